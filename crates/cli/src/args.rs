//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// holginator: composes podcast feeds from upstream sources and publishes them to a key-value store
#[derive(Parser, Debug)]
#[command(name = "holginator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose every feed and publish it to the store
    Run(RunArgs),

    /// Compose one feed and print it without publishing
    Preview(PreviewArgs),

    /// Manage composed feed definitions
    Definitions(DefinitionsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Compose without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Only process the named feed (repeatable)
    #[arg(long = "feed", value_name = "NAME")]
    pub feeds: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Name of the composed feed
    pub name: String,

    /// Write the document to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DefinitionsArgs {
    #[command(subcommand)]
    pub command: DefinitionsCommands,
}

#[derive(Subcommand, Debug)]
pub enum DefinitionsCommands {
    /// List all composed feed definitions
    List {
        /// Override feeds file
        #[arg(long)]
        feeds_path: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the feeds file
    Validate {
        /// Override feeds file
        #[arg(long)]
        feeds_path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
