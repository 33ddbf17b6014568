//! Definitions command - list and validate composed feed definitions

use anyhow::{Context, Result};
use holginator_adapters::definitions::JsonDefinitionsRepo;
use holginator_domain::DefinitionsRepo;
use std::path::PathBuf;

use crate::args::{DefinitionsArgs, DefinitionsCommands};
use crate::commands::load_definitions;
use crate::config::AppConfig;

pub async fn execute(args: DefinitionsArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        DefinitionsCommands::List { feeds_path, json } => {
            list_definitions(feeds_path, json, config_path).await
        }
        DefinitionsCommands::Validate { feeds_path } => {
            validate_definitions(feeds_path, config_path).await
        }
    }
}

fn resolve_feeds_path(feeds_path: Option<PathBuf>, config_path: Option<PathBuf>) -> PathBuf {
    feeds_path.unwrap_or_else(|| {
        AppConfig::load(config_path.as_deref())
            .unwrap_or_default()
            .general
            .feeds_path
    })
}

async fn list_definitions(
    feeds_path: Option<PathBuf>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = resolve_feeds_path(feeds_path, config_path);
    let definitions = load_definitions(&path).await?;

    if json {
        let output = serde_json::json!({
            "count": definitions.len(),
            "definitions": definitions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Composed Feeds ({} found)", definitions.len());
        println!("========================");
        println!();

        for def in &definitions {
            println!("Name: {}", def.name);
            println!("  Title: {}", def.title);
            if !def.description.is_empty() {
                println!("  Description: {}", def.description);
            }
            for source in &def.sources {
                match &source.filter {
                    Some(filter) => println!("  Source: {} (filter: {})", source.url, filter.as_str()),
                    None => println!("  Source: {}", source.url),
                }
            }
            println!();
        }
    }

    Ok(())
}

async fn validate_definitions(
    feeds_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = resolve_feeds_path(feeds_path, config_path);

    println!("Validating feeds file: {}", path.display());

    let repo =
        JsonDefinitionsRepo::new(&path).context("Failed to initialize definitions repository")?;

    match repo.validate().await {
        Ok(()) => {
            let definitions = repo.load().await?;
            println!("✓ Validation passed ({} composed feeds)", definitions.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Validation failed: {}", e);
            std::process::exit(1);
        }
    }
}
