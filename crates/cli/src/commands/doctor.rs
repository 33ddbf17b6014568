//! Doctor command - validate configuration and show status

use anyhow::Result;
use holginator_adapters::definitions::JsonDefinitionsRepo;
use holginator_domain::DefinitionsRepo;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    feeds: CheckResult,
    store: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        feeds: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.feeds = check_feeds(&config.general.feeds_path).await;
        report.store = check_store(config);
    }

    let checks = [&report.config, &report.feeds, &report.store];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_feeds(path: &Path) -> CheckResult {
    let repo = match JsonDefinitionsRepo::new(path) {
        Ok(r) => r,
        Err(e) => return CheckResult::error(format!("{}", e)),
    };

    match repo.load().await {
        Ok(defs) => {
            let sources: usize = defs.iter().map(|d| d.sources.len()).sum();
            CheckResult::ok(format!(
                "{} composed feeds, {} sources",
                defs.len(),
                sources
            ))
            .with_details(serde_json::json!({
                "path": path.display().to_string(),
                "names": defs.iter().map(|d| &d.name).collect::<Vec<_>>(),
            }))
        }
        Err(e) => CheckResult::error(format!("Validation failed: {}", e)),
    }
}

fn check_store(config: &AppConfig) -> CheckResult {
    if config.store.backend == StoreBackend::Memory {
        return CheckResult::warn("In-memory store: published feeds are discarded on exit");
    }

    let env_var = &config.store.url_env;
    if env_var.trim().is_empty() {
        return CheckResult::warn(format!(
            "No URL env var configured, using {}",
            config.store.default_url
        ));
    }

    // Only report presence; the URL may carry a password
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => {
            CheckResult::ok(format!("Redis URL: {} (set)", env_var))
        }
        _ => CheckResult::warn(format!(
            "Redis URL: {} (not set), falling back to {}",
            env_var, config.store.default_url
        )),
    }
}

fn print_report(report: &DoctorReport) {
    println!("holginator Doctor Report");
    println!("========================");
    println!();

    print_check("Config", &report.config);
    print_check("Feeds", &report.feeds);
    print_check("Store", &report.store);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready to run! Try: holginator run --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
