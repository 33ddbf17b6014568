//! Preview command - compose a single feed without publishing

use anyhow::{Context, Result};
use holginator_adapters::store::InMemoryStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::PreviewArgs;
use crate::commands::{build_pipeline, load_definitions};
use crate::config::AppConfig;

pub async fn execute(args: PreviewArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let definitions = load_definitions(&config.general.feeds_path).await?;

    let definition = definitions
        .iter()
        .find(|d| d.name == args.name)
        .with_context(|| format!("Unknown composed feed: {}", args.name))?;

    let pipeline = build_pipeline(&config, Arc::new(InMemoryStore::new()), true)?;
    let composed = pipeline
        .compose_definition(definition)
        .await
        .with_context(|| format!("Failed to compose {}", definition.name))?;

    for url in &composed.failed_sources {
        tracing::warn!(feed = %definition.name, url = %url, "Source skipped");
    }

    tracing::info!(
        feed = %definition.name,
        items = composed.rendered.item_count,
        fingerprint = %composed.rendered.fingerprint,
        "Composed preview"
    );

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &composed.rendered.document)
                .await
                .with_context(|| format!("Failed to write preview: {}", path.display()))?;
            println!(
                "Wrote {} ({} items) to {}",
                definition.name,
                composed.rendered.item_count,
                path.display()
            );
        }
        None => println!("{}", composed.rendered.document),
    }

    Ok(())
}
