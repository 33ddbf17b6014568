//! Run command - compose and publish every feed once

use anyhow::{Result, bail};
use holginator_domain::{ComposedFeedDefinition, FeedOutcome};
use std::path::PathBuf;

use crate::args::RunArgs;
use crate::commands::{build_pipeline, build_store, load_definitions};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let dry_run = args.dry_run || config.general.dry_run;

    let definitions = load_definitions(&config.general.feeds_path).await?;
    let definitions = select_definitions(definitions, &args.feeds)?;

    tracing::info!(
        dry_run = dry_run,
        feeds = definitions.len(),
        backend = ?config.store.backend,
        "Starting holginator run"
    );

    let store = build_store(&config, dry_run).await?;
    let pipeline = build_pipeline(&config, store, dry_run)?;

    let results = pipeline.run_once(&definitions).await;

    let mut failed = Vec::new();
    for (name, outcome) in &results {
        match outcome {
            FeedOutcome::Published {
                item_count,
                fingerprint,
                failed_sources,
            }
            | FeedOutcome::Previewed {
                item_count,
                fingerprint,
                failed_sources,
            } => {
                if !failed_sources.is_empty() {
                    tracing::warn!(
                        feed = %name,
                        failed_sources = ?failed_sources,
                        "Composed feed is missing sources"
                    );
                }
                tracing::info!(
                    feed = %name,
                    items = item_count,
                    fingerprint = %fingerprint,
                    "Done"
                );
            }
            FeedOutcome::Failed { error } => {
                tracing::error!(feed = %name, error = %error, "Failed");
                failed.push(name.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} composed feeds failed: {}",
            failed.len(),
            results.len(),
            failed.join(", ")
        );
    }

    tracing::info!("holginator run completed");
    Ok(())
}

/// Restrict to the requested names, keeping file order; no names means all
fn select_definitions(
    definitions: Vec<ComposedFeedDefinition>,
    names: &[String],
) -> Result<Vec<ComposedFeedDefinition>> {
    if names.is_empty() {
        return Ok(definitions);
    }

    let unknown: Vec<_> = names
        .iter()
        .filter(|name| !definitions.iter().any(|d| &d.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!("Unknown composed feed(s): {}", unknown.join(", "));
    }

    Ok(definitions
        .into_iter()
        .filter(|d| names.contains(&d.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use holginator_domain::SourceSpec;

    fn definition(name: &str) -> ComposedFeedDefinition {
        ComposedFeedDefinition {
            name: name.to_string(),
            title: name.to_string(),
            description: String::new(),
            image: String::new(),
            sources: vec![SourceSpec {
                url: format!("http://example.com/{}.xml", name),
                filter: None,
            }],
        }
    }

    #[test]
    fn test_select_all_when_no_names() {
        let selected = select_definitions(vec![definition("a"), definition("b")], &[]).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_keeps_file_order() {
        let selected = select_definitions(
            vec![definition("a"), definition("b"), definition("c")],
            &["c".to_string(), "a".to_string()],
        )
        .unwrap();

        let names: Vec<_> = selected.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_select_unknown_name_fails() {
        let error = select_definitions(vec![definition("a")], &["missing".to_string()])
            .unwrap_err();
        assert!(error.to_string().contains("missing"));
    }
}
