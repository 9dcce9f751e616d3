//! Check command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tessera_core::{CatalogIndex, CatalogManager, DEFAULT_MAX_KEY_LENGTH};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the catalog JSON file
    pub catalog: PathBuf,

    /// Longest allowed event name
    #[arg(long, default_value_t = DEFAULT_MAX_KEY_LENGTH)]
    pub max_key_length: usize,

    /// List every event
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs the check command.
pub fn run(args: &CheckArgs) -> Result<()> {
    info!(path = ?args.catalog, "Checking catalog");

    let index = super::load_catalog(&args.catalog, args.max_key_length)?;
    print!("{}", summary(&index, args.verbose));
    Ok(())
}

fn summary(index: &CatalogIndex, verbose: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "✓ {} catalog(s), {} event(s), {} attribute(s), {} request context attribute(s)\n",
        index.catalog_ids().len(),
        index.event_count(),
        index.attribute_count(),
        index.get_request_context_attributes().len()
    ));
    if !index.products().is_empty() {
        out.push_str(&format!("  Products: {}\n", index.products().len()));
    }
    for category in index.categories() {
        out.push_str(&format!(
            "  Category {}: {}\n",
            category.name,
            index
                .events_in_category(&category.name)
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if verbose {
        for event in index.events() {
            out.push_str(&format!(
                "  {}/{} ({} attribute(s))\n",
                event.catalog_id,
                event.name,
                event.attributes.len()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::banking_catalog_file;
    use tessera_core::fixtures::banking_catalog;

    #[test]
    fn test_summary() {
        let index = CatalogIndex::build(banking_catalog()).unwrap();
        let text = summary(&index, true);
        assert!(text.starts_with(
            "✓ 1 catalog(s), 4 event(s), 12 attribute(s), 6 request context attribute(s)"
        ));
        assert!(text.contains("Category account: transfer, deposit"));
        assert!(text.contains("DEFAULT/transfer (8 attribute(s))"));
    }

    #[test]
    fn test_run_on_file() {
        let file = banking_catalog_file();
        let args = CheckArgs {
            catalog: file.path().to_path_buf(),
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            verbose: false,
        };
        assert!(run(&args).is_ok());
    }

    #[test]
    fn test_short_key_length_rejects_catalog() {
        let file = banking_catalog_file();
        let args = CheckArgs {
            catalog: file.path().to_path_buf(),
            max_key_length: 4,
            verbose: false,
        };
        let err = run(&args).unwrap_err();
        assert!(err.to_string().starts_with("Invalid catalog"));
    }
}
