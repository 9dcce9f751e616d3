//! Describe command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tessera_core::{CatalogManager, DEFAULT_MAX_KEY_LENGTH};

/// Arguments for the describe command.
#[derive(Args)]
pub struct DescribeArgs {
    /// Path to the catalog JSON file
    pub catalog: PathBuf,

    /// Event name
    pub event: String,

    /// Catalog to look the event up in (defaults to the default catalog)
    #[arg(long)]
    pub catalog_id: Option<String>,

    /// Print the event definition as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the describe command.
pub fn run(args: &DescribeArgs) -> Result<()> {
    info!(path = ?args.catalog, event = %args.event, "Describing event");

    let index = super::load_catalog(&args.catalog, DEFAULT_MAX_KEY_LENGTH)?;
    print!("{}", describe(&index, &args.event, args.catalog_id.as_deref(), args.json)?);
    Ok(())
}

fn describe(
    catalog: &dyn CatalogManager,
    event_name: &str,
    catalog_id: Option<&str>,
    json: bool,
) -> Result<String> {
    let event = catalog
        .get_event(event_name, catalog_id)
        .with_context(|| format!("Unable to locate definition of audit event {event_name}"))?;
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(event.as_ref())?));
    }

    let attributes = catalog.get_attributes(event_name, catalog_id)?;
    let mut required = Vec::new();
    let mut optional = Vec::new();
    for reference in &event.attributes {
        let Some(attribute) = attributes.get(&reference.name) else {
            continue;
        };
        if attribute.request_context {
            continue;
        }
        let mut line = reference.name.clone();
        for constraint in &attribute.constraints {
            line.push_str(&format!(" [{} {}]", constraint.type_name(), constraint.value));
        }
        if attribute.required || reference.forces_required() {
            required.push(line);
        } else {
            optional.push(line);
        }
    }
    let context = catalog.get_required_context_attributes(event_name, catalog_id)?;

    let mut out = format!("{} ({})\n", event.name, event.catalog_id);
    if !event.description.is_empty() {
        out.push_str(&format!("  {}\n", event.description));
    }
    for (label, names) in [
        ("Required attributes", required),
        ("Optional attributes", optional),
        ("Required context", context),
    ] {
        if names.is_empty() {
            out.push_str(&format!("{label}: none\n"));
        } else {
            out.push_str(&format!("{label}:\n"));
            for name in names {
                out.push_str(&format!("  - {name}\n"));
            }
        }
    }
    Ok(out)
}
