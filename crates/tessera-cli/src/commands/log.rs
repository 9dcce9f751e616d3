//! Log command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tessera_audit::{
    AuditConfig, AuditEngine, AuditSink, JsonLinesSink, RequestContext, TracingSink,
};
use tessera_core::SharedCatalogManager;

/// Arguments for the log command.
#[derive(Args)]
pub struct LogArgs {
    /// Path to the catalog JSON file
    pub catalog: PathBuf,

    /// Event name
    pub event: String,

    /// Event attribute as key=value (repeatable)
    #[arg(short, long = "attribute", value_parser = parse_pair)]
    pub attributes: Vec<(String, String)>,

    /// Request context value as key=value (repeatable)
    #[arg(short, long = "context", value_parser = parse_pair)]
    pub context: Vec<(String, String)>,

    /// Catalog to look the event up in (defaults to the default catalog)
    #[arg(long)]
    pub catalog_id: Option<String>,

    /// Engine configuration file (JSON or YAML)
    #[arg(long, env = "TESSERA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the message to stdout as JSON instead of the log
    #[arg(long)]
    pub json: bool,
}

/// Parses a `key=value` argument.
fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Runs the log command.
pub fn run(args: &LogArgs) -> Result<()> {
    info!(path = ?args.catalog, event = %args.event, "Logging event");

    let config = match &args.config {
        Some(path) => AuditConfig::from_path(path)?,
        None => AuditConfig::default(),
    };
    let sink: Arc<dyn AuditSink> = if args.json {
        Arc::new(JsonLinesSink::new(std::io::stdout()))
    } else {
        Arc::new(TracingSink::new())
    };
    let engine = build_engine(args, config, sink)?;

    let attributes: BTreeMap<String, String> = args.attributes.iter().cloned().collect();
    engine
        .validate_and_log(&args.event, args.catalog_id.as_deref(), &attributes, None)
        .with_context(|| format!("Event {} was not logged", args.event))?;
    engine.dispatcher().sink().flush()?;

    if !args.json {
        println!("✓ {} logged", args.event);
    }
    Ok(())
}

fn build_engine(args: &LogArgs, config: AuditConfig, sink: Arc<dyn AuditSink>) -> Result<AuditEngine> {
    let index = super::load_catalog(&args.catalog, config.max_key_length)?;
    let context: RequestContext = args.context.iter().cloned().collect();
    Ok(AuditEngine::builder(SharedCatalogManager::new(index))
        .config(config)
        .context(Arc::new(context))
        .sink(sink)
        .build())
}
