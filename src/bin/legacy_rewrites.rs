//! Renders mod_rewrite rules for the old store from a JSON export of
//! `{ "external_url": ..., "title": ... }` records.
//!
//! Usage: `legacy_rewrites <export.json> [output.htaccess]`

use anyhow::{bail, Context, Result};
use catalog_feed::domain::aggregates::render_rewrite_rules;
use catalog_feed::LegacyUrlMapping;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct ExportedProduct {
    #[serde(default, alias = "url")]
    external_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else { bail!("usage: legacy_rewrites <export.json> [output.htaccess]") };
    let output = args.next();

    let contents = std::fs::read_to_string(&input).with_context(|| format!("reading {input}"))?;
    let records: Vec<ExportedProduct> = serde_json::from_str(&contents).with_context(|| format!("parsing {input}"))?;

    let mut skipped = 0usize;
    let mappings: Vec<LegacyUrlMapping> = records
        .iter()
        .filter_map(|r| {
            let mapping = LegacyUrlMapping::from_external_url(r.external_url.as_deref()?, r.title.as_deref()?);
            if mapping.is_none() { skipped += 1; }
            mapping
        })
        .collect();
    tracing::info!(records = records.len(), mappings = mappings.len(), skipped, "legacy mappings built");

    let rules = render_rewrite_rules(&mappings);
    match output {
        Some(path) => std::fs::write(&path, rules).with_context(|| format!("writing {path}"))?,
        None => print!("{rules}"),
    }
    Ok(())
}
