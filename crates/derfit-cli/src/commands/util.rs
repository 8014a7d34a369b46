use std::io;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use derfit_cli::Settings;
use derfit_io::{load_reference_tables, LoadedTables};

/// Load the reference tables named by the settings.
pub fn load_tables(settings: &Settings) -> Result<LoadedTables> {
    let sources = &settings.sources;
    debug!(
        "loading reference tables: {}, {}, {}",
        sources.municipalities.display(),
        sources.categories.display(),
        sources.ceilings.display()
    );
    let loaded = load_reference_tables(sources, settings.escalation.clone())
        .context("loading reference tables")?;
    info!(
        "loaded {} municipalities and {} category rows",
        loaded.tables.municipalities().len(),
        loaded.tables.relation().len()
    );
    Ok(loaded)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value)
        .map_err(|err| anyhow::anyhow!("serializing output to JSON: {err}"))?;
    println!();
    Ok(())
}

