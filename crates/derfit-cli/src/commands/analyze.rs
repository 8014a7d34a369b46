use anyhow::Result;
use tracing::info;

use crate::commands::util::load_tables;
use derfit_algo::{analyze, format_verdict, ClassificationRequest, ClassificationResult};
use derfit_cli::{OutputFormat, Settings};

pub struct AnalyzeArgs<'a> {
    pub city: &'a str,
    pub phase: &'a str,
    pub load: f64,
    pub kit: &'a str,
}

pub fn handle(settings: &Settings, args: &AnalyzeArgs<'_>, format: OutputFormat) -> Result<()> {
    let result = run(settings, args)?;
    let rendered = format_verdict(&result, format.into())?;
    println!("{rendered}");
    Ok(())
}

/// Classify and escalate; shared with `history add --analyze`.
pub fn run(settings: &Settings, args: &AnalyzeArgs<'_>) -> Result<ClassificationResult> {
    let loaded = load_tables(settings)?;
    let request = ClassificationRequest::from_form(args.city, args.phase, args.load, args.kit);
    info!(
        "Analyzing {} kit for {} ({}, {} kW)",
        args.kit, args.city, args.phase, args.load
    );
    Ok(analyze(&request, &loaded.tables))
}
