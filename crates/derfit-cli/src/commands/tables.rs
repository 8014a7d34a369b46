use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::util::{load_tables, print_json};
use derfit_cli::{OutputFormat, Settings, TablesCommands};
use derfit_core::DiagnosticIssue;

pub fn handle(settings: &Settings, command: &TablesCommands) -> Result<()> {
    match command {
        TablesCommands::Check { format } => check(settings, *format),
        TablesCommands::Lookup { city, format } => lookup(settings, city, *format),
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    municipalities: usize,
    category_rows: usize,
    voltages: Vec<&'a str>,
    warnings: usize,
    errors: usize,
    issues: &'a [DiagnosticIssue],
}

fn check(settings: &Settings, format: OutputFormat) -> Result<()> {
    let loaded = load_tables(settings)?;
    let tables = &loaded.tables;
    let voltages: BTreeSet<&str> = tables
        .relation()
        .rows()
        .iter()
        .map(|row| row.voltage.as_str())
        .collect();
    let report = CheckReport {
        municipalities: tables.municipalities().len(),
        category_rows: tables.relation().len(),
        voltages: voltages.into_iter().collect(),
        warnings: loaded.diagnostics.warning_count(),
        errors: loaded.diagnostics.error_count(),
        issues: &loaded.diagnostics.issues,
    };

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Plain => {
            println!("Reference tables:");
            println!("  Municipalities : {}", report.municipalities);
            println!("  Category rows  : {}", report.category_rows);
            println!("  Voltages       : {}", report.voltages.join(", "));
            println!(
                "  Diagnostics    : {} warning(s), {} error(s)",
                report.warnings, report.errors
            );
            for issue in report.issues {
                println!("    {issue}");
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct LookupRow<'a> {
    category: &'a str,
    phase_type: Option<&'static str>,
    load_min_kw: f64,
    load_max_kw: f64,
    max_generation: String,
}

#[derive(Serialize)]
struct LookupReport<'a> {
    city: &'a str,
    voltage: &'a str,
    rows: Vec<LookupRow<'a>>,
}

fn lookup(settings: &Settings, city: &str, format: OutputFormat) -> Result<()> {
    let loaded = load_tables(settings)?;
    let tables = &loaded.tables;
    let Some(voltage) = tables.municipalities().voltage_for(city) else {
        bail!("unknown city '{city}'");
    };
    info!("{city} is served at {voltage}");

    let escalation = tables.escalation();
    let rows: Vec<LookupRow> = tables
        .relation()
        .for_voltage(voltage)
        .map(|row| LookupRow {
            category: &row.category,
            phase_type: escalation.phase_of(&row.category).map(|phase| phase.as_str()),
            load_min_kw: row.load_min_kw.value(),
            load_max_kw: row.load_max_kw.value(),
            max_generation: row.ceiling_label(),
        })
        .collect();
    let report = LookupReport {
        city,
        voltage: voltage.as_str(),
        rows,
    };

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Plain => {
            println!("{city}: {voltage}");
            let mut writer = TabWriter::new(io::stdout()).padding(2);
            writeln!(writer, "CATEGORY\tPHASE\tLOAD MIN (kW)\tLOAD MAX (kW)\tMAX GENERATION")?;
            for row in &report.rows {
                writeln!(
                    writer,
                    "{}\t{}\t{:.2}\t{:.2}\t{}",
                    row.category,
                    row.phase_type.unwrap_or("-"),
                    row.load_min_kw,
                    row.load_max_kw,
                    row.max_generation
                )?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}
