use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::Local;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::analyze::{self, AnalyzeArgs};
use crate::commands::util::print_json;
use derfit_cli::{HistoryAddArgs, HistoryCommands, OutputFormat, Settings};
use derfit_core::text::extract_number;
use derfit_core::PhaseType;
use derfit_io::{
    append_record, read_history, update_record, HistoryFilter, HistoryRecord, RecordEdit,
};

pub fn handle(settings: &Settings, command: &HistoryCommands) -> Result<()> {
    match command {
        HistoryCommands::Add(args) => add(settings, args),
        HistoryCommands::List {
            client,
            city,
            from,
            to,
            format,
        } => {
            let filter = HistoryFilter {
                client: client.clone(),
                city: city.clone(),
                from: *from,
                to: *to,
            };
            list(settings, &filter, *format)
        }
        HistoryCommands::Edit {
            index,
            comment,
            observation,
            current_kit_power,
            current_kit_panels,
            current_kit_inverter,
        } => {
            let edit = RecordEdit {
                notion_comment: comment.clone(),
                observation: observation.clone(),
                current_kit_power: current_kit_power.clone(),
                current_kit_panels: current_kit_panels.clone(),
                current_kit_inverter: current_kit_inverter.clone(),
            };
            edit_record(settings, *index, &edit)
        }
    }
}

fn add(settings: &Settings, args: &HistoryAddArgs) -> Result<()> {
    let phase: PhaseType = args
        .phase
        .parse()
        .with_context(|| format!("recording update for '{}'", args.client))?;

    let mut observation = args.observation.trim().to_string();
    if args.analyze {
        let verdict = analyze_shipped_kit(settings, args)?;
        println!("{verdict}");
        observation = if observation.is_empty() {
            verdict
        } else {
            format!("{observation} | {verdict}")
        };
    }

    let record = HistoryRecord {
        client: args.client.trim().to_string(),
        send_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        city: args.city.trim().to_string(),
        phase: phase.form_label().to_string(),
        installed_load_kw: args.load,
        installed_kit_power: args.installed_kit_power.clone(),
        installed_kit_panels: args.installed_kit_panels.clone(),
        installed_kit_inverter: args.installed_kit_inverter.clone(),
        shipped_kit_power: args.shipped_kit_power.clone(),
        shipped_kit_panels: args.shipped_kit_panels.clone(),
        shipped_kit_inverter: args.shipped_kit_inverter.clone(),
        notion_comment: args.comment.clone(),
        current_kit_power: args.current_kit_power.clone(),
        current_kit_panels: args.current_kit_panels.clone(),
        current_kit_inverter: args.current_kit_inverter.clone(),
        observation,
    };
    append_record(&settings.history, &record)
        .with_context(|| format!("appending to {}", settings.history.display()))?;
    println!(
        "Recorded update for {} in {}",
        record.client,
        settings.history.display()
    );
    Ok(())
}

/// Verdict text for the shipped kit, or the installed kit when no shipped rating
/// was given.
fn analyze_shipped_kit(settings: &Settings, args: &HistoryAddArgs) -> Result<String> {
    let kit = if extract_number(&args.shipped_kit_power).is_some() {
        args.shipped_kit_power.as_str()
    } else {
        args.installed_kit_power.as_str()
    };
    info!("Analyzing kit '{kit}' for {}", args.client);
    let result = analyze::run(
        settings,
        &AnalyzeArgs {
            city: &args.city,
            phase: &args.phase,
            load: args.load,
            kit,
        },
    )?;
    Ok(result.to_string())
}

#[derive(Serialize)]
struct ListedRecord<'a> {
    index: usize,
    #[serde(flatten)]
    record: &'a HistoryRecord,
}

fn list(settings: &Settings, filter: &HistoryFilter, format: OutputFormat) -> Result<()> {
    let records = read_history(&settings.history)
        .with_context(|| format!("reading {}", settings.history.display()))?;
    let matches = filter.apply(&records);
    info!(
        "{} of {} history records match",
        matches.len(),
        records.len()
    );

    match format {
        OutputFormat::Json => {
            let listed: Vec<ListedRecord> = matches
                .into_iter()
                .map(|(index, record)| ListedRecord { index, record })
                .collect();
            print_json(&listed)
        }
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(io::stdout()).padding(2);
            writeln!(
                writer,
                "#\tDATE\tCLIENT\tCITY\tPHASE\tLOAD (kW)\tSHIPPED KIT\tOBSERVATION"
            )?;
            for (index, record) in matches {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    index,
                    record.send_date,
                    record.client,
                    record.city,
                    record.phase,
                    record.installed_load_kw,
                    record.shipped_kit_power,
                    record.observation
                )?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

fn edit_record(settings: &Settings, index: usize, edit: &RecordEdit) -> Result<()> {
    if edit.is_empty() {
        bail!("nothing to edit; pass at least one field to change");
    }
    let updated = update_record(&settings.history, index, edit)
        .with_context(|| format!("editing record {index} in {}", settings.history.display()))?;
    println!("Updated record {index} ({})", updated.client);
    Ok(())
}
