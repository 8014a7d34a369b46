//! Append-only log of project updates.
//!
//! Each row captures one update to a customer's installation: who, when, where, the
//! kit that was installed, the kit that was shipped, the kit currently on the roof and
//! the verdict text produced by the classifier. Column headers match the spreadsheet
//! the operations team already keeps, so existing files can be appended to in place.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use derfit_core::text::normalize;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("I/O error on history log: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed history log: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to replace history log: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("no history record at index {index} (log has {len} records)")]
    NoSuchRecord { index: usize, len: usize },
}

/// One project update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "Cliente")]
    pub client: String,
    #[serde(rename = "Data de Envio")]
    pub send_date: NaiveDate,
    #[serde(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "Fase")]
    pub phase: String,
    #[serde(rename = "Carga Instalada")]
    pub installed_load_kw: f64,

    #[serde(rename = "Kit Instalado - Potência", default)]
    pub installed_kit_power: String,
    #[serde(rename = "Kit Instalado - Placas", default)]
    pub installed_kit_panels: String,
    #[serde(rename = "Kit Instalado - Inversor", default)]
    pub installed_kit_inverter: String,

    #[serde(rename = "Kit Enviado - Potência", default)]
    pub shipped_kit_power: String,
    #[serde(rename = "Kit Enviado - Placas", default)]
    pub shipped_kit_panels: String,
    #[serde(rename = "Kit Enviado - Inversor", default)]
    pub shipped_kit_inverter: String,

    #[serde(rename = "Comentário do Notion", default)]
    pub notion_comment: String,

    #[serde(rename = "Kit Atual - Potência", default)]
    pub current_kit_power: String,
    #[serde(rename = "Kit Atual - Placas", default)]
    pub current_kit_panels: String,
    #[serde(rename = "Kit Atual - Inversor", default)]
    pub current_kit_inverter: String,

    /// Verdict text pasted from (or produced by) the classifier
    #[serde(rename = "Observação", default)]
    pub observation: String,
}

/// Column headers of the log, in file order.
pub const HISTORY_HEADERS: [&str; 16] = [
    "Cliente",
    "Data de Envio",
    "Cidade",
    "Fase",
    "Carga Instalada",
    "Kit Instalado - Potência",
    "Kit Instalado - Placas",
    "Kit Instalado - Inversor",
    "Kit Enviado - Potência",
    "Kit Enviado - Placas",
    "Kit Enviado - Inversor",
    "Comentário do Notion",
    "Kit Atual - Potência",
    "Kit Atual - Placas",
    "Kit Atual - Inversor",
    "Observação",
];

/// Append one record.
///
/// A new or empty log gets the header first. A log written with a different column set
/// (an older export, a hand-edited sheet) is read, extended and rewritten with the
/// current columns so every row keeps the same shape.
pub fn append_record(path: &Path, record: &HistoryRecord) -> Result<(), HistoryError> {
    match existing_header(path)? {
        Some(header) if header.iter().eq(HISTORY_HEADERS) => {
            let file = OpenOptions::new().append(true).open(path)?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.serialize(record)?;
            writer.flush()?;
        }
        Some(header) => {
            let mut records = read_history(path)?;
            records.push(record.clone());
            rewrite_log(path, &records)?;
            info!(
                "rewrote {} with {} columns (was {})",
                path.display(),
                HISTORY_HEADERS.len(),
                header.len()
            );
        }
        None => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
            writer.serialize(record)?;
            writer.flush()?;
        }
    }
    info!("appended history record for '{}' to {}", record.client, path.display());
    Ok(())
}

/// Header of an existing, non-empty log.
fn existing_header(path: &Path) -> Result<Option<StringRecord>, HistoryError> {
    if fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true) {
        return Ok(None);
    }
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let header = reader.headers()?.clone();
    Ok(Some(header))
}

/// Replace the log with `records` through a temporary file in the same directory, so a
/// failed write leaves the original untouched.
fn rewrite_log(path: &Path, records: &[HistoryRecord]) -> Result<(), HistoryError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(&mut tmp);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// All records in file order. A log that does not exist yet is empty.
pub fn read_history(path: &Path) -> Result<Vec<HistoryRecord>, HistoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    debug!("read {} history records from {}", records.len(), path.display());
    Ok(records)
}

/// Criteria for narrowing the history view. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    /// Case- and accent-insensitive substring of the client name
    pub client: Option<String>,
    /// Normalized city name
    pub city: Option<String>,
    /// Inclusive lower bound on the send date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the send date
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &HistoryRecord) -> bool {
        if let Some(client) = &self.client {
            if !normalize(&record.client).contains(&normalize(client)) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if normalize(&record.city) != normalize(city) {
                return false;
            }
        }
        if self.from.is_some_and(|from| record.send_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.send_date > to) {
            return false;
        }
        true
    }

    /// Matching records paired with their index in the log.
    pub fn apply<'a>(&self, records: &'a [HistoryRecord]) -> Vec<(usize, &'a HistoryRecord)> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .collect()
    }
}

/// Fields that may be changed after a record was logged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordEdit {
    pub notion_comment: Option<String>,
    pub observation: Option<String>,
    pub current_kit_power: Option<String>,
    pub current_kit_panels: Option<String>,
    pub current_kit_inverter: Option<String>,
}

impl RecordEdit {
    pub fn is_empty(&self) -> bool {
        *self == RecordEdit::default()
    }

    fn apply(&self, record: &mut HistoryRecord) {
        let updates = [
            (&self.notion_comment, &mut record.notion_comment),
            (&self.observation, &mut record.observation),
            (&self.current_kit_power, &mut record.current_kit_power),
            (&self.current_kit_panels, &mut record.current_kit_panels),
            (&self.current_kit_inverter, &mut record.current_kit_inverter),
        ];
        for (value, field) in updates {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }
}

/// Edit the record at `index` and rewrite the log.
pub fn update_record(
    path: &Path,
    index: usize,
    edit: &RecordEdit,
) -> Result<HistoryRecord, HistoryError> {
    let mut records = read_history(path)?;
    let len = records.len();
    let record = records
        .get_mut(index)
        .ok_or(HistoryError::NoSuchRecord { index, len })?;
    edit.apply(record);
    let updated = record.clone();

    rewrite_log(path, &records)?;
    info!("updated history record {index} in {}", path.display());
    Ok(updated)
}
