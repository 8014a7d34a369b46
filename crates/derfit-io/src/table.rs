//! Raw CSV tables with normalized headers.
//!
//! Reference spreadsheets arrive exported from office suites in whatever shape the
//! operator's locale produced: `;` or `,` separators, UTF-8 or Windows-1252, sometimes a
//! byte-order mark. [`RawTable`] absorbs those differences and exposes string cells
//! addressed by normalized column name.

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use derfit_core::text::normalize;
use derfit_core::LoadError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// A CSV table held as strings, headers passed through [`normalize`].
#[derive(Debug, Clone)]
pub struct RawTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a table from disk. A missing file is [`LoadError::SourceNotFound`].
    pub fn from_path(name: &str, path: &Path) -> Result<Self, LoadError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LoadError::SourceNotFound(path.display().to_string()))
            }
            Err(source) => {
                return Err(LoadError::Io {
                    table: name.to_string(),
                    source,
                })
            }
        };
        Self::from_csv_str(name, &decode_text(&bytes))
    }

    /// Parse a table from CSV text, sniffing the delimiter from the header line.
    pub fn from_csv_str(name: &str, text: &str) -> Result<Self, LoadError> {
        let parse_err = |message: String| LoadError::Parse {
            table: name.to_string(),
            message,
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(sniff_delimiter(text))
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_err(e.to_string()))?
            .iter()
            .map(normalize)
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(parse_err("empty header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| parse_err(e.to_string()))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a column whose normalized header equals `column`.
    pub fn require_column(&self, column: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LoadError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Index of the single column whose header contains `pattern`.
    ///
    /// An exact match wins outright; otherwise exactly one header may contain the
    /// pattern, and several candidates are an [`LoadError::AmbiguousColumn`].
    pub fn require_column_containing(&self, pattern: &str) -> Result<usize, LoadError> {
        if let Ok(idx) = self.require_column(pattern) {
            return Ok(idx);
        }
        let candidates: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(pattern))
            .map(|(idx, _)| idx)
            .collect();
        match candidates.as_slice() {
            [idx] => Ok(*idx),
            [] => Err(LoadError::MissingColumn {
                table: self.name.clone(),
                column: pattern.to_string(),
            }),
            many => Err(LoadError::AmbiguousColumn {
                table: self.name.clone(),
                pattern: pattern.to_string(),
                candidates: many.iter().map(|idx| self.headers[*idx].clone()).collect(),
            }),
        }
    }
}

/// Cell text, empty when the row is shorter than the header.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Decode file bytes as UTF-8, falling back to Windows-1252, without a leading BOM.
///
/// Windows-1252 is a superset of Latin-1 for printable text and also maps the en dash
/// (0x96) that office exports put in load ranges.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("input is not UTF-8, decoding as Windows-1252");
            WINDOWS_1252
                .decode_without_bom_handling(bytes)
                .0
                .into_owned()
        }
    }
}

/// Pick the delimiter that occurs most often on the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    DELIMITERS
        .iter()
        .copied()
        .map(|d| (d, header.bytes().filter(|b| *b == d).count()))
        .fold((b',', 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
}
