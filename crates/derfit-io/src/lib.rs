//! # derfit-io: Reference Tables & Project History
//!
//! File input/output for the eligibility engine: loading the three reference tables
//! into [`derfit_core::ReferenceTables`] and keeping the project update log.
//!
//! ## Design Philosophy
//!
//! **Fail fast on schema, degrade on cells**: a missing file or a missing column stops
//! the load with a [`derfit_core::LoadError`]. A bad cell (unparsable range, unparsable
//! ceiling, duplicate key) keeps the load going and is recorded as a diagnostic.
//!
//! **Locale-tolerant input**: reference spreadsheets are exported by hand, so the
//! reader sniffs `,`/`;` delimiters, accepts Windows-1252 and ignores a BOM.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use derfit_core::EscalationMap;
//! use derfit_io::reference::{load_reference_tables, ReferenceSources};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sources = ReferenceSources::in_dir(Path::new("data"));
//!     let loaded = load_reference_tables(&sources, EscalationMap::default())?;
//!
//!     println!("Municipalities: {}", loaded.tables.municipalities().len());
//!     println!("Categories: {}", loaded.tables.relation().len());
//!     if loaded.diagnostics.has_issues() {
//!         eprintln!("{}", loaded.diagnostics);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`table`] - CSV decoding and normalized-header access
//! - [`reference`] - schema validation, parsing and the category/ceiling join
//! - [`history`] - append-only project update log with filtering and editing

pub mod history;
pub mod reference;
pub mod table;

pub use history::{
    append_record, read_history, update_record, HistoryError, HistoryFilter, HistoryRecord,
    RecordEdit,
};
pub use reference::{
    build_reference_tables, load_reference_tables, parse_load_range, LoadedTables,
    ReferenceSources,
};
pub use table::RawTable;
