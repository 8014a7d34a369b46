//! Reference table loader.
//!
//! Reads the municipality, category/load and ceiling tables and joins them into
//! [`ReferenceTables`]. The pipeline for each load:
//!
//! 1. Read and decode each CSV, normalizing headers ([`RawTable`])
//! 2. Validate the schema: required columns must exist, the ceiling column must be
//!    unambiguous
//! 3. Canonicalize voltages, municipality names and category codes
//! 4. Parse load ranges (`"a - b"`, single value, `"-"`) and ceilings
//! 5. Left-join categories with ceilings on (voltage, category)
//! 6. Report overlapping ranges and other data-quality issues as [`Diagnostics`]
//!
//! Bad cells never abort a load. Only a missing source or a broken schema is fatal.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use derfit_core::text::extract_number;
use derfit_core::{
    canonical_category, CanonicalVoltage, Diagnostics, EscalationMap, Kilowatts, LoadError,
    MunicipalityVoltageTable, ReferenceTables, TechnicalReferenceRelation, TechnicalReferenceRow,
};

use crate::table::{cell, RawTable};

pub const MUNICIPALITY_TABLE: &str = "municipalities";
pub const CATEGORY_TABLE: &str = "categories";
pub const CEILING_TABLE: &str = "ceilings";

pub const COL_MUNICIPALITY: &str = "municipio";
pub const COL_VOLTAGE: &str = "tensao";
pub const COL_CATEGORY: &str = "categoria";
pub const COL_LOAD_RANGE: &str = "carga_instalada";
/// Matched by containment: source headers carry units and qualifiers.
pub const COL_MAX_GENERATION: &str = "potencia_maxima";

/// Locations of the three reference CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSources {
    pub municipalities: PathBuf,
    pub categories: PathBuf,
    pub ceilings: PathBuf,
}

impl ReferenceSources {
    pub fn new(
        municipalities: impl Into<PathBuf>,
        categories: impl Into<PathBuf>,
        ceilings: impl Into<PathBuf>,
    ) -> Self {
        Self {
            municipalities: municipalities.into(),
            categories: categories.into(),
            ceilings: ceilings.into(),
        }
    }

    /// Standard file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("municipios.csv"),
            dir.join("disjuntores.csv"),
            dir.join("potencia_maxima.csv"),
        )
    }
}

/// Loaded tables plus the data-quality issues found on the way.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub tables: ReferenceTables,
    pub diagnostics: Diagnostics,
}

/// Read the three sources from disk and build the reference tables.
pub fn load_reference_tables(
    sources: &ReferenceSources,
    escalation: EscalationMap,
) -> Result<LoadedTables, LoadError> {
    let municipalities = RawTable::from_path(MUNICIPALITY_TABLE, &sources.municipalities)?;
    let categories = RawTable::from_path(CATEGORY_TABLE, &sources.categories)?;
    let ceilings = RawTable::from_path(CEILING_TABLE, &sources.ceilings)?;
    build_reference_tables(&municipalities, &categories, &ceilings, escalation)
}

/// Build reference tables from already-read raw tables.
pub fn build_reference_tables(
    municipalities: &RawTable,
    categories: &RawTable,
    ceilings: &RawTable,
    escalation: EscalationMap,
) -> Result<LoadedTables, LoadError> {
    let mut diagnostics = Diagnostics::new();

    let municipality_table = build_municipality_table(municipalities, &mut diagnostics)?;
    let ceiling_index = build_ceiling_index(ceilings, &mut diagnostics)?;
    let rows = join_categories(categories, &ceiling_index, &mut diagnostics)?;
    report_overlaps(&rows, &escalation, &mut diagnostics);

    for issue in &diagnostics.issues {
        warn!("{issue}");
    }
    debug!(
        municipalities = municipality_table.len(),
        categories = rows.len(),
        ceilings = ceiling_index.len(),
        issues = diagnostics.issues.len(),
        "reference tables loaded"
    );

    Ok(LoadedTables {
        tables: ReferenceTables::new(
            municipality_table,
            TechnicalReferenceRelation::new(rows),
            escalation,
        ),
        diagnostics,
    })
}

/// Parse a load-range cell into ordered `(min, max)` bounds.
///
/// Accepts `"a - b"` (en/em dashes and their C1 look-alikes too) and a single value (`[v, v]`); a lone `"-"` is
/// the explicit empty range `[0, 0]`. Returns `None` for anything else, which the
/// loader degrades to `[0, 0]` with a warning.
pub fn parse_load_range(text: &str) -> Option<(Kilowatts, Kilowatts)> {
    let cleaned = text.trim().replace(['–', '—', '\u{96}', '\u{97}'], "-");
    if cleaned == "-" {
        return Some((Kilowatts::ZERO, Kilowatts::ZERO));
    }
    let (lo, hi) = match cleaned.split_once('-') {
        Some((lo, hi)) => (extract_number(lo)?, extract_number(hi)?),
        None => {
            let value = extract_number(&cleaned)?;
            (value, value)
        }
    };
    Some((Kilowatts(lo.min(hi)), Kilowatts(lo.max(hi))))
}

fn build_municipality_table(
    table: &RawTable,
    diagnostics: &mut Diagnostics,
) -> Result<MunicipalityVoltageTable, LoadError> {
    let name_col = table.require_column(COL_MUNICIPALITY)?;
    let voltage_col = table.require_column(COL_VOLTAGE)?;

    let mut out = MunicipalityVoltageTable::new();
    for (idx, row) in table.rows().iter().enumerate() {
        let line = idx + 1;
        let name = cell(row, name_col);
        let voltage = CanonicalVoltage::parse(cell(row, voltage_col));
        if name.is_empty() || voltage.is_empty() {
            diagnostics.add_error_at_line(
                table.name(),
                "row",
                "row without municipality or voltage dropped",
                line,
            );
            continue;
        }
        if !out.insert(name, voltage) {
            diagnostics.add_warning_at_line(
                table.name(),
                "duplicate",
                &format!("duplicate municipality '{name}', keeping first occurrence"),
                line,
            );
        }
    }
    Ok(out)
}

type CeilingKey = (CanonicalVoltage, String);

struct Ceiling {
    label: String,
    value: Option<Kilowatts>,
}

fn build_ceiling_index(
    table: &RawTable,
    diagnostics: &mut Diagnostics,
) -> Result<HashMap<CeilingKey, Ceiling>, LoadError> {
    let category_col = table.require_column(COL_CATEGORY)?;
    let voltage_col = table.require_column(COL_VOLTAGE)?;
    let ceiling_col = table.require_column_containing(COL_MAX_GENERATION)?;

    let mut index = HashMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        let line = idx + 1;
        let category = canonical_category(cell(row, category_col));
        let voltage = CanonicalVoltage::parse(cell(row, voltage_col));
        if category.is_empty() || voltage.is_empty() {
            diagnostics.add_error_at_line(
                table.name(),
                "row",
                "row without category or voltage dropped",
                line,
            );
            continue;
        }

        let label = cell(row, ceiling_col).to_string();
        let value = extract_number(&label).map(Kilowatts);
        if value.is_none() {
            diagnostics.add_warning_at_line(
                table.name(),
                "ceiling",
                &format!("unparsable ceiling '{label}' for {voltage} {category}, no limit enforced"),
                line,
            );
        }

        match index.entry((voltage, category)) {
            Entry::Occupied(entry) => {
                let (voltage, category) = entry.key();
                diagnostics.add_warning_at_line(
                    table.name(),
                    "duplicate",
                    &format!("duplicate ceiling for {voltage} {category}, keeping first occurrence"),
                    line,
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(Ceiling { label, value });
            }
        }
    }
    Ok(index)
}

fn join_categories(
    table: &RawTable,
    ceilings: &HashMap<CeilingKey, Ceiling>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<TechnicalReferenceRow>, LoadError> {
    let category_col = table.require_column(COL_CATEGORY)?;
    let range_col = table.require_column(COL_LOAD_RANGE)?;
    let voltage_col = table.require_column(COL_VOLTAGE)?;

    let mut matched: HashSet<&CeilingKey> = HashSet::new();
    let mut rows = Vec::with_capacity(table.rows().len());
    for (idx, raw) in table.rows().iter().enumerate() {
        let line = idx + 1;
        let category = canonical_category(cell(raw, category_col));
        let voltage = CanonicalVoltage::parse(cell(raw, voltage_col));
        if category.is_empty() || voltage.is_empty() {
            diagnostics.add_error_at_line(
                table.name(),
                "row",
                "row without category or voltage dropped",
                line,
            );
            continue;
        }

        let range_text = cell(raw, range_col);
        if let Some(control) = range_text.chars().find(|c| ('\u{80}'..='\u{9f}').contains(c)) {
            diagnostics.add_warning_at_line(
                table.name(),
                "load_range",
                &format!(
                    "load range '{}' for {voltage} {category} contains control character U+{:04X}; \
                     the file was likely mis-encoded",
                    range_text.escape_debug(),
                    u32::from(control)
                ),
                line,
            );
        }
        let (load_min, load_max) = parse_load_range(range_text).unwrap_or_else(|| {
            diagnostics.add_warning_at_line(
                table.name(),
                "load_range",
                &format!("unparsable load range '{range_text}' for {voltage} {category}, using [0, 0]"),
                line,
            );
            (Kilowatts::ZERO, Kilowatts::ZERO)
        });

        let mut row = TechnicalReferenceRow::new(voltage, &category, load_min, load_max);
        let key = (row.voltage.clone(), row.category.clone());
        if let Some((key, ceiling)) = ceilings.get_key_value(&key) {
            row = row.with_ceiling(ceiling.label.clone(), ceiling.value);
            matched.insert(key);
        }
        rows.push(row);
    }

    let mut unmatched: Vec<&CeilingKey> = ceilings
        .keys()
        .filter(|key| !matched.contains(key))
        .collect();
    unmatched.sort();
    for (voltage, category) in unmatched {
        diagnostics.add_warning(
            CEILING_TABLE,
            "unmatched",
            &format!("ceiling for {voltage} {category} has no category row"),
        );
    }
    Ok(rows)
}

/// Warn about categories of the same voltage and phase whose load ranges overlap.
fn report_overlaps(
    rows: &[TechnicalReferenceRow],
    escalation: &EscalationMap,
    diagnostics: &mut Diagnostics,
) {
    for (i, a) in rows.iter().enumerate() {
        let Some(phase) = escalation.phase_of(&a.category) else {
            continue;
        };
        for b in &rows[i + 1..] {
            if a.voltage != b.voltage || escalation.phase_of(&b.category) != Some(phase) {
                continue;
            }
            if a.load_min_kw <= b.load_max_kw && b.load_min_kw <= a.load_max_kw {
                diagnostics.add_warning(
                    CATEGORY_TABLE,
                    "overlap",
                    &format!(
                        "{} load ranges of {} and {} overlap at {}; the first row wins",
                        phase, a.category, b.category, a.voltage
                    ),
                );
            }
        }
    }
}
