//! The canonical reference data the classifier reads from.
//!
//! Everything here is built once by the loader in `derfit-io` and never mutated
//! afterwards; classification only borrows it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::phase::{canonical_category, EscalationMap};
use crate::text::{normalize, standardize_voltage};
use crate::units::Kilowatts;

/// Voltage rating normalized into a join key (see [`standardize_voltage`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalVoltage(String);

impl CanonicalVoltage {
    pub fn parse(raw: &str) -> Self {
        Self(standardize_voltage(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalVoltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Municipality → voltage lookup keyed by normalized municipality name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MunicipalityVoltageTable {
    entries: BTreeMap<String, CanonicalVoltage>,
}

impl MunicipalityVoltageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a municipality; returns `false` and keeps the existing voltage when the
    /// normalized name is already present.
    pub fn insert(&mut self, municipality: &str, voltage: CanonicalVoltage) -> bool {
        let key = normalize(municipality);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, voltage);
        true
    }

    /// Voltage for a free-text city name.
    pub fn voltage_for(&self, city: &str) -> Option<&CanonicalVoltage> {
        self.entries.get(&normalize(city))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalVoltage)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One (voltage, category) row of the joined reference relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalReferenceRow {
    pub voltage: CanonicalVoltage,
    pub category: String,
    pub load_min_kw: Kilowatts,
    pub load_max_kw: Kilowatts,
    /// Ceiling exactly as written in the source table
    pub max_generation_label: Option<String>,
    pub max_generation_kw: Option<Kilowatts>,
}

impl TechnicalReferenceRow {
    pub fn new(
        voltage: CanonicalVoltage,
        category: &str,
        load_min_kw: Kilowatts,
        load_max_kw: Kilowatts,
    ) -> Self {
        Self {
            voltage,
            category: canonical_category(category),
            load_min_kw,
            load_max_kw,
            max_generation_label: None,
            max_generation_kw: None,
        }
    }

    pub fn with_ceiling(mut self, label: impl Into<String>, ceiling: Option<Kilowatts>) -> Self {
        self.max_generation_label = Some(label.into());
        self.max_generation_kw = ceiling;
        self
    }

    /// Inclusive on both bounds.
    pub fn covers_load(&self, load: Kilowatts) -> bool {
        self.load_min_kw <= load && load <= self.load_max_kw
    }

    /// `true` only when a ceiling exists and the kit fits under it.
    pub fn ceiling_admits(&self, kit: Kilowatts) -> bool {
        self.max_generation_kw.is_some_and(|ceiling| kit <= ceiling)
    }

    /// Display text for the ceiling, preferring the source label.
    pub fn ceiling_label(&self) -> String {
        match (&self.max_generation_label, self.max_generation_kw) {
            (Some(label), _) if !label.trim().is_empty() => label.trim().to_string(),
            (_, Some(kw)) => kw.to_string(),
            _ => "no limit".to_string(),
        }
    }
}

/// Joined category/load/ceiling relation in source row order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechnicalReferenceRelation {
    rows: Vec<TechnicalReferenceRow>,
}

impl TechnicalReferenceRelation {
    pub fn new(rows: Vec<TechnicalReferenceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TechnicalReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_voltage<'a>(
        &'a self,
        voltage: &'a CanonicalVoltage,
    ) -> impl Iterator<Item = &'a TechnicalReferenceRow> {
        self.rows.iter().filter(move |row| &row.voltage == voltage)
    }
}

/// The three reference structures the classifier needs, bundled and immutable.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceTables {
    municipalities: MunicipalityVoltageTable,
    relation: TechnicalReferenceRelation,
    escalation: EscalationMap,
}

impl ReferenceTables {
    pub fn new(
        municipalities: MunicipalityVoltageTable,
        relation: TechnicalReferenceRelation,
        escalation: EscalationMap,
    ) -> Self {
        Self {
            municipalities,
            relation,
            escalation,
        }
    }

    pub fn municipalities(&self) -> &MunicipalityVoltageTable {
        &self.municipalities
    }

    pub fn relation(&self) -> &TechnicalReferenceRelation {
        &self.relation
    }

    pub fn escalation(&self) -> &EscalationMap {
        &self.escalation
    }
}
