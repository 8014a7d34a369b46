//! # derfit-core: Connection Category Reference Model
//!
//! Shared data structures for deciding whether a solar kit fits a customer's grid
//! connection category.
//!
//! ## Design Philosophy
//!
//! The reference data is three small static tables joined once at startup:
//! - **Municipality table**: city → service voltage
//! - **Category table**: (voltage, category) → installed-load range
//! - **Ceiling table**: (voltage, category) → maximum generation power
//!
//! The joined form is a [`TechnicalReferenceRelation`] bundled with the municipality
//! lookup and the phase [`EscalationMap`] into [`ReferenceTables`]. It is built by a
//! single loader call and passed by reference to every classification, so there is
//! no hidden global state and no implicit reload.
//!
//! ## Lookup Keys
//!
//! Every key goes through one normalization rule:
//! - City names and column headers: [`text::normalize`]
//! - Voltages: [`text::standardize_voltage`] (`"127/220 V"` → `"220/127"`)
//! - Category codes: [`phase::canonical_category`] (`" m1"` → `"M1"`)
//!
//! ## Quick Start
//!
//! ```rust
//! use derfit_core::*;
//!
//! let mut municipalities = MunicipalityVoltageTable::new();
//! municipalities.insert("Rio Branco", CanonicalVoltage::parse("220/127 V"));
//!
//! let relation = TechnicalReferenceRelation::new(vec![TechnicalReferenceRow::new(
//!     CanonicalVoltage::parse("127/220"),
//!     "M1",
//!     Kilowatts(0.0),
//!     Kilowatts(8.0),
//! )
//! .with_ceiling("5 kW", Some(Kilowatts(5.0)))]);
//!
//! let tables = ReferenceTables::new(municipalities, relation, EscalationMap::default());
//! let voltage = tables.municipalities().voltage_for("RIO BRANCO").unwrap();
//! assert_eq!(tables.relation().for_voltage(voltage).count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`text`] - normalization and number extraction
//! - [`phase`] - phase types and the escalation map
//! - [`reference`] - the joined reference relation
//! - [`diagnostics`] - data-quality issues found while loading
//! - [`error`] - load and input error types
//! - [`units`] - kilowatt newtype

pub mod diagnostics;
pub mod error;
pub mod phase;
pub mod reference;
pub mod text;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{InputError, LoadError};
pub use phase::{canonical_category, EscalationMap, PhaseType};
pub use reference::{
    CanonicalVoltage, MunicipalityVoltageTable, ReferenceTables, TechnicalReferenceRelation,
    TechnicalReferenceRow,
};
pub use units::Kilowatts;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_reference_tables_are_shareable() {
        assert_send_sync::<ReferenceTables>();
    }
}
