//! # derfit-algo: Kit Eligibility Engine
//!
//! Classifies a customer's connection (city, phase type, installed load) into a
//! connection category and decides whether a solar inverter kit fits under that
//! category's maximum generation power. Rejected kits trigger a forward search for the
//! smallest reclassification that would admit them.
//!
//! ## Pipeline
//!
//! | Stage | Function | Outcome |
//! |-------|----------|---------|
//! | Classification | [`classify`] | category row, ceiling comparison |
//! | Escalation | [`find_upgrade`] | [`UpgradeOutcome::Upgrade`] or [`UpgradeOutcome::NoSolution`] |
//! | Rendering | [`format_verdict`] | plain text or JSON |
//!
//! [`analyze`] runs the first two stages and is what most callers want.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use derfit_algo::{analyze, ClassificationRequest};
//! use derfit_core::{EscalationMap, PhaseType};
//! use derfit_io::reference::{load_reference_tables, ReferenceSources};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loaded = load_reference_tables(
//!         &ReferenceSources::in_dir(Path::new("data")),
//!         EscalationMap::default(),
//!     )?;
//!     let request = ClassificationRequest::new("Rio Branco", PhaseType::Single, 5.0, Some(8.0));
//!     println!("{}", analyze(&request, &loaded.tables));
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod escalation;
pub mod types;
pub mod verdict;

pub use classify::{classify, find_category};
pub use escalation::find_upgrade;
pub use types::{
    CategoryMatch, ClassificationRequest, ClassificationResult, Rejection, Upgrade,
    UpgradeOutcome,
};
pub use verdict::{format_verdict, VerdictFormat};

use derfit_core::ReferenceTables;

/// Classify a request and, when the kit is rejected, search for an upgrade.
///
/// The returned result never has `Rejected { upgrade: None }`.
pub fn analyze(request: &ClassificationRequest, tables: &ReferenceTables) -> ClassificationResult {
    match classify(request, tables) {
        ClassificationResult::Rejected {
            rejection,
            upgrade: None,
        } => {
            let upgrade = find_upgrade(&rejection, tables);
            ClassificationResult::Rejected {
                rejection,
                upgrade: Some(upgrade),
            }
        }
        other => other,
    }
}
