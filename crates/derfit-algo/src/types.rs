//! Request and result types exchanged with callers of the engine.

use serde::{Deserialize, Serialize};

use derfit_core::text::extract_number;
use derfit_core::{CanonicalVoltage, InputError, Kilowatts, PhaseType, TechnicalReferenceRow};

/// One analysis call: where the customer is, what service they have, what they want
/// to install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub city: String,
    /// Phase type as entered ("Monofásico", "three-phase", ...); parsed during
    /// classification so unknown values surface as an input error.
    pub phase_type: String,
    pub installed_load_kw: Kilowatts,
    pub kit_power_kwp: Option<Kilowatts>,
}

impl ClassificationRequest {
    pub fn new(
        city: impl Into<String>,
        phase: PhaseType,
        installed_load_kw: f64,
        kit_power_kwp: Option<f64>,
    ) -> Self {
        Self {
            city: city.into(),
            phase_type: phase.as_str().to_string(),
            installed_load_kw: Kilowatts(installed_load_kw),
            kit_power_kwp: kit_power_kwp.map(Kilowatts),
        }
    }

    /// Build a request from form text; the kit rating is extracted from strings such
    /// as `"5,5 kWp"`.
    pub fn from_form(city: &str, phase: &str, installed_load_kw: f64, kit_power: &str) -> Self {
        Self {
            city: city.trim().to_string(),
            phase_type: phase.trim().to_string(),
            installed_load_kw: Kilowatts(installed_load_kw),
            kit_power_kwp: extract_number(kit_power).map(Kilowatts),
        }
    }
}

/// The category row a request resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub voltage: CanonicalVoltage,
    pub phase_type: PhaseType,
    pub category: String,
    pub load_min_kw: Kilowatts,
    pub load_max_kw: Kilowatts,
}

impl CategoryMatch {
    pub fn from_row(row: &TechnicalReferenceRow, phase_type: PhaseType) -> Self {
        Self {
            voltage: row.voltage.clone(),
            phase_type,
            category: row.category.clone(),
            load_min_kw: row.load_min_kw,
            load_max_kw: row.load_max_kw,
        }
    }
}

/// A kit that exceeds the ceiling of the customer's current category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub matched: CategoryMatch,
    pub ceiling_label: String,
    pub ceiling_kw: Kilowatts,
    pub kit_power_kwp: Kilowatts,
    pub installed_load_kw: Kilowatts,
}

/// Smallest reclassification that admits the kit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upgrade {
    pub phase_type: PhaseType,
    /// The service type itself must change, not just the category
    pub phase_changed: bool,
    pub category: String,
    pub load_min_kw: Kilowatts,
    pub load_max_kw: Kilowatts,
    pub ceiling_label: String,
    pub ceiling_kw: Kilowatts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpgradeOutcome {
    Upgrade(Upgrade),
    /// Nothing up to three-phase service admits the kit
    NoSolution,
}

/// Outcome of one analysis.
///
/// `Approved`, `ApprovedNoCeiling` and `Rejected` with an `Upgrade` are answers the
/// customer can act on; `InputError` and `Rejected` with `NoSolution` are dead ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationResult {
    Approved {
        matched: CategoryMatch,
        ceiling_label: String,
        ceiling_kw: Kilowatts,
        kit_power_kwp: Kilowatts,
    },
    /// The category defines no generation ceiling
    ApprovedNoCeiling {
        matched: CategoryMatch,
        kit_power_kwp: Kilowatts,
    },
    /// `upgrade` is `None` until the escalation search has run
    Rejected {
        rejection: Rejection,
        upgrade: Option<UpgradeOutcome>,
    },
    InputError {
        error: InputError,
    },
}

impl ClassificationResult {
    pub fn is_approved(&self) -> bool {
        matches!(
            self,
            ClassificationResult::Approved { .. } | ClassificationResult::ApprovedNoCeiling { .. }
        )
    }

    /// The category the request currently falls into, when one was found.
    pub fn category(&self) -> Option<&str> {
        match self {
            ClassificationResult::Approved { matched, .. }
            | ClassificationResult::ApprovedNoCeiling { matched, .. } => Some(&matched.category),
            ClassificationResult::Rejected { rejection, .. } => Some(&rejection.matched.category),
            ClassificationResult::InputError { .. } => None,
        }
    }

    pub fn upgrade(&self) -> Option<&Upgrade> {
        match self {
            ClassificationResult::Rejected {
                upgrade: Some(UpgradeOutcome::Upgrade(upgrade)),
                ..
            } => Some(upgrade),
            _ => None,
        }
    }
}

impl From<InputError> for ClassificationResult {
    fn from(error: InputError) -> Self {
        ClassificationResult::InputError { error }
    }
}
