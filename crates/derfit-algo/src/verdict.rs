//! Human-readable and JSON renderings of a classification result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{ClassificationResult, Rejection, Upgrade, UpgradeOutcome};

/// Output format for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for VerdictFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(VerdictFormat::Plain),
            "json" => Ok(VerdictFormat::Json),
            other => Err(format!("unknown verdict format '{other}' (expected plain or json)")),
        }
    }
}

/// Render a result in the requested format.
pub fn format_verdict(
    result: &ClassificationResult,
    format: VerdictFormat,
) -> Result<String, serde_json::Error> {
    match format {
        VerdictFormat::Plain => Ok(result.to_string()),
        VerdictFormat::Json => serde_json::to_string_pretty(result),
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationResult::Approved {
                matched,
                ceiling_label,
                kit_power_kwp,
                ..
            } => write!(
                f,
                "APPROVED: {kit_power_kwp} kit fits category {} ({}, {}), ceiling {ceiling_label}",
                matched.category, matched.voltage, matched.phase_type
            ),
            ClassificationResult::ApprovedNoCeiling {
                matched,
                kit_power_kwp,
            } => write!(
                f,
                "APPROVED: {kit_power_kwp} kit fits category {} ({}, {}), no generation limit",
                matched.category, matched.voltage, matched.phase_type
            ),
            ClassificationResult::Rejected { rejection, upgrade } => {
                write_rejection(f, rejection)?;
                match upgrade {
                    Some(UpgradeOutcome::Upgrade(upgrade)) => {
                        f.write_str(". ")?;
                        write_upgrade(f, upgrade)
                    }
                    Some(UpgradeOutcome::NoSolution) => write!(
                        f,
                        ". No category up to three-phase admits this kit at {}",
                        rejection.matched.voltage
                    ),
                    None => Ok(()),
                }
            }
            ClassificationResult::InputError { error } => write!(f, "ERROR: {error}"),
        }
    }
}

fn write_rejection(f: &mut fmt::Formatter<'_>, rejection: &Rejection) -> fmt::Result {
    write!(
        f,
        "REJECTED: {} kit exceeds the {} ceiling of category {} ({}, {})",
        rejection.kit_power_kwp,
        rejection.ceiling_label,
        rejection.matched.category,
        rejection.matched.voltage,
        rejection.matched.phase_type
    )
}

fn write_upgrade(f: &mut fmt::Formatter<'_>, upgrade: &Upgrade) -> fmt::Result {
    if upgrade.phase_changed {
        write!(f, "Upgrade to {} service, ", upgrade.phase_type)?;
    } else {
        f.write_str("Move to ")?;
    }
    write!(
        f,
        "category {} (installed load {} to {}, ceiling {})",
        upgrade.category, upgrade.load_min_kw, upgrade.load_max_kw, upgrade.ceiling_label
    )
}
