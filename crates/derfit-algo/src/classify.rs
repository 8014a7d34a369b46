//! Category classification: resolve a request's voltage and connection category and
//! compare the kit against that category's generation ceiling.

use tracing::debug;

use derfit_core::{InputError, Kilowatts, PhaseType, ReferenceTables, TechnicalReferenceRow};

use crate::types::{CategoryMatch, ClassificationRequest, ClassificationResult, Rejection};

/// Classify a request against the reference tables.
///
/// Never fails: problems with the request come back as
/// [`ClassificationResult::InputError`]. A `Rejected` result carries `upgrade: None`;
/// run [`crate::escalation::find_upgrade`] (or use [`crate::analyze`]) to fill it.
pub fn classify(request: &ClassificationRequest, tables: &ReferenceTables) -> ClassificationResult {
    match try_classify(request, tables) {
        Ok(result) => result,
        Err(error) => {
            debug!("request for '{}' is not classifiable: {error}", request.city);
            ClassificationResult::InputError { error }
        }
    }
}

fn try_classify(
    request: &ClassificationRequest,
    tables: &ReferenceTables,
) -> Result<ClassificationResult, InputError> {
    let city = request.city.trim();
    if city.is_empty() {
        return Err(InputError::missing("city"));
    }
    if request.phase_type.trim().is_empty() {
        return Err(InputError::missing("phase_type"));
    }
    let kit = match request.kit_power_kwp {
        Some(kit) if kit.is_finite() && kit > Kilowatts::ZERO => kit,
        _ => return Err(InputError::missing("kit_power_kwp")),
    };
    let load = request.installed_load_kw;
    if !load.is_finite() || load < Kilowatts::ZERO {
        return Err(InputError::InvalidLoad {
            load_kw: load.value(),
        });
    }

    let voltage = tables
        .municipalities()
        .voltage_for(city)
        .ok_or_else(|| InputError::UnknownCity {
            city: city.to_string(),
        })?;

    let phase: PhaseType = request.phase_type.parse()?;
    let escalation = tables.escalation();
    if escalation.admitted(phase).is_empty() {
        return Err(InputError::UnknownPhaseType {
            phase: request.phase_type.trim().to_string(),
        });
    }

    let row = find_category(tables, voltage, phase, load).ok_or_else(|| {
        InputError::NoMatchingCategory {
            voltage: voltage.to_string(),
            phase: phase.to_string(),
            load_kw: load.value(),
        }
    })?;
    debug!(
        "{city} ({voltage}, {phase}, {load}) falls into category {}",
        row.category
    );

    let matched = CategoryMatch::from_row(row, phase);
    let Some(ceiling) = row.max_generation_kw else {
        return Ok(ClassificationResult::ApprovedNoCeiling {
            matched,
            kit_power_kwp: kit,
        });
    };

    if kit <= ceiling {
        Ok(ClassificationResult::Approved {
            matched,
            ceiling_label: row.ceiling_label(),
            ceiling_kw: ceiling,
            kit_power_kwp: kit,
        })
    } else {
        Ok(ClassificationResult::Rejected {
            rejection: Rejection {
                matched,
                ceiling_label: row.ceiling_label(),
                ceiling_kw: ceiling,
                kit_power_kwp: kit,
                installed_load_kw: load,
            },
            upgrade: None,
        })
    }
}

/// First row in source order with the voltage, an admitted category and a range
/// covering `load`.
pub fn find_category<'a>(
    tables: &'a ReferenceTables,
    voltage: &'a derfit_core::CanonicalVoltage,
    phase: PhaseType,
    load: Kilowatts,
) -> Option<&'a TechnicalReferenceRow> {
    let escalation = tables.escalation();
    tables
        .relation()
        .for_voltage(voltage)
        .find(|row| escalation.admits(phase, &row.category) && row.covers_load(load))
}
