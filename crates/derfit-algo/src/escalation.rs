//! Forward search for the smallest reclassification that admits a rejected kit.
//!
//! Phase types are tried in escalation order starting from the customer's own; the
//! search never proposes a downgrade. Within a phase type the admitting category with
//! the lowest minimum load wins.

use tracing::debug;

use derfit_core::ReferenceTables;

use crate::types::{Rejection, Upgrade, UpgradeOutcome};

pub fn find_upgrade(rejection: &Rejection, tables: &ReferenceTables) -> UpgradeOutcome {
    let matched = &rejection.matched;
    let kit = rejection.kit_power_kwp;
    let escalation = tables.escalation();

    for phase in matched.phase_type.escalation_path() {
        // min_by keeps the first of equal elements, so ties go to source order
        let best = tables
            .relation()
            .for_voltage(&matched.voltage)
            .filter(|row| escalation.admits(phase, &row.category) && row.ceiling_admits(kit))
            .min_by(|a, b| a.load_min_kw.value().total_cmp(&b.load_min_kw.value()));

        if let Some(row) = best {
            debug!(
                "kit {kit} fits {phase} category {} (ceiling {})",
                row.category,
                row.ceiling_label()
            );
            return UpgradeOutcome::Upgrade(Upgrade {
                phase_type: phase,
                phase_changed: phase != matched.phase_type,
                category: row.category.clone(),
                load_min_kw: row.load_min_kw,
                load_max_kw: row.load_max_kw,
                ceiling_label: row.ceiling_label(),
                // ceiling_admits only holds for rows with a ceiling
                ceiling_kw: row.max_generation_kw.unwrap_or(kit),
            });
        }
    }

    debug!(
        "no category up to three-phase admits kit {kit} at {}",
        matched.voltage
    );
    UpgradeOutcome::NoSolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryMatch;
    use derfit_core::{
        CanonicalVoltage, EscalationMap, Kilowatts, MunicipalityVoltageTable, PhaseType,
        TechnicalReferenceRelation, TechnicalReferenceRow,
    };

    fn row(
        voltage: &str,
        category: &str,
        min: f64,
        max: f64,
        ceiling: Option<f64>,
    ) -> TechnicalReferenceRow {
        let row = TechnicalReferenceRow::new(
            CanonicalVoltage::parse(voltage),
            category,
            Kilowatts(min),
            Kilowatts(max),
        );
        match ceiling {
            Some(kw) => row.with_ceiling(format!("{kw} kW"), Some(Kilowatts(kw))),
            None => row,
        }
    }

    fn tables(rows: Vec<TechnicalReferenceRow>) -> ReferenceTables {
        ReferenceTables::new(
            MunicipalityVoltageTable::new(),
            TechnicalReferenceRelation::new(rows),
            EscalationMap::default(),
        )
    }

    fn rejection(phase: PhaseType, category: &str, kit: f64) -> Rejection {
        Rejection {
            matched: CategoryMatch {
                voltage: CanonicalVoltage::parse("220/127"),
                phase_type: phase,
                category: category.to_string(),
                load_min_kw: Kilowatts(0.0),
                load_max_kw: Kilowatts(5.0),
            },
            ceiling_label: "5 kW".to_string(),
            ceiling_kw: Kilowatts(5.0),
            kit_power_kwp: Kilowatts(kit),
            installed_load_kw: Kilowatts(5.0),
        }
    }

    fn upgrade(outcome: UpgradeOutcome) -> Upgrade {
        match outcome {
            UpgradeOutcome::Upgrade(upgrade) => upgrade,
            UpgradeOutcome::NoSolution => panic!("expected an upgrade"),
        }
    }

    #[test]
    fn test_same_phase_upgrade_preferred() {
        let tables = tables(vec![
            row("220/127", "M1", 0.0, 5.0, Some(5.0)),
            row("220/127", "M2", 5.1, 8.0, Some(7.5)),
            row("220/127", "T1", 0.0, 15.0, Some(10.0)),
        ]);
        let found = upgrade(find_upgrade(&rejection(PhaseType::Single, "M1", 7.0), &tables));
        assert_eq!(found.category, "M2");
        assert_eq!(found.phase_type, PhaseType::Single);
        assert!(!found.phase_changed);
    }

    #[test]
    fn test_escalates_phase_and_picks_lowest_minimum_load() {
        let tables = tables(vec![
            row("220/127", "M1", 0.0, 5.0, Some(5.0)),
            row("220/127", "B1", 0.0, 10.0, Some(6.0)),
            row("220/127", "T4", 15.1, 25.0, Some(20.0)),
            row("220/127", "T3", 8.0, 15.0, Some(10.0)),
        ]);
        let found = upgrade(find_upgrade(&rejection(PhaseType::Single, "M1", 8.0), &tables));
        assert_eq!(found.category, "T3");
        assert_eq!(found.phase_type, PhaseType::Three);
        assert!(found.phase_changed);
        assert_eq!((found.load_min_kw, found.load_max_kw), (Kilowatts(8.0), Kilowatts(15.0)));
        assert_eq!(found.ceiling_kw, Kilowatts(10.0));
    }

    #[test]
    fn test_ties_keep_source_order() {
        let tables = tables(vec![
            row("220/127", "T2", 8.0, 15.0, Some(12.0)),
            row("220/127", "T3", 8.0, 20.0, Some(15.0)),
        ]);
        let found = upgrade(find_upgrade(&rejection(PhaseType::Single, "M1", 9.0), &tables));
        assert_eq!(found.category, "T2");
    }

    #[test]
    fn test_never_escalates_backward() {
        let tables = tables(vec![
            row("220/127", "M9", 0.0, 5.0, Some(100.0)),
            row("220/127", "T1", 0.0, 15.0, Some(10.0)),
        ]);
        let outcome = find_upgrade(&rejection(PhaseType::Three, "T1", 50.0), &tables);
        assert_eq!(outcome, UpgradeOutcome::NoSolution);
    }

    #[test]
    fn test_ignores_other_voltages_and_missing_ceilings() {
        let tables = tables(vec![
            row("380/220", "T1", 0.0, 15.0, Some(100.0)),
            row("220/127", "T2", 0.0, 15.0, None),
        ]);
        let outcome = find_upgrade(&rejection(PhaseType::Single, "M1", 50.0), &tables);
        assert_eq!(outcome, UpgradeOutcome::NoSolution);
    }
}
