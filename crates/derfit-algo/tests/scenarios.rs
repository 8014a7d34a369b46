//! End-to-end classification against the reference fixtures under test_data/reference

use derfit_algo::{
    analyze, classify, ClassificationRequest, ClassificationResult, UpgradeOutcome,
};
use derfit_core::{EscalationMap, InputError, Kilowatts, PhaseType, ReferenceTables};
use derfit_io::reference::{load_reference_tables, ReferenceSources};
use std::path::PathBuf;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn fixture_tables() -> ReferenceTables {
    let sources = ReferenceSources::in_dir(&repo_path("test_data/reference"));
    load_reference_tables(&sources, EscalationMap::default())
        .unwrap()
        .tables
}

fn rio_branco(load: f64, kit: f64) -> ClassificationRequest {
    ClassificationRequest::from_form("Rio Branco", "Monofásico", load, &format!("{kit} kWp"))
}

#[test]
fn test_small_kit_is_approved() {
    let tables = fixture_tables();
    match analyze(&rio_branco(5.0, 4.0), &tables) {
        ClassificationResult::Approved {
            matched,
            ceiling_kw,
            ceiling_label,
            ..
        } => {
            assert_eq!(matched.category, "M1");
            assert_eq!(matched.voltage.as_str(), "220/127");
            assert_eq!(ceiling_kw, Kilowatts(5.0));
            assert_eq!(ceiling_label, "5,0 kW");
        }
        other => panic!("expected approval, got {other:?}"),
    }
}

#[test]
fn test_oversized_kit_upgrades_to_three_phase() {
    let tables = fixture_tables();
    let result = analyze(&rio_branco(5.0, 8.0), &tables);

    assert_eq!(result.category(), Some("M1"));
    let upgrade = result.upgrade().expect("an upgrade");
    assert_eq!(upgrade.phase_type, PhaseType::Three);
    assert!(upgrade.phase_changed);
    assert_eq!(upgrade.category, "T3");
    assert_eq!(upgrade.load_min_kw, Kilowatts(8.0));
    assert_eq!(upgrade.load_max_kw, Kilowatts(15.0));

    let text = result.to_string();
    assert!(text.starts_with("REJECTED:"));
    assert!(text.contains("three-phase service, category T3"));
}

#[test]
fn test_huge_kit_has_no_solution() {
    let tables = fixture_tables();
    match analyze(&rio_branco(5.0, 1000.0), &tables) {
        ClassificationResult::Rejected { upgrade, .. } => {
            assert_eq!(upgrade, Some(UpgradeOutcome::NoSolution));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_unknown_city() {
    let request = ClassificationRequest::from_form("Nowhereville", "Monofásico", 5.0, "4 kWp");
    let result = analyze(&request, &fixture_tables());
    assert!(matches!(
        result,
        ClassificationResult::InputError {
            error: InputError::UnknownCity { .. }
        }
    ));
}

#[test]
fn test_city_lookup_ignores_annotations_and_accents() {
    let tables = fixture_tables();
    let request = ClassificationRequest::new("sao paulo", PhaseType::Single, 2.0, Some(3.0));
    assert!(analyze(&request, &tables).is_approved());

    let request = ClassificationRequest::new("CRUZEIRO DO SUL", PhaseType::Single, 3.0, Some(5.0));
    assert_eq!(analyze(&request, &tables).category(), Some("M1"));
}

#[test]
fn test_upgrade_within_next_phase_at_other_voltage() {
    let tables = fixture_tables();
    let request = ClassificationRequest::new("Cruzeiro do Sul", PhaseType::Single, 3.0, Some(7.0));
    let result = analyze(&request, &tables);
    let upgrade = result.upgrade().expect("an upgrade");
    assert_eq!(upgrade.phase_type, PhaseType::Two);
    assert_eq!(upgrade.category, "B1");
}

#[test]
fn test_zero_load_falls_into_first_matching_row() {
    // M0 [0, 0] and M1 [0, 5] both cover 0 kW; M0 comes first and has no ceiling
    let result = analyze(&rio_branco(0.0, 4.0), &fixture_tables());
    assert!(matches!(result, ClassificationResult::ApprovedNoCeiling { .. }));
    assert_eq!(result.category(), Some("M0"));
}

#[test]
fn test_load_in_range_gap_has_no_category() {
    let tables = fixture_tables();
    for load in [5.05, 9.0] {
        let result = classify(&rio_branco(load, 4.0), &tables);
        assert!(
            matches!(
                result,
                ClassificationResult::InputError {
                    error: InputError::NoMatchingCategory { .. }
                }
            ),
            "load {load} gave {result:?}"
        );
    }
}

#[test]
fn test_matched_rows_cover_load_and_upgrades_never_go_backward() {
    let tables = fixture_tables();
    let loads = [0.0, 1.0, 4.99, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0, 20.0, 30.0];
    let kits = [0.5, 5.0, 6.5, 9.0, 15.0, 50.0, 200.0];

    for phase in PhaseType::ALL {
        for load in loads {
            for kit in kits {
                let request = ClassificationRequest::new("Rio Branco", phase, load, Some(kit));
                let result = analyze(&request, &tables);

                if let Some(category) = result.category() {
                    let row = tables
                        .relation()
                        .rows()
                        .iter()
                        .find(|row| row.category == category && row.voltage.as_str() == "220/127")
                        .unwrap();
                    assert!(row.covers_load(Kilowatts(load)), "{category} vs {load}");
                    assert!(tables.escalation().admits(phase, category));
                }
                if let Some(upgrade) = result.upgrade() {
                    assert!(upgrade.phase_type >= phase);
                    assert!(upgrade.ceiling_kw >= Kilowatts(kit));
                    assert_eq!(upgrade.phase_changed, upgrade.phase_type != phase);
                }
                if let ClassificationResult::Rejected { upgrade, .. } = &result {
                    assert!(upgrade.is_some());
                }
            }
        }
    }
}
