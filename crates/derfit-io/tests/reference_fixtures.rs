//! Loading the reference fixtures shipped under test_data/reference

use derfit_core::{EscalationMap, Kilowatts, LoadError};
use derfit_io::reference::{load_reference_tables, ReferenceSources};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn fixture_sources() -> ReferenceSources {
    ReferenceSources::in_dir(&repo_path("test_data/reference"))
}

#[test]
fn test_fixture_tables_load() {
    let loaded = load_reference_tables(&fixture_sources(), EscalationMap::default()).unwrap();
    let tables = &loaded.tables;

    assert_eq!(tables.municipalities().len(), 5);
    assert_eq!(tables.relation().len(), 11);

    let voltage = tables.municipalities().voltage_for("São Paulo").unwrap();
    assert_eq!(voltage.as_str(), "220/127");
    assert_eq!(
        tables.municipalities().voltage_for("xapuri"),
        Some(voltage)
    );
}

#[test]
fn test_fixture_join_across_voltage_spellings() {
    let loaded = load_reference_tables(&fixture_sources(), EscalationMap::default()).unwrap();
    let t3 = loaded
        .tables
        .relation()
        .rows()
        .iter()
        .find(|row| row.category == "T3")
        .unwrap();

    assert_eq!(t3.voltage.as_str(), "220/127");
    assert_eq!(t3.load_min_kw, Kilowatts(8.0));
    assert_eq!(t3.load_max_kw, Kilowatts(15.0));
    assert_eq!(t3.max_generation_kw, Some(Kilowatts(10.0)));
}

#[test]
fn test_fixture_dash_range_and_missing_ceiling() {
    let loaded = load_reference_tables(&fixture_sources(), EscalationMap::default()).unwrap();
    let m0 = &loaded.tables.relation().rows()[0];

    assert_eq!(m0.category, "M0");
    assert_eq!((m0.load_min_kw, m0.load_max_kw), (Kilowatts::ZERO, Kilowatts::ZERO));
    assert_eq!(m0.max_generation_kw, None);

    // M0 [0, 0] touches M1 [0, 5]; nothing else in the fixtures is degraded
    assert_eq!(loaded.diagnostics.issues.len(), 1);
    assert_eq!(loaded.diagnostics.issues_by_category("overlap").count(), 1);
}

#[test]
fn test_missing_source_is_fatal() {
    let dir = tempdir().unwrap();
    let fixtures = fixture_sources();
    fs::copy(&fixtures.municipalities, dir.path().join("municipios.csv")).unwrap();
    fs::copy(&fixtures.categories, dir.path().join("disjuntores.csv")).unwrap();

    let err = load_reference_tables(&ReferenceSources::in_dir(dir.path()), EscalationMap::default())
        .unwrap_err();
    assert!(matches!(err, LoadError::SourceNotFound(ref path) if path.ends_with("potencia_maxima.csv")));
}
