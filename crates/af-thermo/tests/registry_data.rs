//! Integration tests against the shipped thermochemical data table.

use af_thermo::{PropertySeries, SpeciesId, SpeciesRegistry};

const DATA_PATH: &str = "../../data/thermochemical_data.csv";

fn registry() -> SpeciesRegistry {
    SpeciesRegistry::from_csv_path(DATA_PATH).expect("data file should load")
}

#[test]
fn all_catalog_compounds_load() {
    let registry = registry();
    assert_eq!(registry.len(), 7);
    for species in registry.iter() {
        let table = species.table();
        assert_eq!(table.temperatures().len(), 14);
        assert_eq!(table.min_temperature(), 0.0);
        assert_eq!(table.max_temperature(), 6000.0);
    }
}

#[test]
fn interpolation_is_exact_at_sample_points() {
    let registry = registry();
    for species in registry.iter() {
        let table = species.table();
        let temps: Vec<f64> = table.temperatures().to_vec();
        let sh = table.raw_series(PropertySeries::SensibleHeat).to_vec();
        let hf = table.raw_series(PropertySeries::FormationEnthalpy).to_vec();
        for (i, &t) in temps.iter().enumerate() {
            assert!((table.sh(t) - sh[i]).abs() < 1e-9, "{} SH at {t}", species.id());
            assert!((table.hf(t) - hf[i]).abs() < 1e-9, "{} Hf at {t}", species.id());
        }
    }
}

#[test]
fn interpolation_stays_between_bracketing_samples() {
    let registry = registry();
    let co2 = registry.get(&SpeciesId::new("Carbon_Dioxide")).unwrap();
    let table = co2.table();
    // midway between the 1000 K and 1500 K samples
    let mid = table.sh(1250.0);
    assert!(mid > 33.40 && mid < 61.71);
}

#[test]
fn standard_formation_enthalpies() {
    let registry = registry();
    let co2 = registry.get(&SpeciesId::new("Carbon_Dioxide")).unwrap();
    assert!((co2.std_hf() - -393.52).abs() < 1e-9);
    let o2 = registry.get(&SpeciesId::new("Oxygen")).unwrap();
    assert_eq!(o2.std_hf(), 0.0);
}

#[test]
fn log_kf_infinity_substitution() {
    let registry = registry();
    let co2 = registry.get(&SpeciesId::new("Carbon_Dioxide")).unwrap();
    let table = co2.table();

    // raw series keeps the sentinel unmodified
    let raw = table.raw_series(PropertySeries::LogEquilibriumConstant);
    assert_eq!(raw[0], f64::INFINITY);

    // interpolant sees 1e6 x the largest finite entry (68.67 at 298.15 K)
    assert!((table.log_kf(0.0) - 68.67e6).abs() < 1.0);
    // finite region is untouched
    assert!((table.log_kf(298.15) - 68.67).abs() < 1e-9);

    // elements have no sentinel anywhere
    let o2 = registry.get(&SpeciesId::new("Oxygen")).unwrap();
    assert!(o2
        .table()
        .raw_series(PropertySeries::LogEquilibriumConstant)
        .iter()
        .all(|v| v.is_finite()));
}

#[test]
fn catalog_listing_exposes_identity() {
    let registry = registry();
    let mut seen = Vec::new();
    for species in registry.iter() {
        seen.push((species.id().as_str().to_string(), species.formula()));
    }
    assert!(seen.contains(&("Methane".to_string(), "CH4")));
    assert!(seen.contains(&("Argon".to_string(), "Ar")));
}
