//! Concentration sequences for 1-D parametric sweeps.
//!
//! A sweep varies one reactant's mole fraction strictly inside (0, 1) while
//! holding the remaining reactants at fixed relative ratios scaled into the
//! leftover `1 - x`.

use crate::engine::FlameTemp;
use crate::error::{ConcentrationError, ReactionError, ReactionResult};
use af_thermo::SpeciesId;
use std::collections::{BTreeMap, BTreeSet};

/// Scale a ratio map so its values sum to 1.
pub fn normalize(ratios: &BTreeMap<SpeciesId, f64>) -> ReactionResult<BTreeMap<SpeciesId, f64>> {
    let sum: f64 = ratios.values().sum();
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(ReactionError::DegenerateRatio);
    }
    Ok(ratios.iter().map(|(k, v)| (k.clone(), v / sum)).collect())
}

/// Concentrations of the non-variable reactants when the variable sits at
/// mole fraction `x`: the rest of the ratio map, normalized, scaled by
/// `1 - x`.
pub fn scale_dependents(
    variable: &SpeciesId,
    x: f64,
    ratios: &BTreeMap<SpeciesId, f64>,
) -> ReactionResult<BTreeMap<SpeciesId, f64>> {
    let dependents: BTreeMap<SpeciesId, f64> = ratios
        .iter()
        .filter(|(id, _)| *id != variable)
        .map(|(id, v)| (id.clone(), *v))
        .collect();
    let normalized = normalize(&dependents)?;
    Ok(normalized
        .into_iter()
        .map(|(id, proportion)| (id, proportion * (1.0 - x)))
        .collect())
}

/// Generate the sweep's concentration maps.
///
/// `resolution` points at step `1/(resolution+1)`, starting one step in and
/// excluding both 0 and 1 exactly.
pub(crate) fn concentration_points(
    variable: &SpeciesId,
    base_ratios: &BTreeMap<SpeciesId, f64>,
    reactants: &BTreeSet<SpeciesId>,
    resolution: usize,
) -> ReactionResult<Vec<(f64, BTreeMap<SpeciesId, f64>)>> {
    if !reactants.contains(variable) {
        return Err(ReactionError::SweepVariable {
            id: variable.clone(),
        });
    }
    let provided: BTreeSet<SpeciesId> = base_ratios.keys().cloned().collect();
    if &provided != reactants {
        return Err(ConcentrationError::KeyMismatch {
            missing: reactants.difference(&provided).cloned().collect(),
            extra: provided.difference(reactants).cloned().collect(),
        }
        .into());
    }
    for (id, &value) in base_ratios {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConcentrationError::NonPositive {
                id: id.clone(),
                value,
            }
            .into());
        }
    }

    let step = 1.0 / (resolution as f64 + 1.0);
    let mut points = Vec::with_capacity(resolution);
    for i in 1..=resolution {
        let x = i as f64 * step;
        let mut concentrations = scale_dependents(variable, x, base_ratios)?;
        concentrations.insert(variable.clone(), x);
        points.push((x, concentrations));
    }
    Ok(points)
}

/// Result of a 1-D concentration sweep: parallel x / flame-temperature
/// sequences, possibly containing unreachable points.
#[derive(Debug, Clone)]
pub struct FlameTable {
    x_values: Vec<f64>,
    temperatures: Vec<FlameTemp>,
}

impl FlameTable {
    pub(crate) fn new(x_values: Vec<f64>, temperatures: Vec<FlameTemp>) -> Self {
        debug_assert_eq!(x_values.len(), temperatures.len());
        Self {
            x_values,
            temperatures,
        }
    }

    pub fn len(&self) -> usize {
        self.x_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_values.is_empty()
    }

    /// Variable-species mole fractions, strictly increasing.
    pub fn x_values(&self) -> &[f64] {
        &self.x_values
    }

    pub fn temperatures(&self) -> &[FlameTemp] {
        &self.temperatures
    }

    /// Flame temperatures in kelvin, NaN at unreachable points. Consumers
    /// filter with the usual is-nan checks.
    pub fn kelvins(&self) -> Vec<f64> {
        self.temperatures.iter().map(FlameTemp::kelvin).collect()
    }

    /// Only the points where a flame temperature was found.
    pub fn reached_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x_values
            .iter()
            .zip(&self.temperatures)
            .filter_map(|(&x, t)| t.as_kelvin().map(|k| (x, k)))
    }

    pub fn num_unreachable(&self) -> usize {
        self.temperatures
            .iter()
            .filter(|t| !t.is_reached())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, FlameTemp)> + '_ {
        self.x_values
            .iter()
            .zip(&self.temperatures)
            .map(|(&x, &t)| (x, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(pairs: &[(&str, f64)]) -> BTreeMap<SpeciesId, f64> {
        pairs
            .iter()
            .map(|(id, v)| (SpeciesId::new(*id), *v))
            .collect()
    }

    #[test]
    fn normalize_scales_to_unit_sum() {
        let normalized = normalize(&ratios(&[("Hydrogen", 2.0), ("Oxygen", 1.0)])).unwrap();
        assert!((normalized[&SpeciesId::new("Hydrogen")] - 2.0 / 3.0).abs() < 1e-12);
        assert!((normalized[&SpeciesId::new("Oxygen")] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_rejects_zero_sum() {
        let err = normalize(&ratios(&[("Hydrogen", 0.0), ("Oxygen", 0.0)])).unwrap_err();
        assert!(matches!(err, ReactionError::DegenerateRatio));
    }

    #[test]
    fn scale_dependents_fills_the_leftover() {
        let variable = SpeciesId::new("Hydrogen");
        let scaled = scale_dependents(
            &variable,
            0.4,
            &ratios(&[("Hydrogen", 2.0), ("Oxygen", 3.0), ("Nitrogen", 1.0)]),
        )
        .unwrap();
        assert!(!scaled.contains_key(&variable));
        let total: f64 = scaled.values().sum();
        assert!((total - 0.6).abs() < 1e-12);
        // fixed relative ratio 3:1 preserved
        let o2 = scaled[&SpeciesId::new("Oxygen")];
        let n2 = scaled[&SpeciesId::new("Nitrogen")];
        assert!((o2 / n2 - 3.0).abs() < 1e-9);
    }

    #[test]
    fn points_exclude_bounds_and_space_evenly() {
        let variable = SpeciesId::new("Hydrogen");
        let base = ratios(&[("Hydrogen", 2.0), ("Oxygen", 1.0)]);
        let reactants: BTreeSet<SpeciesId> = base.keys().cloned().collect();
        let points = concentration_points(&variable, &base, &reactants, 50).unwrap();

        assert_eq!(points.len(), 50);
        let step = 1.0 / 51.0;
        for (i, (x, concentrations)) in points.iter().enumerate() {
            assert!((x - (i as f64 + 1.0) * step).abs() < 1e-12);
            assert!(*x > 0.0 && *x < 1.0);
            let sum: f64 = concentrations.values().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn unknown_variable_is_rejected() {
        let base = ratios(&[("Hydrogen", 2.0), ("Oxygen", 1.0)]);
        let reactants: BTreeSet<SpeciesId> = base.keys().cloned().collect();
        let err =
            concentration_points(&SpeciesId::new("Argon"), &base, &reactants, 10).unwrap_err();
        assert!(matches!(err, ReactionError::SweepVariable { .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalized_sum_is_one(values in prop::collection::vec(0.0_f64..10.0, 1..5)) {
                let names = ["Methane", "Oxygen", "Nitrogen", "Argon", "Hydrogen"];
                let map: BTreeMap<SpeciesId, f64> = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (SpeciesId::new(names[i]), v))
                    .collect();
                if let Ok(normalized) = normalize(&map) {
                    let sum: f64 = normalized.values().sum();
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
            }
        }
    }
}
