//! Reaction construction and the flame-temperature energy balance.

use crate::balance;
use crate::error::{ConcentrationError, ReactionError, ReactionResult};
use crate::products::{self, ResolvedProducts};
use crate::roots::{BrentConfig, brent_root};
use crate::sweep::{self, FlameTable};
use af_core::numeric::{Tolerances, nearly_equal};
use af_core::units::{Temperature, k, kelvin_of};
use af_thermo::{Species, SpeciesId, SpeciesRegistry};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Absolute tolerance on the sum of mole fractions.
const CONCENTRATION_SUM_TOL: f64 = 1e-6;

/// Default number of points in a concentration sweep.
pub const DEFAULT_SWEEP_RESOLUTION: usize = 100;

/// Flame-temperature outcome.
///
/// `Unreachable` means the energy balance has no root inside the
/// data-supported temperature range — an expected result for physically
/// out-of-range mixtures, not a failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlameTemp {
    Reached(Temperature),
    Unreachable,
}

impl FlameTemp {
    /// Kelvin value, NaN for `Unreachable`, preserving is-nan filtering
    /// semantics for tabular consumers.
    pub fn kelvin(&self) -> f64 {
        match self {
            FlameTemp::Reached(t) => kelvin_of(*t),
            FlameTemp::Unreachable => f64::NAN,
        }
    }

    pub fn as_kelvin(&self) -> Option<f64> {
        match self {
            FlameTemp::Reached(t) => Some(kelvin_of(*t)),
            FlameTemp::Unreachable => None,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, FlameTemp::Reached(_))
    }
}

/// Extent of reaction plus the resulting species amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesBalance {
    /// How far the limiting reagent lets the reaction proceed.
    pub extent: f64,
    /// Final amount per species: consumed reactants, pass-through inerts,
    /// and newly formed products.
    pub final_amounts: BTreeMap<SpeciesId, f64>,
}

#[derive(Debug)]
struct Reactant<'r> {
    species: &'r Species,
    coefficient: u32,
    inert: bool,
    entry_temp: f64,
}

#[derive(Debug)]
struct Product<'r> {
    species: &'r Species,
    coefficient: u32,
}

/// An immutable reaction bound to a species registry.
///
/// Construction resolves products and inerts, balances stoichiometry, and
/// caches temperature bounds; all derived state is fixed afterwards, so a
/// reaction can be queried repeatedly (and concurrently) without locking.
#[derive(Debug)]
pub struct Reaction<'r> {
    reactants: Vec<Reactant<'r>>,
    products: Vec<Product<'r>>,
    reactant_ids: BTreeSet<SpeciesId>,
    product_ids: BTreeSet<SpeciesId>,
    inert_ids: BTreeSet<SpeciesId>,
    reactant_coeffs: BTreeMap<String, u32>,
    product_coeffs: BTreeMap<String, u32>,
    min_temp: f64,
    max_temp: f64,
}

impl<'r> Reaction<'r> {
    pub fn new(
        registry: &'r SpeciesRegistry,
        reactants: BTreeSet<SpeciesId>,
        entry_temperatures: &BTreeMap<SpeciesId, Temperature>,
        dissociation: bool,
    ) -> ReactionResult<Self> {
        let ResolvedProducts { products, inerts } = products::resolve(&reactants, dissociation)?;

        let active_formulas: BTreeSet<String> = reactants
            .iter()
            .filter(|id| !inerts.contains(*id))
            .map(|id| registry.get(id).map(|s| s.formula().to_string()))
            .collect::<Result<_, _>>()
            .map_err(ReactionError::from)?;
        let product_formulas: BTreeSet<String> = products
            .iter()
            .map(|id| registry.get(id).map(|s| s.formula().to_string()))
            .collect::<Result<_, _>>()
            .map_err(ReactionError::from)?;

        let (mut reactant_coeffs, product_coeffs) =
            balance::balance(&active_formulas, &product_formulas)?;
        // Inerts carry no reactive stoichiometry but need an entry so the
        // concentration math can flow over every reactant.
        for id in &inerts {
            reactant_coeffs.insert(registry.get(id)?.formula().to_string(), 0);
        }

        let provided: BTreeSet<SpeciesId> = entry_temperatures.keys().cloned().collect();
        if provided != reactants {
            return Err(ReactionError::TemperatureMismatch {
                missing: reactants.difference(&provided).cloned().collect(),
                extra: provided.difference(&reactants).cloned().collect(),
            });
        }

        let reactant_parts = reactants
            .iter()
            .map(|id| {
                let species = registry.get(id)?;
                Ok(Reactant {
                    species,
                    coefficient: reactant_coeffs[species.formula()],
                    inert: inerts.contains(id),
                    entry_temp: kelvin_of(entry_temperatures[id]),
                })
            })
            .collect::<ReactionResult<Vec<_>>>()?;
        let product_parts = products
            .iter()
            .map(|id| {
                let species = registry.get(id)?;
                Ok(Product {
                    species,
                    coefficient: product_coeffs[species.formula()],
                })
            })
            .collect::<ReactionResult<Vec<_>>>()?;

        // Shared valid temperature range of every involved species, floored
        // at 0 K; root-finding never leaves it, so lookups never
        // extrapolate.
        let mut min_temp = 0.0_f64;
        let mut max_temp = f64::INFINITY;
        for species in reactant_parts
            .iter()
            .map(|r| r.species)
            .chain(product_parts.iter().map(|p| p.species))
        {
            min_temp = min_temp.max(species.table().min_temperature());
            max_temp = max_temp.min(species.table().max_temperature());
        }

        tracing::debug!(
            reactants = %display_ids(&reactants),
            products = %display_ids(&products),
            min_temp,
            max_temp,
            "reaction constructed"
        );

        Ok(Self {
            reactants: reactant_parts,
            products: product_parts,
            reactant_ids: reactants,
            product_ids: products,
            inert_ids: inerts,
            reactant_coeffs,
            product_coeffs,
            min_temp,
            max_temp,
        })
    }

    pub fn reactant_ids(&self) -> &BTreeSet<SpeciesId> {
        &self.reactant_ids
    }

    pub fn product_ids(&self) -> &BTreeSet<SpeciesId> {
        &self.product_ids
    }

    pub fn inert_ids(&self) -> &BTreeSet<SpeciesId> {
        &self.inert_ids
    }

    /// Balanced coefficients keyed by chemical formula; inert reactants
    /// carry coefficient 0.
    pub fn stoichiometry(&self) -> (&BTreeMap<String, u32>, &BTreeMap<String, u32>) {
        (&self.reactant_coeffs, &self.product_coeffs)
    }

    /// Shared valid temperature range (K) of all involved species.
    pub fn temperature_bounds(&self) -> (f64, f64) {
        (self.min_temp, self.max_temp)
    }

    /// Extent of reaction and final species amounts for a mixture.
    pub fn species_balance(
        &self,
        concentrations: &BTreeMap<SpeciesId, f64>,
    ) -> ReactionResult<SpeciesBalance> {
        self.validate_concentrations(concentrations)?;
        let (extent, reactant_final, product_final) = self.final_amounts(concentrations);

        let mut final_amounts = BTreeMap::new();
        for (reactant, amount) in self.reactants.iter().zip(&reactant_final) {
            final_amounts.insert(reactant.species.id().clone(), *amount);
        }
        for (product, amount) in self.products.iter().zip(&product_final) {
            final_amounts.insert(product.species.id().clone(), *amount);
        }
        Ok(SpeciesBalance {
            extent,
            final_amounts,
        })
    }

    /// Adiabatic flame temperature for a mixture.
    ///
    /// Concentrations are mole fractions: keys equal to the reactant set,
    /// strictly positive values summing to 1 within tolerance. A mixture
    /// whose energy balance has no root inside the temperature bounds
    /// yields `FlameTemp::Unreachable`; the reaction stays valid either
    /// way.
    pub fn calc_flame_temp(
        &self,
        concentrations: &BTreeMap<SpeciesId, f64>,
    ) -> ReactionResult<FlameTemp> {
        self.validate_concentrations(concentrations)?;
        let (extent, reactant_final, product_final) = self.final_amounts(concentrations);

        // Heat released by formation, counting unreacted residue on both
        // sides so leftover reactants contribute their own formation
        // enthalpy back.
        let delta_hf: f64 = self
            .products
            .iter()
            .zip(&product_final)
            .map(|(p, amount)| amount * p.species.std_hf())
            .sum::<f64>()
            - self
                .reactants
                .iter()
                .zip(&reactant_final)
                .map(|(r, amount)| amount * r.species.std_hf())
                .sum::<f64>();

        // Sensible heat the feed brings in, at each reactant's own entry
        // temperature.
        let sh_in: f64 = self
            .reactants
            .iter()
            .zip(&reactant_final)
            .map(|(r, amount)| amount * r.species.table().sh(r.entry_temp))
            .sum();

        // Leftover reactants exit at the flame temperature, so they join
        // the product side of the balance.
        let residual = |t: f64| -> f64 {
            let sh_out: f64 = self
                .products
                .iter()
                .zip(&product_final)
                .map(|(p, amount)| amount * p.species.table().sh(t))
                .sum::<f64>()
                + self
                    .reactants
                    .iter()
                    .zip(&reactant_final)
                    .map(|(r, amount)| amount * r.species.table().sh(t))
                    .sum::<f64>();
            sh_out - sh_in + delta_hf
        };

        let f_lo = residual(self.min_temp);
        let f_hi = residual(self.max_temp);
        if f_lo * f_hi > 0.0 {
            tracing::debug!(extent, f_lo, f_hi, "no bracketed root in temperature bounds");
            return Ok(FlameTemp::Unreachable);
        }

        let solution = brent_root(
            residual,
            self.min_temp,
            self.max_temp,
            &BrentConfig::default(),
        )?;
        tracing::debug!(
            extent,
            flame_temp = solution.root,
            iterations = solution.iterations,
            "energy balance solved"
        );
        Ok(FlameTemp::Reached(k(solution.root)))
    }

    /// 1-D sweep over one reactant's mole fraction.
    ///
    /// `base_ratios` fixes the relative proportions of the other reactants;
    /// it is normalized internally and need not sum to 1. Produces
    /// `resolution` points strictly inside (0, 1), including unreachable
    /// entries where the mixture has no in-range flame temperature.
    pub fn calc_flame_table(
        &self,
        variable: &SpeciesId,
        base_ratios: &BTreeMap<SpeciesId, f64>,
        resolution: usize,
    ) -> ReactionResult<FlameTable> {
        let points =
            sweep::concentration_points(variable, base_ratios, &self.reactant_ids, resolution)?;

        // Points are independent root-finds over a read-only registry.
        let temperatures = points
            .par_iter()
            .map(|(_, concentrations)| self.calc_flame_temp(concentrations))
            .collect::<ReactionResult<Vec<_>>>()?;
        let x_values = points.into_iter().map(|(x, _)| x).collect();

        let table = FlameTable::new(x_values, temperatures);
        tracing::debug!(
            variable = %variable,
            points = table.len(),
            unreachable = table.num_unreachable(),
            "flame table computed"
        );
        Ok(table)
    }

    fn validate_concentrations(
        &self,
        concentrations: &BTreeMap<SpeciesId, f64>,
    ) -> Result<(), ConcentrationError> {
        let provided: BTreeSet<SpeciesId> = concentrations.keys().cloned().collect();
        if provided != self.reactant_ids {
            return Err(ConcentrationError::KeyMismatch {
                missing: self.reactant_ids.difference(&provided).cloned().collect(),
                extra: provided.difference(&self.reactant_ids).cloned().collect(),
            });
        }
        for (id, &value) in concentrations {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConcentrationError::NonPositive {
                    id: id.clone(),
                    value,
                });
            }
        }
        let sum: f64 = concentrations.values().sum();
        if !nearly_equal(sum, 1.0, Tolerances::absolute(CONCENTRATION_SUM_TOL)) {
            return Err(ConcentrationError::BadSum { sum });
        }
        Ok(())
    }

    /// Limiting-reagent extent plus final amounts, parallel to
    /// `self.reactants` / `self.products`. Assumes validated input.
    fn final_amounts(
        &self,
        concentrations: &BTreeMap<SpeciesId, f64>,
    ) -> (f64, Vec<f64>, Vec<f64>) {
        let extent = self
            .reactants
            .iter()
            .filter(|r| !r.inert)
            .map(|r| concentrations[r.species.id()] / f64::from(r.coefficient))
            .fold(f64::INFINITY, f64::min);

        let reactant_final: Vec<f64> = self
            .reactants
            .iter()
            .map(|r| {
                let initial = concentrations[r.species.id()];
                if r.inert {
                    initial
                } else {
                    initial - extent * f64::from(r.coefficient)
                }
            })
            .collect();
        let product_final: Vec<f64> = self
            .products
            .iter()
            .map(|p| extent * f64::from(p.coefficient))
            .collect();

        (extent, reactant_final, product_final)
    }
}

fn display_ids(ids: &BTreeSet<SpeciesId>) -> String {
    let names: Vec<&str> = ids.iter().map(SpeciesId::as_str).collect();
    names.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_thermo::KNOWN_COMPOUNDS;

    /// Synthetic registry: linear SH ramps and constant Hf, wide enough to
    /// bracket the combustion scenarios. `max_temp` truncates every grid.
    fn registry(max_temp: f64) -> SpeciesRegistry {
        let mut text = String::from("Compound,T,SH,Hf,logKf\n");
        for entry in &KNOWN_COMPOUNDS {
            let (hf, log_kf) = match entry.id {
                "Carbon_Dioxide" => (-393.5, "inf"),
                "Water" => (-241.8, "40.05"),
                "Methane" => (-74.9, "8.90"),
                _ => (0.0, "0"),
            };
            // SH: -9 at 0 K, 0 at 298.15 K, then ~0.05 kJ/mol per K;
            // only the 0 K row may carry the inf sentinel
            text.push_str(&format!("{},0,-9.0,{hf},{log_kf}\n", entry.id));
            text.push_str(&format!("{},298.15,0.0,{hf},1.0\n", entry.id));
            text.push_str(&format!(
                "{},{max_temp},{:.4},{hf},0.5\n",
                entry.id,
                0.05 * (max_temp - 298.15),
            ));
        }
        SpeciesRegistry::from_reader(text.as_bytes()).unwrap()
    }

    fn ids(names: &[&str]) -> BTreeSet<SpeciesId> {
        names.iter().map(|n| SpeciesId::new(*n)).collect()
    }

    fn temps(names: &[&str]) -> BTreeMap<SpeciesId, Temperature> {
        names.iter().map(|n| (SpeciesId::new(*n), k(298.15))).collect()
    }

    fn concentrations(pairs: &[(&str, f64)]) -> BTreeMap<SpeciesId, f64> {
        pairs
            .iter()
            .map(|(id, v)| (SpeciesId::new(*id), *v))
            .collect()
    }

    fn methane_reaction(registry: &SpeciesRegistry) -> Reaction<'_> {
        Reaction::new(
            registry,
            ids(&["Methane", "Oxygen"]),
            &temps(&["Methane", "Oxygen"]),
            false,
        )
        .unwrap()
    }

    #[test]
    fn construction_derives_stoichiometry_and_bounds() {
        let registry = registry(6000.0);
        let reaction = methane_reaction(&registry);

        let (r, p) = reaction.stoichiometry();
        assert_eq!(r.get("CH4"), Some(&1));
        assert_eq!(r.get("O2"), Some(&2));
        assert_eq!(p.get("CO2"), Some(&1));
        assert_eq!(p.get("H2O"), Some(&2));
        assert_eq!(reaction.temperature_bounds(), (0.0, 6000.0));
    }

    #[test]
    fn temperature_map_must_match_reactants() {
        let registry = registry(6000.0);
        let err = Reaction::new(
            &registry,
            ids(&["Methane", "Oxygen"]),
            &temps(&["Methane"]),
            false,
        )
        .unwrap_err();
        match err {
            ReactionError::TemperatureMismatch { missing, extra } => {
                assert_eq!(missing, ids(&["Oxygen"]));
                assert!(extra.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn inert_coefficient_is_zero() {
        let registry = registry(6000.0);
        let reaction = Reaction::new(
            &registry,
            ids(&["Methane", "Oxygen", "Nitrogen"]),
            &temps(&["Methane", "Oxygen", "Nitrogen"]),
            false,
        )
        .unwrap();
        assert_eq!(reaction.inert_ids(), &ids(&["Nitrogen"]));
        assert_eq!(reaction.stoichiometry().0.get("N2"), Some(&0));
    }

    #[test]
    fn inert_amount_passes_through() {
        let registry = registry(6000.0);
        let reaction = Reaction::new(
            &registry,
            ids(&["Methane", "Oxygen", "Nitrogen"]),
            &temps(&["Methane", "Oxygen", "Nitrogen"]),
            false,
        )
        .unwrap();
        let balance = reaction
            .species_balance(&concentrations(&[
                ("Methane", 0.15),
                ("Oxygen", 0.55),
                ("Nitrogen", 0.3),
            ]))
            .unwrap();
        assert_eq!(balance.final_amounts[&SpeciesId::new("Nitrogen")], 0.3);
        assert!(balance.extent > 0.0);
    }

    #[test]
    fn limiting_reagent_never_goes_negative() {
        let registry = registry(6000.0);
        let reaction = methane_reaction(&registry);
        let balance = reaction
            .species_balance(&concentrations(&[("Methane", 0.5), ("Oxygen", 0.5)]))
            .unwrap();
        // oxygen limits: extent = 0.5 / 2
        assert!((balance.extent - 0.25).abs() < 1e-12);
        for (id, &amount) in &balance.final_amounts {
            assert!(amount >= -1e-12, "{id} went negative: {amount}");
        }
        assert_eq!(balance.final_amounts[&SpeciesId::new("Oxygen")], 0.0);
    }

    #[test]
    fn concentration_validation_catches_each_constraint() {
        let registry = registry(6000.0);
        let reaction = methane_reaction(&registry);

        // sums outside the 1e-6 tolerance
        for bad_sum in [0.99, 1.02] {
            let err = reaction
                .calc_flame_temp(&concentrations(&[
                    ("Methane", 0.2),
                    ("Oxygen", bad_sum - 0.2),
                ]))
                .unwrap_err();
            assert!(matches!(
                err,
                ReactionError::InvalidConcentration(ConcentrationError::BadSum { .. })
            ));
        }

        // missing key
        let err = reaction
            .calc_flame_temp(&concentrations(&[("Methane", 1.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ReactionError::InvalidConcentration(ConcentrationError::KeyMismatch { .. })
        ));

        // zero and negative values
        for bad in [0.0, -0.2] {
            let err = reaction
                .calc_flame_temp(&concentrations(&[("Methane", bad), ("Oxygen", 1.0 - bad)]))
                .unwrap_err();
            assert!(matches!(
                err,
                ReactionError::InvalidConcentration(ConcentrationError::NonPositive { .. })
            ));
        }
    }

    #[test]
    fn flame_temp_is_bracketed_and_repeatable() {
        let registry = registry(6000.0);
        let reaction = methane_reaction(&registry);
        let mixture = concentrations(&[("Methane", 0.2), ("Oxygen", 0.8)]);

        let first = reaction.calc_flame_temp(&mixture).unwrap();
        let flame = first.kelvin();
        assert!(flame.is_finite());
        assert!(flame > 0.0 && flame < 6000.0);

        // no hidden state: identical query, identical answer
        let second = reaction.calc_flame_temp(&mixture).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_table_makes_flame_unreachable() {
        // The same mixture releases more heat than the products can hold
        // below 1000 K, so the balance has no in-range root.
        let registry = registry(1000.0);
        let reaction = methane_reaction(&registry);
        let result = reaction
            .calc_flame_temp(&concentrations(&[("Methane", 0.2), ("Oxygen", 0.8)]))
            .unwrap();
        assert_eq!(result, FlameTemp::Unreachable);
        assert!(result.kelvin().is_nan());
        assert_eq!(result.as_kelvin(), None);
    }

    #[test]
    fn flame_table_covers_the_open_interval() {
        let registry = registry(6000.0);
        let reaction = Reaction::new(
            &registry,
            ids(&["Hydrogen", "Oxygen"]),
            &temps(&["Hydrogen", "Oxygen"]),
            false,
        )
        .unwrap();

        let table = reaction
            .calc_flame_table(
                &SpeciesId::new("Hydrogen"),
                &concentrations(&[("Hydrogen", 2.0), ("Oxygen", 1.0)]),
                50,
            )
            .unwrap();

        assert_eq!(table.len(), 50);
        let xs = table.x_values();
        let step = 1.0 / 51.0;
        for (i, w) in xs.windows(2).enumerate() {
            assert!(w[0] < w[1]);
            assert!((w[0] - (i as f64 + 1.0) * step).abs() < 1e-12);
        }
        assert!(xs[0] > 0.0);
        assert!(xs[xs.len() - 1] < 1.0);
        // kelvins() mirrors the table, NaN only at unreachable points
        let kelvins = table.kelvins();
        assert_eq!(kelvins.len(), 50);
        assert_eq!(
            kelvins.iter().filter(|t| t.is_nan()).count(),
            table.num_unreachable()
        );
    }
}
