//! af-reaction: the adiabatic flame temperature engine.
//!
//! Provides:
//! - Product resolution for the fixed reactant→product mapping table
//! - Smallest-integer stoichiometric balancing
//! - The `Reaction` engine: extent of reaction, species mass balance,
//!   enthalpy accounting, and the root-finding energy balance
//! - 1-D concentration sweeps over one reactant's mole fraction
//!
//! # Example
//!
//! ```no_run
//! use std::collections::{BTreeMap, BTreeSet};
//! use af_core::units::k;
//! use af_reaction::Reaction;
//! use af_thermo::{SpeciesId, SpeciesRegistry};
//!
//! let registry = SpeciesRegistry::from_csv_path("data/thermochemical_data.csv").unwrap();
//! let reactants: BTreeSet<_> = ["Methane", "Oxygen"].map(SpeciesId::new).into();
//! let temps: BTreeMap<_, _> = reactants.iter().map(|id| (id.clone(), k(298.15))).collect();
//! let reaction = Reaction::new(&registry, reactants.clone(), &temps, false).unwrap();
//!
//! let mixture: BTreeMap<_, _> = [("Methane", 0.2), ("Oxygen", 0.8)]
//!     .map(|(id, c)| (SpeciesId::new(id), c))
//!     .into();
//! println!("{} K", reaction.calc_flame_temp(&mixture).unwrap().kelvin());
//! ```

pub mod balance;
pub mod engine;
pub mod error;
pub mod products;
pub mod roots;
pub mod sweep;

// Re-exports for ergonomics
pub use balance::{Coefficients, balance};
pub use engine::{DEFAULT_SWEEP_RESOLUTION, FlameTemp, Reaction, SpeciesBalance};
pub use error::{ConcentrationError, ReactionError, ReactionResult};
pub use products::{INERT_SPECIES, ResolvedProducts, resolve};
pub use roots::{BrentConfig, BrentResult, brent_root};
pub use sweep::{FlameTable, normalize, scale_dependents};
