//! af-thermo: thermochemical property data for adiaflame.
//!
//! Provides:
//! - Species identity (`SpeciesId`) and the known-compound catalog
//! - Per-species interpolated property tables (SH, Hf, logKf)
//! - The read-only `SpeciesRegistry` loaded from tabular CSV data
//!
//! # Architecture
//!
//! The registry is constructed exactly once at process start and is
//! read-only afterwards, so a `&SpeciesRegistry` can be shared freely across
//! concurrent callers. Reactions reference species through the registry by
//! stable string id, never by object identity.
//!
//! # Example
//!
//! ```no_run
//! use af_thermo::{SpeciesId, SpeciesRegistry};
//!
//! let registry = SpeciesRegistry::from_csv_path("data/thermochemical_data.csv").unwrap();
//! let methane = registry.get(&SpeciesId::new("Methane")).unwrap();
//! println!("{}: Hf(298.15) = {} kJ/mol", methane.name(), methane.std_hf());
//! ```

pub mod error;
pub mod registry;
pub mod species;
pub mod table;

// Re-exports for ergonomics
pub use error::{ThermoError, ThermoResult};
pub use registry::{Species, SpeciesRegistry};
pub use species::{CompoundEntry, KNOWN_COMPOUNDS, SpeciesId};
pub use table::{PropertySeries, PropertyTable};
