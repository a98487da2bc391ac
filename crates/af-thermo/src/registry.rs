//! Read-only registry of species built from tabular thermochemical data.

use crate::error::{ThermoError, ThermoResult};
use crate::species::{CompoundEntry, KNOWN_COMPOUNDS, SpeciesId};
use crate::table::PropertyTable;
use af_core::units::constants::STANDARD_REF_TEMP_K;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One compound with its bound property table.
///
/// Immutable after construction; the standard-state heat of formation is
/// evaluated once at 298.15 K and cached.
#[derive(Debug, Clone)]
pub struct Species {
    id: SpeciesId,
    name: &'static str,
    formula: &'static str,
    table: PropertyTable,
    std_hf: f64,
}

impl Species {
    fn new(entry: &CompoundEntry, table: PropertyTable) -> Self {
        let std_hf = table.hf(STANDARD_REF_TEMP_K);
        Self {
            id: SpeciesId::new(entry.id),
            name: entry.display_name,
            formula: entry.formula,
            table,
            std_hf,
        }
    }

    pub fn id(&self) -> &SpeciesId {
        &self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn formula(&self) -> &'static str {
        self.formula
    }

    pub fn table(&self) -> &PropertyTable {
        &self.table
    }

    /// Heat of formation (kJ/mol) at the standard reference temperature.
    pub fn std_hf(&self) -> f64 {
        self.std_hf
    }
}

/// Raw row of the thermochemical data file.
///
/// Extra columns (heat capacity, entropy, Gibbs energy in some table
/// variants) are ignored. `logKf` is read as text because the file encodes
/// "fully formed" conditions with a literal `inf` token.
#[derive(Debug, Deserialize)]
struct DataRow {
    #[serde(rename = "Compound")]
    compound: String,
    #[serde(rename = "T")]
    temperature: f64,
    #[serde(rename = "SH")]
    sensible_heat: f64,
    #[serde(rename = "Hf")]
    formation_enthalpy: f64,
    #[serde(rename = "logKf")]
    log_kf: String,
}

fn parse_log_kf(raw: &str) -> ThermoResult<f64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("inf") {
        return Ok(f64::INFINITY);
    }
    trimmed.parse::<f64>().map_err(|_| ThermoError::Parse {
        what: "logKf",
        value: raw.to_string(),
    })
}

/// Catalog of species, populated once at startup and read-only afterwards.
///
/// Safe to share by reference across threads: nothing mutates it post-init.
#[derive(Debug)]
pub struct SpeciesRegistry {
    species: BTreeMap<SpeciesId, Species>,
}

impl SpeciesRegistry {
    pub fn from_csv_path(path: impl AsRef<Path>) -> ThermoResult<Self> {
        Self::build(csv::Reader::from_path(path.as_ref())?)
    }

    pub fn from_reader<R: Read>(reader: R) -> ThermoResult<Self> {
        Self::build(csv::Reader::from_reader(reader))
    }

    fn build<R: Read>(mut reader: csv::Reader<R>) -> ThermoResult<Self> {
        // (T, SH, Hf, logKf) rows grouped per compound; file order is not
        // trusted, rows are sorted by temperature before table construction.
        let mut rows: BTreeMap<&'static str, Vec<(f64, f64, f64, f64)>> = BTreeMap::new();
        for record in reader.deserialize::<DataRow>() {
            let row = record?;
            let Some(entry) = CompoundEntry::lookup(&row.compound) else {
                continue;
            };
            let log_kf = parse_log_kf(&row.log_kf)?;
            rows.entry(entry.id).or_default().push((
                row.temperature,
                row.sensible_heat,
                row.formation_enthalpy,
                log_kf,
            ));
        }

        let mut species = BTreeMap::new();
        for entry in &KNOWN_COMPOUNDS {
            let Some(mut samples) = rows.remove(entry.id) else {
                return Err(ThermoError::MissingData { id: entry.id });
            };
            samples.sort_by(|a, b| a.0.total_cmp(&b.0));
            let table = PropertyTable::new(
                samples.iter().map(|s| s.0).collect(),
                samples.iter().map(|s| s.1).collect(),
                samples.iter().map(|s| s.2).collect(),
                samples.iter().map(|s| s.3).collect(),
            )?;
            tracing::debug!(id = entry.id, samples = samples.len(), "loaded property table");
            let sp = Species::new(entry, table);
            species.insert(sp.id().clone(), sp);
        }

        tracing::info!(count = species.len(), "species registry initialized");
        Ok(Self { species })
    }

    /// Look up a species by id.
    pub fn get(&self, id: &SpeciesId) -> ThermoResult<&Species> {
        self.species
            .get(id)
            .ok_or_else(|| ThermoError::UnknownSpecies {
                id: id.to_string(),
            })
    }

    /// All species in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
