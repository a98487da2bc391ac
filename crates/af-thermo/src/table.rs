//! Per-species interpolation of tabulated thermochemical data.

use crate::error::{ThermoError, ThermoResult};
use af_core::numeric::is_strictly_increasing;
use std::fmt;
use std::str::FromStr;

/// Closed set of value series a property table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySeries {
    /// Sensible heat relative to the standard reference temperature (kJ/mol).
    SensibleHeat,
    /// Heat of formation (kJ/mol).
    FormationEnthalpy,
    /// Base-10 logarithm of the equilibrium formation constant.
    LogEquilibriumConstant,
}

impl PropertySeries {
    pub const ALL: [PropertySeries; 3] = [
        PropertySeries::SensibleHeat,
        PropertySeries::FormationEnthalpy,
        PropertySeries::LogEquilibriumConstant,
    ];

    /// Column label as it appears in the data file.
    pub fn label(&self) -> &'static str {
        match self {
            PropertySeries::SensibleHeat => "SH",
            PropertySeries::FormationEnthalpy => "Hf",
            PropertySeries::LogEquilibriumConstant => "logKf",
        }
    }
}

impl fmt::Display for PropertySeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertySeries {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sh" => Ok(PropertySeries::SensibleHeat),
            "hf" => Ok(PropertySeries::FormationEnthalpy),
            "logkf" => Ok(PropertySeries::LogEquilibriumConstant),
            _ => Err("unknown property series"),
        }
    }
}

/// Multiplier applied to the largest finite logKf entry when replacing
/// infinite entries, so a continuous interpolant can be built. The stand-in
/// has no physical meaning; the raw series keeps the infinities.
const INFINITY_SUBSTITUTION_FACTOR: f64 = 1e6;

/// Piecewise-linear interpolants over one species' tabulated data.
///
/// The temperature grid is strictly increasing with at least two samples;
/// SH and Hf are finite everywhere; logKf entries may be `+inf` where the
/// reverse reaction is negligible. Lookups outside the grid extrapolate
/// linearly from the boundary segment and are not guaranteed accurate —
/// callers clamp through reaction temperature bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTable {
    temperatures: Vec<f64>,
    sensible_heat: Vec<f64>,
    formation_enthalpy: Vec<f64>,
    log_kf: Vec<f64>,
    log_kf_finite: Vec<f64>,
}

impl PropertyTable {
    pub fn new(
        temperatures: Vec<f64>,
        sensible_heat: Vec<f64>,
        formation_enthalpy: Vec<f64>,
        log_kf: Vec<f64>,
    ) -> ThermoResult<Self> {
        if temperatures.len() < 2 {
            return Err(ThermoError::BadGrid {
                what: "fewer than 2 temperature samples",
            });
        }
        if !is_strictly_increasing(&temperatures) {
            return Err(ThermoError::BadGrid {
                what: "temperatures not strictly increasing",
            });
        }
        for (label, values) in [
            ("SH", &sensible_heat),
            ("Hf", &formation_enthalpy),
            ("logKf", &log_kf),
        ] {
            if values.len() != temperatures.len() {
                return Err(ThermoError::ShapeMismatch {
                    what: label,
                    expected: temperatures.len(),
                    actual: values.len(),
                });
            }
        }
        if !sensible_heat.iter().all(|v| v.is_finite()) {
            return Err(ThermoError::NonFinite { what: "SH" });
        }
        if !formation_enthalpy.iter().all(|v| v.is_finite()) {
            return Err(ThermoError::NonFinite { what: "Hf" });
        }
        // logKf admits +inf as a "fully formed" sentinel, nothing else.
        if !log_kf.iter().all(|v| v.is_finite() || *v == f64::INFINITY) {
            return Err(ThermoError::NonFinite { what: "logKf" });
        }
        let log_kf_finite = substitute_infinities(&log_kf)?;

        Ok(Self {
            temperatures,
            sensible_heat,
            formation_enthalpy,
            log_kf,
            log_kf_finite,
        })
    }

    /// Sensible heat (kJ/mol) at a temperature (K).
    pub fn sh(&self, t: f64) -> f64 {
        lerp(&self.temperatures, &self.sensible_heat, t)
    }

    /// Heat of formation (kJ/mol) at a temperature (K).
    pub fn hf(&self, t: f64) -> f64 {
        lerp(&self.temperatures, &self.formation_enthalpy, t)
    }

    /// logKf at a temperature (K), evaluated on the finite-substituted
    /// series. Diagnostic/display consumers wanting the stored infinities
    /// use [`PropertyTable::raw_series`].
    pub fn log_kf(&self, t: f64) -> f64 {
        lerp(&self.temperatures, &self.log_kf_finite, t)
    }

    /// Temperature grid (K), strictly increasing.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Stored values exactly as loaded; logKf keeps its infinities here.
    pub fn raw_series(&self, series: PropertySeries) -> &[f64] {
        match series {
            PropertySeries::SensibleHeat => &self.sensible_heat,
            PropertySeries::FormationEnthalpy => &self.formation_enthalpy,
            PropertySeries::LogEquilibriumConstant => &self.log_kf,
        }
    }

    pub fn min_temperature(&self) -> f64 {
        self.temperatures[0]
    }

    pub fn max_temperature(&self) -> f64 {
        self.temperatures[self.temperatures.len() - 1]
    }
}

/// Replace `+inf` entries with `1e6 × max(finite entries)`.
///
/// A deliberately large but finite stand-in so an interpolant exists; it
/// approximates nothing physical. A series with no finite entry at all has
/// no scale to substitute from and is rejected.
fn substitute_infinities(values: &[f64]) -> ThermoResult<Vec<f64>> {
    let max_finite = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_finite.is_finite() {
        return Err(ThermoError::NonFinite {
            what: "logKf (no finite entries)",
        });
    }
    Ok(values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                v
            } else {
                max_finite * INFINITY_SUBSTITUTION_FACTOR
            }
        })
        .collect())
}

/// Linear interpolation on a strictly increasing grid, extrapolating from
/// the boundary segment outside it.
fn lerp(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    let p = xs.partition_point(|&xi| xi <= x);
    let i = if p == 0 { 0 } else { (p - 1).min(n - 2) };
    let (x0, x1) = (xs[i], xs[i + 1]);
    let (y0, y1) = (ys[i], ys[i + 1]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
