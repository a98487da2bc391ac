//! Errors for reaction construction and flame-temperature queries.

use af_thermo::{SpeciesId, ThermoError};
use std::collections::BTreeSet;
use thiserror::Error;

/// Result type for reaction operations.
pub type ReactionResult<T> = Result<T, ReactionError>;

/// Which concentration precondition a query violated.
///
/// Rejecting a query leaves the reaction valid and reusable; only the
/// offending call fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConcentrationError {
    #[error("concentration keys do not match reactants (missing {missing:?}, unexpected {extra:?})")]
    KeyMismatch {
        missing: BTreeSet<SpeciesId>,
        extra: BTreeSet<SpeciesId>,
    },

    #[error("concentration for {id} must be strictly positive and finite, got {value}")]
    NonPositive { id: SpeciesId, value: f64 },

    #[error("concentrations must sum to 1.0, got {sum}")]
    BadSum { sum: f64 },
}

/// Errors raised while constructing or querying a reaction.
#[derive(Error, Debug)]
pub enum ReactionError {
    /// No product pattern matches the active reactant set.
    #[error("no known reaction for reactants {reactants:?}")]
    UnsupportedReaction { reactants: BTreeSet<SpeciesId> },

    /// Entry-temperature map does not cover the reactant set exactly.
    #[error("entry temperatures do not match reactants (missing {missing:?}, unexpected {extra:?})")]
    TemperatureMismatch {
        missing: BTreeSet<SpeciesId>,
        extra: BTreeSet<SpeciesId>,
    },

    /// The formula sets admit no unique positive integer balance.
    #[error("cannot balance reaction: {what}")]
    Unbalanceable { what: String },

    /// A per-call concentration precondition failed.
    #[error("invalid concentrations: {0}")]
    InvalidConcentration(#[from] ConcentrationError),

    /// Ratios sum to zero or non-finite and cannot be normalized.
    #[error("ratios sum to zero or non-finite, cannot normalize")]
    DegenerateRatio,

    /// Sweep variable is not one of the reaction's reactants.
    #[error("sweep variable {id} is not a reactant")]
    SweepVariable { id: SpeciesId },

    /// Root-finder misuse or failure to converge inside the bracket.
    #[error("root finding failed: {what}")]
    RootFinding { what: String },

    #[error(transparent)]
    Thermo(#[from] ThermoError),
}
