//! Fixed mapping from a reactant set to its product set and inert subset.

use crate::error::{ReactionError, ReactionResult};
use af_thermo::SpeciesId;
use std::collections::BTreeSet;

/// Species that never participate in reaction stoichiometry; they pass
/// through the system unchanged, carrying sensible heat only.
pub const INERT_SPECIES: [&str; 2] = ["Nitrogen", "Argon"];

/// Product patterns keyed by the exact active (non-inert) reactant set.
const REACTION_PATTERNS: [(&[&str], &[&str]); 2] = [
    (&["Methane", "Oxygen"], &["Carbon_Dioxide", "Water"]),
    (&["Hydrogen", "Oxygen"], &["Water"]),
];

/// Outcome of product resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProducts {
    pub products: BTreeSet<SpeciesId>,
    pub inerts: BTreeSet<SpeciesId>,
}

pub fn is_inert(id: &SpeciesId) -> bool {
    INERT_SPECIES.contains(&id.as_str())
}

/// Split the feed into inerts and an active set, then match the active set
/// exactly against the known patterns. No partial or fuzzy matching.
///
/// The dissociation flag currently routes to the same pattern table as
/// `false`; it is reserved for future dissociation chemistry and must not
/// be extended silently.
pub fn resolve(
    reactants: &BTreeSet<SpeciesId>,
    _dissociation: bool,
) -> ReactionResult<ResolvedProducts> {
    let (inerts, active): (BTreeSet<SpeciesId>, BTreeSet<SpeciesId>) =
        reactants.iter().cloned().partition(is_inert);

    for (pattern, products) in REACTION_PATTERNS {
        if active.len() == pattern.len() && pattern.iter().all(|id| active.contains(*id)) {
            return Ok(ResolvedProducts {
                products: products.iter().map(|id| SpeciesId::new(*id)).collect(),
                inerts,
            });
        }
    }

    Err(ReactionError::UnsupportedReaction { reactants: active })
}
