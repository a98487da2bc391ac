//! Smallest-integer stoichiometric balancing from chemical formulas.
//!
//! The element-conservation system is assembled as a matrix (one row per
//! element, one signed column per species) and reduced to find its
//! nullspace; a chemically meaningful reaction has exactly one independent
//! balance, which is then scaled to the smallest positive integers.

use crate::error::{ReactionError, ReactionResult};
use nalgebra::DMatrix;
use std::collections::{BTreeMap, BTreeSet};

/// Balanced integer coefficients keyed by chemical formula.
pub type Coefficients = BTreeMap<String, u32>;

/// Pivot entries smaller than this are treated as zero during elimination.
const PIVOT_EPS: f64 = 1e-9;

/// Largest multiplier tried when rationalizing nullspace components.
const MAX_INTEGER_SCALE: u32 = 512;

/// Balance `reactants -> products`, both given as molecular formulas.
///
/// Returns positive integer coefficients with no remaining atom imbalance.
/// Inert species carry no reactive stoichiometry and must not appear here;
/// the caller adds them to the reactant map with coefficient 0 afterwards.
pub fn balance(
    reactants: &BTreeSet<String>,
    products: &BTreeSet<String>,
) -> ReactionResult<(Coefficients, Coefficients)> {
    if reactants.is_empty() || products.is_empty() {
        return Err(ReactionError::Unbalanceable {
            what: "empty reactant or product set".into(),
        });
    }

    let formulas: Vec<&String> = reactants.iter().chain(products.iter()).collect();
    let counts = formulas
        .iter()
        .map(|f| element_counts(f))
        .collect::<ReactionResult<Vec<_>>>()?;
    let elements: BTreeSet<&String> = counts.iter().flat_map(|c| c.keys()).collect();

    // Reactant columns count atoms in, product columns count atoms out.
    let matrix = DMatrix::from_fn(elements.len(), formulas.len(), |i, j| {
        let element = elements.iter().nth(i).unwrap();
        let sign = if j < reactants.len() { 1.0 } else { -1.0 };
        sign * counts[j].get(element.as_str()).copied().unwrap_or(0) as f64
    });

    let solution = nullspace_vector(matrix)?;
    let coefficients = smallest_integers(&solution)?;

    let reactant_coeffs = reactants
        .iter()
        .zip(&coefficients)
        .map(|(f, &c)| (f.clone(), c))
        .collect();
    let product_coeffs = products
        .iter()
        .zip(&coefficients[reactants.len()..])
        .map(|(f, &c)| (f.clone(), c))
        .collect();
    Ok((reactant_coeffs, product_coeffs))
}

/// Parse a molecular formula (e.g. `CH4`, `CO2`, `Ar`) into element counts.
///
/// Grammar: one-or-two-letter element symbols followed by an optional
/// count. No parenthesized groups; the compound catalog has none.
fn element_counts(formula: &str) -> ReactionResult<BTreeMap<String, i64>> {
    let mut counts = BTreeMap::new();
    let mut chars = formula.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_ascii_uppercase() {
            return Err(ReactionError::Unbalanceable {
                what: format!("cannot parse formula {formula:?}"),
            });
        }
        let mut symbol = c.to_string();
        while let Some(&lower) = chars.peek() {
            if lower.is_ascii_lowercase() {
                symbol.push(lower);
                chars.next();
            } else {
                break;
            }
        }
        let mut count = 0_i64;
        while let Some(&digit) = chars.peek() {
            if let Some(d) = digit.to_digit(10) {
                count = count * 10 + d as i64;
                chars.next();
            } else {
                break;
            }
        }
        *counts.entry(symbol).or_insert(0) += count.max(1);
    }
    if counts.is_empty() {
        return Err(ReactionError::Unbalanceable {
            what: format!("empty formula {formula:?}"),
        });
    }
    Ok(counts)
}

/// Reduce the conservation matrix and extract its one-dimensional nullspace.
fn nullspace_vector(mut a: DMatrix<f64>) -> ReactionResult<Vec<f64>> {
    let (rows, cols) = a.shape();
    let mut pivot_cols: Vec<usize> = Vec::new();

    for col in 0..cols {
        let row = pivot_cols.len();
        if row == rows {
            break;
        }
        let pivot_row = (row..rows)
            .max_by(|&r1, &r2| a[(r1, col)].abs().total_cmp(&a[(r2, col)].abs()))
            .unwrap();
        if a[(pivot_row, col)].abs() < PIVOT_EPS {
            continue;
        }
        a.swap_rows(row, pivot_row);
        let pivot = a[(row, col)];
        for c in col..cols {
            a[(row, c)] /= pivot;
        }
        for r in 0..rows {
            if r != row {
                let factor = a[(r, col)];
                if factor != 0.0 {
                    for c in col..cols {
                        a[(r, c)] -= factor * a[(row, c)];
                    }
                }
            }
        }
        pivot_cols.push(col);
    }

    let free_cols: Vec<usize> = (0..cols).filter(|c| !pivot_cols.contains(c)).collect();
    match free_cols.len() {
        0 => Err(ReactionError::Unbalanceable {
            what: "element conservation admits no reaction".into(),
        }),
        1 => {
            let free = free_cols[0];
            let mut x = vec![0.0; cols];
            x[free] = 1.0;
            for (row, &col) in pivot_cols.iter().enumerate() {
                x[col] = -a[(row, free)];
            }
            Ok(x)
        }
        n => Err(ReactionError::Unbalanceable {
            what: format!("{n} independent balances, reaction is ambiguous"),
        }),
    }
}

/// Scale a positive rational vector to the smallest integer multiple.
fn smallest_integers(x: &[f64]) -> ReactionResult<Vec<u32>> {
    for scale in 1..=MAX_INTEGER_SCALE {
        let scaled: Vec<f64> = x.iter().map(|v| v * scale as f64).collect();
        if scaled.iter().all(|v| (v - v.round()).abs() < 1e-6) {
            let ints: Vec<i64> = scaled.iter().map(|v| v.round() as i64).collect();
            if ints.iter().any(|&v| v <= 0) {
                return Err(ReactionError::Unbalanceable {
                    what: "balance requires a non-positive coefficient".into(),
                });
            }
            let divisor = ints.iter().copied().fold(0, gcd);
            return Ok(ints.iter().map(|&v| (v / divisor) as u32).collect());
        }
    }
    Err(ReactionError::Unbalanceable {
        what: "coefficients are not small rationals".into(),
    })
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
