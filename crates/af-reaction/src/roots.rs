//! Bracketed scalar root-finding (Brent's method).

use crate::error::{ReactionError, ReactionResult};

/// Brent solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct BrentConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the bracket width
    pub x_tol: f64,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_tol: 1e-9,
        }
    }
}

/// Root-finding outcome.
#[derive(Debug, Clone, Copy)]
pub struct BrentResult {
    /// Best root estimate
    pub root: f64,
    /// Iterations consumed
    pub iterations: usize,
    /// Residual at the root estimate
    pub residual: f64,
}

/// Find a root of `f` on `[a, b]`.
///
/// The interval must bracket a root: `f(a)` and `f(b)` have opposite signs
/// (or one endpoint is already a root). Combines bisection with secant and
/// inverse-quadratic steps, falling back to bisection whenever an
/// interpolated step leaves the bracket or converges too slowly.
pub fn brent_root<F>(f: F, a: f64, b: f64, config: &BrentConfig) -> ReactionResult<BrentResult>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return Ok(BrentResult {
            root: a,
            iterations: 0,
            residual: fa,
        });
    }
    if fb == 0.0 {
        return Ok(BrentResult {
            root: b,
            iterations: 0,
            residual: fb,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(ReactionError::RootFinding {
            what: format!("interval [{a}, {b}] does not bracket a root"),
        });
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let midpoint = 0.5 * (c - b);
        if midpoint.abs() <= tol || fb == 0.0 {
            return Ok(BrentResult {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Attempt inverse quadratic interpolation (secant when a == c).
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * midpoint * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * midpoint * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let accept = 2.0 * p < (3.0 * midpoint * q - (tol * q).abs()).min((e * q).abs());
            if accept {
                e = d;
                d = p / q;
            } else {
                d = midpoint;
                e = d;
            }
        } else {
            d = midpoint;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if midpoint > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
    }

    Err(ReactionError::RootFinding {
        what: format!("no convergence within {} iterations", config.max_iterations),
    })
}
