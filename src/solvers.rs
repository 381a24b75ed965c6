//! Scalar (1D) minimization, root finding and quadrature.
//!
//! These are the numerical primitives the rest of the crate is built from:
//! - [`minimize_brent`] finds the worst error inside one subinterval.
//! - [`bracketed_root`] drives the step-size search in the generator.
//! - [`newton_bounded`] recovers the forward map of a transfer function.
//! - [`quad`] integrates the arc-length density of a transfer function.
//!
//! All of them are generic over [`crate::value::Value`] and take their tolerances from
//! [`ScalarOptions`] or [`QuadOptions`].
mod minimization;
mod quadrature;
mod root_finding;

pub use minimization::minimize_brent;
pub use quadrature::{quad, QuadOptions, QuadResult};
pub use root_finding::{bracketed_root, newton_bounded};

use crate::value::Value;

/// Options for scalar root finding and minimization.
#[derive(Debug, Clone, Copy)]
pub struct ScalarOptions<T: Value> {
    /// Maximum number of iterations
    pub max_iter: usize,

    /// Absolute tolerance for convergence
    pub tol: T,

    /// Relative tolerance for convergence (scaled by the magnitude of the iterate)
    pub rtol: T,
}

impl<T: Value> Default for ScalarOptions<T> {
    fn default() -> Self {
        let eps = <T as num_traits::float::FloatCore>::epsilon();
        Self {
            max_iter: 100,
            tol: eps * T::two(),
            rtol: eps * T::two(),
        }
    }
}

impl<T: Value> ScalarOptions<T> {
    /// Options with a relative tolerance of `2^-bits`, the way precision is usually
    /// requested from a minimizer ("half the mantissa is enough").
    pub fn with_bits(max_iter: usize, bits: u32) -> Self {
        let bits = i32::try_from(bits).unwrap_or(i32::MAX);
        let rtol = Value::powi(T::two(), -bits);
        Self {
            max_iter,
            tol: <T as num_traits::float::FloatCore>::min_positive_value(),
            rtol,
        }
    }

    /// Combined tolerance at `x`
    pub(crate) fn tolerance_at(&self, x: T) -> T {
        self.tol + self.rtol * Value::abs(x)
    }
}

/// Result from a root finding method.
#[derive(Debug, Clone, Copy)]
pub struct RootResult<T: Value> {
    /// The root found
    ///
    /// For bracketing methods this is the end of the final bracket with `f <= 0`.
    pub root: T,

    /// Function value at root
    pub function_value: T,

    /// Final bracket `(lower, upper)`, or `(root, root)` for open methods
    pub bracket: (T, T),

    /// Number of iterations used
    pub iterations: usize,

    /// False if the iteration cap was hit first
    pub converged: bool,
}

impl<T: Value> RootResult<T> {
    /// Final bracket width
    pub fn bracket_width(&self) -> T {
        self.bracket.1 - self.bracket.0
    }
}

/// Result from a minimization method.
#[derive(Debug, Clone, Copy)]
pub struct MinimizeResult<T: Value> {
    /// The minimum point found
    pub x: T,

    /// Function value at minimum
    pub f_min: T,

    /// Number of iterations used
    pub iterations: usize,

    /// Final bracket width
    pub bracket_width: T,
}

/// `|magnitude|` carrying the sign of `sign`
fn with_sign<T: Value>(magnitude: T, sign: T) -> T {
    if sign < T::zero() {
        -Value::abs(magnitude)
    } else {
        Value::abs(magnitude)
    }
}
