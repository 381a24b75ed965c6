//! Monotone reparametrization used by nonuniform grids.
//!
//! A nonuniform table is still uniform in a *parameter* space. The transfer function
//! maps a physical argument `x` to that parameter space (already divided by the step
//! size, so the integer part is the subinterval index), and back.
//!
//! The map is built from the arc length of `f`:
//!
//! ```text
//! g(x) = a + (b - a)/c * ∫ₐˣ 1/√(1 + f'(t)²) dt,     c = ∫ₐᵇ 1/√(1 + f'(t)²) dt
//! ```
//!
//! `g` grows slowly where `f` is steep. Its inverse is approximated by the Hermite cubic
//! that matches `g⁻¹` and its slope at both ends, so more subintervals land where `f`
//! changes quickly.
use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::solvers::{newton_bounded, quad, QuadOptions, ScalarOptions};
use crate::value::Value;

/// Endpoint slopes above 3 can make a cubic Hermite interpolant non-monotone
const MAX_ENDPOINT_SLOPE: f64 = 3.0;

/// Iteration cap for recovering the forward map
const FORWARD_MAX_ITER: usize = 55;

/// Cubic map from physical arguments to (scaled) parameter space.
///
/// `inverse(x)` is one cubic Horner pass returning `(p(x) - min_arg) / step_size`, where `p`
/// approximates `g⁻¹`. Its integer part is the index of the subinterval containing `x`.
///
/// # Example
/// ```rust
/// # use polylut::{FunctionContainer, TransferFunction};
/// let func = FunctionContainer::new(|x: f64| x.powi(3))
///     .with_derivatives(1, |x, out: &mut [f64]| {
///         out[0] = x.powi(3);
///         out[1] = 3.0 * x * x;
///     })
///     .unwrap();
///
/// let tf = TransferFunction::new(&func, 0.0, 2.0, 0.25).unwrap();
/// assert!(tf.inverse(0.0).abs() < 1e-12);
/// assert!((tf.inverse(2.0) - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction<T: Value> {
    inverse: Polynomial<T, 4>,
    min_arg: T,
    table_max_arg: T,
    step_size: T,
}

impl<T: Value> TransferFunction<T> {
    /// Builds the transfer function for a grid on `[min_arg, table_max_arg]` with the given step.
    ///
    /// # Errors
    /// - [`Error::MissingDerivative`] if `func` cannot supply a first derivative.
    /// - [`Error::InvalidArgument`] if the domain is empty or the arc length integral is not positive.
    pub fn new(
        func: &FunctionContainer<T>,
        min_arg: T,
        table_max_arg: T,
        step_size: T,
    ) -> Result<Self> {
        func.require(1)?;
        if min_arg >= table_max_arg || step_size <= T::zero() {
            return Err(Error::invalid(format!(
                "transfer function needs min < max and step > 0, got [{min_arg:e}, {table_max_arg:e}] with step {step_size:e}"
            )));
        }

        let (a, b) = (min_arg, table_max_arg);
        let density = |t: T| {
            func.nth_derivative(t, 1)
                .map_or(T::nan(), |slope| T::one() / (T::one() + slope * slope).sqrt())
        };

        let integral = quad(density, a, b, QuadOptions::default())?;
        if !integral.converged {
            log::debug!(
                "arc length integral on [{a:e}, {b:e}] did not converge (error {:e})",
                integral.error
            );
        }
        let c = integral.value;
        if c <= T::zero() || !num_traits::float::FloatCore::is_finite(c) {
            return Err(Error::invalid(format!(
                "arc length density integrates to {c:e} on [{a:e}, {b:e}]"
            )));
        }

        // Slopes of g^-1 at the ends are 1/g'
        let max_slope = T::try_cast(MAX_ENDPOINT_SLOPE)?;
        let g_prime = |x: T| (b - a) * density(x) / c;
        let m0 = num_traits::float::FloatCore::min(T::one() / g_prime(a), max_slope);
        let m1 = num_traits::float::FloatCore::min(T::one() / g_prime(b), max_slope);

        let inverse = hermite_cubic(a, b, m0, m1);
        log::debug!("transfer function on [{a:e}, {b:e}]: m0 = {m0:e}, m1 = {m1:e}, p = {inverse}");

        Ok(Self::from_inverse(inverse, min_arg, table_max_arg, step_size))
    }

    /// The transfer function of a uniform grid: `inverse(x) = (x - min_arg) / step_size`
    pub fn identity(min_arg: T, table_max_arg: T, step_size: T) -> Self {
        let inverse = Polynomial::new([T::zero(), T::one(), T::zero(), T::zero()]);
        Self::from_inverse(inverse, min_arg, table_max_arg, step_size)
    }

    /// Rebuilds a transfer function from coefficients that already include the grid hash,
    /// as produced by [`TransferFunction::coefficients`].
    pub fn from_coefs(coefs: [T; 4], min_arg: T, table_max_arg: T, step_size: T) -> Self {
        Self {
            inverse: Polynomial::new(coefs),
            min_arg,
            table_max_arg,
            step_size,
        }
    }

    /// Bakes the grid hash into `p`: subtract the minimum, then divide by the step
    fn from_inverse(mut p: Polynomial<T, 4>, min_arg: T, table_max_arg: T, step_size: T) -> Self {
        p[0] -= min_arg;
        p.scale(T::one() / step_size);
        Self::from_coefs(*p.coefficients(), min_arg, table_max_arg, step_size)
    }

    /// Maps a physical argument to its fractional subinterval index
    #[inline]
    pub fn inverse(&self, x: T) -> T {
        self.inverse.eval(x)
    }

    /// Derivative of [`TransferFunction::inverse`]
    pub fn inverse_diff(&self, x: T) -> T {
        self.inverse.diff(x, 1)
    }

    /// Maps a point of the uniform parameter grid `u ∈ [min_arg, table_max_arg]` to its physical location.
    ///
    /// Solves `inverse(z) = (u - min_arg) / step_size` by bounded Newton-Raphson starting at `z = u`.
    pub fn forward(&self, u: T) -> T {
        let target = (u - self.min_arg) / self.step_size;
        let options = ScalarOptions {
            max_iter: FORWARD_MAX_ITER,
            ..ScalarOptions::default()
        };
        let result = newton_bounded(
            |z| (self.inverse(z) - target, self.inverse_diff(z)),
            u,
            self.min_arg,
            self.table_max_arg,
            options,
        );
        if !result.converged {
            log::trace!("transfer forward map did not converge at u = {u:e}");
        }
        result.root
    }

    /// Coefficients of the hashed inverse cubic, lowest order first
    pub fn coefficients(&self) -> &[T; 4] {
        self.inverse.coefficients()
    }
}

/// Cubic `p` with `p(a) = a`, `p(b) = b`, `p'(a) = m0`, `p'(b) = m1`, in powers of `x`
fn hermite_cubic<T: Value>(a: T, b: T, m0: T, m1: T) -> Polynomial<T, 4> {
    let width = b - a;
    let three = T::from_positive_int(3);
    let local = Polynomial::new([
        a,
        width * m0,
        -three * a + three * b - (T::two() * m0 + m1) * width,
        T::two() * a - T::two() * b + (m0 + m1) * width,
    ]);

    // t = (x - a) / width
    local.compose_affine(T::one() / width, -a / width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::value::SteppedValues;

    fn peak() -> FunctionContainer<f64> {
        // Steep flanks around 0, flat tails at +-1
        let f = |x: f64| (-50.0 * x * x).exp();
        FunctionContainer::new(f)
            .with_derivatives(1, move |x, out: &mut [f64]| {
                out[0] = f(x);
                out[1] = -100.0 * x * f(x);
            })
            .unwrap()
    }

    #[test]
    fn test_identity() {
        let tf = TransferFunction::identity(-1.0, 1.0, 0.25);
        assert_eq!(tf.coefficients(), &[4.0, 4.0, 0.0, 0.0]);
        assert_close!(tf.inverse(0.5), 6.0);
        assert_close!(tf.forward(0.5), 0.5);
    }

    #[test]
    fn test_hits_both_ends() {
        let tf = TransferFunction::new(&peak(), -1.0, 1.0, 0.1).unwrap();
        assert_close!(tf.inverse(-1.0), 0.0, tol = 1e-12);
        assert_close!(tf.inverse(1.0), 20.0, tol = 1e-10);
    }

    #[test]
    fn test_bijection() {
        let tf = TransferFunction::new(&peak(), -1.0, 1.0, 0.1).unwrap();
        for x in SteppedValues::new(-1.0..=1.0, 0.01) {
            let u = -1.0 + 0.1 * tf.inverse(x);
            assert_close!(tf.forward(u), x, tol = 1e-10, "x = {x}");
        }
    }

    #[test]
    fn test_monotone() {
        let tf = TransferFunction::new(&peak(), -1.0, 1.0, 0.1).unwrap();
        let mut last = f64::NEG_INFINITY;
        for x in SteppedValues::new(-1.0..=1.0, 0.001) {
            let y = tf.inverse(x);
            assert!(y >= last, "inverse decreases at {x}");
            last = y;
        }
    }

    #[test]
    fn test_denser_near_peak() {
        let tf = TransferFunction::new(&peak(), -1.0, 1.0, 0.1).unwrap();
        // Slope of the index map is the number of subintervals per unit length
        assert!(tf.inverse_diff(0.0) > tf.inverse_diff(-1.0));
        assert!(tf.inverse_diff(0.0) > tf.inverse_diff(1.0));
    }

    #[test]
    fn test_requires_derivative() {
        let plain = FunctionContainer::new(f64::sin);
        assert!(matches!(
            TransferFunction::new(&plain, 0.0, 1.0, 0.1),
            Err(Error::MissingDerivative { required: 1, .. })
        ));
    }

    #[test]
    fn test_endpoint_slope_clamped() {
        // Very steep at both ends: both slopes hit the clamp
        let f = |x: f64| 1e3 * x.powi(3);
        let func = FunctionContainer::new(f)
            .with_derivatives(1, move |x, out: &mut [f64]| {
                out[0] = f(x);
                out[1] = 3e3 * x * x;
            })
            .unwrap();
        let tf = TransferFunction::new(&func, -1.0, 1.0, 1.0).unwrap();
        assert_close!(tf.inverse_diff(-1.0), 3.0, tol = 1e-9);
        assert_close!(tf.inverse_diff(1.0), 3.0, tol = 1e-9);
    }
}
