//! The function a table approximates, and its derivatives.
//!
//! Tables only ever read from a [`FunctionContainer`], and only while they are being
//! built or checked; evaluating a finished table never calls back into it.
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

/// Highest derivative order any fitting strategy asks for
pub const MAX_DERIVATIVE_ORDER: usize = 7;

type Scalar<T> = Arc<dyn Fn(T) -> T + Send + Sync>;
type Derivatives<T> = Arc<dyn Fn(T, &mut [T]) + Send + Sync>;

/// A function `f` and, optionally, an oracle for its derivatives.
///
/// The derivative oracle fills a slice with `[f(x), f'(x), ..., f^(k)(x)]`, where `k` is
/// the slice length minus one and never exceeds the order declared with
/// [`FunctionContainer::with_derivatives`]. Automatic differentiation, closed forms or
/// hand-written series all fit behind this one closure.
///
/// Cloning is cheap; the closures are shared.
///
/// # Example
/// ```rust
/// # use polylut::FunctionContainer;
/// // exp is its own derivative
/// let func = FunctionContainer::new(f64::exp)
///     .with_derivatives(7, |x, out: &mut [f64]| out.fill(x.exp()))
///     .unwrap();
///
/// assert_eq!(func.call(0.0), 1.0);
/// assert_eq!(func.nth_derivative(0.0, 3).unwrap(), 1.0);
/// ```
#[derive(Clone)]
pub struct FunctionContainer<T: Value> {
    function: Scalar<T>,
    derivatives: Option<(usize, Derivatives<T>)>,
}

impl<T: Value> FunctionContainer<T> {
    /// Wraps a plain function with no derivative information
    pub fn new(f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self {
            function: Arc::new(f),
            derivatives: None,
        }
    }

    /// Attaches a derivative oracle able to produce derivatives up to `max_order`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `max_order` is 0 or above [`MAX_DERIVATIVE_ORDER`].
    pub fn with_derivatives(
        mut self,
        max_order: usize,
        derivatives: impl Fn(T, &mut [T]) + Send + Sync + 'static,
    ) -> Result<Self> {
        if max_order == 0 || max_order > MAX_DERIVATIVE_ORDER {
            return Err(Error::invalid(format!(
                "derivative order must be between 1 and {MAX_DERIVATIVE_ORDER}, got {max_order}"
            )));
        }

        self.derivatives = Some((max_order, Arc::new(derivatives)));
        Ok(self)
    }

    /// Evaluates `f(x)`
    #[inline]
    pub fn call(&self, x: T) -> T {
        (self.function)(x)
    }

    /// Highest derivative order available, 0 if there is no derivative oracle
    pub fn max_derivative(&self) -> usize {
        self.derivatives.as_ref().map_or(0, |(order, _)| *order)
    }

    /// Fails unless derivatives up to `order` are available.
    ///
    /// Fitting strategies call this once before sampling anything, so a missing
    /// derivative is reported at construction rather than silently replaced.
    ///
    /// # Errors
    /// Returns [`Error::MissingDerivative`] if the oracle is absent or too shallow.
    pub fn require(&self, order: usize) -> Result<()> {
        let available = self.max_derivative();
        if order > available {
            return Err(Error::MissingDerivative {
                required: order,
                available,
            });
        }
        Ok(())
    }

    /// Returns `[f(x), f'(x), ..., f^(order)(x)]`
    ///
    /// # Errors
    /// Returns [`Error::MissingDerivative`] if `order` exceeds what the oracle provides.
    pub fn derivatives(&self, x: T, order: usize) -> Result<Vec<T>> {
        let mut out = vec![T::zero(); order + 1];
        if order == 0 {
            out[0] = self.call(x);
            return Ok(out);
        }

        self.require(order)?;
        if let Some((_, oracle)) = &self.derivatives {
            oracle(x, &mut out);
        }
        Ok(out)
    }

    /// Evaluates the `n`-th derivative at `x`
    ///
    /// # Errors
    /// Returns [`Error::MissingDerivative`] if `n` exceeds what the oracle provides.
    pub fn nth_derivative(&self, x: T, n: usize) -> Result<T> {
        let all = self.derivatives(x, n)?;
        Ok(all[n])
    }
}

impl<T: Value> std::fmt::Debug for FunctionContainer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionContainer")
            .field("max_derivative", &self.max_derivative())
            .finish_non_exhaustive()
    }
}
