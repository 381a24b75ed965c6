//! Worst-case error of a table against the function it approximates.
//!
//! The error metric at `x` is
//!
//! ```text
//! -|f(x) - L(x)| / (1 + relTol |f(x)|)
//! ```
//!
//! negated so the worst point is a *minimum*, found per subinterval with
//! [`crate::solvers::minimize_brent`]. All error arithmetic happens in a separate type `E`
//! (default `f64`), which should be at least as wide as the table's type. An `f32` table is
//! checked in `f64` and the difference between `f` and the table does not drown in the
//! table's own rounding.
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::solvers::{minimize_brent, ScalarOptions};
use crate::table::LookupTable;
use crate::value::Value;

/// Iteration cap for the per-subinterval search
const CELL_MAX_ITER: usize = 20;

/// Where a table is furthest from its function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstCase<E: Value> {
    /// Normalized error, `|f - L| / (1 + relTol |f|)`; infinite if the table is not finite there
    pub error: E,

    /// Argument at which it occurs
    pub argument: E,

    /// Index of the subinterval containing `argument`
    pub subinterval: usize,
}

/// Computes the worst-case error of lookup tables.
///
/// # Example
/// ```rust
/// # use polylut::{ErrorEstimator, FunctionContainer, LookupTableParameters, TableRegistry};
/// let registry = TableRegistry::standard();
/// let func = FunctionContainer::new(|x: f64| x * x);
/// let kind = "UniformEqSpaceInterpTable<1>".parse().unwrap();
/// let table = registry.create(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.25)).unwrap();
///
/// // Linear interpolation of x^2 is off by h^2/4 in the middle of each subinterval
/// let error = ErrorEstimator::<f64>::new(0.0).worst_case_error(table.as_ref(), &func).unwrap();
/// assert!((error - 0.015625).abs() < 1e-9);
/// ```
#[derive(Clone)]
pub struct ErrorEstimator<E: Value = f64> {
    rel_tol: E,
    reference: Option<Arc<dyn Fn(E) -> E + Send + Sync>>,
    options: ScalarOptions<E>,
}

impl<E: Value> ErrorEstimator<E> {
    /// An estimator using `rel_tol` to weight the error where `|f|` is large
    pub fn new(rel_tol: E) -> Self {
        let bits = E::mantissa_digits() / 2;
        Self {
            rel_tol,
            reference: None,
            options: ScalarOptions::with_bits(CELL_MAX_ITER, bits),
        }
    }

    /// Replaces the relative weight
    #[must_use]
    pub fn with_rel_tol(mut self, rel_tol: E) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    /// Compares against `reference`, evaluated in `E`, instead of widening `f(x)` from the table's type
    #[must_use]
    pub fn with_reference(mut self, reference: impl Fn(E) -> E + Send + Sync + 'static) -> Self {
        self.reference = Some(Arc::new(reference));
        self
    }

    /// Replaces the per-subinterval minimizer options
    #[must_use]
    pub fn with_options(mut self, options: ScalarOptions<E>) -> Self {
        self.options = options;
        self
    }

    /// The relative weight
    pub fn rel_tol(&self) -> E {
        self.rel_tol
    }

    /// Locates the worst error of `table` over `[min_arg, max_arg]`.
    ///
    /// # Errors
    /// Returns [`Error::CastFailed`] if the table's bounds do not fit `E`.
    pub fn worst_case<T, L>(&self, table: &L, func: &FunctionContainer<T>) -> Result<WorstCase<E>>
    where
        T: Value,
        L: LookupTable<T> + ?Sized,
    {
        let cells = 0..table.num_intervals();

        #[cfg(feature = "parallel")]
        let worst = {
            use rayon::prelude::*;
            cells
                .into_par_iter()
                .map(|i| self.cell(table, func, i))
                .try_reduce(|| None, |a, b| Ok(worse(a, b)))?
        };

        #[cfg(not(feature = "parallel"))]
        let worst = cells
            .map(|i| self.cell(table, func, i))
            .try_fold(None, |a, b| b.map(|b| worse(a, b)))?;

        let worst = worst.ok_or_else(|| Error::invalid(format!("{} has no subintervals", table.name())))?;
        log::trace!(
            "{}: worst error {:e} at x = {:e} (subinterval {})",
            table.name(),
            worst.error,
            worst.argument,
            worst.subinterval
        );
        Ok(worst)
    }

    /// Just the error of [`ErrorEstimator::worst_case`]
    ///
    /// # Errors
    /// Returns [`Error::CastFailed`] if the table's bounds do not fit `E`.
    pub fn worst_case_error<T, L>(&self, table: &L, func: &FunctionContainer<T>) -> Result<E>
    where
        T: Value,
        L: LookupTable<T> + ?Sized,
    {
        Ok(self.worst_case(table, func)?.error)
    }

    /// Worst error inside subinterval `i`, or `None` if it lies entirely above `max_arg`
    fn cell<T, L>(&self, table: &L, func: &FunctionContainer<T>, i: usize) -> Result<Option<WorstCase<E>>>
    where
        T: Value,
        L: LookupTable<T> + ?Sized,
    {
        let max = table.max_arg();
        let (lo, hi) = table.bounds_of_subinterval(i);
        if lo >= max {
            return Ok(None);
        }
        let hi = num_traits::float::FloatCore::min(hi, max);

        // Stay off the breakpoints shared with the neighbours
        let (a, b) = (lo.next_up(), hi.next_down());
        let (a, b) = if a < b { (a, b) } else { (lo, hi) };
        let (a, b) = (E::try_cast(a)?, E::try_cast(b)?);

        let metric = |x: E| self.metric(table, func, x);
        let found = minimize_brent(metric, a, b, self.options);

        let mut worst = (found.x, found.f_min);
        for x in [a, b, (a + b) / E::two()] {
            let value = metric(x);
            if value < worst.1 {
                worst = (x, value);
            }
        }

        Ok(Some(WorstCase {
            error: -worst.1,
            argument: worst.0,
            subinterval: i,
        }))
    }

    fn metric<T, L>(&self, table: &L, func: &FunctionContainer<T>, x: E) -> E
    where
        T: Value,
        L: LookupTable<T> + ?Sized,
    {
        let Some(x_table) = num_traits::cast::<E, T>(x) else {
            return E::neg_infinity();
        };

        // Compare at the argument the table actually sees
        let x = num_traits::cast::<T, E>(x_table).unwrap_or(x);
        let exact = match &self.reference {
            Some(reference) => reference(x),
            None => num_traits::cast(func.call(x_table)).unwrap_or_else(E::nan),
        };
        let approx: E = num_traits::cast(table.evaluate(x_table)).unwrap_or_else(E::nan);

        let value = -Value::abs(exact - approx) / (E::one() + self.rel_tol * Value::abs(exact));
        if value.is_nan() {
            E::neg_infinity()
        } else {
            value
        }
    }
}

/// The larger of two per-cell results
fn worse<E: Value>(a: Option<WorstCase<E>>, b: Option<WorstCase<E>>) -> Option<WorstCase<E>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.error > a.error { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

impl<E: Value> std::fmt::Debug for ErrorEstimator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorEstimator")
            .field("rel_tol", &self.rel_tol)
            .field("reference", &self.reference.is_some())
            .field("options", &self.options)
            .finish()
    }
}
