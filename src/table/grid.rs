use num_traits::float::FloatCore;

use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::table::{LookupTableParameters, TableRecord};
use crate::transfer::TransferFunction;
use crate::value::Value;

/// Largest number of subintervals a single table may have
pub const MAX_INTERVALS: usize = 1 << 24;

/// Whether subintervals are equally wide in `x`, or equally wide in the transfer function's parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridKind {
    /// Equal widths; the hash is one subtraction and one multiply
    #[default]
    Uniform,

    /// Widths follow [`TransferFunction`]; the hash costs one extra cubic
    NonUniform,
}

impl GridKind {
    /// Name prefix used in table kind names
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Uniform => "Uniform",
            Self::NonUniform => "NonUniform",
        }
    }
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Geometry of a table's grid, and the hash from an argument to its subinterval.
///
/// The grid is always uniform in parameter space: `stepSize` apart, starting at `minArg`.
/// `numIntervals` is rounded up so that `tableMaxArg >= maxArg`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Value> {
    kind: GridKind,
    min_arg: T,
    max_arg: T,
    step_size: T,
    step_inv: T,
    num_intervals: usize,
    table_max_arg: T,
    transfer: TransferFunction<T>,
}

impl<T: Value> Grid<T> {
    /// Lays out a grid for `params`.
    ///
    /// Nonuniform grids build their [`TransferFunction`] here, which needs `f'`.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty domain, a bad step, or more than [`MAX_INTERVALS`] subintervals.
    /// - [`Error::MissingDerivative`] for a nonuniform grid without a first derivative.
    pub fn new(
        params: &LookupTableParameters<T>,
        kind: GridKind,
        func: &FunctionContainer<T>,
    ) -> Result<Self> {
        params.validate()?;
        let LookupTableParameters {
            min_arg,
            max_arg,
            step_size,
        } = *params;

        let step_inv = T::one() / step_size;
        let intervals = FloatCore::ceil(step_inv * (max_arg - min_arg));
        let mut num_intervals = intervals
            .as_usize()
            .filter(|&n| n <= MAX_INTERVALS)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "step size {step_size:e} needs {intervals:e} subintervals on [{min_arg:e}, {max_arg:e}], more than {MAX_INTERVALS}"
                ))
            })?
            .max(1);

        let mut table_max_arg = min_arg + step_size * T::from_positive_int(num_intervals);
        if table_max_arg < max_arg {
            num_intervals += 1;
            table_max_arg = min_arg + step_size * T::from_positive_int(num_intervals);
        }

        let transfer = match kind {
            GridKind::Uniform => TransferFunction::identity(min_arg, table_max_arg, step_size),
            GridKind::NonUniform => TransferFunction::new(func, min_arg, table_max_arg, step_size)?,
        };

        Ok(Self {
            kind,
            min_arg,
            max_arg,
            step_size,
            step_inv,
            num_intervals,
            table_max_arg,
            transfer,
        })
    }

    /// Rebuilds the grid recorded in a persisted table, without recomputing anything
    ///
    /// # Errors
    /// Returns [`Error::CastFailed`] if a recorded number does not fit `T`.
    pub fn from_record(kind: GridKind, record: &TableRecord) -> Result<Self> {
        let min_arg = T::try_cast(record.min_arg)?;
        let table_max_arg = T::try_cast(record.table_max_arg)?;
        let step_size = T::try_cast(record.step_size)?;
        if record.step_size <= 0.0 || record.num_intervals == 0 {
            return Err(Error::invalid(format!(
                "table record `{}` has step {:e} and {} subintervals",
                record.name, record.step_size, record.num_intervals
            )));
        }

        let mut coefs = [T::zero(); 4];
        for (dst, &src) in coefs.iter_mut().zip(&record.transfer_function_coefs) {
            *dst = T::try_cast(src)?;
        }

        Ok(Self {
            kind,
            min_arg,
            max_arg: T::try_cast(record.max_arg)?,
            step_size,
            step_inv: T::one() / step_size,
            num_intervals: record.num_intervals,
            table_max_arg,
            transfer: TransferFunction::from_coefs(coefs, min_arg, table_max_arg, step_size),
        })
    }

    /// Maps `x` to `(index, t)`.
    ///
    /// On a uniform grid `t ∈ [0, 1)` is the position inside the subinterval. On a nonuniform
    /// grid the stored polynomials are already in `x`, so `t = x`.
    ///
    /// Nothing is checked: for `x < min_arg` the index saturates to 0 and the first
    /// polynomial is extrapolated.
    #[inline]
    pub fn hash(&self, x: T) -> (usize, T) {
        match self.kind {
            GridKind::Uniform => {
                let u = (x - self.min_arg) * self.step_inv;
                let index = FloatCore::floor(u);
                match index.as_usize() {
                    Some(i) => (i, u - index),
                    None => (0, u),
                }
            }

            GridKind::NonUniform => {
                let index = FloatCore::floor(self.transfer.inverse(x));
                (index.as_usize().unwrap_or(0), x)
            }
        }
    }

    /// Physical bounds `[x_i, x_{i+1}]` of subinterval `i`
    pub fn bounds_of_subinterval(&self, i: usize) -> (T, T) {
        let lo = self.min_arg + self.step_size * T::from_positive_int(i);
        let hi = self.min_arg + self.step_size * T::from_positive_int(i + 1);
        match self.kind {
            GridKind::Uniform => (lo, hi),
            GridKind::NonUniform => (
                self.transfer.forward(lo),
                FloatCore::min(self.transfer.forward(hi), self.table_max_arg),
            ),
        }
    }

    /// Uniform or nonuniform
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Requested lower bound
    pub fn min_arg(&self) -> T {
        self.min_arg
    }

    /// Requested upper bound
    pub fn max_arg(&self) -> T {
        self.max_arg
    }

    /// Spacing in parameter space
    pub fn step_size(&self) -> T {
        self.step_size
    }

    /// Number of subintervals covering `[min_arg, table_max_arg]`
    pub fn num_intervals(&self) -> usize {
        self.num_intervals
    }

    /// Right edge of the last subinterval, never below `max_arg`
    pub fn table_max_arg(&self) -> T {
        self.table_max_arg
    }

    /// The grid's transfer function (the identity map for uniform grids)
    pub fn transfer(&self) -> &TransferFunction<T> {
        &self.transfer
    }
}
