//! Piecewise polynomial tables and the interface every table exposes.
//!
//! A table splits its domain into subintervals and stores one [`Polynomial`] per
//! subinterval. Evaluation is a hash ([`Grid::hash`]) followed by one Horner pass, and
//! never calls the approximated function.
//!
//! - [`Table`] is the single concrete table type, generic over the number of coefficients.
//! - [`LookupTable`] is the object-safe interface the generator, the estimator and
//!   [`crate::FailureProofTable`] work with, so tables of different orders can share a `Vec`.
//! - [`TableRecord`] is the JSON form.
use crate::error::{Error, Result};
use crate::polynomial::Polynomial;
use crate::registry::TableKind;
use crate::value::Value;

mod grid;
mod record;

pub use grid::{Grid, GridKind, MAX_INTERVALS};
pub use record::{EntryRecord, TableRecord, RECORD_COMMENT};

/// The domain and spacing a table is built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupTableParameters<T: Value> {
    /// Lower bound of the domain
    pub min_arg: T,

    /// Upper bound of the domain
    pub max_arg: T,

    /// Grid spacing (in parameter space for nonuniform grids)
    pub step_size: T,
}

impl<T: Value> LookupTableParameters<T> {
    /// Creates a new set of table parameters
    pub fn new(min_arg: T, max_arg: T, step_size: T) -> Self {
        Self {
            min_arg,
            max_arg,
            step_size,
        }
    }

    /// Width of the domain
    pub fn span(&self) -> T {
        self.max_arg - self.min_arg
    }

    /// Checks that the domain is nonempty and the step is positive and finite
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] describing the offending value.
    pub fn validate(&self) -> Result<()> {
        let finite = |v: T| num_traits::float::FloatCore::is_finite(v);
        if !finite(self.min_arg) || !finite(self.max_arg) || self.min_arg >= self.max_arg {
            return Err(Error::invalid(format!(
                "domain [{:e}, {:e}] is empty or not finite",
                self.min_arg, self.max_arg
            )));
        }

        if !finite(self.step_size) || self.step_size <= T::zero() {
            return Err(Error::invalid(format!(
                "step size must be positive and finite, got {:e}",
                self.step_size
            )));
        }

        Ok(())
    }
}

/// How a table turns its entries into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Evaluator {
    /// One polynomial per subinterval
    Horner,

    /// Linear interpolation between two stored samples
    LinearRaw,

    /// `P(dx) / (1 + dx Q(dx))` centred on the nearest grid point, `P` of degree `numerator`
    Pade { numerator: usize },
}

/// Interface shared by every lookup table.
///
/// Object safe: use `Box<dyn LookupTable<T>>` to mix table kinds and orders.
pub trait LookupTable<T: Value>: Send + Sync + std::fmt::Debug {
    /// Approximates `f(x)`.
    ///
    /// Valid for `x ∈ [min_arg, table_max_arg]`. Arguments outside that range are not
    /// checked. Slightly below `min_arg` the first polynomial is extrapolated.
    ///
    /// # Panics
    /// Panics if `x` is far enough above `table_max_arg` that its subinterval index is
    /// past the last entry. Wrap the table in a [`crate::FailureProofTable`] to guard it.
    fn evaluate(&self, x: T) -> T;

    /// Kind of table
    fn kind(&self) -> TableKind;

    /// Canonical name of the kind, e.g. `UniformTaylorTable<3>`
    fn name(&self) -> &str;

    /// Grid geometry
    fn grid(&self) -> &Grid<T>;

    /// Reported order (coefficients per entry; 2 for linear raw tables)
    fn order(&self) -> usize;

    /// Number of stored entries, sentinels included
    fn num_table_entries(&self) -> usize;

    /// Bytes of coefficient storage
    fn data_size(&self) -> usize;

    /// Persisted form of the table
    ///
    /// # Errors
    /// Returns [`Error::CastFailed`] if a value cannot be widened to `f64`.
    fn record(&self) -> Result<TableRecord>;

    /// Requested lower bound
    fn min_arg(&self) -> T {
        self.grid().min_arg()
    }

    /// Requested upper bound
    fn max_arg(&self) -> T {
        self.grid().max_arg()
    }

    /// Grid spacing in parameter space
    fn step_size(&self) -> T {
        self.grid().step_size()
    }

    /// Right edge of the last subinterval
    fn table_max_arg(&self) -> T {
        self.grid().table_max_arg()
    }

    /// Number of subintervals
    fn num_intervals(&self) -> usize {
        self.grid().num_intervals()
    }

    /// Physical bounds of subinterval `i`
    fn bounds_of_subinterval(&self, i: usize) -> (T, T) {
        self.grid().bounds_of_subinterval(i)
    }

    /// Writes the table to a JSON file
    ///
    /// # Errors
    /// Returns an error if the record cannot be built or written.
    fn save(&self, path: &std::path::Path) -> Result<()> {
        self.record()?.save(path)
    }
}

/// A piecewise polynomial table with `N` coefficients per entry.
///
/// Built by [`crate::TableRegistry::create`] (or [`Table::build`] when `N` is known
/// statically) and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Table<T: Value, const N: usize> {
    kind: TableKind,
    name: String,
    grid: Grid<T>,
    evaluator: Evaluator,
    entries: Vec<Polynomial<T, N>>,
}

impl<T: Value, const N: usize> Table<T, N> {
    pub(crate) fn from_entries(
        kind: TableKind,
        grid: Grid<T>,
        evaluator: Evaluator,
        entries: Vec<Polynomial<T, N>>,
    ) -> Self {
        Self {
            kind,
            name: kind.to_string(),
            grid,
            evaluator,
            entries,
        }
    }

    /// Fits a table of the given kind.
    ///
    /// # Errors
    /// - [`Error::UnsupportedOrder`] if `kind` needs a different number of coefficients than `N`.
    /// - Any error from the fitting strategy (bad parameters, missing derivatives, ...).
    pub fn build(
        kind: TableKind,
        func: &crate::function::FunctionContainer<T>,
        params: LookupTableParameters<T>,
    ) -> Result<Self> {
        crate::strategy::build(kind, func, &params)
    }

    /// Rebuilds a table from its persisted form
    ///
    /// # Errors
    /// Returns an error if the record's layout does not match `kind` and `N`.
    pub fn from_record(kind: TableKind, record: &TableRecord) -> Result<Self> {
        if kind.coefficients() != N {
            return Err(Error::UnsupportedOrder(N));
        }

        let grid = Grid::from_record(kind.grid, record)?;
        let expected = kind.num_table_entries(grid.num_intervals());
        if record.num_table_entries != expected || record.table.len() != expected {
            return Err(Error::invalid(format!(
                "`{}` with {} subintervals needs {expected} entries, the record has {}",
                record.name,
                grid.num_intervals(),
                record.table.len()
            )));
        }

        let entries = (0..expected)
            .map(|i| {
                let coefs = record
                    .entry(i)
                    .filter(|c| c.len() <= N)
                    .ok_or_else(|| Error::invalid(format!("table entry {i} is missing or malformed")))?;
                let coefs = coefs.into_iter().map(T::try_cast).collect::<Result<Vec<T>>>()?;
                Ok(Polynomial::from_slice(&coefs))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_entries(kind, grid, kind.strategy.evaluator(), entries))
    }

    /// The stored polynomials, one per entry
    pub fn entries(&self) -> &[Polynomial<T, N>] {
        &self.entries
    }
}

/// Horner over a coefficient slice, lowest order first
#[inline]
fn horner<T: Value>(coefs: &[T], x: T) -> T {
    coefs.iter().rev().fold(T::zero(), |acc, &c| acc * x + c)
}

impl<T: Value, const N: usize> LookupTable<T> for Table<T, N> {
    #[inline]
    fn evaluate(&self, x: T) -> T {
        match self.evaluator {
            Evaluator::Horner => {
                let (i, t) = self.grid.hash(x);
                self.entries[i].eval(t)
            }

            Evaluator::LinearRaw => {
                let (i, t) = self.grid.hash(x);
                let y0 = self.entries[i][0];
                let y1 = self.entries[i + 1][0];
                y0 + t * (y1 - y0)
            }

            Evaluator::Pade { numerator } => {
                let step = self.grid.step_size();
                let dx = x - self.grid.min_arg();
                let nearest = num_traits::float::FloatCore::floor(dx / step + T::half());
                let dx = dx - nearest * step;

                let coefs = self.entries[nearest.as_usize().unwrap_or(0)].as_ref();
                let (p, q) = coefs.split_at(numerator + 1);
                horner(p, dx) / (T::one() + dx * horner(q, dx))
            }
        }
    }

    fn kind(&self) -> TableKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    fn order(&self) -> usize {
        self.kind.order()
    }

    fn num_table_entries(&self) -> usize {
        self.entries.len()
    }

    fn data_size(&self) -> usize {
        self.entries.len() * N * std::mem::size_of::<T>()
    }

    fn record(&self) -> Result<TableRecord> {
        let widen = |v: T| -> Result<f64> { num_traits::cast(v).ok_or(Error::CastFailed) };

        let mut table = std::collections::BTreeMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let coefs = entry
                .as_ref()
                .iter()
                .enumerate()
                .map(|(j, &c)| Ok((j.to_string(), widen(c)?)))
                .collect::<Result<_>>()?;
            table.insert(i.to_string(), EntryRecord { coefs });
        }

        let mut transfer_function_coefs = [0.0; 4];
        for (dst, &src) in transfer_function_coefs
            .iter_mut()
            .zip(self.grid.transfer().coefficients())
        {
            *dst = widen(src)?;
        }

        Ok(TableRecord {
            comment: RECORD_COMMENT.to_string(),
            name: self.name.clone(),
            min_arg: widen(self.grid.min_arg())?,
            max_arg: widen(self.grid.max_arg())?,
            step_size: widen(self.grid.step_size())?,
            order: self.order(),
            data_size: self.data_size(),
            num_intervals: self.grid.num_intervals(),
            num_table_entries: self.entries.len(),
            table_max_arg: widen(self.grid.table_max_arg())?,
            transfer_function_coefs,
            table,
        })
    }
}
