//! Table kinds, their canonical names, and construction by kind.
//!
//! Every table kind is a [`Strategy`] (how coefficients are fitted) on a [`GridKind`]
//! (how subintervals are laid out). A [`TableRegistry`] lists the kinds a program is
//! willing to build and dispatches to the right `Table<T, N>`:
//!
//! ```rust
//! use polylut::{FunctionContainer, LookupTable, LookupTableParameters, TableRegistry};
//!
//! let registry = TableRegistry::standard();
//! let kind = registry.lookup("UniformChebyInterpTable<4>").unwrap();
//!
//! let func = FunctionContainer::new(f64::exp);
//! let table = registry.create(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.1)).unwrap();
//! assert_eq!(table.name(), "UniformChebyInterpTable<4>");
//! assert!((table.evaluate(0.5) - 0.5f64.exp()).abs() < 1e-10);
//! ```
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::function::{FunctionContainer, MAX_DERIVATIVE_ORDER};
use crate::table::{Evaluator, GridKind, LookupTable, LookupTableParameters, Table, TableRecord};
use crate::value::Value;

/// Highest polynomial degree of any table
pub const MAX_DEGREE: usize = 7;

/// How a table's coefficients are fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Interpolation at equally spaced points, both ends included
    EqSpace {
        /// Polynomial degree
        degree: usize,
    },

    /// Interpolation at Chebyshev points of the second kind
    Chebyshev {
        /// Polynomial degree
        degree: usize,
    },

    /// Truncated Taylor series about each subinterval's midpoint
    Taylor {
        /// Polynomial degree
        degree: usize,
    },

    /// Cubic matching `f` and `f'` at both ends of each subinterval
    CubicHermite,

    /// Only `f` at the grid points; evaluated by linear interpolation
    LinearRaw,

    /// Rational `[m/n]` Padé approximant about each grid point
    Pade {
        /// Numerator degree
        m: usize,

        /// Denominator degree
        n: usize,
    },
}

impl Strategy {
    /// Coefficients stored per entry
    pub fn coefficients(&self) -> usize {
        match *self {
            Self::EqSpace { degree } | Self::Chebyshev { degree } | Self::Taylor { degree } => degree + 1,
            Self::CubicHermite => 4,
            Self::LinearRaw => 1,
            Self::Pade { m, n } => m + n + 1,
        }
    }

    /// Order reported by tables of this strategy
    pub fn order(&self) -> usize {
        match self {
            Self::LinearRaw => 2,
            other => other.coefficients(),
        }
    }

    /// Highest derivative of `f` the fit needs
    pub fn required_derivative(&self) -> usize {
        match *self {
            Self::EqSpace { .. } | Self::Chebyshev { .. } | Self::LinearRaw => 0,
            Self::Taylor { degree } => degree,
            Self::CubicHermite => 1,
            Self::Pade { m, n } => m + n,
        }
    }

    /// True if the strategy can be used on nonuniform grids
    pub fn supports(&self, grid: GridKind) -> bool {
        grid == GridKind::Uniform || !matches!(self, Self::LinearRaw | Self::Pade { .. })
    }

    pub(crate) fn evaluator(&self) -> Evaluator {
        match *self {
            Self::LinearRaw => Evaluator::LinearRaw,
            Self::Pade { m, .. } => Evaluator::Pade { numerator: m },
            _ => Evaluator::Horner,
        }
    }

    /// Checks degrees against what tables can store
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedOrder`] or [`Error::InvalidArgument`] for out-of-range degrees.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::EqSpace { degree } | Self::Chebyshev { degree } | Self::Taylor { degree }
                if degree > MAX_DEGREE =>
            {
                Err(Error::UnsupportedOrder(degree + 1))
            }

            Self::Pade { m, n } if n == 0 || n > m || m + n > MAX_DERIVATIVE_ORDER => Err(Error::invalid(
                format!("Padé [{m}/{n}] needs 1 <= n <= m and m + n <= {MAX_DERIVATIVE_ORDER}"),
            )),

            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EqSpace { degree } => write!(f, "EqSpaceInterpTable<{degree}>"),
            Self::Chebyshev { degree } => write!(f, "ChebyInterpTable<{degree}>"),
            Self::Taylor { degree } => write!(f, "TaylorTable<{degree}>"),
            Self::CubicHermite => write!(f, "CubicHermiteTable"),
            Self::LinearRaw => write!(f, "LinearRawInterpTable"),
            Self::Pade { m, n } => write!(f, "PadeTable<{m},{n}>"),
        }
    }
}

/// A fitting strategy on a grid layout; the unit tables are requested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKind {
    /// How coefficients are fitted
    pub strategy: Strategy,

    /// How subintervals are laid out
    pub grid: GridKind,
}

impl TableKind {
    /// Combines a strategy and a grid layout
    pub fn new(strategy: Strategy, grid: GridKind) -> Self {
        Self { strategy, grid }
    }

    /// `strategy` on a uniform grid
    pub fn uniform(strategy: Strategy) -> Self {
        Self::new(strategy, GridKind::Uniform)
    }

    /// `strategy` on a nonuniform grid
    pub fn nonuniform(strategy: Strategy) -> Self {
        Self::new(strategy, GridKind::NonUniform)
    }

    /// Coefficients stored per entry
    pub fn coefficients(&self) -> usize {
        self.strategy.coefficients()
    }

    /// Reported order
    pub fn order(&self) -> usize {
        self.strategy.order()
    }

    /// Entries a table of this kind stores for `num_intervals` subintervals
    pub fn num_table_entries(&self, num_intervals: usize) -> usize {
        match self.strategy {
            Strategy::LinearRaw => num_intervals + 2,
            _ => num_intervals + 1,
        }
    }

    /// Checks the strategy and its compatibility with the grid
    ///
    /// # Errors
    /// Returns an error for bad degrees or a strategy that cannot use this grid.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        if !self.strategy.supports(self.grid) {
            return Err(Error::invalid(format!(
                "{} tables only support uniform grids",
                self.strategy
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.grid, self.strategy)
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let unknown = || Error::UnknownTable(name.to_string());

        let trimmed = name.trim();
        let (grid, rest) = if let Some(rest) = trimmed.strip_prefix("NonUniform") {
            (GridKind::NonUniform, rest)
        } else if let Some(rest) = trimmed.strip_prefix("Uniform") {
            (GridKind::Uniform, rest)
        } else {
            return Err(unknown());
        };

        let (base, args) = match rest.split_once('<') {
            Some((base, args)) => (base, Some(args.strip_suffix('>').ok_or_else(unknown)?)),
            None => (rest, None),
        };
        let numbers = args
            .map(|args| {
                args.split(',')
                    .map(|a| a.trim().parse::<usize>().map_err(|_| unknown()))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let strategy = match (base, numbers.as_slice()) {
            ("EqSpaceInterpTable", &[degree]) => Strategy::EqSpace { degree },
            ("ChebyInterpTable", &[degree]) => Strategy::Chebyshev { degree },
            ("TaylorTable", &[degree]) => Strategy::Taylor { degree },
            ("CubicHermiteTable", &[]) => Strategy::CubicHermite,
            ("LinearRawInterpTable", &[]) => Strategy::LinearRaw,
            ("PadeTable", &[m, n]) => Strategy::Pade { m, n },
            _ => return Err(unknown()),
        };

        Ok(Self::new(strategy, grid))
    }
}

/// Calls `$body` with `$n` bound to the runtime coefficient count as a const generic
macro_rules! with_coefficients {
    ($count:expr, $n:ident => $body:expr) => {
        match $count {
            1 => { const $n: usize = 1; $body }
            2 => { const $n: usize = 2; $body }
            3 => { const $n: usize = 3; $body }
            4 => { const $n: usize = 4; $body }
            5 => { const $n: usize = 5; $body }
            6 => { const $n: usize = 6; $body }
            7 => { const $n: usize = 7; $body }
            8 => { const $n: usize = 8; $body }
            other => Err(Error::UnsupportedOrder(other)),
        }
    };
}

/// The set of table kinds a program builds, and construction by kind.
///
/// There is no global registry; build one with [`TableRegistry::standard`] (every valid kind)
/// or start from [`TableRegistry::empty`] and add kinds with [`TableRegistry::with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRegistry {
    kinds: Vec<TableKind>,
}

impl TableRegistry {
    /// A registry that accepts nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every valid kind:
    /// - equally spaced, Chebyshev and Taylor tables of degree 0 to 7 on both grids
    /// - cubic Hermite tables on both grids
    /// - linear raw tables and every valid `[m/n]` Padé table on uniform grids
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for grid in [GridKind::Uniform, GridKind::NonUniform] {
            for degree in 0..=MAX_DEGREE {
                registry = registry
                    .with(TableKind::new(Strategy::EqSpace { degree }, grid))
                    .with(TableKind::new(Strategy::Chebyshev { degree }, grid))
                    .with(TableKind::new(Strategy::Taylor { degree }, grid));
            }
            registry = registry.with(TableKind::new(Strategy::CubicHermite, grid));
        }

        registry = registry.with(TableKind::uniform(Strategy::LinearRaw));
        for m in 1..MAX_DERIVATIVE_ORDER {
            for n in 1..=m.min(MAX_DERIVATIVE_ORDER - m) {
                registry = registry.with(TableKind::uniform(Strategy::Pade { m, n }));
            }
        }
        registry
    }

    /// Adds a kind; invalid or duplicate kinds are ignored
    #[must_use]
    pub fn with(mut self, kind: TableKind) -> Self {
        if kind.validate().is_ok() && !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Registered kinds, in registration order
    pub fn kinds(&self) -> &[TableKind] {
        &self.kinds
    }

    /// True if `kind` is registered
    pub fn contains(&self, kind: TableKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Parses a table name and checks that it is registered
    ///
    /// # Errors
    /// Returns [`Error::UnknownTable`] for a malformed or unregistered name.
    pub fn lookup(&self, name: &str) -> Result<TableKind> {
        let kind: TableKind = name.parse()?;
        if self.contains(kind) {
            Ok(kind)
        } else {
            Err(Error::UnknownTable(name.to_string()))
        }
    }

    pub(crate) fn check(&self, kind: TableKind) -> Result<()> {
        kind.validate()?;
        if !self.contains(kind) {
            return Err(Error::UnknownTable(kind.to_string()));
        }
        Ok(())
    }

    /// Fits a table of the given kind.
    ///
    /// # Errors
    /// - [`Error::UnknownTable`] if `kind` is not registered.
    /// - Any construction error of the table itself.
    pub fn create<T: Value>(
        &self,
        kind: TableKind,
        func: &FunctionContainer<T>,
        params: LookupTableParameters<T>,
    ) -> Result<Box<dyn LookupTable<T>>> {
        self.check(kind)?;
        log::trace!("building {kind} on [{:e}, {:e}] with step {:e}", params.min_arg, params.max_arg, params.step_size);
        with_coefficients!(kind.coefficients(), N => {
            Table::<T, N>::build(kind, func, params).map(|t| Box::new(t) as Box<dyn LookupTable<T>>)
        })
    }

    /// Rebuilds a table from its persisted form; the kind comes from the record's name
    ///
    /// # Errors
    /// - [`Error::UnknownTable`] if the recorded name is not registered.
    /// - [`Error::InvalidArgument`] if the record's layout is inconsistent.
    pub fn load<T: Value>(&self, record: &TableRecord) -> Result<Box<dyn LookupTable<T>>> {
        let kind = self.lookup(&record.name)?;
        with_coefficients!(kind.coefficients(), N => {
            Table::<T, N>::from_record(kind, record).map(|t| Box::new(t) as Box<dyn LookupTable<T>>)
        })
    }
}
