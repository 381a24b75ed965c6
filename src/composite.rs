//! Several tables over adjacent subdomains, evaluated as one.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{self, AtomicUsize};

use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::generator::Generator;
use crate::registry::{TableKind, TableRegistry};
use crate::table::{Grid, LookupTable, LookupTableParameters, TableRecord};
use crate::value::Value;

/// Right edge of a subdomain, as a map key.
///
/// Edges are checked to be finite on construction, so the partial order is total here.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge<T>(T);

impl<T: Value> Eq for Edge<T> {}

impl<T: Value> PartialOrd for Edge<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Value> Ord for Edge<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Tables of one function built over adjacent subdomains.
///
/// Useful for piecewise functions, or for functions that need a fine grid only in places.
/// Each piece is its own table, with its own kind and step. An argument is routed to the piece
/// whose subdomain contains it: the most recently used piece is tried first, then the pieces
/// are searched by right edge in `O(log n)`. Arguments outside every piece, including gaps
/// between pieces, go to the function itself.
///
/// At a shared edge the piece on the left wins.
///
/// ```rust
/// # use polylut::{CompositeTable, FunctionContainer, LookupTable, TableRegistry};
/// let func = FunctionContainer::new(|x: f64| x.abs().sqrt());
/// let registry = TableRegistry::standard();
/// let table = CompositeTable::new(&registry, func, &[
///     ("UniformChebyInterpTable<3>".parse().unwrap(), 0.0, 0.1, 0.001),
///     ("UniformChebyInterpTable<3>".parse().unwrap(), 0.1, 4.0, 0.05),
/// ]).unwrap();
///
/// assert!((table.evaluate(2.0) - 2f64.sqrt()).abs() < 1e-6);
/// assert_eq!(table.evaluate(9.0), 3.0);
/// ```
#[derive(Debug)]
pub struct CompositeTable<T: Value> {
    tables: Vec<Box<dyn LookupTable<T>>>,
    by_right_edge: BTreeMap<Edge<T>, usize>,
    recent: AtomicUsize,
    func: FunctionContainer<T>,
}

impl<T: Value> CompositeTable<T> {
    /// Builds one table per `(kind, min, max, step)` piece.
    ///
    /// Each step is shrunk to `(max - min) / ceil((max - min) / step)` so the piece's grid
    /// ends exactly on `max`. Pieces may be given in any order and may leave gaps, but must
    /// not overlap.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if there are no pieces, a piece is invalid, or two pieces overlap.
    /// - Any error from building a piece, see [`TableRegistry::create`].
    pub fn new(registry: &TableRegistry, func: FunctionContainer<T>, pieces: &[(TableKind, T, T, T)]) -> Result<Self> {
        if pieces.is_empty() {
            return Err(Error::invalid("a composite table needs at least one piece"));
        }

        let mut pieces = pieces.to_vec();
        for &(_, min_arg, max_arg, step_size) in &pieces {
            LookupTableParameters::new(min_arg, max_arg, step_size).validate()?;
        }
        pieces.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        for pair in pieces.windows(2) {
            let ((_, lo_a, hi_a, _), (_, lo_b, hi_b, _)) = (pair[0], pair[1]);
            if lo_b < hi_a {
                return Err(Error::invalid(format!(
                    "pieces [{lo_a:e}, {hi_a:e}] and [{lo_b:e}, {hi_b:e}] overlap"
                )));
            }
        }

        let mut tables = Vec::with_capacity(pieces.len());
        let mut by_right_edge = BTreeMap::new();
        for (i, &(kind, min_arg, max_arg, step_size)) in pieces.iter().enumerate() {
            let width = max_arg - min_arg;
            let count = num_traits::float::FloatCore::ceil(width / step_size);
            let step_size = width / count;

            log::debug!("{kind}: piece {i} on [{min_arg:e}, {max_arg:e}] with step {step_size:e}");
            tables.push(registry.create(kind, &func, LookupTableParameters::new(min_arg, max_arg, step_size))?);
            by_right_edge.insert(Edge(max_arg), i);
        }

        Ok(Self {
            tables,
            by_right_edge,
            recent: AtomicUsize::new(0),
            func,
        })
    }

    /// Builds each `(kind, min, max, a_tol, r_tol)` piece with the coarsest step that meets
    /// its own tolerance, see [`Generator::by_tolerance`].
    ///
    /// # Errors
    /// - Any error from the step-size search of a piece.
    /// - The errors of [`CompositeTable::new`].
    pub fn from_tolerances<E: Value>(
        registry: &TableRegistry,
        func: FunctionContainer<T>,
        pieces: &[(TableKind, T, T, E, E)],
    ) -> Result<Self> {
        let steps = pieces
            .iter()
            .map(|&(kind, min_arg, max_arg, a_tol, r_tol)| {
                let generator: Generator<T, E> = Generator::new(registry.clone(), func.clone(), min_arg, max_arg);
                let table = generator.by_tolerance(kind, a_tol, r_tol)?;
                Ok((kind, min_arg, max_arg, table.step_size()))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(registry, func, &steps)
    }

    /// The pieces, ordered by subdomain
    pub fn tables(&self) -> impl Iterator<Item = &dyn LookupTable<T>> {
        self.tables.iter().map(AsRef::as_ref)
    }

    /// The piece whose subdomain contains `x`, if any
    pub fn table_at(&self, x: T) -> Option<&dyn LookupTable<T>> {
        self.find(x).map(|i| self.tables[i].as_ref())
    }

    fn covers(&self, i: usize, x: T) -> bool {
        let table = &self.tables[i];
        table.min_arg() <= x && x <= table.max_arg()
    }

    /// Like `covers`, without the left edge, which may belong to the previous piece
    fn covers_interior(&self, i: usize, x: T) -> bool {
        let table = &self.tables[i];
        table.min_arg() < x && x <= table.max_arg()
    }

    /// First piece whose right edge is at or past `x`, if `x` is inside it
    fn find(&self, x: T) -> Option<usize> {
        let (_, &i) = self.by_right_edge.range(Edge(x)..).next()?;
        self.covers(i, x).then_some(i)
    }

    fn first(&self) -> &dyn LookupTable<T> {
        self.tables[0].as_ref()
    }

    fn last(&self) -> &dyn LookupTable<T> {
        self.tables[self.tables.len() - 1].as_ref()
    }
}

impl<T: Value> LookupTable<T> for CompositeTable<T> {
    fn evaluate(&self, x: T) -> T {
        let recent = self.recent.load(atomic::Ordering::Relaxed);
        if self.covers_interior(recent, x) {
            return self.tables[recent].evaluate(x);
        }

        match self.find(x) {
            Some(i) => {
                self.recent.store(i, atomic::Ordering::Relaxed);
                self.tables[i].evaluate(x)
            }
            None => self.func.call(x),
        }
    }

    /// Kind of the first piece
    fn kind(&self) -> TableKind {
        self.first().kind()
    }

    fn name(&self) -> &str {
        "CompositeTable"
    }

    /// Grid of the first piece
    fn grid(&self) -> &Grid<T> {
        self.first().grid()
    }

    /// Lowest order among the pieces
    fn order(&self) -> usize {
        self.tables.iter().map(|t| t.order()).min().unwrap_or(0)
    }

    fn num_table_entries(&self) -> usize {
        self.tables.iter().map(|t| t.num_table_entries()).sum()
    }

    fn data_size(&self) -> usize {
        self.tables.iter().map(|t| t.data_size()).sum()
    }

    /// Composite tables are not persisted; save each piece instead
    fn record(&self) -> Result<TableRecord> {
        Err(Error::invalid(
            "a composite table has no single record, save its pieces individually",
        ))
    }

    fn min_arg(&self) -> T {
        self.first().min_arg()
    }

    fn max_arg(&self) -> T {
        self.last().max_arg()
    }

    /// Finest step among the pieces
    fn step_size(&self) -> T {
        self.tables
            .iter()
            .map(|t| t.step_size())
            .fold(<T as num_traits::float::FloatCore>::infinity(), num_traits::float::FloatCore::min)
    }

    fn table_max_arg(&self) -> T {
        self.last().table_max_arg()
    }

    fn num_intervals(&self) -> usize {
        self.tables.iter().map(|t| t.num_intervals()).sum()
    }

    /// Subintervals are numbered through the pieces in order
    fn bounds_of_subinterval(&self, mut i: usize) -> (T, T) {
        for table in &self.tables[..self.tables.len() - 1] {
            let n = table.num_intervals();
            if i < n {
                return table.bounds_of_subinterval(i);
            }
            i -= n;
        }
        self.last().bounds_of_subinterval(i)
    }
}
