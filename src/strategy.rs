//! Fitting strategies: how each subinterval's polynomial is computed.
//!
//! All strategies share one shape. They lay out a [`Grid`], fit every entry independently
//! (in parallel with the `parallel` feature), and append whatever sentinel entries make
//! `evaluate(table_max_arg)` land on stored data.
//!
//! | Strategy | Samples | Entries |
//! |---|---|---|
//! | equally spaced | `f` at `N` equally spaced points | `n + 1` |
//! | Chebyshev | `f` at `N` Chebyshev points (2nd kind) | `n + 1` |
//! | Taylor | `f..f^(N-1)` at the midpoint | `n + 1` |
//! | cubic Hermite | `f, f'` at both ends | `n + 1` |
//! | linear raw | `f` at the grid points | `n + 2` |
//! | Padé `[m/k]` | `f..f^(m+k)` at the grid points | `n + 1` |
//!
//! On nonuniform grids every polynomial is rewritten in terms of `x` itself, so the
//! evaluator never has to rescale.
mod hermite;
mod interpolation;
mod linear_raw;
mod pade;
mod taylor;

use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::registry::{Strategy, TableKind};
use crate::table::{Grid, GridKind, LookupTableParameters, Table};
use crate::value::Value;

use interpolation::Nodes;

/// Fits a table of `kind` with `N` coefficients per entry
pub(crate) fn build<T: Value, const N: usize>(
    kind: TableKind,
    func: &FunctionContainer<T>,
    params: &LookupTableParameters<T>,
) -> Result<Table<T, N>> {
    kind.validate()?;
    if kind.coefficients() != N {
        return Err(Error::UnsupportedOrder(N));
    }
    func.require(kind.strategy.required_derivative())?;

    let grid = Grid::new(params, kind.grid, func)?;
    let entries = match kind.strategy {
        Strategy::EqSpace { .. } => interpolation::fit(func, &grid, Nodes::Equal)?,
        Strategy::Chebyshev { .. } => interpolation::fit(func, &grid, Nodes::Chebyshev)?,
        Strategy::Taylor { .. } => taylor::fit(func, &grid)?,
        Strategy::CubicHermite => hermite::fit(func, &grid)?,
        Strategy::LinearRaw => linear_raw::fit(func, &grid)?,
        Strategy::Pade { m, n } => pade::fit(func, &grid, m, n)?,
    };

    log::debug!(
        "built {kind}: {} subintervals, {} entries, table max {:e}",
        grid.num_intervals(),
        entries.len(),
        grid.table_max_arg()
    );
    Ok(Table::from_entries(kind, grid, kind.strategy.evaluator(), entries))
}

/// Runs `fit` for every index in `0..count`
fn fill<T, const N: usize, F>(count: usize, fit: F) -> Result<Vec<Polynomial<T, N>>>
where
    T: Value,
    F: Fn(usize) -> Result<Polynomial<T, N>> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..count).into_par_iter().map(fit).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(fit).collect()
    }
}

/// Left edge and width of subinterval `i`
fn cell<T: Value>(grid: &Grid<T>, i: usize) -> (T, T) {
    let (lo, hi) = grid.bounds_of_subinterval(i);
    (lo, hi - lo)
}

/// Rewrites a polynomial in `t ∈ [0, 1]` over `[x, x + h]` in terms of `x` on nonuniform grids
fn to_grid_space<T: Value, const N: usize>(
    p: Polynomial<T, N>,
    x: T,
    h: T,
    grid: &Grid<T>,
) -> Polynomial<T, N> {
    match grid.kind() {
        GridKind::Uniform => p,
        GridKind::NonUniform => p.compose_affine(T::one() / h, -x / h),
    }
}

/// Appends the entry hit by `table_max_arg`.
///
/// Nonuniform polynomials are already in `x` and stay valid past their right edge, so they
/// are repeated; uniform grids use `uniform(last)`.
fn push_sentinel<T: Value, const N: usize>(
    grid: &Grid<T>,
    entries: &mut Vec<Polynomial<T, N>>,
    uniform: impl FnOnce(&Polynomial<T, N>) -> Polynomial<T, N>,
) {
    if let Some(last) = entries.last().copied() {
        let sentinel = match grid.kind() {
            GridKind::Uniform => uniform(&last),
            GridKind::NonUniform => last,
        };
        entries.push(sentinel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_table_matches;
    use crate::table::LookupTable;

    pub(super) fn exp() -> FunctionContainer<f64> {
        FunctionContainer::new(f64::exp)
            .with_derivatives(7, |x, out: &mut [f64]| out.fill(x.exp()))
            .unwrap()
    }

    #[test]
    fn test_order_mismatch() {
        let kind = TableKind::uniform(Strategy::Taylor { degree: 3 });
        let params = LookupTableParameters::new(0.0, 1.0, 0.1);
        assert!(matches!(
            build::<f64, 3>(kind, &exp(), &params),
            Err(Error::UnsupportedOrder(3))
        ));
    }

    #[test]
    fn test_missing_derivatives_reported_up_front() {
        let func = FunctionContainer::new(f64::exp);
        let params = LookupTableParameters::new(0.0, 1.0, 0.1);
        for kind in [
            TableKind::uniform(Strategy::Taylor { degree: 2 }),
            TableKind::uniform(Strategy::CubicHermite),
            TableKind::uniform(Strategy::Pade { m: 1, n: 1 }),
            TableKind::nonuniform(Strategy::EqSpace { degree: 2 }),
        ] {
            let result = crate::TableRegistry::standard().create(kind, &func, params);
            assert!(matches!(result, Err(Error::MissingDerivative { .. })), "{kind}");
        }
    }

    #[test]
    fn test_uniform_only_strategies() {
        let params = LookupTableParameters::new(0.0, 1.0, 0.1);
        let kind = TableKind::nonuniform(Strategy::LinearRaw);
        assert!(matches!(build::<f64, 1>(kind, &exp(), &params), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_accuracy_every_strategy() {
        let func = exp();
        let params = LookupTableParameters::new(-1.0, 1.0, 0.05);
        let registry = crate::TableRegistry::standard();
        for (name, tol) in [
            ("UniformEqSpaceInterpTable<3>", 5e-8),
            ("NonUniformEqSpaceInterpTable<3>", 1e-6),
            ("UniformChebyInterpTable<3>", 5e-8),
            ("NonUniformChebyInterpTable<3>", 1e-6),
            ("UniformTaylorTable<4>", 1e-9),
            ("NonUniformTaylorTable<4>", 5e-8),
            ("UniformCubicHermiteTable", 1e-7),
            ("NonUniformCubicHermiteTable", 2e-6),
            ("UniformLinearRawInterpTable", 1e-3),
            ("UniformPadeTable<2,2>", 1e-10),
        ] {
            let kind = registry.lookup(name).unwrap();
            let table = registry.create(kind, &func, params).unwrap();
            assert_eq!(table.name(), name);
            assert_table_matches!(table, f64::exp, tol);
        }
    }
}
