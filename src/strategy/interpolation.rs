use nalgebra::{DMatrix, DVector};

use super::{cell, fill, push_sentinel, to_grid_space};
use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::table::Grid;
use crate::value::Value;

/// Where inside `[0, 1]` each subinterval is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Nodes {
    /// `k / (N - 1)`
    Equal,

    /// `(1 + cos(πk / (N - 1))) / 2`, the extrema of the Chebyshev polynomial plus both ends
    Chebyshev,
}

impl Nodes {
    /// The `count` sample positions in `[0, 1]`; a single node sits in the middle
    pub(super) fn points<T: Value>(self, count: usize) -> Vec<T> {
        if count == 1 {
            return vec![T::half()];
        }

        let last = T::from_positive_int(count - 1);
        (0..count)
            .map(|k| {
                let frac = T::from_positive_int(k) / last;
                match self {
                    Self::Equal => frac,
                    Self::Chebyshev => (T::one() + (T::pi() * frac).cos()) / T::two(),
                }
            })
            .collect()
    }
}

/// Interpolates `f` at `N` nodes in every subinterval.
///
/// The Vandermonde matrix only depends on the nodes, so it is inverted once and every
/// entry is a single matrix-vector product.
pub(super) fn fit<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    grid: &Grid<T>,
    nodes: Nodes,
) -> Result<Vec<Polynomial<T, N>>> {
    let t = nodes.points::<T>(N);
    let vandermonde = DMatrix::from_fn(N, N, |i, j| (0..j).fold(T::one(), |acc, _| acc * t[i]));
    let inverse = vandermonde
        .try_inverse()
        .ok_or(Error::Algebra("interpolation matrix is singular"))?;

    let mut entries = fill(grid.num_intervals(), |i| {
        let (x, h) = cell(grid, i);
        let samples = DVector::from_fn(N, |k, _| func.call(x + h * t[k]));
        let coefs = &inverse * samples;
        Ok(to_grid_space(Polynomial::from_slice(coefs.as_slice()), x, h, grid))
    })?;

    match nodes {
        Nodes::Equal => {
            let right = func.call(grid.table_max_arg());
            push_sentinel(grid, &mut entries, |_| Polynomial::constant(right));
        }
        Nodes::Chebyshev => {
            push_sentinel(grid, &mut entries, |last| {
                last.taylor_shift(T::one(), T::two(), T::zero(), T::one())
            });
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::registry::{Strategy, TableKind};
    use crate::table::{LookupTable, LookupTableParameters, Table};

    #[test]
    fn test_nodes() {
        let equal = Nodes::Equal.points::<f64>(4);
        assert_eq!(equal[0], 0.0);
        assert_eq!(equal[3], 1.0);
        assert_close!(equal[1], 1.0 / 3.0);

        let cheby = Nodes::Chebyshev.points::<f64>(3);
        assert_close!(cheby[0], 1.0);
        assert_close!(cheby[1], 0.5);
        assert_close!(cheby[2], 0.0);

        assert_eq!(Nodes::Chebyshev.points::<f64>(1), vec![0.5]);
    }

    fn check_exact<const N: usize>(kind: TableKind, nodes: Nodes) {
        let func = crate::strategy::tests::exp();
        let table = Table::<f64, N>::build(kind, &func, LookupTableParameters::new(-0.5, 1.5, 0.1)).unwrap();
        let t = nodes.points::<f64>(N);

        for i in 0..table.num_intervals() {
            let (x, h) = cell(table.grid(), i);
            let p = &table.entries()[i];
            for &tk in &t {
                let at = match kind.grid {
                    crate::GridKind::Uniform => tk,
                    crate::GridKind::NonUniform => x + h * tk,
                };
                let expected = (x + h * tk).exp();
                assert_close!(p.eval(at), expected, tol = 1e-11 * expected, "{kind} cell {i} node {tk}");
            }
        }
    }

    #[test]
    fn test_interpolation_is_exact_at_nodes() {
        check_exact::<4>(TableKind::uniform(Strategy::EqSpace { degree: 3 }), Nodes::Equal);
        check_exact::<4>(TableKind::nonuniform(Strategy::EqSpace { degree: 3 }), Nodes::Equal);
        check_exact::<6>(TableKind::uniform(Strategy::Chebyshev { degree: 5 }), Nodes::Chebyshev);
        check_exact::<6>(TableKind::nonuniform(Strategy::Chebyshev { degree: 5 }), Nodes::Chebyshev);
        check_exact::<1>(TableKind::uniform(Strategy::EqSpace { degree: 0 }), Nodes::Equal);
    }

    #[test]
    fn test_sentinels() {
        let func = crate::strategy::tests::exp();
        let params = LookupTableParameters::new(0.0, 1.0, 0.25);

        let table = Table::<f64, 3>::build(TableKind::uniform(Strategy::EqSpace { degree: 2 }), &func, params).unwrap();
        assert_eq!(table.entries().len(), 5);
        assert_eq!(table.entries()[4].coefficients(), &[1f64.exp(), 0.0, 0.0]);

        let table = Table::<f64, 3>::build(TableKind::uniform(Strategy::Chebyshev { degree: 2 }), &func, params).unwrap();
        let last = table.entries()[3];
        assert_close!(table.entries()[4].eval(0.0), last.eval(1.0));
        assert_close!(table.evaluate(1.0), 1f64.exp(), tol = 1e-12);
    }
}
