use super::{cell, fill, push_sentinel};
use crate::error::Result;
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::table::{Grid, GridKind};
use crate::value::Value;

/// Truncated Taylor series of degree `N - 1` about each subinterval's midpoint
pub(super) fn fit<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    grid: &Grid<T>,
) -> Result<Vec<Polynomial<T, N>>> {
    let mut entries = fill(grid.num_intervals(), |i| {
        let (x, h) = cell(grid, i);
        let half = h / T::two();
        let mid = x + half;

        let derivatives = func.derivatives(mid, N - 1)?;
        let coefs: Vec<T> = derivatives
            .iter()
            .enumerate()
            .map(|(k, &d)| d / T::factorial(k))
            .collect();

        // The series is in s = x - mid
        let series = Polynomial::from_slice(&coefs);
        Ok(match grid.kind() {
            GridKind::Uniform => series.taylor_shift(-half, half, T::zero(), T::one()),
            GridKind::NonUniform => series.compose_affine(T::one(), -mid),
        })
    })?;

    push_sentinel(grid, &mut entries, |last| {
        last.taylor_shift(T::one(), T::two(), T::zero(), T::one())
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::registry::{Strategy, TableKind};
    use crate::table::{LookupTable, LookupTableParameters, Table};

    #[test]
    fn test_matches_derivatives_at_midpoint() {
        let func = crate::strategy::tests::exp();
        let kind = TableKind::uniform(Strategy::Taylor { degree: 4 });
        let table = Table::<f64, 5>::build(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.2)).unwrap();

        for i in 0..table.num_intervals() {
            let (x, h) = cell(table.grid(), i);
            let mid = x + h / 2.0;
            let p = &table.entries()[i];

            // d^s/dt^s p(1/2) = h^s f^(s)(mid)
            for s in 0..5 {
                let expected = h.powi(s as i32) * mid.exp();
                assert_close!(p.diff(0.5, s), expected, tol = 1e-13, "cell {i}, derivative {s}");
            }
        }
    }

    #[test]
    fn test_nonuniform_series_in_x() {
        let func = crate::strategy::tests::exp();
        let kind = TableKind::nonuniform(Strategy::Taylor { degree: 3 });
        let table = Table::<f64, 4>::build(kind, &func, LookupTableParameters::new(-1.0, 1.0, 0.25)).unwrap();

        for i in 0..table.num_intervals() {
            let (x, h) = cell(table.grid(), i);
            let mid = x + h / 2.0;
            assert_close!(table.entries()[i].eval(mid), mid.exp(), tol = 1e-13);
            assert_close!(table.entries()[i].diff(mid, 1), mid.exp(), tol = 1e-12);
        }
    }

    #[test]
    fn test_constant_series() {
        let func = crate::strategy::tests::exp();
        let kind = TableKind::uniform(Strategy::Taylor { degree: 0 });
        let table = Table::<f64, 1>::build(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.5)).unwrap();
        assert_eq!(table.entries()[0].coefficients(), &[0.25f64.exp()]);
        assert_eq!(table.entries().len(), 3);
    }
}
