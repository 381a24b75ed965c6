use super::{fill, push_sentinel, to_grid_space};
use crate::error::Result;
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::table::Grid;
use crate::value::Value;

/// Cubic matching `f` and `f'` at both ends of every subinterval
pub(super) fn fit<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    grid: &Grid<T>,
) -> Result<Vec<Polynomial<T, N>>> {
    let three = T::from_positive_int(3);
    let mut entries = fill(grid.num_intervals(), |i| {
        let (lo, hi) = grid.bounds_of_subinterval(i);
        let h = hi - lo;

        let left = func.derivatives(lo, 1)?;
        let right = func.derivatives(hi, 1)?;
        let (y0, m0) = (left[0], left[1]);
        let (y1, m1) = (right[0], right[1]);

        let local = Polynomial::from_slice(&[
            y0,
            h * m0,
            -three * y0 + three * y1 - (T::two() * m0 + m1) * h,
            T::two() * y0 - T::two() * y1 + (m0 + m1) * h,
        ]);
        Ok(to_grid_space(local, lo, h, grid))
    })?;

    let right = func.call(grid.table_max_arg());
    push_sentinel(grid, &mut entries, |_| Polynomial::constant(right));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::registry::{Strategy, TableKind};
    use crate::table::{LookupTable, LookupTableParameters, Table};

    #[test]
    fn test_matches_values_and_slopes() {
        let func = FunctionContainer::new(f64::sin)
            .with_derivatives(1, |x, out: &mut [f64]| {
                out[0] = x.sin();
                out[1] = x.cos();
            })
            .unwrap();
        let kind = TableKind::uniform(Strategy::CubicHermite);
        let table = Table::<f64, 4>::build(kind, &func, LookupTableParameters::new(0.0, 3.0, 0.3)).unwrap();
        let h = table.step_size();

        for i in 0..table.num_intervals() {
            let (lo, hi) = table.bounds_of_subinterval(i);
            let p = &table.entries()[i];
            assert_close!(p.eval(0.0), lo.sin());
            assert_close!(p.eval(1.0), hi.sin(), tol = 1e-14);
            assert_close!(p.diff(0.0, 1), h * lo.cos(), tol = 1e-14);
            assert_close!(p.diff(1.0, 1), h * hi.cos(), tol = 1e-14);
        }
    }

    #[test]
    fn test_cubic_is_reproduced() {
        let f = |x: f64| 2.0 * x.powi(3) - x + 0.5;
        let func = FunctionContainer::new(f)
            .with_derivatives(1, move |x, out: &mut [f64]| {
                out[0] = f(x);
                out[1] = 6.0 * x * x - 1.0;
            })
            .unwrap();

        let kind = TableKind::nonuniform(Strategy::CubicHermite);
        let table = Table::<f64, 4>::build(kind, &func, LookupTableParameters::new(-1.0, 1.0, 0.5)).unwrap();
        crate::assert_table_matches!(table, f, 1e-12);
    }
}
