use super::fill;
use crate::error::Result;
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::table::Grid;
use crate::value::Value;

/// `f` at every grid point, plus a copy of the last value.
///
/// The evaluator reads entries `i` and `i + 1`; the duplicate keeps `i + 1` in range
/// when `x` hashes to the last grid point.
pub(super) fn fit<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    grid: &Grid<T>,
) -> Result<Vec<Polynomial<T, N>>> {
    let (min, step) = (grid.min_arg(), grid.step_size());
    let mut entries = fill(grid.num_intervals() + 1, |i| {
        Ok(Polynomial::constant(func.call(min + step * T::from_positive_int(i))))
    })?;

    if let Some(&last) = entries.last() {
        entries.push(last);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use crate::registry::{Strategy, TableKind};
    use crate::table::{LookupTable, LookupTableParameters, Table};

    #[test]
    fn test_exact_at_grid_points() {
        let func = crate::function::FunctionContainer::new(f64::cos);
        let kind = TableKind::uniform(Strategy::LinearRaw);
        let table = Table::<f64, 1>::build(kind, &func, LookupTableParameters::new(-1.0, 1.0, 0.25)).unwrap();

        assert_eq!(table.entries().len(), 10);
        for i in 0..=8 {
            let x = -1.0 + 0.25 * f64::from(i);
            assert_eq!(table.evaluate(x), x.cos(), "x = {x}");
        }
        assert_eq!(table.entries()[9], table.entries()[8]);
    }
}
