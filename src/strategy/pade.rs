use nalgebra::DMatrix;
use num_traits::float::FloatCore;

use super::fill;
use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::polynomial::Polynomial;
use crate::table::Grid;
use crate::value::Value;

/// `[m/n]` Padé approximants about every grid point.
///
/// Entry `i` holds `[P_0..P_m, Q_1..Q_n]` for the approximant about `min + i h`, valid on
/// `[-h/2, h/2]` around it, clipped to the table's domain for the first and last entries.
/// Where the denominator has a root in that range the denominator degree is lowered,
/// down to the plain Taylor polynomial of degree `m`.
pub(super) fn fit<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    grid: &Grid<T>,
    m: usize,
    n: usize,
) -> Result<Vec<Polynomial<T, N>>> {
    let (min, max, step) = (grid.min_arg(), grid.table_max_arg(), grid.step_size());
    let half = step / T::two();
    fill(grid.num_intervals() + 1, |i| {
        let x0 = min + step * T::from_positive_int(i);
        let lo = FloatCore::max(-half, min - x0);
        let hi = FloatCore::max(FloatCore::min(half, max - x0), lo);
        fit_point(func, x0, (lo, hi), m, n)
    })
}

fn fit_point<T: Value, const N: usize>(
    func: &FunctionContainer<T>,
    x0: T,
    range: (T, T),
    m: usize,
    n: usize,
) -> Result<Polynomial<T, N>> {
    let taylor: Vec<T> = func
        .derivatives(x0, m + n)?
        .iter()
        .enumerate()
        .map(|(k, &d)| d / T::factorial(k))
        .collect();

    for degree in (1..=n).rev() {
        if let Some((p, q)) = approximant(&taylor, m, degree, x0) {
            if !has_pole(&q, range) && p.iter().chain(&q).all(|&c| FloatCore::is_finite(c)) {
                return Ok(pack(&p, &q[1..]));
            }
        }
        log::warn!(
            "Padé [{m}/{degree}] about x = {x0:e} has a pole within [{:e}, {:e}], lowering the denominator degree",
            range.0,
            range.1
        );
    }

    let fallback = pack::<T, N>(&taylor[..=m], &[]);
    if !fallback.is_finite() {
        return Err(Error::Algebra("Padé fallback has non-finite coefficients"));
    }
    Ok(fallback)
}

/// `[P, Q]` laid out as stored, with the leading 1 of `Q` dropped
fn pack<T: Value, const N: usize>(p: &[T], q: &[T]) -> Polynomial<T, N> {
    let coefs: Vec<T> = p.iter().chain(q).copied().collect();
    Polynomial::from_slice(&coefs)
}

/// Solves for the `[m/n]` approximant from Taylor coefficients `a`.
///
/// `Q` spans the null space of rows `m+1..=m+n` of the Toeplitz matrix `T[i][j] = a[i-j]`,
/// and `P` is rows `0..=m` times `Q`. Returns `None` when `Q(0)` vanishes.
fn approximant<T: Value>(a: &[T], m: usize, n: usize, x0: T) -> Option<(Vec<T>, Vec<T>)> {
    let toeplitz = |i: usize, j: usize| if i >= j { a[i - j] } else { T::zero() };

    // Square, with a zero last row; the null space is unchanged
    let block = DMatrix::from_fn(n + 1, n + 1, |r, j| {
        if r < n {
            toeplitz(m + 1 + r, j)
        } else {
            T::zero()
        }
    });

    let svd = block.svd(false, true);
    let v_t = svd.v_t?;
    let sigma = svd.singular_values;

    let largest = sigma.iter().copied().fold(T::zero(), FloatCore::max);
    let threshold = largest * T::epsilon() * T::from_positive_int(8 * (n + 1));
    let null: Vec<usize> = (0..sigma.len()).filter(|&k| sigma[k] <= threshold).collect();

    let column = if null.len() > 1 {
        log::warn!(
            "Padé [{m}/{n}] about x = {x0:e}: denominator null space has dimension {}, using the first vector",
            null.len()
        );
        null[0]
    } else {
        (0..sigma.len())
            .min_by(|&x, &y| sigma[x].partial_cmp(&sigma[y]).unwrap_or(std::cmp::Ordering::Equal))?
    };

    let mut q: Vec<T> = v_t.row(column).iter().copied().collect();
    let lead = q[0];
    if Value::abs(lead) <= T::epsilon() {
        return None;
    }
    for c in &mut q {
        *c /= lead;
    }

    let p = (0..=m)
        .map(|i| (0..=n).fold(T::zero(), |acc, j| acc + toeplitz(i, j) * q[j]))
        .collect();
    Some((p, q))
}

/// True if `Q` (with `Q(0) = 1`) is not strictly positive somewhere on `[lo, hi]`.
///
/// Checks both ends and every critical point inside; degrees up to 3 only need the
/// quadratic formula.
fn has_pole<T: Value>(q: &[T], (lo, hi): (T, T)) -> bool {
    let value = |x: T| q.iter().rev().fold(T::zero(), |acc, &c| acc * x + c);

    let mut points = vec![lo, hi];
    match q.len() {
        3 if q[2] != T::zero() => points.push(-q[1] / (T::two() * q[2])),
        4 => {
            // Q' = q1 + 2 q2 x + 3 q3 x^2
            let (a, b, c) = (T::from_positive_int(3) * q[3], T::two() * q[2], q[1]);
            if a == T::zero() {
                if b != T::zero() {
                    points.push(-c / b);
                }
            } else {
                let disc = b * b - T::from_positive_int(4) * a * c;
                if disc >= T::zero() {
                    let root = disc.sqrt();
                    points.push((-b + root) / (T::two() * a));
                    points.push((-b - root) / (T::two() * a));
                }
            }
        }
        _ => {}
    }

    points
        .into_iter()
        .filter(|&x| lo <= x && x <= hi)
        .any(|x| value(x).partial_cmp(&T::zero()) != Some(std::cmp::Ordering::Greater))
}
