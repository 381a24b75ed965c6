use super::{with_sign, MinimizeResult, ScalarOptions};
use crate::value::Value;

/// Minimizes `f` over `[a, b]` with Brent's method.
///
/// Golden-section steps, replaced by parabolic interpolation whenever the parabola's
/// vertex lies inside the bracket and the step is shrinking. The function is never
/// evaluated at `a` or `b` themselves.
///
/// `NaN` values of `f` never become the current best point, so a caller that wants
/// them treated as "worst possible" must map them before returning.
///
/// # Example
/// ```rust
/// # use polylut::solvers::{minimize_brent, ScalarOptions};
/// let result = minimize_brent(|x: f64| (x - 0.3).powi(2), -1.0, 2.0, ScalarOptions::default());
/// assert!((result.x - 0.3).abs() < 1e-7);
/// ```
pub fn minimize_brent<T: Value>(
    mut f: impl FnMut(T) -> T,
    a: T,
    b: T,
    options: ScalarOptions<T>,
) -> MinimizeResult<T> {
    let five: T = T::from_positive_int(5);
    let three: T = T::from_positive_int(3);
    let golden = (three - five.sqrt()) / T::two();

    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };
    let mut x = a + golden * (b - a);
    let mut w = x;
    let mut v = x;
    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;

    let mut d = T::zero();
    let mut e = T::zero();
    let mut iterations = 0;

    while iterations < options.max_iter {
        let m = (a + b) / T::two();
        let tol1 = options.tolerance_at(x);
        let tol2 = tol1 * T::two();
        if Value::abs(x - m) <= tol2 - (b - a) / T::two() {
            break;
        }
        iterations += 1;

        let mut golden_step = true;
        if Value::abs(e) > tol1 {
            // Parabola through (v, fv), (w, fw), (x, fx)
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = (q - r) * T::two();
            if q > T::zero() {
                p = -p;
            } else {
                q = -q;
            }

            let previous = e;
            e = d;
            if Value::abs(p) < Value::abs(T::half() * q * previous)
                && p > q * (a - x)
                && p < q * (b - x)
            {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = with_sign(tol1, m - x);
                }
                golden_step = false;
            }
        }

        if golden_step {
            e = if x >= m { a - x } else { b - x };
            d = golden * e;
        }

        let u = if Value::abs(d) >= tol1 {
            x + d
        } else {
            x + with_sign(tol1, d)
        };
        let fu = f(u);

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    MinimizeResult {
        x,
        f_min: fx,
        iterations,
        bracket_width: b - a,
    }
}
