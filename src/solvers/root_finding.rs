use super::{RootResult, ScalarOptions};
use crate::error::Result;
use crate::value::Value;

/// Finds a sign change of an increasing function `f` inside `[lo, hi]`.
///
/// `f_lo <= 0 <= f_hi` must hold on entry. The caller passes both end values, so an
/// end point that is expensive or impossible to evaluate (a step size of 0, say) can be
/// supplied analytically.
///
/// The search bisects until the lower end of the bracket moves for the first time, which
/// shields the interpolating steps from a wildly nonlinear far end. After that it switches
/// to Brent-Dekker steps: inverse quadratic interpolation when three distinct points are
/// known, secant otherwise, with a bisection fallback whenever the previous step removed
/// less than a quarter of the bracket.
///
/// The bracket is kept the whole time; [`RootResult::root`] is its lower end, the last
/// point known to satisfy `f <= 0`. Hitting `max_iter` is not an error: the result is
/// returned with `converged = false` and the caller decides what to do with it.
///
/// # Errors
/// Propagates the first error returned by `f`.
///
/// # Example
/// ```rust
/// # use polylut::solvers::{bracketed_root, ScalarOptions};
/// let f = |x: f64| Ok(x * x - 2.0);
/// let r = bracketed_root(f, 0.0, 2.0, -2.0, 2.0, ScalarOptions::default()).unwrap();
/// assert!(r.converged);
/// assert!((r.root - 2f64.sqrt()).abs() < 1e-12);
/// ```
pub fn bracketed_root<T: Value>(
    mut f: impl FnMut(T) -> Result<T>,
    lo: T,
    hi: T,
    f_lo: T,
    f_hi: T,
    options: ScalarOptions<T>,
) -> Result<RootResult<T>> {
    let (mut a, mut fa) = (lo, f_lo);
    let (mut b, mut fb) = (hi, f_hi);

    let finish = |a: T, fa: T, b: T, iterations: usize, converged: bool| RootResult {
        root: a,
        function_value: fa,
        bracket: (a, b),
        iterations,
        converged,
    };

    if fa == T::zero() {
        return Ok(finish(a, fa, a, 0, true));
    }
    if fb <= T::zero() {
        return Ok(finish(b, fb, b, 0, true));
    }

    // Previous iterates, for interpolation
    let mut previous: Option<(T, T)> = None;
    let mut width_before = b - a;
    let mut escalated = false;
    let mut iterations = 0;

    while iterations < options.max_iter {
        if b - a <= options.tolerance_at(a) {
            return Ok(finish(a, fa, b, iterations, true));
        }
        iterations += 1;

        let midpoint = a + (b - a) / T::two();
        let mut x = midpoint;
        if escalated {
            let candidate = match previous {
                Some((c, fc)) if fc != fa && fc != fb && fa != fb => {
                    // Inverse quadratic interpolation through (a, fa), (b, fb), (c, fc)
                    a * fb * fc / ((fa - fb) * (fa - fc))
                        + b * fa * fc / ((fb - fa) * (fb - fc))
                        + c * fa * fb / ((fc - fa) * (fc - fb))
                }
                _ => a - fa * (b - a) / (fb - fa),
            };

            // Only trust the interpolant inside the bracket, and only while the last step
            // removed at least a quarter of it. Points hugging an end are nudged inwards by
            // the tolerance so the far end gets pulled in too.
            let inside = candidate > a && candidate < b;
            let shrinking = (b - a) * T::from_positive_int(4) <= width_before * T::from_positive_int(3);
            if inside && shrinking && num_traits::float::FloatCore::is_finite(candidate) {
                let margin = options.tolerance_at(a) / T::two();
                x = num_traits::float::FloatCore::min(
                    num_traits::float::FloatCore::max(candidate, a + margin),
                    b - margin,
                );
            }
        }

        let fx = f(x)?;
        log::trace!("bracketed_root: f({x:e}) = {fx:e}, bracket [{a:e}, {b:e}]");
        width_before = b - a;

        if fx <= T::zero() {
            if x != a {
                escalated = true;
            }
            previous = Some((a, fa));
            a = x;
            fa = fx;
            if fx == T::zero() {
                return Ok(finish(a, fa, b, iterations, true));
            }
        } else {
            previous = Some((b, fb));
            b = x;
            fb = fx;
        }
    }

    let converged = b - a <= options.tolerance_at(a);
    Ok(finish(a, fa, b, iterations, converged))
}

/// Newton-Raphson iteration confined to `[lo, hi]`.
///
/// `f` returns the value and the derivative at a point. A step that would leave the
/// interval is replaced by a step halfway to the violated bound, so the iterate never
/// escapes. Stops when a step is smaller than the tolerance, `f` is exactly zero, or the
/// derivative vanishes.
///
/// # Example
/// ```rust
/// # use polylut::solvers::{newton_bounded, ScalarOptions};
/// let r = newton_bounded(|x: f64| (x * x * x - 8.0, 3.0 * x * x), 1.0, 0.0, 10.0, ScalarOptions::default());
/// assert!(r.converged);
/// assert!((r.root - 2.0).abs() < 1e-12);
/// ```
pub fn newton_bounded<T: Value>(
    mut f: impl FnMut(T) -> (T, T),
    x0: T,
    lo: T,
    hi: T,
    options: ScalarOptions<T>,
) -> RootResult<T> {
    let mut x = num_traits::float::FloatCore::min(num_traits::float::FloatCore::max(x0, lo), hi);
    let mut fx = T::zero();
    let mut last_step = T::zero();
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iter {
        iterations += 1;
        let (value, slope) = f(x);
        fx = value;
        if fx == T::zero() {
            converged = true;
            break;
        }
        if slope == T::zero() || !num_traits::float::FloatCore::is_finite(slope) {
            break;
        }

        let mut next = x - fx / slope;
        if next < lo {
            next = (x + lo) / T::two();
        } else if next > hi {
            next = (x + hi) / T::two();
        }

        last_step = next - x;
        x = next;
        if Value::abs(last_step) <= options.tolerance_at(x) {
            converged = true;
            break;
        }
    }

    RootResult {
        root: x,
        function_value: fx,
        bracket: (x - Value::abs(last_step), x + Value::abs(last_step)),
        iterations,
        converged,
    }
}
