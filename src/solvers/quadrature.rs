use crate::error::{Error, Result};
use crate::value::Value;

/// Kronrod abscissae on `[0, 1]`, outermost first; odd entries are the 7-point Gauss nodes
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Kronrod weights, matching [`XGK`]
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for `XGK[1]`, `XGK[3]`, `XGK[5]` and the centre
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Options for adaptive quadrature.
#[derive(Debug, Clone, Copy)]
pub struct QuadOptions<T: Value> {
    /// Absolute error target
    pub abs_tol: T,

    /// Relative error target
    pub rel_tol: T,

    /// Maximum number of subintervals before giving up
    pub max_subdivisions: usize,
}

impl<T: Value> Default for QuadOptions<T> {
    fn default() -> Self {
        let tol = <T as num_traits::float::FloatCore>::epsilon().sqrt();
        Self {
            abs_tol: tol,
            rel_tol: tol,
            max_subdivisions: 50,
        }
    }
}

/// Result of an adaptive quadrature.
#[derive(Debug, Clone, Copy)]
pub struct QuadResult<T: Value> {
    /// Estimated integral
    pub value: T,

    /// Estimated absolute error
    pub error: T,

    /// Number of function evaluations
    pub evaluations: usize,

    /// Whether the error target was met
    pub converged: bool,
}

/// One 15-point Gauss-Kronrod rule: `(integral, error estimate)`
fn gauss_kronrod<T: Value>(f: &mut impl FnMut(T) -> T, a: T, b: T) -> Result<(T, T)> {
    let centre = (a + b) / T::two();
    let half = (b - a) / T::two();

    let fc = f(centre);
    let mut kronrod = fc * T::try_cast(WGK[7])?;
    let mut gauss = fc * T::try_cast(WG[3])?;

    for j in 0..7 {
        let dx = half * T::try_cast(XGK[j])?;
        let pair = f(centre - dx) + f(centre + dx);
        kronrod += pair * T::try_cast(WGK[j])?;
        if j % 2 == 1 {
            gauss += pair * T::try_cast(WG[j / 2])?;
        }
    }

    Ok((kronrod * half, Value::abs((kronrod - gauss) * half)))
}

/// Integrates `f` over `[a, b]` with globally adaptive Gauss-Kronrod (7-15) quadrature.
///
/// The subinterval with the largest error estimate is bisected until the summed error
/// drops below `max(abs_tol, rel_tol * |integral|)` or `max_subdivisions` is reached.
/// Running out of subdivisions returns the best estimate with `converged = false`.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if the integral is not finite, which usually means
/// `f` is singular somewhere in `[a, b]`.
///
/// # Example
/// ```rust
/// # use polylut::solvers::{quad, QuadOptions};
/// let r = quad(|x: f64| x.cos(), 0.0, std::f64::consts::FRAC_PI_2, QuadOptions::default()).unwrap();
/// assert!((r.value - 1.0).abs() < 1e-12);
/// ```
pub fn quad<T: Value>(
    mut f: impl FnMut(T) -> T,
    a: T,
    b: T,
    options: QuadOptions<T>,
) -> Result<QuadResult<T>> {
    let (first_value, first_error) = gauss_kronrod(&mut f, a, b)?;
    let mut segments = vec![(a, b, first_value, first_error)];
    let mut evaluations = 15;

    let totals = |segments: &[(T, T, T, T)]| {
        segments.iter().fold((T::zero(), T::zero()), |(v, e), s| (v + s.2, e + s.3))
    };

    let (mut value, mut error) = (first_value, first_error);
    let mut converged = false;
    loop {
        let target = num_traits::float::FloatCore::max(options.abs_tol, options.rel_tol * Value::abs(value));
        if error <= target {
            converged = true;
            break;
        }
        if segments.len() >= options.max_subdivisions {
            break;
        }

        // Split the worst segment
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|x, y| x.1 .3.partial_cmp(&y.1 .3).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(0, |(i, _)| i);
        let (lo, hi, _, _) = segments.swap_remove(worst);
        let mid = (lo + hi) / T::two();
        let (left_value, left_error) = gauss_kronrod(&mut f, lo, mid)?;
        let (right_value, right_error) = gauss_kronrod(&mut f, mid, hi)?;
        evaluations += 30;
        segments.push((lo, mid, left_value, left_error));
        segments.push((mid, hi, right_value, right_error));

        (value, error) = totals(&segments);
    }

    if !num_traits::float::FloatCore::is_finite(value) {
        return Err(Error::invalid(format!(
            "integral over [{a:e}, {b:e}] is not finite"
        )));
    }

    Ok(QuadResult {
        value,
        error,
        evaluations,
        converged,
    })
}
