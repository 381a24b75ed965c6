/// Asserts that two floating-point values are approximately equal.
///
/// This is useful for comparing computed values where exact equality is not expected due to rounding errors.
/// - Without a tolerance, accepts a difference of `64 * epsilon * max(1, |a|, |b|)` for the type `T`.
/// - With `tol = ...`, accepts an absolute difference up to `tol`.
///
/// # Parameters
/// - `$a`: First value.
/// - `$b`: Second value.
/// - `tol = $tol`: *(optional)* Absolute tolerance.
/// - `$msg`: *(optional)* Custom failure message. Supports formatting arguments just like `format!`.
///
/// # Panics
/// Panics if the values are further apart than the tolerance, or if either is NaN.
///
/// # Examples
/// ```
/// # use polylut::assert_close;
/// assert_close!(1.0 + 1e-16, 1.0, "Nearly equal");
/// assert_close!(1.0, 1.001, tol = 1e-2);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($a:expr, $b:expr, tol = $tol:expr $(, $msg:literal $(, $($args:tt),*)?)?) => { #[allow(clippy::float_cmp)] {
        #[allow(unused_mut, unused_assignments)] let mut msg = "Values not close".to_string();
        $( msg = format!($msg, $($($args)?)?); )?

        let (a, b, tol) = ($a, $b, $tol);
        let diff = $crate::value::Value::abs(a - b);
        assert!(
            a == b || diff <= tol,
            "{msg}: {a:e} != {b:e} (difference {diff:e} > {tol:e})"
        );
    }};

    ($a:expr, $b:expr $(, $msg:literal $(, $($args:tt),*)?)?) => { #[allow(clippy::float_cmp)] {
        fn tolerance<T: $crate::value::Value>(a: T, b: T) -> T {
            let scale = $crate::num_traits::float::FloatCore::max(
                T::one(),
                $crate::num_traits::float::FloatCore::max($crate::value::Value::abs(a), $crate::value::Value::abs(b)),
            );
            let sixty_four: T = $crate::value::Value::from_positive_int(64);
            sixty_four * <T as $crate::num_traits::float::FloatCore>::epsilon() * scale
        }

        #[allow(unused_mut, unused_assignments)] let mut msg = "Values not close".to_string();
        $( msg = format!($msg, $($($args)?)?); )?

        let (a, b) = ($a, $b);
        $crate::assert_close!(a, b, tol = tolerance(a, b), "{msg}");
    }};
}

/// Asserts that two slices of floating-point values are approximately equal element-wise.
///
/// - Element-wise [`crate::assert_close`], with the same default tolerance.
///
/// # Parameters
/// - `$src`: Source slice (implements `iter()`).
/// - `$dst`: Destination slice (same length as `$src`).
/// - `tol = $tol`: *(optional)* Absolute tolerance.
///
/// # Panics
/// - If the lengths differ.
/// - If any pair of elements is not close.
///
/// # Examples
/// ```
/// # use polylut::assert_all_close;
/// let a = [1.0, 2.0, 3.0];
/// let b = [1.0, 2.0 + 1e-16, 3.0];
/// assert_all_close!(&a, &b);
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($src:expr, $dst:expr $(, tol = $tol:expr)?) => {{
        let src = $src;
        let dst = $dst;
        assert_eq!(src.len(), dst.len(), "Slices differ in length");

        for (i, (a, b)) in src.iter().zip(dst.iter()).enumerate() {
            $crate::assert_close!(*a, *b $(, tol = $tol)?, "Element {} differs", i);
        }
    }};
}

/// Asserts that a lookup table reproduces a reference function to within an absolute tolerance.
///
/// The table is sampled at 1000 evenly spaced points over `[min_arg, max_arg]` (both ends included).
///
/// # Parameters
/// - `$table`: Anything that derefs to a [`crate::LookupTable`].
/// - `$f`: Reference function, `Fn(T) -> T`.
/// - `$tol`: Maximum allowed absolute error.
///
/// # Panics
/// Panics with the worst sample point if any sample exceeds the tolerance or is not finite.
#[macro_export]
macro_rules! assert_table_matches {
    ($table:expr, $f:expr, $tol:expr $(, $msg:literal $(, $($args:tt),*)?)?) => {{
        use $crate::LookupTable as _;
        fn lerp<T: $crate::value::Value>(min: T, max: T, frac: f64) -> T {
            min + (max - min) * T::try_cast(frac).unwrap_or_else(|_| T::zero())
        }

        let table = &$table;
        let f = $f;
        let tol = $tol;

        #[allow(unused_mut, unused_assignments)] let mut msg = table.name().to_string();
        $( msg = format!("{msg}: {}", format!($msg, $($($args)?)?)); )?

        let (min, max) = (table.min_arg(), table.max_arg());
        let samples: usize = 1000;
        let mut worst = (min, -1.0f64);
        for i in 0..=samples {
            let frac: f64 = i as f64 / samples as f64;
            let x = lerp(min, max, frac);
            let err: f64 = $crate::num_traits::cast($crate::value::Value::abs(table.evaluate(x) - f(x))).unwrap_or(f64::NAN);
            if !err.is_finite() || err > worst.1 {
                worst = (x, if err.is_finite() { err } else { f64::INFINITY });
            }
        }

        let tol_f64: f64 = $crate::num_traits::cast(tol).unwrap();
        assert!(
            worst.1 <= tol_f64,
            "{msg}: error {:e} at x = {:e} exceeds {tol_f64:e}", worst.1, worst.0
        );
    }};
}
