//! Numeric types and iteration utilities for lookup tables.
//!
//! This module defines the [`Value`] trait, which abstracts the floating point
//! types a table can be built over, ensuring compatibility with nalgebra and
//! the handful of bit-level operations the error estimator needs.
//!
//! # Traits
//!
//! - [`Value`]: Extends `RealField`, `Scalar`, and `FloatCore` to provide:
//!   - A canonical `two()` constant.
//!   - `try_cast` for safe type conversion with error handling.
//!   - `next_up` / `next_down` for stepping to adjacent representable values.
//!
//! # Iterators
//!
//! - [`SteppedValues`]: A floating-point range iterator with a specified step,
//!   useful for sampling a table over its domain.
//!
//! # Example
//!
//! ```rust
//! use polylut::value::{Value, SteppedValues};
//!
//! // Create a range of f64 values from 0.0 to 1.0 in steps of 0.1
//! let range = SteppedValues::new(0.0..=1.0, 0.1);
//! assert_eq!(range.count(), 11);
//!
//! // The smallest double above 1.0
//! assert!(1.0f64.next_up() > 1.0);
//! ```
use std::ops::RangeInclusive;

use crate::error::Error;

/// Numeric type for tables
pub trait Value:
    nalgebra::Scalar
    + nalgebra::ComplexField<RealField = Self>
    + nalgebra::RealField
    + num_traits::float::FloatCore
    + std::fmt::LowerExp
    + Send
    + Sync
{
    /// Returns the value 2.0
    #[must_use]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    /// Returns the value 0.5
    #[must_use]
    fn half() -> Self {
        Self::one() / Self::two()
    }

    /// Tries to cast a value to the target type
    ///
    /// # Errors
    /// Returns an error if the cast fails
    fn try_cast<U: num_traits::NumCast>(n: U) -> Result<Self, Error> {
        num_traits::cast(n).ok_or(Error::CastFailed)
    }

    /// Converts the value to `usize`
    fn as_usize(&self) -> Option<usize> {
        num_traits::cast(*self)
    }

    /// Raises the value to the power of an integer
    #[must_use]
    fn powi(self, n: i32) -> Self {
        nalgebra::ComplexField::powi(self, n)
    }

    /// Get the absolute value for a numeric type
    #[must_use]
    fn abs(self) -> Self {
        nalgebra::ComplexField::abs(self)
    }

    /// Computes the factorial of a non-negative integer `n`.
    #[must_use]
    fn factorial(n: usize) -> Self {
        let mut result = Self::one();
        for i in 2..=n {
            result *= Self::from_positive_int(i);
        }
        result
    }

    /// Binomial coefficient `n choose k`
    #[must_use]
    fn binomial(n: usize, k: usize) -> Self {
        if k > n {
            return Self::zero();
        }
        Self::factorial(n) / (Self::factorial(k) * Self::factorial(n - k))
    }

    /// Falling factorial `n (n-1) ... (n-k+1)`, the weight of `x^n` in its `k`-th derivative
    #[must_use]
    fn permutation(n: usize, k: usize) -> Self {
        if k > n {
            return Self::zero();
        }
        ((n - k + 1)..=n).fold(Self::one(), |acc, i| acc * Self::from_positive_int(i))
    }

    /// Converts a `usize` to the target numeric type.
    ///
    /// Results in `infinity` if the value is out of range.
    #[must_use]
    fn from_positive_int(n: usize) -> Self {
        Self::try_cast(n).unwrap_or(Self::infinity())
    }

    /// Number of bits in the significand, including the implicit bit
    #[must_use]
    fn mantissa_digits() -> u32 {
        // epsilon = 2^(1 - digits)
        let eps: f64 = num_traits::cast(Self::epsilon()).unwrap_or(f64::EPSILON);
        let bits = 1.0 - eps.log2();
        num_traits::cast(bits).unwrap_or(53)
    }

    /// The smallest representable value greater than `self`
    #[must_use]
    fn next_up(self) -> Self {
        step_representable(self, true)
    }

    /// The largest representable value less than `self`
    #[must_use]
    fn next_down(self) -> Self {
        step_representable(self, false)
    }
}

impl<T> Value for T where
    T: nalgebra::Scalar
        + nalgebra::ComplexField<RealField = Self>
        + nalgebra::RealField
        + num_traits::float::FloatCore
        + std::fmt::LowerExp
        + Send
        + Sync
{
}

/// Steps to the adjacent representable value by adding or removing one ulp.
///
/// Works for any binary float without access to its bit pattern: the spacing of
/// representable values around `x` is `eps * 2^floor(log2|x|)`.
fn step_representable<T: Value>(x: T, up: bool) -> T {
    if x.is_nan() || (up && x == T::infinity()) || (!up && x == T::neg_infinity()) {
        return x;
    }

    if x == T::zero() {
        let tiny = T::min_positive_value() * T::epsilon();
        let tiny = if tiny > T::zero() { tiny } else { T::min_positive_value() };
        return if up { tiny } else { -tiny };
    }

    let magnitude = Value::abs(x);
    let exponent = num_traits::float::FloatCore::floor(nalgebra::ComplexField::log2(magnitude));
    let mut binade = nalgebra::ComplexField::powf(T::two(), exponent);
    if binade > magnitude {
        binade /= T::two();
    } else if binade * T::two() <= magnitude {
        binade *= T::two();
    }

    let smallest = T::min_positive_value() * T::epsilon();
    let mut ulp = T::epsilon() * binade;
    if ulp < smallest || ulp <= T::zero() {
        ulp = if smallest > T::zero() { smallest } else { T::min_positive_value() };
    }

    // Crossing a power of two downwards halves the spacing
    let towards_zero = up == (x < T::zero());
    if towards_zero && magnitude == binade && ulp / T::two() > T::zero() {
        ulp /= T::two();
    }

    if up {
        x + ulp
    } else {
        x - ulp
    }
}

/// Iterator over a range of floating-point values with a specified step.
///
/// This iterator yields values starting from `start` up to and including `end`,
/// incrementing by `step` on each iteration.
pub struct SteppedValues<T: Value> {
    range: RangeInclusive<T>,
    step: T,
    index: T,
}
impl<T: Value> SteppedValues<T> {
    /// Creates a new iterator over stepped values in a range
    ///
    /// Will yield values starting from `range.start` up to and including `range.end`
    pub fn new(range: RangeInclusive<T>, step: T) -> Self {
        Self {
            range,
            step,
            index: T::zero(),
        }
    }

    /// Returns the number of steps remaining in the iterator
    pub fn len(&self) -> usize {
        let value = *self.range.start() + self.index * self.step;
        let remaining = *self.range.end() - value;
        if remaining < T::zero() {
            return 0;
        }
        let steps = remaining / self.step;
        steps.as_usize().map_or(0, |s| s + 1)
    }

    /// Returns true if the iterator is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<T: Value> Iterator for SteppedValues<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = *self.range.start() + self.index * self.step;
        if value <= *self.range.end() {
            self.index += T::one();
            Some(value)
        } else {
            None
        }
    }
}
