use num_traits::float::FloatCore;

use crate::value::Value;

/// One subinterval's worth of coefficients.
///
/// Represents `p(t) = c[0] + c[1] t + ... + c[N-1] t^(N-1)` in the monomial basis,
/// where `t` is whatever local coordinate the owning table hashes `x` into.
///
/// `N` is the number of coefficients (degree + 1), fixed at compile time so that a
/// table's coefficient block is a flat array with no per-entry allocation.
///
/// # Example
/// ```rust
/// # use polylut::Polynomial;
/// // 1 + 2t + 3t^2
/// let p = Polynomial::new([1.0, 2.0, 3.0]);
/// assert_eq!(p.eval(2.0), 17.0);
/// assert_eq!(p.diff(2.0, 1), 14.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polynomial<T: Value, const N: usize> {
    coefs: [T; N],
}

impl<T: Value, const N: usize> Default for Polynomial<T, N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Value, const N: usize> Polynomial<T, N> {
    /// Creates a polynomial from its monomial coefficients, lowest order first
    pub fn new(coefs: [T; N]) -> Self {
        Self { coefs }
    }

    /// The zero polynomial
    #[must_use]
    pub fn zero() -> Self {
        Self {
            coefs: [T::zero(); N],
        }
    }

    /// A polynomial holding only the constant `value`
    #[must_use]
    pub fn constant(value: T) -> Self {
        let mut p = Self::zero();
        if N > 0 {
            p.coefs[0] = value;
        }
        p
    }

    /// Builds a polynomial from a slice, zero-padding or truncating it to `N` coefficients
    pub fn from_slice(coefs: &[T]) -> Self {
        let mut p = Self::zero();
        for (dst, src) in p.coefs.iter_mut().zip(coefs) {
            *dst = *src;
        }
        p
    }

    /// Number of coefficients
    #[must_use]
    pub const fn order() -> usize {
        N
    }

    /// Returns a reference to the polynomial’s coefficients.
    pub fn coefficients(&self) -> &[T; N] {
        &self.coefs
    }

    /// Returns a mutable reference to the polynomial’s coefficients.
    pub fn coefficients_mut(&mut self) -> &mut [T; N] {
        &mut self.coefs
    }

    /// Evaluates the polynomial at `t` using Horner's method.
    ///
    /// This is the table's hot path: `N-1` multiply-adds and no branches.
    #[inline]
    pub fn eval(&self, t: T) -> T {
        let mut sum = match self.coefs.last() {
            Some(&c) => c,
            None => return T::zero(),
        };
        for k in (0..N.saturating_sub(1)).rev() {
            sum = sum * t + self.coefs[k];
        }
        sum
    }

    /// Evaluates the `s`-th derivative at `t`.
    ///
    /// `s = 0` is the same as [`Polynomial::eval`]; for `s >= N` the result is zero.
    pub fn diff(&self, t: T, s: usize) -> T {
        let mut sum = T::zero();
        for k in (s..N).rev() {
            sum = sum * t + self.coefs[k] * T::permutation(k, s);
        }
        sum
    }

    /// Returns `q` such that `q(x) = p(alpha * x + beta)`.
    ///
    /// Expands every `(alpha x + beta)^i` with the binomial theorem, so the result is exact
    /// up to rounding for any affine change of variable.
    #[must_use]
    pub fn compose_affine(&self, alpha: T, beta: T) -> Self {
        let mut out = Self::zero();
        for (i, &c) in self.coefs.iter().enumerate() {
            if c == T::zero() {
                continue;
            }
            for j in 0..=i {
                let power_a = Value::powi(alpha, exponent(j));
                let power_b = Value::powi(beta, exponent(i - j));
                out.coefs[j] += c * T::binomial(i, j) * power_a * power_b;
            }
        }
        out
    }

    /// Re-expresses the polynomial on a new interval.
    ///
    /// Returns `q` with `q(t) = p(a + (b - a) * (t - c) / (d - c))`, i.e. `q` on `[c, d]`
    /// traces out what `p` does on `[a, b]`.
    ///
    /// # Example
    /// ```rust
    /// # use polylut::Polynomial;
    /// // Continue the polynomial past its right edge: q(t) = p(t + 1)
    /// let p = Polynomial::new([0.0, 0.0, 1.0]);
    /// let q = p.taylor_shift(1.0, 2.0, 0.0, 1.0);
    /// assert_eq!(q.eval(0.0), 1.0);
    /// assert_eq!(q.eval(1.0), 4.0);
    /// ```
    #[must_use]
    pub fn taylor_shift(&self, a: T, b: T, c: T, d: T) -> Self {
        let alpha = (b - a) / (d - c);
        let beta = a - alpha * c;
        self.compose_affine(alpha, beta)
    }

    /// Multiplies every coefficient by `factor`
    pub fn scale(&mut self, factor: T) {
        for c in &mut self.coefs {
            *c *= factor;
        }
    }

    /// True if every coefficient is finite
    pub fn is_finite(&self) -> bool {
        self.coefs.iter().all(|&c| FloatCore::is_finite(c))
    }
}

impl<T: Value, const N: usize> AsRef<[T]> for Polynomial<T, N> {
    fn as_ref(&self) -> &[T] {
        &self.coefs
    }
}

impl<T: Value, const N: usize> std::ops::Index<usize> for Polynomial<T, N> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        &self.coefs[index]
    }
}

impl<T: Value, const N: usize> std::ops::IndexMut<usize> for Polynomial<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.coefs[index]
    }
}

impl<T: Value, const N: usize> std::fmt::Display for Polynomial<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for k in (1..N).rev() {
            write!(f, "{:e}t^{k} + ", self.coefs[k])?;
        }
        match self.coefs.first() {
            Some(c) => write!(f, "{c:e}"),
            None => write!(f, "0"),
        }
    }
}

// Coefficient counts never exceed 8
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn exponent(n: usize) -> i32 {
    n as i32
}
