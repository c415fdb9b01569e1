use std::ops::Mul;

use super::{check_bound, FibError};

/// Row-major 2x2 matrix of `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix2(pub [[u64; 2]; 2]);

impl Matrix2 {
    pub const IDENTITY: Matrix2 = Matrix2([[1, 0], [0, 1]]);
    /// `[[1, 1], [1, 0]]`; its k-th power is `[[fib(k+1), fib(k)], [fib(k), fib(k-1)]]`.
    pub const BASE: Matrix2 = Matrix2([[1, 1], [1, 0]]);

    pub fn top_left(&self) -> u64 {
        self.0[0][0]
    }
}

impl Mul for Matrix2 {
    type Output = Matrix2;

    fn mul(self, rhs: Matrix2) -> Matrix2 {
        let [[a, b], [c, d]] = self.0;
        let [[e, f], [g, h]] = rhs.0;
        Matrix2([[a * e + b * g, a * f + b * h], [c * e + d * g, c * f + d * h]])
    }
}

/// Multiplies the base matrix into an accumulator `n - 1` times.
pub fn linear_matrix(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    if n == 0 {
        return Ok(0);
    }
    let mut acc = Matrix2::IDENTITY;
    for _ in 1..n {
        acc = acc * Matrix2::BASE;
    }
    Ok(acc.top_left())
}

/// Raises the base matrix to `n - 1` by squaring.
pub fn fast_matrix(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    if n == 0 {
        return Ok(0);
    }
    Ok(power(n - 1).top_left())
}

fn power(exp: u64) -> Matrix2 {
    if exp == 0 {
        return Matrix2::IDENTITY;
    }
    let half = power(exp / 2);
    let squared = half * half;
    if exp % 2 == 1 {
        squared * Matrix2::BASE
    } else {
        squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci::MAX_N;

    #[test]
    fn base_powers_hold_consecutive_terms() {
        assert_eq!(power(0), Matrix2::IDENTITY);
        assert_eq!(power(1), Matrix2::BASE);
        assert_eq!(power(5), Matrix2([[8, 5], [5, 3]]));
    }

    #[test]
    fn linear_and_fast_agree_up_to_boundary() {
        for n in 0..=MAX_N {
            assert_eq!(linear_matrix(n), fast_matrix(n), "n = {n}");
        }
    }

    #[test]
    fn matrix_known_values() {
        assert_eq!(fast_matrix(0), Ok(0));
        assert_eq!(fast_matrix(1), Ok(1));
        assert_eq!(fast_matrix(2), Ok(1));
        assert_eq!(linear_matrix(10), Ok(55));
        assert_eq!(fast_matrix(20), Ok(6765));
        assert_eq!(fast_matrix(MAX_N), Ok(12200160415121876738));
    }
}
