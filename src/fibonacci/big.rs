//! Exact Fibonacci numbers past the `u64` boundary.

use num_bigint::BigUint;
use num_traits::{One, Zero};

type BigMatrix = [[BigUint; 2]; 2];

fn identity() -> BigMatrix {
    [
        [BigUint::one(), BigUint::zero()],
        [BigUint::zero(), BigUint::one()],
    ]
}

fn base() -> BigMatrix {
    [
        [BigUint::one(), BigUint::one()],
        [BigUint::one(), BigUint::zero()],
    ]
}

fn multiply(lhs: &BigMatrix, rhs: &BigMatrix) -> BigMatrix {
    let cell = |i: usize, j: usize| &lhs[i][0] * &rhs[0][j] + &lhs[i][1] * &rhs[1][j];
    [[cell(0, 0), cell(0, 1)], [cell(1, 0), cell(1, 1)]]
}

fn power(exp: u64) -> BigMatrix {
    if exp == 0 {
        return identity();
    }
    let half = power(exp / 2);
    let squared = multiply(&half, &half);
    if exp % 2 == 1 {
        multiply(&squared, &base())
    } else {
        squared
    }
}

/// `fib(n)` by exponentiation by squaring over arbitrary-precision integers.
pub fn fast_matrix(n: u64) -> BigUint {
    if n == 0 {
        return BigUint::zero();
    }
    let [[top_left, _], _] = power(n - 1);
    top_left
}
