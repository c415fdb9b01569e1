//! Fibonacci strategies.
//!
//! Every strategy computes the n-th Fibonacci number (`fib(0) = 0`, `fib(1) = 1`)
//! as a `u64`. The largest index whose value fits is [`MAX_N`]; larger indices are
//! rejected with [`FibError::Overflow`] instead of wrapping. Use [`big`] for exact
//! results past that boundary.

pub mod big;
mod iterative;
mod matrix;
mod recursive;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use iterative::iterative;
pub use matrix::{fast_matrix, linear_matrix, Matrix2};
pub use recursive::{memo_recursive, naive_recursive, tail_recursive};

/// Largest index for which `fib(n)` fits in a `u64`.
/// fib(93) = 12200160415121876738, fib(94) exceeds `u64::MAX`.
pub const MAX_N: u64 = 93;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FibError {
    #[error("fib({n}) overflows u64, largest supported index is {max}")]
    Overflow { n: u64, max: u64 },
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("naive recursion is limited to n <= {limit}, got {n}")]
    NaiveLimitExceeded { n: u64, limit: u64 },
    #[error("big results are limited to n <= {limit}, got {n}")]
    BigLimitExceeded { n: u64, limit: u64 },
    #[error("repetitions must be at least 1")]
    InvalidRepetitions,
    #[error("job id {0:?} must be non-empty and use only [A-Za-z0-9_-]")]
    InvalidJobId(String),
    #[error("job id {0:?} is already in use")]
    DuplicateJobId(String),
}

pub(crate) fn check_bound(n: u64) -> Result<(), FibError> {
    if n > MAX_N {
        return Err(FibError::Overflow { n, max: MAX_N });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NaiveRecursive,
    MemoRecursive,
    Iterative,
    TailRecursive,
    LinearMatrix,
    FastMatrix,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::NaiveRecursive,
        Strategy::MemoRecursive,
        Strategy::Iterative,
        Strategy::TailRecursive,
        Strategy::LinearMatrix,
        Strategy::FastMatrix,
    ];

    pub fn compute(self, n: u64) -> Result<u64, FibError> {
        match self {
            Strategy::NaiveRecursive => naive_recursive(n),
            Strategy::MemoRecursive => memo_recursive(n),
            Strategy::Iterative => iterative(n),
            Strategy::TailRecursive => tail_recursive(n),
            Strategy::LinearMatrix => linear_matrix(n),
            Strategy::FastMatrix => fast_matrix(n),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::NaiveRecursive => "naive_recursive",
            Strategy::MemoRecursive => "memo_recursive",
            Strategy::Iterative => "iterative",
            Strategy::TailRecursive => "tail_recursive",
            Strategy::LinearMatrix => "linear_matrix",
            Strategy::FastMatrix => "fast_matrix",
        }
    }

    /// Time complexity in matrix multiplies or additions.
    pub fn complexity(self) -> &'static str {
        match self {
            Strategy::NaiveRecursive => "O(2^n)",
            Strategy::FastMatrix => "O(log n)",
            _ => "O(n)",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| FibError::UnknownStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIRST_TERMS: [u64; 12] = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

    #[test]
    fn strategies_match_sequence_prefix() {
        for strategy in Strategy::ALL {
            let computed: Vec<u64> = (0..FIRST_TERMS.len() as u64)
                .map(|n| strategy.compute(n).unwrap())
                .collect();
            assert_eq!(computed, FIRST_TERMS.to_vec(), "{strategy}");
        }
    }

    #[test]
    fn names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!(
            "bogus".parse::<Strategy>(),
            Err(FibError::UnknownStrategy("bogus".to_string()))
        );
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Strategy::FastMatrix).unwrap();
        assert_eq!(json, "\"fast_matrix\"");
        let back: Strategy = serde_json::from_str("\"tail_recursive\"").unwrap();
        assert_eq!(back, Strategy::TailRecursive);
    }

    #[test]
    fn overflow_is_reported_past_max_n() {
        for strategy in Strategy::ALL {
            assert_eq!(
                strategy.compute(MAX_N + 1),
                Err(FibError::Overflow { n: MAX_N + 1, max: MAX_N })
            );
        }
    }

    #[test]
    fn complexity_labels() {
        assert_eq!(Strategy::NaiveRecursive.complexity(), "O(2^n)");
        assert_eq!(Strategy::Iterative.complexity(), "O(n)");
        assert_eq!(Strategy::FastMatrix.complexity(), "O(log n)");
    }
}
