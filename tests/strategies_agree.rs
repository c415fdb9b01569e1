use fib_bench::fibonacci::{self, big, Strategy, MAX_N};
use fib_bench::FibError;
use num_bigint::BigUint;
use pretty_assertions::assert_eq;
use rand::Rng;

const SEQUENCE: [u64; 31] = [
    0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181, 6765, 10946, 17711, 28657,
    46368, 75025, 121393, 196418, 317811, 514229, 832040,
];

#[test]
fn all_strategies_match_the_canonical_sequence() {
    for strategy in Strategy::ALL {
        let computed: Vec<u64> = (0..=30).map(|n| strategy.compute(n).unwrap()).collect();
        assert_eq!(computed, SEQUENCE.to_vec(), "{strategy}");
    }
}

#[test]
fn concrete_scenarios() {
    for strategy in Strategy::ALL {
        assert_eq!(strategy.compute(0), Ok(0), "{strategy}");
        assert_eq!(strategy.compute(1), Ok(1), "{strategy}");
        assert_eq!(strategy.compute(2), Ok(1), "{strategy}");
        assert_eq!(strategy.compute(10), Ok(55), "{strategy}");
        assert_eq!(strategy.compute(20), Ok(6765), "{strategy}");
    }
}

#[test]
fn recurrence_holds_for_random_indices() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let n = rng.random_range(2..=MAX_N);
        for strategy in Strategy::ALL.into_iter().filter(|s| *s != Strategy::NaiveRecursive) {
            let fib = |k| strategy.compute(k).unwrap();
            assert_eq!(fib(n), fib(n - 1) + fib(n - 2), "{strategy} n = {n}");
        }
    }
}

#[test]
fn matrix_strategies_agree_everywhere_in_range() {
    for n in 0..=MAX_N {
        assert_eq!(fibonacci::linear_matrix(n), fibonacci::fast_matrix(n), "n = {n}");
    }
}

#[test]
fn repeated_calls_are_idempotent() {
    for strategy in Strategy::ALL {
        let first = strategy.compute(25);
        for _ in 0..5 {
            assert_eq!(strategy.compute(25), first);
        }
    }
}

#[test]
fn bounded_strategies_stop_at_the_u64_boundary() {
    let largest = 12200160415121876738u64;
    for strategy in Strategy::ALL.into_iter().filter(|s| *s != Strategy::NaiveRecursive) {
        assert_eq!(strategy.compute(MAX_N), Ok(largest), "{strategy}");
        assert_eq!(
            strategy.compute(MAX_N + 1),
            Err(FibError::Overflow { n: MAX_N + 1, max: MAX_N }),
            "{strategy}"
        );
    }
    assert_eq!(big::fast_matrix(MAX_N), BigUint::from(largest));
    assert_eq!(big::fast_matrix(100).to_string(), "354224848179261915075");
}
