use super::{check_bound, FibError};

/// `f(n) = f(n-1) + f(n-2)` with no caching. Exponential time, keep `n` small.
pub fn naive_recursive(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    Ok(naive(n))
}

fn naive(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    naive(n - 1) + naive(n - 2)
}

/// Fills a memo array of size `n + 1` bottom-up through recursion and returns the last slot.
pub fn memo_recursive(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    let mut memo = vec![0u64; n as usize + 1];
    fill(&mut memo, n as usize);
    Ok(memo[n as usize])
}

fn fill(memo: &mut [u64], i: usize) {
    if i < 2 {
        memo[i] = i as u64;
        return;
    }
    fill(memo, i - 1);
    memo[i] = memo[i - 1] + memo[i - 2];
}

/// Carries `(remaining, first, second)` through a tail call until `remaining` hits zero.
pub fn tail_recursive(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    Ok(accumulate(n, 0, 1))
}

fn accumulate(remaining: u64, first: u64, second: u64) -> u64 {
    if remaining == 0 {
        return first;
    }
    // `second` runs one term ahead of `first`. At n = MAX_N the final lookahead
    // term is fib(94), which is never returned, so it is allowed to wrap.
    accumulate(remaining - 1, second, first.wrapping_add(second))
}
