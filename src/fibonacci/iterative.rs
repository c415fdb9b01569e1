use super::{check_bound, FibError};

/// Advances a `(first, second)` pair `n - 1` times.
pub fn iterative(n: u64) -> Result<u64, FibError> {
    check_bound(n)?;
    if n == 0 {
        return Ok(0);
    }
    let mut first = 0u64;
    let mut second = 1u64;
    for _ in 1..n {
        let next = first + second;
        first = second;
        second = next;
    }
    Ok(second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci::MAX_N;

    #[test]
    fn iterative_values() {
        assert_eq!(iterative(0), Ok(0));
        assert_eq!(iterative(1), Ok(1));
        assert_eq!(iterative(2), Ok(1));
        assert_eq!(iterative(10), Ok(55));
        assert_eq!(iterative(MAX_N), Ok(12200160415121876738));
    }
}
