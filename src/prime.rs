//! Prime-finding support for table growth.
//!
//! The table keeps its capacity prime so that any probe stride in
//! `[1, capacity - 1]` is co-prime with the capacity and the double-hash
//! probe sequence permutes the whole slot array.

/// Returns the smallest prime greater than or equal to `n`.
///
/// Pure and allocation-free. Used by the table only when it grows, so the
/// trial-division cost is amortized over the insertions that triggered the
/// growth.
///
/// # Examples
///
/// ```rust
/// use oa_table::prime::closest_prime_at_least;
///
/// assert_eq!(closest_prime_at_least(14), 17);
/// assert_eq!(closest_prime_at_least(17), 17);
/// ```
pub fn closest_prime_at_least(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    // Trial division by 6k +/- 1 only.
    let mut divisor = 5;
    while divisor * divisor <= n {
        if n % divisor == 0 || n % (divisor + 2) == 0 {
            return false;
        }
        divisor += 6;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        for p in [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 97, 101] {
            assert!(is_prime(p), "{p} should be prime");
            assert_eq!(closest_prime_at_least(p), p);
        }
    }

    #[test]
    fn small_composites() {
        for c in [4, 6, 8, 9, 10, 12, 14, 15, 16, 21, 25, 27, 49, 100] {
            assert!(!is_prime(c), "{c} should be composite");
        }
    }

    #[test]
    fn rounds_up_to_the_next_prime() {
        assert_eq!(closest_prime_at_least(0), 2);
        assert_eq!(closest_prime_at_least(1), 2);
        assert_eq!(closest_prime_at_least(4), 5);
        assert_eq!(closest_prime_at_least(8), 11);
        assert_eq!(closest_prime_at_least(14), 17);
        assert_eq!(closest_prime_at_least(24), 29);
        assert_eq!(closest_prime_at_least(90), 97);
    }

    #[test]
    fn stride_walk_is_a_permutation() {
        // With a prime capacity, (h + i * stride) % capacity must visit
        // every index exactly once for every stride in [1, capacity - 1].
        for capacity in [2usize, 3, 5, 7, 11, 13, 17] {
            for stride in 1..capacity {
                let mut seen = alloc::vec![false; capacity];
                let mut idx = 0;
                for _ in 0..capacity {
                    assert!(!seen[idx], "revisited {idx} with stride {stride}");
                    seen[idx] = true;
                    idx = (idx + stride) % capacity;
                }
                assert!(seen.iter().all(|v| *v));
            }
        }
    }
}
