//! Ready-made hash functions built on `foldhash`.
//!
//! These satisfy the `HashFn` contract so a table can be constructed without
//! writing hash functions by hand.

use core::hash::BuildHasher;

use foldhash::fast::FixedState;

// Distinct fixed seeds so the two functions disagree on clustered keys.
const PRIMARY_SEED: u64 = 0xF0E1_D2C3_B4A5_9687;
const SECONDARY_SEED: u64 = 0x1032_5476_98BA_DCFE;

/// A primary hash function: maps `key` into `[0, table_size)`.
///
/// Deterministic across runs (fixed seed), so tables hashed with it place
/// keys reproducibly.
///
/// # Examples
///
/// ```rust
/// use oa_table::hashers::fold_primary;
///
/// let index = fold_primary("some key", 31);
/// assert!(index < 31);
/// assert_eq!(index, fold_primary("some key", 31));
/// ```
pub fn fold_primary(key: &str, table_size: usize) -> usize {
    (FixedState::with_seed(PRIMARY_SEED).hash_one(key) % table_size as u64) as usize
}

/// A secondary hash function: maps `key` into `[0, modulus)`.
///
/// Intended to be passed `capacity - 1` as the modulus; the table shifts the
/// result up by one to obtain a nonzero probe stride.
pub fn fold_secondary(key: &str, modulus: usize) -> usize {
    (FixedState::with_seed(SECONDARY_SEED).hash_one(key) % modulus as u64) as usize
}
