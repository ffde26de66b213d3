//! Construction-time configuration for [`HashTable`].
//!
//! A [`Config`] is immutable once the table is built. Hash functions and the
//! free callback are plain function pointers, so capture-free closures
//! coerce directly and the config stays `Copy` for any value type.
//!
//! [`HashTable`]: crate::HashTable

/// A client-supplied hash function.
///
/// Maps a key and a modulus to an index in `[0, modulus)`. The primary hash
/// is called with the table capacity as the modulus; the secondary hash is
/// called with `capacity - 1` and its result is shifted up by one to form a
/// nonzero probe stride. Must be deterministic for a given key and modulus.
pub type HashFn = fn(&str, usize) -> usize;

/// A client-supplied free callback.
///
/// Invoked exactly once per value whose ownership the table relinquishes:
/// during `remove`, `clear`, and at table destruction. Never invoked by a
/// successful `find`. Without one, values are simply dropped.
pub type FreeFn<V> = fn(V);

/// The policy applied when an item is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Leave a tombstone behind. The slot keeps the removed key so later
    /// walks can tell "deleted" from "never inserted", and an insert of the
    /// same key fails with `DuplicateKey` until the table grows.
    Mark,
    /// Vacate the slot immediately and backward-shift the rest of the
    /// cluster so no tombstone survives the removal.
    Pack,
}

/// Configuration for a [`HashTable`], fixed at construction.
///
/// `initial_capacity` must be prime; the table does not validate or correct
/// it. A composite capacity breaks the probe-permutation guarantee and
/// lookups may fail to terminate at the right slot.
///
/// [`HashTable`]: crate::HashTable
///
/// # Examples
///
/// ```rust
/// use oa_table::Config;
/// use oa_table::DeletionPolicy;
/// # use oa_table::hashers;
///
/// let config: Config<u64> = Config::new(31, hashers::fold_primary)
///     .with_secondary_hash(hashers::fold_secondary)
///     .with_max_load_factor(0.75)
///     .with_deletion_policy(DeletionPolicy::Mark);
/// ```
pub struct Config<V> {
    /// Starting capacity of the slot array. Caller obligation: prime.
    pub initial_capacity: usize,
    /// Primary hash function, maps into `[0, capacity)`.
    pub primary_hash: HashFn,
    /// Optional secondary hash for the probe stride. Absent means linear
    /// probing with stride 1.
    pub secondary_hash: Option<HashFn>,
    /// Load factor at which an insert grows the table first. Default 0.5.
    pub max_load_factor: f64,
    /// Capacity multiplier applied during growth. Default 2.0.
    pub growth_factor: f64,
    /// What `remove` leaves behind. Default [`DeletionPolicy::Pack`].
    pub deletion_policy: DeletionPolicy,
    /// Optional callback that consumes relinquished values.
    pub free_proc: Option<FreeFn<V>>,
}

impl<V> Config<V> {
    /// Creates a configuration with the given capacity and primary hash and
    /// the default settings for everything else: no secondary hash, max load
    /// factor 0.5, growth factor 2.0, `Pack` deletion, no free callback.
    pub fn new(initial_capacity: usize, primary_hash: HashFn) -> Self {
        debug_assert!(initial_capacity > 0);
        Config {
            initial_capacity,
            primary_hash,
            secondary_hash: None,
            max_load_factor: 0.5,
            growth_factor: 2.0,
            deletion_policy: DeletionPolicy::Pack,
            free_proc: None,
        }
    }

    /// Sets the secondary hash function used to derive the probe stride.
    pub fn with_secondary_hash(mut self, secondary_hash: HashFn) -> Self {
        self.secondary_hash = Some(secondary_hash);
        self
    }

    /// Sets the maximum load factor. Must be in `(0, 1]`.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        debug_assert!(max_load_factor > 0.0 && max_load_factor <= 1.0);
        self.max_load_factor = max_load_factor;
        self
    }

    /// Sets the growth factor. Must be greater than 1.0 or growth stalls.
    pub fn with_growth_factor(mut self, growth_factor: f64) -> Self {
        debug_assert!(growth_factor > 1.0);
        self.growth_factor = growth_factor;
        self
    }

    /// Sets the deletion policy.
    pub fn with_deletion_policy(mut self, deletion_policy: DeletionPolicy) -> Self {
        self.deletion_policy = deletion_policy;
        self
    }

    /// Sets the free callback that consumes relinquished values.
    pub fn with_free_proc(mut self, free_proc: FreeFn<V>) -> Self {
        self.free_proc = Some(free_proc);
        self
    }
}

// Manual impls: `#[derive]` would bound `V: Clone`/`V: Copy`, but every field
// is a pointer or scalar regardless of `V`.
impl<V> Clone for Config<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Config<V> {}

impl<V> core::fmt::Debug for Config<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("initial_capacity", &self.initial_capacity)
            .field("has_secondary_hash", &self.secondary_hash.is_some())
            .field("max_load_factor", &self.max_load_factor)
            .field("growth_factor", &self.growth_factor)
            .field("deletion_policy", &self.deletion_policy)
            .field("has_free_proc", &self.free_proc.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_sum(key: &str, modulus: usize) -> usize {
        key.bytes().map(usize::from).sum::<usize>() % modulus
    }

    #[test]
    fn defaults() {
        let config: Config<i32> = Config::new(7, byte_sum);
        assert_eq!(config.initial_capacity, 7);
        assert!(config.secondary_hash.is_none());
        assert_eq!(config.max_load_factor, 0.5);
        assert_eq!(config.growth_factor, 2.0);
        assert_eq!(config.deletion_policy, DeletionPolicy::Pack);
        assert!(config.free_proc.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config: Config<i32> = Config::new(11, byte_sum)
            .with_secondary_hash(byte_sum)
            .with_max_load_factor(0.9)
            .with_growth_factor(3.0)
            .with_deletion_policy(DeletionPolicy::Mark);
        assert!(config.secondary_hash.is_some());
        assert_eq!(config.max_load_factor, 0.9);
        assert_eq!(config.growth_factor, 3.0);
        assert_eq!(config.deletion_policy, DeletionPolicy::Mark);
    }

    #[test]
    fn config_is_copy_for_non_clone_values() {
        struct NotClone;
        let config: Config<NotClone> = Config::new(7, byte_sum);
        let copied = config;
        assert_eq!(copied.initial_capacity, config.initial_capacity);
    }
}
