//! The open-addressing hash table core: slot model, double-hash probing,
//! growth, and the two deletion policies.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::mem;
use core::str;

use crate::config::Config;
use crate::config::DeletionPolicy;
use crate::error::Error;
use crate::prime::closest_prime_at_least;

/// Maximum key length in bytes, including one reserved terminator byte.
///
/// Keys longer than `MAX_KEY_LEN - 1` bytes are silently truncated, on a
/// UTF-8 boundary, by every operation. Truncation is uniform, so a long key
/// and its truncated prefix are the same key.
pub const MAX_KEY_LEN: usize = 32;

/// A key stored inline in a slot: a zero-padded fixed buffer plus a length.
///
/// Comparison is bytewise; the padding is always zero so derived equality is
/// exact.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyBuf {
    len: u8,
    bytes: [u8; MAX_KEY_LEN],
}

impl KeyBuf {
    fn new(key: &str) -> Self {
        let key = truncate_key(key);
        let mut bytes = [0u8; MAX_KEY_LEN];
        bytes[..key.len()].copy_from_slice(key.as_bytes());
        KeyBuf {
            len: key.len() as u8,
            bytes,
        }
    }

    /// The key text, after any truncation that was applied on the way in.
    pub fn as_str(&self) -> &str {
        // SAFETY: `bytes[..len]` was copied verbatim from a `&str` cut on a
        // char boundary in `new`, so it is valid UTF-8.
        unsafe { str::from_utf8_unchecked(&self.bytes[..usize::from(self.len)]) }
    }
}

impl fmt::Debug for KeyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Longest prefix of `key` that fits `MAX_KEY_LEN - 1` bytes without
/// splitting a UTF-8 sequence.
fn truncate_key(key: &str) -> &str {
    if key.len() < MAX_KEY_LEN {
        return key;
    }
    let mut end = MAX_KEY_LEN - 1;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    &key[..end]
}

/// The state of a slot, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Holds a live key/value pair.
    Occupied,
    /// Never held a pair since the last clear/growth, or vacated under PACK.
    Unoccupied,
    /// Tombstone: a pair was removed here under MARK. The key is retained so
    /// probe walks can tell "deleted" from "never inserted".
    Deleted,
}

/// One cell of the backing array.
///
/// The value is live, and will be released through the free callback, if and
/// only if the slot is `Occupied` - the enum makes that invariant structural.
#[derive(Debug, Clone)]
pub enum Slot<V> {
    /// Empty slot; terminates probe walks.
    Unoccupied,
    /// Live pair owned by the table.
    Occupied {
        /// The stored key.
        key: KeyBuf,
        /// The client payload.
        value: V,
    },
    /// Tombstone left by a MARK-policy removal.
    Deleted {
        /// Key of the removed pair.
        key: KeyBuf,
    },
}

impl<V> Slot<V> {
    /// The slot's state.
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Unoccupied => SlotState::Unoccupied,
            Slot::Occupied { .. } => SlotState::Occupied,
            Slot::Deleted { .. } => SlotState::Deleted,
        }
    }

    /// The stored key, if the slot is occupied or a tombstone.
    pub fn key(&self) -> Option<&str> {
        match self {
            Slot::Unoccupied => None,
            Slot::Occupied { key, .. } | Slot::Deleted { key } => Some(key.as_str()),
        }
    }

    /// The stored value, if the slot is occupied.
    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A snapshot of the table's diagnostic counters.
///
/// The counters are observational only: the algorithms never read them. The
/// probe counter advances on every probe step, including read-only walks
/// during `find`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of occupied slots.
    pub count: usize,
    /// Current capacity of the slot array.
    pub capacity: usize,
    /// Total probe steps performed since construction.
    pub probes: u64,
    /// Number of times the table grew.
    pub expansions: u64,
}

/// An open-addressing hash table from short string keys to values of type
/// `V`.
///
/// All entries live in one contiguous slot array. Collisions are resolved by
/// double hashing: the primary hash picks the starting index, the secondary
/// hash (plus one) picks the stride. The capacity is always prime, so every
/// stride is co-prime with it and a probe walk of `capacity` steps visits
/// every slot exactly once.
///
/// The table is strictly sequential; wrap it in external synchronization if
/// it must be shared.
///
/// # Examples
///
/// ```rust
/// use oa_table::Config;
/// use oa_table::HashTable;
///
/// fn byte_sum(key: &str, table_size: usize) -> usize {
///     key.bytes().map(usize::from).sum::<usize>() % table_size
/// }
///
/// let mut table = HashTable::new(Config::new(7, byte_sum));
/// table.insert("a", 1).unwrap();
/// table.insert("b", 2).unwrap();
/// assert_eq!(table.find("a"), Ok(&1));
/// assert_eq!(table.find("b"), Ok(&2));
/// assert_eq!(table.len(), 2);
/// ```
pub struct HashTable<V> {
    config: Config<V>,
    slots: Vec<Slot<V>>,
    count: usize,
    // Mutable side-channel: advances during `&self` lookups. Single-threaded
    // by contract, so a plain Cell suffices.
    probes: Cell<u64>,
    expansions: u64,
}

impl<V> HashTable<V> {
    /// Creates a table from a configuration, with all slots unoccupied.
    ///
    /// The configured `initial_capacity` must be prime; the table does not
    /// validate it.
    pub fn new(config: Config<V>) -> Self {
        debug_assert!(config.initial_capacity > 0);
        let mut slots = Vec::new();
        slots.resize_with(config.initial_capacity, || Slot::Unoccupied);
        HashTable {
            config,
            slots,
            count: 0,
            probes: Cell::new(0),
            expansions: 0,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current length of the slot array. Always prime.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Ratio of occupied slots to capacity.
    ///
    /// Immediately after any successful insert this is at most the
    /// configured `max_load_factor`.
    pub fn load_factor(&self) -> f64 {
        if self.slots.is_empty() {
            0.0
        } else {
            self.count as f64 / self.slots.len() as f64
        }
    }

    /// The deletion policy the table was configured with.
    pub fn policy(&self) -> DeletionPolicy {
        self.config.deletion_policy
    }

    /// A snapshot of the diagnostic counters.
    pub fn stats(&self) -> Stats {
        Stats {
            count: self.count,
            capacity: self.slots.len(),
            probes: self.probes.get(),
            expansions: self.expansions,
        }
    }

    /// Read-only view of the slot array, for diagnostics and testing.
    pub fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }

    /// Returns an iterator over the occupied `(key, value)` pairs, in slot
    /// order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Looks up `key` and returns a reference to its value.
    ///
    /// The walk stops at the first unoccupied slot (the key was never
    /// inserted along this path) or at a tombstone carrying the same key
    /// (the key was removed); both fail with [`Error::ItemNotFound`]. No
    /// mutation, no growth; only the probe counter advances.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use oa_table::Config;
    /// # use oa_table::Error;
    /// # use oa_table::HashTable;
    /// #
    /// # fn byte_sum(key: &str, table_size: usize) -> usize {
    /// #     key.bytes().map(usize::from).sum::<usize>() % table_size
    /// # }
    /// #
    /// let mut table = HashTable::new(Config::new(7, byte_sum));
    /// table.insert("a", 1).unwrap();
    /// assert_eq!(table.find("a"), Ok(&1));
    /// assert_eq!(table.find("z"), Err(Error::ItemNotFound));
    /// ```
    pub fn find(&self, key: &str) -> Result<&V, Error> {
        let key = KeyBuf::new(key);
        let index = self.locate(&key)?;
        match &self.slots[index] {
            Slot::Occupied { value, .. } => Ok(value),
            _ => Err(Error::ItemNotFound),
        }
    }

    /// Looks up `key` and returns a mutable reference to its value.
    ///
    /// Same walk and failure rules as [`find`](HashTable::find).
    pub fn find_mut(&mut self, key: &str) -> Result<&mut V, Error> {
        let key = KeyBuf::new(key);
        let index = self.locate(&key)?;
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Ok(value),
            _ => Err(Error::ItemNotFound),
        }
    }

    /// Returns `true` if `key` resolves to a live entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_ok()
    }

    /// Inserts a key/value pair.
    ///
    /// If the insertion would push the load factor above the configured
    /// maximum, the table grows first (which re-hashes every entry against
    /// the new capacity). The pair is placed in the first unoccupied slot of
    /// the key's probe sequence.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] if the key is already logically present: an
    ///   occupied slot with the same key, or a MARK tombstone for it.
    ///   Tombstoned keys are never reused; growth is what reclaims them.
    /// - [`Error::OutOfMemory`] if growth cannot allocate, or if a full probe
    ///   walk finds no usable slot (only reachable when tombstones saturate
    ///   the table).
    ///
    /// On any error the contents are unchanged; the probe counter, and any
    /// growth performed by the pre-check, persist.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use oa_table::Config;
    /// # use oa_table::Error;
    /// # use oa_table::HashTable;
    /// #
    /// # fn byte_sum(key: &str, table_size: usize) -> usize {
    /// #     key.bytes().map(usize::from).sum::<usize>() % table_size
    /// # }
    /// #
    /// let mut table = HashTable::new(Config::new(7, byte_sum));
    /// assert_eq!(table.insert("a", 1), Ok(()));
    /// assert_eq!(table.insert("a", 2), Err(Error::DuplicateKey));
    /// assert_eq!(table.find("a"), Ok(&1));
    /// ```
    pub fn insert(&mut self, key: &str, value: V) -> Result<(), Error> {
        if self.count + 1 > self.slots.len()
            || (self.count + 1) as f64 / self.slots.len() as f64 > self.config.max_load_factor
        {
            self.grow()?;
        }

        let key = KeyBuf::new(key);
        let capacity = self.slots.len();
        let (mut index, stride) = probe_origin(&self.config, capacity, key.as_str());

        let mut target = None;
        for _ in 0..capacity {
            self.probes.set(self.probes.get() + 1);
            match &self.slots[index] {
                Slot::Occupied { key: existing, .. } if *existing == key => {
                    return Err(Error::DuplicateKey);
                }
                // A matching tombstone means the key is logically still
                // present under MARK semantics; it is never reused.
                Slot::Deleted { key: existing } if *existing == key => {
                    return Err(Error::DuplicateKey);
                }
                Slot::Unoccupied => {
                    target = Some(index);
                    break;
                }
                _ => {}
            }
            index = (index + stride) % capacity;
        }

        match target {
            Some(index) => {
                self.slots[index] = Slot::Occupied { key, value };
                self.count += 1;
                Ok(())
            }
            None => Err(Error::OutOfMemory),
        }
    }

    /// Removes the entry for `key`.
    ///
    /// The value is handed to the configured free callback, or dropped if
    /// none was configured. Under [`DeletionPolicy::Mark`] the slot becomes a
    /// tombstone that retains the key; under [`DeletionPolicy::Pack`] the
    /// slot is vacated and every surviving entry whose probe path crossed it
    /// is re-placed, so no tombstone survives. With stride 1 that is the
    /// contiguous run of occupied slots after the vacated one; with a
    /// secondary hash configured the affected entries can sit anywhere, so
    /// the whole array is re-placed.
    ///
    /// # Errors
    ///
    /// [`Error::ItemNotFound`] under the same conditions as
    /// [`find`](HashTable::find).
    pub fn remove(&mut self, key: &str) -> Result<(), Error> {
        let key = KeyBuf::new(key);
        let index = self.locate(&key)?;

        let replacement = match self.config.deletion_policy {
            DeletionPolicy::Mark => Slot::Deleted { key },
            DeletionPolicy::Pack => Slot::Unoccupied,
        };
        if let Slot::Occupied { value, .. } = mem::replace(&mut self.slots[index], replacement) {
            self.release(value);
        }
        self.count -= 1;

        if self.config.deletion_policy == DeletionPolicy::Pack {
            if self.config.secondary_hash.is_some() {
                self.replace_all();
            } else {
                self.compact_cluster(index);
            }
        }
        Ok(())
    }

    /// Removes all entries, releasing every occupied value through the free
    /// callback (or dropping it). Capacity is unchanged; tombstones are
    /// cleared too.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Slot::Occupied { value, .. } = mem::replace(slot, Slot::Unoccupied) {
                match self.config.free_proc {
                    Some(free) => free(value),
                    None => drop(value),
                }
            }
        }
        self.count = 0;
    }

    /// Shared location walk implementing the find/remove stop rules.
    fn locate(&self, key: &KeyBuf) -> Result<usize, Error> {
        let capacity = self.slots.len();
        let (mut index, stride) = probe_origin(&self.config, capacity, key.as_str());
        for _ in 0..capacity {
            self.probes.set(self.probes.get() + 1);
            match &self.slots[index] {
                Slot::Unoccupied => return Err(Error::ItemNotFound),
                Slot::Deleted { key: existing } if existing == key => {
                    return Err(Error::ItemNotFound);
                }
                Slot::Occupied { key: existing, .. } if existing == key => return Ok(index),
                _ => {}
            }
            index = (index + stride) % capacity;
        }
        Err(Error::ItemNotFound)
    }

    /// Grows the slot array to the smallest prime at least `growth_factor`
    /// times the current capacity and re-places every occupied entry.
    /// Tombstones are dropped; growth is the only path that reclaims
    /// tombstone space under MARK.
    fn grow(&mut self) -> Result<(), Error> {
        let old_capacity = self.slots.len();
        let scaled = self.config.growth_factor * old_capacity as f64;
        let mut target = scaled as usize;
        if (target as f64) < scaled {
            target += 1;
        }
        let new_capacity = closest_prime_at_least(target);

        let mut new_slots = Vec::new();
        new_slots
            .try_reserve_exact(new_capacity)
            .map_err(|_| Error::OutOfMemory)?;
        new_slots.resize_with(new_capacity, || Slot::Unoccupied);

        // Nothing can fail past this point; the table is untouched until the
        // new array exists, which gives the strong guarantee on allocation
        // failure.
        for index in 0..old_capacity {
            if let Slot::Occupied { key, value } =
                mem::replace(&mut self.slots[index], Slot::Unoccupied)
            {
                Self::place(&mut new_slots, &self.config, &self.probes, key, value);
            }
        }
        self.slots = new_slots;
        self.expansions += 1;
        Ok(())
    }

    /// Backward-shift compaction after a PACK removal under linear probing:
    /// walk the contiguous run of occupied slots following the vacated index
    /// and re-place each pair, which finds it a home consistent with the
    /// now-shorter cluster. Only sound for stride 1, where a probe path that
    /// crosses the vacated slot cannot leave the cluster.
    fn compact_cluster(&mut self, vacated: usize) {
        let capacity = self.slots.len();
        let mut index = (vacated + 1) % capacity;
        for _ in 0..capacity {
            if !matches!(self.slots[index], Slot::Occupied { .. }) {
                break;
            }
            if let Slot::Occupied { key, value } =
                mem::replace(&mut self.slots[index], Slot::Unoccupied)
            {
                Self::place(&mut self.slots, &self.config, &self.probes, key, value);
            }
            index = (index + 1) % capacity;
        }
    }

    /// Rebuilds the slot array at the same capacity, re-placing every
    /// occupied entry. Under double hashing the slot vacated by a PACK
    /// removal can lie on the probe path of entries far from the adjacent
    /// run, with a stride of their own, so the contiguous shift is not
    /// enough; placing everything against an empty array restores every
    /// path.
    fn replace_all(&mut self) {
        let capacity = self.slots.len();
        let mut new_slots = Vec::new();
        new_slots.resize_with(capacity, || Slot::Unoccupied);
        for index in 0..capacity {
            if let Slot::Occupied { key, value } =
                mem::replace(&mut self.slots[index], Slot::Unoccupied)
            {
                Self::place(&mut new_slots, &self.config, &self.probes, key, value);
            }
        }
        self.slots = new_slots;
    }

    /// Plain placement walk shared by growth and compaction: no duplicate
    /// detection, fills the first unoccupied slot of the key's sequence.
    fn place(slots: &mut [Slot<V>], config: &Config<V>, probes: &Cell<u64>, key: KeyBuf, value: V) {
        let capacity = slots.len();
        let (mut index, stride) = probe_origin(config, capacity, key.as_str());
        for _ in 0..capacity {
            probes.set(probes.get() + 1);
            if matches!(slots[index], Slot::Unoccupied) {
                slots[index] = Slot::Occupied { key, value };
                return;
            }
            index = (index + stride) % capacity;
        }
        // Callers guarantee an unoccupied slot is reachable: growth allocates
        // more slots than entries, and compaction just vacated one.
        debug_assert!(false, "placement walk found no unoccupied slot");
    }

    fn release(&self, value: V) {
        match self.config.free_proc {
            Some(free) => free(value),
            None => drop(value),
        }
    }
}

/// Starting index and stride for a key's probe sequence.
///
/// The primary hash is reduced modulo `capacity`; the secondary hash is
/// reduced modulo `capacity - 1` and shifted up by one, so the stride is in
/// `[1, capacity - 1]` and co-prime with the prime capacity. Without a
/// secondary hash the stride is 1 (linear probing).
fn probe_origin<V>(config: &Config<V>, capacity: usize, key: &str) -> (usize, usize) {
    let origin = (config.primary_hash)(key, capacity) % capacity;
    let stride = match config.secondary_hash {
        Some(secondary) if capacity > 1 => secondary(key, capacity - 1) % (capacity - 1) + 1,
        _ => 1,
    };
    (origin, stride)
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<V: Clone> Clone for HashTable<V> {
    fn clone(&self) -> Self {
        HashTable {
            config: self.config,
            slots: self.slots.clone(),
            count: self.count,
            probes: Cell::new(self.probes.get()),
            expansions: self.expansions,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("count", &self.count)
            .field("capacity", &self.slots.len())
            .field("policy", &self.config.deletion_policy)
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, V>(&'a HashTable<V>);

impl<V: fmt::Debug> fmt::Debug for DebugEntries<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// An iterator over the occupied `(key, value)` pairs of a [`HashTable`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied { key, value } = slot {
                return Some((key.as_str(), value));
            }
        }
        None
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (&'a str, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
