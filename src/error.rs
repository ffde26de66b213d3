//! The error taxonomy surfaced by table operations.

use core::fmt;

/// The error taxonomy of the table.
///
/// No recovery is attempted internally; every failure is surfaced to the
/// caller, and the table is left in the state it had before the call (the
/// probe counter may still have advanced, it is diagnostic state only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `insert` found the key already logically present: either an occupied
    /// slot with the same key, or a `MARK`-policy tombstone for it.
    DuplicateKey,
    /// `find` or `remove` could not resolve the key to a live occupied slot.
    ItemNotFound,
    /// Allocation failed during growth, or an insert exhausted a full probe
    /// walk without finding a usable slot.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateKey => f.write_str("key is already present in the table"),
            Error::ItemNotFound => f.write_str("key not found in the table"),
            Error::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::DuplicateKey.to_string(),
            "key is already present in the table"
        );
        assert_eq!(Error::ItemNotFound.to_string(), "key not found in the table");
        assert_eq!(Error::OutOfMemory.to_string(), "out of memory");
    }
}
