#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod hash_table;

#[cfg(feature = "foldhash")]
pub mod hashers;

pub mod prime;

pub use config::Config;
pub use config::DeletionPolicy;
pub use config::FreeFn;
pub use config::HashFn;
pub use error::Error;
pub use hash_table::HashTable;
pub use hash_table::Slot;
pub use hash_table::SlotState;
pub use hash_table::Stats;
