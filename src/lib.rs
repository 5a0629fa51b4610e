#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

pub mod cursor;

/// A map using closed hashing with linear probing and tombstones.
///
/// This module provides the [`HashMap`] type together with its iterator
/// types.
pub mod hash_map;

mod hash_table;

pub mod key_codec;

pub mod policy;

pub use cursor::Cursor;
pub use error::Error;
pub use hash_map::HashMap;
#[cfg(feature = "stats")]
pub use hash_table::TableStats;
pub use policy::ResizePolicy;
