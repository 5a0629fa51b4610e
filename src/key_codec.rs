//! Turning keys into slot indices.
//!
//! A key is hashed through a [`BuildHasher`], folded down to 32 bits, and then
//! reduced modulo the table size to find its home slot. Hash quality only
//! affects probe lengths: key equality is always decided by `K: Eq`.

use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hash builder used by [`HashMap::new`](crate::HashMap::new).
        ///
        /// This is `foldhash::fast::RandomState` with the `foldhash` feature
        /// enabled, and [`Crc32`] otherwise.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else {
        /// The hash builder used by [`HashMap::new`](crate::HashMap::new).
        ///
        /// This is `foldhash::fast::RandomState` with the `foldhash` feature
        /// enabled, and [`Crc32`] otherwise.
        pub type DefaultHashBuilder = Crc32;
    }
}

/// Reversed IEEE 802.3 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

const CRC32_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// A streaming IEEE CRC-32 over every byte written to it.
///
/// Deterministic and unkeyed, so hashes are stable across runs. It is not
/// resistant to adversarial keys.
#[derive(Debug, Clone, Copy)]
pub struct Crc32Hasher {
    state: u32,
}

impl Default for Crc32Hasher {
    fn default() -> Self {
        Self { state: !0 }
    }
}

impl Hasher for Crc32Hasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let index = ((self.state ^ byte as u32) & 0xFF) as usize;
            self.state = CRC32_TABLE[index] ^ (self.state >> 8);
        }
    }

    fn finish(&self) -> u64 {
        (!self.state) as u64
    }
}

/// Builder for [`Crc32Hasher`].
///
/// # Examples
///
/// ```rust
/// use closed_hash::HashMap;
/// use closed_hash::key_codec::Crc32;
///
/// let mut map = HashMap::with_hasher(Crc32);
/// map.save("Gato", "miau");
/// assert_eq!(map.get(&"Gato"), Ok(&"miau"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32;

impl BuildHasher for Crc32 {
    type Hasher = Crc32Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Crc32Hasher::default()
    }
}

/// Hashes `key` with `builder` and folds the result to 32 bits.
#[inline]
pub fn hash_key<K, S>(builder: &S, key: &K) -> u32
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    let hash = builder.hash_one(key);
    ((hash >> 32) ^ hash) as u32
}

/// Reduces a key hash to its starting slot in a table of `size` slots.
#[inline(always)]
pub fn home_slot(hash: u32, size: usize) -> usize {
    debug_assert!(size > 0);
    hash as usize % size
}
