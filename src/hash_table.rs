use alloc::vec::Vec;

use crate::key_codec::home_slot;

/// One position in the slot array.
#[derive(Clone)]
pub(crate) enum Slot<K, V> {
    /// Never written since the last resize.
    Empty,
    /// A live entry. `hash` is the folded key hash, kept so a resize can place
    /// the entry without hashing the key again.
    Occupied { hash: u32, key: K, value: V },
    /// Tombstone: vacated by a removal. Probes continue through it and
    /// insertions never reuse it.
    Deleted,
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline(always)]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}

/// Low-level statistics for a [`HashMap`](crate::HashMap).
///
/// Returned by [`HashMap::stats`](crate::HashMap::stats).
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of live entries.
    pub count: usize,
    /// Number of tombstones.
    pub tombstones: usize,
    /// Number of slots.
    pub size: usize,
    /// `(count + tombstones) / size`.
    pub load_factor: f64,
    /// Largest distance, in slots, between a live entry and its home slot.
    pub longest_displacement: usize,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Table Statistics ===");
        println!(
            "Entries: {} live, {} tombstones in {} slots",
            self.count, self.tombstones, self.size
        );
        println!("Load factor: {:.2}%", self.load_factor * 100.0);
        println!("Longest displacement: {} slots", self.longest_displacement);
    }
}

/// Result of walking a probe sequence.
pub(crate) enum Probe {
    /// An occupied slot holding an equal key.
    Found(usize),
    /// The first empty slot of the sequence; no equal key precedes it.
    Vacant(usize),
}

/// Flat slot array with linear probing.
///
/// Keeps the `count` and `deleted` bookkeeping but makes no resize decisions;
/// those belong to [`HashMap`](crate::HashMap). Callers must keep at least one
/// `Empty` slot at all times, which is what bounds every probe to `size`
/// steps.
#[derive(Clone)]
pub(crate) struct HashTable<K, V> {
    slots: Vec<Slot<K, V>>,
    count: usize,
    deleted: usize,
}

impl<K, V> HashTable<K, V> {
    pub(crate) fn with_size(size: usize) -> Self {
        debug_assert!(size > 1);
        Self {
            slots: empty_slots(size),
            count: 0,
            deleted: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub(crate) fn tombstones(&self) -> usize {
        self.deleted
    }

    /// Slots that are not `Empty`: the numerator of the load factor.
    #[inline(always)]
    pub(crate) fn used(&self) -> usize {
        self.count + self.deleted
    }

    #[inline(always)]
    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline(always)]
    fn next_index(&self, index: usize) -> usize {
        if index + 1 == self.slots.len() {
            0
        } else {
            index + 1
        }
    }

    /// Walks the probe sequence for `hash` until it meets a matching key or
    /// the first `Empty` slot.
    pub(crate) fn probe(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Probe {
        debug_assert!(self.used() < self.size());

        let mut index = home_slot(hash, self.size());
        loop {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(index),
                Slot::Occupied {
                    hash: stored, key, ..
                } if *stored == hash && eq(key) => return Probe::Found(index),
                _ => index = self.next_index(index),
            }
        }
    }

    #[inline]
    pub(crate) fn find(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<usize> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) => None,
        }
    }

    /// Writes a new entry into the `Empty` slot returned by [`probe`].
    ///
    /// [`probe`]: HashTable::probe
    pub(crate) fn insert_vacant(&mut self, index: usize, hash: u32, key: K, value: V) {
        debug_assert!(matches!(self.slots[index], Slot::Empty));
        self.slots[index] = Slot::Occupied { hash, key, value };
        self.count += 1;
    }

    /// The entry at an index previously returned as [`Probe::Found`].
    pub(crate) fn entry_at(&self, index: usize) -> Option<(&K, &V)> {
        self.slots.get(index).and_then(Slot::entry)
    }

    pub(crate) fn value_mut_at(&mut self, index: usize) -> Option<&mut V> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Turns an occupied slot into a tombstone and hands back its entry.
    pub(crate) fn take(&mut self, index: usize) -> Option<(K, V)> {
        if !self.slots.get(index).is_some_and(Slot::is_occupied) {
            return None;
        }

        match core::mem::replace(&mut self.slots[index], Slot::Deleted) {
            Slot::Occupied { key, value, .. } => {
                self.count -= 1;
                self.deleted += 1;
                Some((key, value))
            }
            _ => None,
        }
    }

    /// Replaces the slot array with `size` fresh slots and re-places every
    /// live entry. Tombstones are dropped.
    pub(crate) fn rehash(&mut self, size: usize) {
        debug_assert!(self.count < size);

        let old = core::mem::replace(&mut self.slots, empty_slots(size));
        self.deleted = 0;
        for slot in old {
            if let Slot::Occupied { hash, key, value } = slot {
                self.place(hash, key, value);
            }
        }
    }

    /// Inserts an entry known to be absent. Only used while rehashing, where
    /// every key is already unique.
    fn place(&mut self, hash: u32, key: K, value: V) {
        let mut index = home_slot(hash, self.size());
        while !matches!(self.slots[index], Slot::Empty) {
            index = self.next_index(index);
        }
        self.slots[index] = Slot::Occupied { hash, key, value };
    }

    /// Drops every entry and starts over with `size` empty slots.
    pub(crate) fn reset(&mut self, size: usize) {
        self.slots = empty_slots(size);
        self.count = 0;
        self.deleted = 0;
    }

    /// Consumes the table, returning its slots and live entry count.
    pub(crate) fn into_slots(self) -> (Vec<Slot<K, V>>, usize) {
        (self.slots, self.count)
    }

    /// Largest distance between any live entry and its home slot.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn longest_displacement(&self) -> usize {
        let size = self.size();
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { hash, .. } => {
                    Some((index + size - home_slot(*hash, size)) % size)
                }
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

fn empty_slots<K, V>(size: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(size);
    slots.resize_with(size, || Slot::Empty);
    slots
}
