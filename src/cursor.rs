//! External iteration over a [`HashMap`](crate::HashMap).

use crate::Error;
use crate::hash_table::Slot;

/// A cursor over the entries of a [`HashMap`](crate::HashMap), in slot order.
///
/// Unlike [`Iter`](crate::hash_map::Iter), the cursor separates "is there an
/// entry here", "read it", and "move on" into three calls, and reports misuse
/// as [`Error::IteratorExhausted`] instead of returning `None`.
///
/// # Invalidation
///
/// The cursor reads the map's slot array in place. A save or removal may
/// rebuild that array at a different size, after which a stored slot index
/// would point at an unrelated entry or past the end. The cursor therefore
/// holds a shared borrow of the map, and the compiler rejects any mutation
/// while it is alive:
///
/// ```compile_fail
/// use closed_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.save(1, "one");
///
/// let cursor = map.cursor();
/// map.save(2, "two");
/// assert!(cursor.has_next());
/// ```
///
/// To keep going after a mutation, drop the cursor and ask the map for a new
/// one.
///
/// # Examples
///
/// ```rust
/// use closed_hash::Error;
/// use closed_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.save("only", 1);
///
/// let mut cursor = map.cursor();
/// assert!(cursor.has_next());
/// assert_eq!(cursor.current(), Ok((&"only", &1)));
/// assert_eq!(cursor.advance(), Ok(()));
///
/// assert!(!cursor.has_next());
/// assert_eq!(cursor.current(), Err(Error::IteratorExhausted));
/// assert_eq!(cursor.advance(), Err(Error::IteratorExhausted));
/// ```
pub struct Cursor<'a, K, V> {
    slots: &'a [Slot<K, V>],
    /// Index of the current occupied slot, or `slots.len()` once exhausted.
    index: usize,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            index: self.index,
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(slots: &'a [Slot<K, V>]) -> Self {
        Self {
            slots,
            index: seek(slots, 0),
        }
    }

    /// Returns `true` while the cursor rests on an entry.
    ///
    /// Calling it any number of times does not move the cursor.
    pub fn has_next(&self) -> bool {
        self.index < self.slots.len()
    }

    /// Returns the entry under the cursor.
    ///
    /// Fails with [`Error::IteratorExhausted`] once every entry has been
    /// passed.
    pub fn current(&self) -> Result<(&'a K, &'a V), Error> {
        let slots: &'a [Slot<K, V>] = self.slots;
        slots
            .get(self.index)
            .and_then(Slot::entry)
            .ok_or(Error::IteratorExhausted)
    }

    /// Moves the cursor past the current slot to the next entry, if any.
    ///
    /// Fails with [`Error::IteratorExhausted`], without moving, once every
    /// entry has been passed.
    pub fn advance(&mut self) -> Result<(), Error> {
        if !self.has_next() {
            return Err(Error::IteratorExhausted);
        }
        self.index = seek(self.slots, self.index + 1);
        Ok(())
    }
}

/// First occupied slot at or after `from`, or `slots.len()` if there is none.
fn seek<K, V>(slots: &[Slot<K, V>], from: usize) -> usize {
    slots
        .get(from..)
        .and_then(|rest| rest.iter().position(Slot::is_occupied))
        .map_or(slots.len(), |offset| from + offset)
}
