use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::Error;
use crate::cursor::Cursor;
use crate::hash_table::HashTable;
use crate::hash_table::Probe;
use crate::hash_table::Slot;
use crate::key_codec::DefaultHashBuilder;
use crate::key_codec::hash_key;
use crate::policy::ResizePolicy;

/// A map using closed hashing with linear probing.
///
/// `HashMap<K, V, S>` stores key-value pairs in one flat slot array. Keys
/// must implement `Hash + Eq`; `S` builds the hasher that picks each key's
/// home slot. Removals leave tombstones that keep probe sequences intact, and
/// both growth and shrinking count tombstones toward the load factor. The
/// thresholds come from a [`ResizePolicy`].
///
/// # Examples
///
/// ```rust
/// use closed_hash::Error;
/// use closed_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.save("Gato", "miau");
/// map.save("Perro", "guau");
/// map.save("Gato", "miu");
///
/// assert_eq!(map.count(), 2);
/// assert_eq!(map.get(&"Gato"), Ok(&"miu"));
/// assert_eq!(map.remove(&"Perro"), Ok("guau"));
/// assert_eq!(map.get(&"Perro"), Err(Error::KeyNotFound));
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<K, V>,
    policy: ResizePolicy,
    /// Smallest size a resize may pick. Starts at the policy minimum and is
    /// raised by `with_capacity*` and `reserve`.
    floor: usize,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// assert_eq!(map.count(), 0);
    /// map.save(1, "a");
    /// assert_eq!(map.count(), 1);
    /// ```
    pub fn count(&self) -> usize {
        self.table.len()
    }

    /// Same as [`count`](HashMap::count).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Returns the number of slots in the table, including empty slots and
    /// tombstones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let map: HashMap<u32, u32> = HashMap::new();
    /// assert_eq!(map.size(), 17);
    /// ```
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Returns the smallest size a resize may choose: the policy minimum,
    /// or the size picked by [`with_capacity`](HashMap::with_capacity) or
    /// [`reserve`](HashMap::reserve).
    ///
    /// While the table is larger than this, its load factor stays above the
    /// policy's shrink threshold.
    pub fn reserved_size(&self) -> usize {
        self.floor
    }

    /// Returns the number of tombstones currently in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// for i in 0..10 {
    ///     map.save(i, i);
    /// }
    /// map.remove(&3).unwrap();
    /// assert_eq!(map.tombstones(), 1);
    /// ```
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Returns `(count + tombstones) / size`.
    pub fn load_factor(&self) -> f64 {
        self.table.used() as f64 / self.table.size() as f64
    }

    /// Returns the resize policy in effect.
    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry and returns the table to its reserved size: the
    /// policy minimum unless capacity was reserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// for i in 0..100 {
    ///     map.save(i, i);
    /// }
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.size(), 17);
    /// ```
    pub fn clear(&mut self) {
        self.table.reset(self.floor);
    }

    /// Visits every entry in slot order until `visit` returns `false`.
    ///
    /// Empty slots and tombstones are skipped. The pass is synchronous and
    /// stops without looking at further slots as soon as the visitor asks it
    /// to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// for i in 0..10 {
    ///     map.save(i, i * 10);
    /// }
    ///
    /// let mut seen = 0;
    /// map.iterate(|_, _| {
    ///     seen += 1;
    ///     seen < 3
    /// });
    /// assert_eq!(seen, 3);
    /// ```
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in self.iter() {
            if !visit(key, value) {
                break;
            }
        }
    }

    /// Returns a cursor positioned at the first entry in slot order.
    ///
    /// The cursor borrows the map; see [`Cursor`] for why the map cannot be
    /// changed while it is alive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save("a", 1);
    /// map.save("b", 2);
    ///
    /// let mut total = 0;
    /// let mut cursor = map.cursor();
    /// while cursor.has_next() {
    ///     let (_, value) = cursor.current().unwrap();
    ///     total += value;
    ///     cursor.advance().unwrap();
    /// }
    /// assert_eq!(total, 3);
    /// ```
    pub fn cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.table.slots())
    }

    /// Returns an iterator over `(&K, &V)` pairs in slot order.
    ///
    /// The order is unrelated to insertion order and changes whenever the
    /// table resizes.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.slots().iter(),
            remaining: self.table.len(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes every entry, yielding them as owned pairs.
    ///
    /// The table is reset to its reserved size immediately; entries the
    /// returned iterator does not yield are dropped with it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save(1, "a");
    /// map.save(2, "b");
    ///
    /// let mut drained: Vec<_> = map.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, vec![(1, "a"), (2, "b")]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let table = core::mem::replace(&mut self.table, HashTable::with_size(self.floor));
        Drain {
            inner: IntoIter::new(table),
            _map: PhantomData,
        }
    }

    /// Returns a snapshot of the table's internal statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> crate::TableStats {
        crate::TableStats {
            count: self.table.len(),
            tombstones: self.table.tombstones(),
            size: self.table.size(),
            load_factor: self.load_factor(),
            longest_displacement: self.table.longest_displacement(),
        }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the default policy and the given hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use closed_hash::HashMap;
    /// use closed_hash::key_codec::Crc32;
    ///
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(Crc32);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty map able to hold `capacity` entries without growing.
    ///
    /// The table starts at the smallest policy size (`17 * 2^k` by default)
    /// that keeps `capacity` entries below the growth threshold, and removals
    /// never shrink it below that size. Until it fills up, its load factor
    /// may sit under the shrink threshold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use closed_hash::HashMap;
    /// use closed_hash::key_codec::Crc32;
    ///
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, Crc32);
    /// assert_eq!(map.size(), 17 * 16);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let policy = ResizePolicy::default();
        let floor = policy.fit(capacity, policy.min_size(), policy.min_size());
        Self {
            table: HashTable::with_size(floor),
            policy,
            floor,
            hash_builder,
        }
    }

    /// Creates an empty map with a custom resize policy.
    ///
    /// Fails with [`Error::InvalidPolicy`] if the policy does not validate.
    pub fn with_policy_and_hasher(policy: ResizePolicy, hash_builder: S) -> Result<Self, Error> {
        policy.validate()?;
        Ok(Self {
            table: HashTable::with_size(policy.min_size()),
            policy,
            floor: policy.min_size(),
            hash_builder,
        })
    }

    /// Stores `value` under `key`.
    ///
    /// If the key is already present its value is replaced in place and the
    /// previous value returned; the count does not change. Otherwise the entry
    /// goes into the first empty slot of the key's probe sequence (never into
    /// a tombstone) and the table grows if the load factor reaches the growth
    /// threshold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// assert_eq!(map.save(37, "a"), None);
    /// assert_eq!(map.save(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Ok(&"b"));
    /// ```
    pub fn save(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&self.hash_builder, &key);
        match self.table.probe(hash, |k| *k == key) {
            Probe::Found(index) => self
                .table
                .value_mut_at(index)
                .map(|slot| core::mem::replace(slot, value)),
            Probe::Vacant(index) => {
                self.table.insert_vacant(index, hash, key, value);
                if self.policy.should_grow(self.table.used(), self.table.size()) {
                    let target = self.table.size().saturating_mul(self.policy.factor());
                    self.resize(target);
                }
                None
            }
        }
    }

    /// Returns `true` if the map holds `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save(1, "a");
    /// assert!(map.contains(&1));
    /// assert!(!map.contains(&2));
    /// ```
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the value stored under `key`.
    ///
    /// Fails with [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::Error;
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save(1, "a");
    /// assert_eq!(map.get(&1), Ok(&"a"));
    /// assert_eq!(map.get(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn get(&self, key: &K) -> Result<&V, Error> {
        self.find(key)
            .and_then(|index| self.table.entry_at(index))
            .map(|(_, value)| value)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save("visits", 1);
    /// *map.get_mut(&"visits").unwrap() += 1;
    /// assert_eq!(map.get(&"visits"), Ok(&2));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        let index = self.find(key).ok_or(Error::KeyNotFound)?;
        self.table.value_mut_at(index).ok_or(Error::KeyNotFound)
    }

    /// Removes `key` and returns its value.
    ///
    /// The slot becomes a tombstone. If the load factor drops to the shrink
    /// threshold the table is rebuilt at a smaller size, never below the
    /// policy minimum or a reserved capacity. Fails with [`Error::KeyNotFound`] if the key is absent,
    /// leaving the map untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::Error;
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.save(1, "a");
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<V, Error> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key together with its value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V), Error> {
        let index = self.find(key).ok_or(Error::KeyNotFound)?;
        let entry = self.table.take(index).ok_or(Error::KeyNotFound)?;

        if self
            .policy
            .should_shrink(self.table.used(), self.table.size())
        {
            let target = self.table.size() / self.policy.factor();
            self.resize(target);
        }
        Ok(entry)
    }

    /// Rebuilds the table at the smallest policy size that holds the current
    /// entries, clearing every tombstone and releasing any reserved capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// for i in 0..100 {
    ///     map.save(i, i);
    /// }
    /// for i in 0..90 {
    ///     map.remove(&i).unwrap();
    /// }
    /// assert!(map.tombstones() > 0);
    ///
    /// map.shrink_to_fit();
    /// assert_eq!(map.tombstones(), 0);
    /// assert_eq!(map.size(), 17);
    /// assert_eq!(map.count(), 10);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.floor = self.policy.min_size();
        let target = self.policy.fit(self.table.len(), self.floor, self.floor);
        if target != self.table.size() || self.table.tombstones() > 0 {
            self.table.rehash(target);
        }
    }

    /// Makes room for at least `additional` more entries without growing.
    ///
    /// The reserved size also becomes the smallest size later removals may
    /// shrink the table to, until [`shrink_to_fit`](HashMap::shrink_to_fit)
    /// releases it. Tombstones are cleared if a rebuild happens.
    ///
    /// # Panics
    ///
    /// Panics if the required slot array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.reserve(100);
    /// assert_eq!(map.size(), 17 * 16);
    ///
    /// map.save(1, 1);
    /// map.save(2, 2);
    /// map.remove(&1).unwrap();
    /// assert_eq!(map.size(), 17 * 16);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let required = self.table.len().saturating_add(additional);
        self.floor = self.policy.fit(required, self.floor, self.floor);

        let used = self.table.used().saturating_add(additional);
        if self.policy.should_grow(used, self.table.size()) {
            let size = self.policy.fit(self.table.len(), self.table.size(), self.floor);
            self.table.rehash(size);
        }
    }

    fn find(&self, key: &K) -> Option<usize> {
        let hash = hash_key(&self.hash_builder, key);
        self.table.find(hash, |k| k == key)
    }

    fn resize(&mut self, target: usize) {
        let size = self.policy.fit(self.table.len(), target, self.floor);
        self.table.rehash(size);
    }
}

impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty map with 17 slots using the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closed_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.size(), 17);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map able to hold `capacity` entries without growing,
    /// using the default hasher.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_ok_and(|v| v == value))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.save(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.table)
    }
}

/// An iterator over the entries of a [`HashMap`] in slot order.
///
/// This struct is created by [`HashMap::iter`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.slots.find_map(Slot::entry)?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An owning iterator over the entries of a [`HashMap`].
pub struct IntoIter<K, V> {
    slots: alloc::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    fn new(table: HashTable<K, V>) -> Self {
        let (slots, remaining) = table.into_slots();
        Self {
            slots: slots.into_iter(),
            remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.slots.find_map(|slot| match slot {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        })?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A draining iterator over the entries of a [`HashMap`].
///
/// This struct is created by [`HashMap::drain`].
pub struct Drain<'a, K, V> {
    inner: IntoIter<K, V>,
    _map: PhantomData<&'a mut Vec<Slot<K, V>>>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
