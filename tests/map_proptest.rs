// Property tests for HashMap.
//
// Model check: a random sequence of save/remove/get/contains is applied to
// both HashMap and std's HashMap. After every step the two must agree on the
// result and on count(), and the table must satisfy its sizing invariants:
//  - load factor (count + tombstones) / size stays below 0.7;
//  - unless the table is at its reserved size, it stays above 0.175;
//  - size is always 17 * 2^k.
//
// The remaining properties pin down round-trip, update, absence, and the
// agreement between internal iteration, the cursor, and Iter.
use std::collections::BTreeSet;
use std::collections::HashMap as StdHashMap;

use closed_hash::Error;
use closed_hash::HashMap;
use closed_hash::ResizePolicy;
use proptest::prelude::*;

fn assert_sizing<K, V, S>(map: &HashMap<K, V, S>) -> Result<(), TestCaseError> {
    let policy = ResizePolicy::default();
    prop_assert!(map.load_factor() < policy.grow_at(), "load {} too high", map.load_factor());
    prop_assert!(
        map.size() == map.reserved_size() || map.load_factor() > policy.shrink_at(),
        "load {} too low at size {}",
        map.load_factor(),
        map.size()
    );

    let mut size = map.size();
    while size > policy.min_size() && size % policy.factor() == 0 {
        size /= policy.factor();
    }
    prop_assert_eq!(size, policy.min_size());
    prop_assert!(map.size() >= map.reserved_size());
    Ok(())
}

fn cursor_keys<K: Clone + Ord, V, S>(map: &HashMap<K, V, S>) -> Vec<K> {
    let mut keys = Vec::new();
    let mut cursor = map.cursor();
    while cursor.has_next() {
        let (key, _) = cursor.current().unwrap();
        keys.push(key.clone());
        cursor.advance().unwrap();
    }
    keys
}

proptest! {
    #[test]
    fn prop_matches_std_model(
        ops in proptest::collection::vec((0u8..=3u8, 0u16..96u16, any::<i32>()), 1..600)
    ) {
        let mut map: HashMap<u16, i32> = HashMap::new();
        let mut model: StdHashMap<u16, i32> = StdHashMap::new();

        for (op, key, value) in ops {
            match op {
                0 => {
                    prop_assert_eq!(map.save(key, value), model.insert(key, value));
                }
                1 => {
                    let expected = model.remove(&key).ok_or(Error::KeyNotFound);
                    prop_assert_eq!(map.remove(&key), expected);
                }
                2 => {
                    let expected = model.get(&key).ok_or(Error::KeyNotFound);
                    prop_assert_eq!(map.get(&key), expected);
                }
                3 => {
                    prop_assert_eq!(map.contains(&key), model.contains_key(&key));
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(map.count(), model.len());
            assert_sizing(&map)?;
        }

        let mut entries: Vec<(u16, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        let mut expected: Vec<(u16, i32)> = model.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(entries, expected);
    }

    #[test]
    fn prop_reserved_capacity_keeps_sizing(
        capacity in 0usize..500,
        ops in proptest::collection::vec((0u8..=3u8, 0u16..400u16), 1..600)
    ) {
        let mut map: HashMap<u16, u16> = HashMap::with_capacity(capacity);
        let mut model: StdHashMap<u16, u16> = StdHashMap::new();
        let reserved = map.size();
        assert_sizing(&map)?;

        for (op, key) in ops {
            match op {
                0 | 1 => {
                    prop_assert_eq!(map.save(key, key), model.insert(key, key));
                }
                2 => {
                    let expected = model.remove(&key).ok_or(Error::KeyNotFound);
                    prop_assert_eq!(map.remove(&key), expected);
                }
                3 => {
                    let additional = usize::from(key % 64);
                    map.reserve(additional);
                    let size = map.size();
                    let before = map.count();
                    for extra in 0..additional {
                        map.save(1000 + extra as u16, 0);
                    }
                    prop_assert_eq!(map.size(), size, "reserve({}) grew", additional);
                    for extra in 0..additional {
                        map.remove(&(1000 + extra as u16)).unwrap();
                    }
                    prop_assert_eq!(map.count(), before);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(map.count(), model.len());
            prop_assert!(map.size() >= reserved);
            assert_sizing(&map)?;
        }
    }

    #[test]
    fn prop_save_then_get_round_trips(
        entries in proptest::collection::vec((any::<u64>(), any::<u64>()), 0..300)
    ) {
        let mut map = HashMap::new();
        for (key, value) in &entries {
            map.save(*key, *value);
            prop_assert_eq!(map.get(key), Ok(value));
        }
        let distinct: BTreeSet<u64> = entries.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(map.count(), distinct.len());
    }

    #[test]
    fn prop_update_keeps_count(
        keys in proptest::collection::btree_set(any::<u32>(), 1..200),
        first in any::<i64>(),
        second in any::<i64>(),
    ) {
        let mut map = HashMap::new();
        for key in &keys {
            map.save(*key, first);
        }
        let count = map.count();
        for key in &keys {
            prop_assert_eq!(map.save(*key, second), Some(first));
        }
        prop_assert_eq!(map.count(), count);
        for key in &keys {
            prop_assert_eq!(map.get(key), Ok(&second));
        }
    }

    #[test]
    fn prop_absent_keys_are_not_found(
        present in proptest::collection::btree_set(0u32..10_000, 0..300),
        probes in proptest::collection::vec(0u32..10_000, 1..100),
        removed_share in 0usize..=100,
    ) {
        let mut map = HashMap::new();
        for key in &present {
            map.save(*key, key.to_string());
        }
        let cut = present.len() * removed_share / 100;
        let removed: BTreeSet<u32> = present.iter().copied().take(cut).collect();
        for key in &removed {
            prop_assert!(map.remove(key).is_ok());
        }

        for key in probes {
            if present.contains(&key) && !removed.contains(&key) {
                prop_assert!(map.contains(&key));
                let expected = key.to_string();
                prop_assert_eq!(map.get(&key), Ok(&expected));
            } else {
                prop_assert!(!map.contains(&key));
                prop_assert_eq!(map.get(&key), Err(Error::KeyNotFound));
                prop_assert_eq!(map.remove(&key), Err(Error::KeyNotFound));
            }
        }
    }

    #[test]
    fn prop_iteration_visits_each_entry_once(
        keys in proptest::collection::btree_set(any::<i32>(), 0..400),
        removals in proptest::collection::vec(any::<prop::sample::Index>(), 0..200),
    ) {
        let mut map = HashMap::new();
        for key in &keys {
            map.save(*key, ());
        }
        let mut live = keys.clone();
        if !keys.is_empty() {
            let all: Vec<i32> = keys.iter().copied().collect();
            for index in removals {
                let key = *index.get(&all);
                prop_assert_eq!(map.remove(&key).is_ok(), live.remove(&key));
            }
        }

        let mut internal = Vec::new();
        map.iterate(|key, _| {
            internal.push(*key);
            true
        });
        let external = cursor_keys(&map);
        let iterated: Vec<i32> = map.keys().copied().collect();

        prop_assert_eq!(&internal, &external);
        prop_assert_eq!(&internal, &iterated);
        prop_assert_eq!(internal.len(), map.count());

        let visited: BTreeSet<i32> = internal.into_iter().collect();
        prop_assert_eq!(visited, live);
    }

    #[test]
    fn prop_iterate_stops_when_asked(
        keys in proptest::collection::btree_set(any::<u16>(), 0..200),
        stop_after in 1usize..250,
    ) {
        let mut map = HashMap::new();
        for key in &keys {
            map.save(*key, *key);
        }

        let mut calls = 0;
        map.iterate(|_, _| {
            calls += 1;
            calls < stop_after
        });
        prop_assert_eq!(calls, stop_after.min(map.count()));
    }

    #[test]
    fn prop_repeated_churn_stays_small(key in any::<u64>(), rounds in 1usize..2_000) {
        let mut map = HashMap::new();
        for round in 0..rounds {
            map.save(key, round);
            prop_assert_eq!(map.remove(&key), Ok(round));
            assert_sizing(&map)?;
        }
        prop_assert_eq!(map.count(), 0);
        prop_assert_eq!(map.size(), ResizePolicy::default().min_size());
    }
}
