//! Insertion-order bookkeeping for node and edge maps.
//!
//! Records live in hash maps for O(1) lookup, but snapshots, exports and
//! cycle-detection roots follow the order entities were inserted. Each stored
//! record carries the sequence number it was assigned on insertion.

use std::collections::HashMap;
use std::hash::Hash;

/// A stored record tagged with its insertion sequence.
#[derive(Debug, Clone)]
pub(crate) struct Sequenced<T> {
    pub(crate) sequence: u64,
    pub(crate) value: T,
}

/// Values of `map` ordered by insertion sequence.
pub(crate) fn in_insertion_order<K, T>(map: &HashMap<K, Sequenced<T>>) -> Vec<&T>
where
    K: Eq + Hash,
{
    let mut entries: Vec<&Sequenced<T>> = map.values().collect();
    entries.sort_by_key(|entry| entry.sequence);
    entries.into_iter().map(|entry| &entry.value).collect()
}

/// Sort keys of `map` by the insertion sequence of their records.
///
/// Keys missing from `map` sort last, in their original relative order.
pub(crate) fn sort_by_insertion<K, T>(keys: &mut [K], map: &HashMap<K, Sequenced<T>>)
where
    K: Eq + Hash,
{
    keys.sort_by_key(|key| map.get(key).map_or(u64::MAX, |entry| entry.sequence));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<&'static str, Sequenced<char>> {
        let mut map = HashMap::new();
        map.insert("c", Sequenced { sequence: 7, value: 'c' });
        map.insert("a", Sequenced { sequence: 1, value: 'a' });
        map.insert("b", Sequenced { sequence: 4, value: 'b' });
        map
    }

    #[test]
    fn test_values_follow_sequence() {
        let map = sample();
        let ordered: Vec<char> = in_insertion_order(&map).into_iter().copied().collect();
        assert_eq!(ordered, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_unknown_keys_sort_last() {
        let map = sample();
        let mut keys = vec!["zz", "c", "a"];
        sort_by_insertion(&mut keys, &map);
        assert_eq!(keys, vec!["a", "c", "zz"]);
    }
}
