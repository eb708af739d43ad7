//! Memoization of string preparation.
//!
//! Preparing a string (lowercasing, bitflags, boundary tables) costs O(len);
//! a cache keyed by the exact string handed to preparation amortizes that
//! cost across repeated searches over the same candidate set. Strings longer
//! than [`MAX_CACHED_LEN`] bytes bypass the map entirely so one giant
//! candidate cannot pin unbounded memory.

use std::collections::HashMap;

/// Byte-length cutoff above which prepared data is not retained.
pub(crate) const MAX_CACHED_LEN: usize = 999;

/// A get-or-prepare map from raw strings to their prepared representation.
///
/// Oversized strings are prepared into a single overflow slot that is
/// overwritten by the next oversized call, which keeps the return type a
/// plain reference while guaranteeing the map never holds an entry larger
/// than the cutoff.
pub(crate) struct PrepareCache<V> {
    map: HashMap<String, V>,
    overflow: Option<V>,
}

impl<V> PrepareCache<V> {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::new(),
            overflow: None,
        }
    }

    /// Look up `raw`, preparing and inserting it on a miss.
    ///
    /// The cache key is `raw` exactly as passed; callers apply any transform
    /// before reaching the cache, so transformed and untransformed spellings
    /// of the same string are distinct entries.
    pub(crate) fn get_or_prepare(&mut self, raw: &str, prepare: impl FnOnce(&str) -> V) -> &V {
        if raw.len() > MAX_CACHED_LEN {
            return self.overflow.insert(prepare(raw));
        }

        if !self.map.contains_key(raw) {
            let value = prepare(raw);
            self.map.insert(raw.to_owned(), value);
        }
        // Present by construction: either it was already cached or the
        // branch above just inserted it.
        &self.map[raw]
    }

    /// Drop every cached entry, including the overflow slot.
    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.overflow = None;
    }

    /// Number of retained entries (the overflow slot does not count).
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Prepare function that counts invocations through a cell.
    fn counting<'a>(calls: &'a std::cell::Cell<usize>) -> impl Fn(&str) -> String + 'a {
        move |s| {
            calls.set(calls.get() + 1);
            s.to_uppercase()
        }
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();

        let first = cache.get_or_prepare("abc", counting(&calls)).clone();
        let second = cache.get_or_prepare("abc", counting(&calls)).clone();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn distinct_keys_prepare_separately() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();

        cache.get_or_prepare("abc", counting(&calls));
        cache.get_or_prepare("def", counting(&calls));

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn oversized_strings_bypass_the_map() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();
        let big = "x".repeat(MAX_CACHED_LEN + 1);

        cache.get_or_prepare(&big, counting(&calls));
        cache.get_or_prepare(&big, counting(&calls));

        // Prepared twice: nothing was retained in the map.
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn cutoff_is_inclusive() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();
        let exactly = "x".repeat(MAX_CACHED_LEN);

        cache.get_or_prepare(&exactly, counting(&calls));
        cache.get_or_prepare(&exactly, counting(&calls));

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forces_re_preparation() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();

        let before = cache.get_or_prepare("abc", counting(&calls)).clone();
        cache.clear();
        let after = cache.get_or_prepare("abc", counting(&calls)).clone();

        // Re-prepared, but structurally identical: memoization is an
        // optimization, not an observable behavior change.
        assert_eq!(calls.get(), 2);
        assert_eq!(before, after);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_key_is_cacheable() {
        let calls = std::cell::Cell::new(0);
        let mut cache = PrepareCache::new();

        cache.get_or_prepare("", counting(&calls));
        cache.get_or_prepare("", counting(&calls));

        assert_eq!(calls.get(), 1);
    }
}
