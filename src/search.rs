//! Search context and entry points.
//!
//! A [`Searcher`] owns the preparation caches and the matcher's scratch
//! buffers, so repeated searches over the same candidate set only pay the
//! per-string preparation cost once. Construct one, reuse it for the
//! process lifetime (or [`Searcher::clear_cache`] between workloads), and
//! keep one instance per thread: everything here is single-threaded and
//! fully synchronous.

use std::fmt;

use crate::cache::PrepareCache;
use crate::options::{KeyedOptions, SearchError, SearchOptions};
use crate::prepare::{PreparedQuery, PreparedTarget, prepare_query, prepare_target};
use crate::score::{MatchInfo, Scratch, score_any};
use crate::topk::TopK;

/// Type alias for the boxed extractor closure stored inside a [`Key`].
///
/// Given a reference to an item of type `T`, the extractor returns the
/// field value to rank, or `None` when the item has no value for this key.
type Extractor<T> = Box<dyn Fn(&T) -> Option<String>>;

/// Describes how to pull one matchable string field out of an item.
///
/// A key pairs a name (reported back on results, so callers can tell which
/// field matched) with an extractor closure. This replaces dotted-path
/// runtime field lookup: the access path is compiled into the closure once,
/// per schema, instead of being re-resolved per candidate.
///
/// # Examples
///
/// ```
/// use fuzzrank::Key;
///
/// struct User { name: String, email: String }
///
/// let keys = vec![
///     Key::new("name", |u: &User| Some(u.name.clone())),
///     Key::from_fn("email", |u: &User| u.email.as_str()),
/// ];
/// assert_eq!(keys[0].name(), "name");
/// ```
pub struct Key<T> {
    name: String,
    extractor: Extractor<T>,
}

impl<T> Key<T> {
    /// Create a key from a closure returning an optional owned value.
    ///
    /// Returning `None` (or an empty string) marks the item as having no
    /// candidate value for this key; it is skipped, not failed.
    pub fn new<F>(name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&T) -> Option<String> + 'static,
    {
        Self {
            name: name.into(),
            extractor: Box::new(extractor),
        }
    }

    /// Create a key from a closure that returns a borrowed `&str`.
    ///
    /// Convenience shorthand for fields that are always present; the
    /// borrowed value is converted to an owned `String` internally.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> &str + 'static,
    {
        Self {
            name: name.into(),
            extractor: Box::new(move |item| Some(f(item).to_owned())),
        }
    }

    /// The name reported on results produced by this key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extract this key's value from an item.
    pub fn extract(&self, item: &T) -> Option<String> {
        (self.extractor)(item)
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("name", &self.name).finish()
    }
}

/// A ranked plain-string result.
#[derive(Debug, Clone, PartialEq)]
pub struct StringMatch<'a> {
    /// The candidate exactly as passed in (untransformed).
    pub text: &'a str,
    /// Score and matched char positions.
    pub info: MatchInfo,
}

/// One key's match against one item.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMatch {
    /// Name of the [`Key`] that produced this match.
    pub key: String,
    /// The extracted field value (untransformed) the match ran against.
    pub text: String,
    /// Score and matched char positions within `text`.
    pub info: MatchInfo,
}

/// A ranked keyed-search result.
#[derive(Debug)]
pub struct KeyedMatch<'a, T> {
    /// The matched item.
    pub item: &'a T,
    /// The reduced ranking score (default: best per-key score).
    pub score: f64,
    /// One slot per key, in key order; `None` where that key missed.
    pub per_key: Vec<Option<KeyMatch>>,
}

impl<T> KeyedMatch<'_, T> {
    /// The per-key match backing this item's ranking score.
    ///
    /// Picks the first per-key result whose score equals the reduced score;
    /// when a custom score function produced a synthetic score matching no
    /// single key, falls back to the best-scoring key. `None` only when
    /// every key missed (possible only with a custom score function).
    pub fn best(&self) -> Option<&KeyMatch> {
        if let Some(found) = self
            .per_key
            .iter()
            .flatten()
            .find(|m| m.info.score == self.score)
        {
            return Some(found);
        }
        self.per_key.iter().flatten().max_by(|a, b| {
            a.info
                .score
                .partial_cmp(&b.info.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Default per-key reduction: the maximum non-`None` score.
fn default_score_fn(per_key: &[Option<KeyMatch>]) -> Option<f64> {
    let mut max: Option<f64> = None;
    for m in per_key.iter().flatten() {
        match max {
            Some(best) if best >= m.info.score => {}
            _ => max = Some(m.info.score),
        }
    }
    max
}

/// Fuzzy search context: preparation caches plus matcher scratch space.
///
/// # Examples
///
/// ```
/// use fuzzrank::{SearchOptions, Searcher};
///
/// let mut searcher = Searcher::new();
/// let results = searcher.search(
///     "go",
///     &["Golang", "Go", "Django"],
///     &SearchOptions::default(),
/// );
///
/// // "Go" is an exact match (score 0); "Golang" follows.
/// assert_eq!(results[0].text, "Go");
/// assert_eq!(results[0].info.score, 0.0);
/// assert_eq!(results[1].text, "Golang");
/// ```
pub struct Searcher {
    queries: PrepareCache<PreparedQuery>,
    targets: PrepareCache<PreparedTarget>,
    scratch: Scratch,
}

impl Searcher {
    /// Create an empty search context.
    pub fn new() -> Self {
        Self {
            queries: PrepareCache::new(),
            targets: PrepareCache::new(),
            scratch: Scratch::new(),
        }
    }

    /// Rank plain string candidates against a query.
    ///
    /// Candidates that do not match, score below `options.threshold`, or
    /// are empty strings are dropped. The result is sorted descending by
    /// score and capped at `options.limit`.
    pub fn search<'a, S: AsRef<str>>(
        &mut self,
        query: &str,
        candidates: &'a [S],
        options: &SearchOptions,
    ) -> Vec<StringMatch<'a>> {
        let transform = options.transform.as_deref();

        let transformed_query;
        let query_str: &str = match transform {
            Some(f) => {
                transformed_query = f(query);
                &transformed_query
            }
            None => query,
        };

        let prepared = self.queries.get_or_prepare(query_str, prepare_query);
        if prepared.lower_codes.is_empty() {
            return Vec::new();
        }
        let query_flags = prepared.bitflags;

        let limit = options.limit.unwrap_or(usize::MAX);
        if limit == 0 {
            return Vec::new();
        }
        let mut selected = TopK::new(limit);

        for candidate in candidates {
            let raw = candidate.as_ref();
            if raw.is_empty() {
                continue;
            }

            let transformed;
            let target_str: &str = match transform {
                Some(f) => {
                    transformed = f(raw);
                    &transformed
                }
                None => raw,
            };

            let target = self.targets.get_or_prepare(target_str, prepare_target);
            if query_flags & target.bitflags != query_flags {
                continue;
            }

            let Some(info) = score_any(prepared, target, &mut self.scratch) else {
                continue;
            };
            if info.score < options.threshold {
                continue;
            }

            let score = info.score;
            selected.offer(score, StringMatch { text: raw, info });
        }

        log::trace!(
            "search {:?}: {} candidates, {} kept",
            query,
            candidates.len(),
            selected.len()
        );
        selected.into_sorted_desc()
    }

    /// Rank items by one or more extracted string fields.
    ///
    /// Each key extracts at most one field per item; each non-empty field
    /// becomes its own prepared target. An item's per-key results are
    /// reduced to one ranking score by `options.score_fn` (default: the
    /// best per-key score, rejecting items where every key missed).
    ///
    /// A single-element `keys` slice gives plain single-field search; an
    /// empty slice is a configuration error.
    ///
    /// # Errors
    ///
    /// [`SearchError::NoKeys`] when `keys` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzrank::{Key, KeyedOptions, Searcher};
    ///
    /// struct Repo { name: String, description: String }
    ///
    /// let repos = vec![
    ///     Repo { name: "linux".into(), description: "kernel sources".into() },
    ///     Repo { name: "rust".into(), description: "the rust compiler".into() },
    /// ];
    /// let keys = vec![
    ///     Key::new("name", |r: &Repo| Some(r.name.clone())),
    ///     Key::new("description", |r: &Repo| Some(r.description.clone())),
    /// ];
    ///
    /// let mut searcher = Searcher::new();
    /// let results = searcher
    ///     .search_keyed("rust", &repos, &keys, &KeyedOptions::default())
    ///     .unwrap();
    ///
    /// assert_eq!(results.len(), 1);
    /// assert_eq!(results[0].best().unwrap().text, "rust");
    /// ```
    pub fn search_keyed<'a, T>(
        &mut self,
        query: &str,
        items: &'a [T],
        keys: &[Key<T>],
        options: &KeyedOptions,
    ) -> Result<Vec<KeyedMatch<'a, T>>, SearchError> {
        if keys.is_empty() {
            return Err(SearchError::NoKeys);
        }

        let transform = options.transform.as_deref();

        let transformed_query;
        let query_str: &str = match transform {
            Some(f) => {
                transformed_query = f(query);
                &transformed_query
            }
            None => query,
        };

        let prepared = self.queries.get_or_prepare(query_str, prepare_query);
        if prepared.lower_codes.is_empty() {
            return Ok(Vec::new());
        }
        let query_flags = prepared.bitflags;

        let limit = options.limit.unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut selected = TopK::new(limit);

        for item in items {
            let mut per_key: Vec<Option<KeyMatch>> = Vec::with_capacity(keys.len());

            for key in keys {
                let Some(text) = key.extract(item).filter(|t| !t.is_empty()) else {
                    per_key.push(None);
                    continue;
                };

                let transformed;
                let target_str: &str = match transform {
                    Some(f) => {
                        transformed = f(&text);
                        &transformed
                    }
                    None => &text,
                };

                let target = self.targets.get_or_prepare(target_str, prepare_target);
                if query_flags & target.bitflags != query_flags {
                    per_key.push(None);
                    continue;
                }

                let entry = score_any(prepared, target, &mut self.scratch).map(|info| KeyMatch {
                    key: key.name.clone(),
                    text,
                    info,
                });
                per_key.push(entry);
            }

            let reduced = match &options.score_fn {
                Some(f) => f(&per_key),
                None => default_score_fn(&per_key),
            };
            let Some(score) = reduced else {
                continue;
            };
            if score < options.threshold {
                continue;
            }

            selected.offer(
                score,
                KeyedMatch {
                    item,
                    score,
                    per_key,
                },
            );
        }

        log::trace!(
            "keyed search {:?}: {} items x {} keys, {} kept",
            query,
            items.len(),
            keys.len(),
            selected.len()
        );
        Ok(selected.into_sorted_desc())
    }

    /// Score exactly one query/target pair.
    ///
    /// Preparation of both strings is cache-eligible, but the result itself
    /// is computed fresh on every call. Returns `None` when either string
    /// is empty or no subsequence match exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzrank::Searcher;
    ///
    /// let mut searcher = Searcher::new();
    /// let info = searcher.single("hello", "hello").unwrap();
    /// assert_eq!(info.score, 0.0);
    /// assert_eq!(info.indexes, vec![0, 1, 2, 3, 4]);
    ///
    /// assert!(searcher.single("xyz", "abc").is_none());
    /// ```
    pub fn single(&mut self, query: &str, target: &str) -> Option<MatchInfo> {
        self.single_impl(query, target, None)
    }

    /// [`Searcher::single`] with a transformation applied to both strings
    /// before preparation.
    pub fn single_with(
        &mut self,
        query: &str,
        target: &str,
        transform: &dyn Fn(&str) -> String,
    ) -> Option<MatchInfo> {
        self.single_impl(query, target, Some(transform))
    }

    fn single_impl(
        &mut self,
        query: &str,
        target: &str,
        transform: Option<&dyn Fn(&str) -> String>,
    ) -> Option<MatchInfo> {
        if query.is_empty() || target.is_empty() {
            return None;
        }

        let transformed_query;
        let query_str: &str = match transform {
            Some(f) => {
                transformed_query = f(query);
                &transformed_query
            }
            None => query,
        };
        let transformed_target;
        let target_str: &str = match transform {
            Some(f) => {
                transformed_target = f(target);
                &transformed_target
            }
            None => target,
        };

        let prepared = self.queries.get_or_prepare(query_str, prepare_query);
        let prepared_target = self.targets.get_or_prepare(target_str, prepare_target);

        if prepared.bitflags & prepared_target.bitflags != prepared.bitflags {
            return None;
        }

        score_any(prepared, prepared_target, &mut self.scratch)
    }

    /// Discard both preparation caches and the matcher scratch buffers.
    ///
    /// Safe to call between searches; the next search re-prepares whatever
    /// it touches and produces identical results.
    pub fn clear_cache(&mut self) {
        self.queries.clear();
        self.targets.clear();
        self.scratch.reset();
        log::debug!("preparation caches cleared");
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher").finish_non_exhaustive()
    }
}
