//! Configuration options and errors for the search entry points.
//!
//! [`SearchOptions`] applies to plain string searches; [`KeyedOptions`] adds
//! the per-key score reduction hook used by keyed searches. Misuse that the
//! type system cannot rule out is reported through [`SearchError`].

use std::fmt;

use thiserror::Error;

use crate::search::KeyMatch;

/// Default minimum score for returned results.
///
/// An exact match scores `0.0` and lower is worse; `-10000.0` keeps any
/// plausible match while rejecting clearly bad ones. Lower the threshold
/// (e.g. to `f64::NEG_INFINITY`) to keep results with any score.
pub const DEFAULT_THRESHOLD: f64 = -10_000.0;

/// A string transformation applied to the query and to every target string
/// before preparation (and therefore before caching).
pub type Transform = Box<dyn Fn(&str) -> String>;

/// Reduces one item's per-key match results to a single ranking score.
///
/// Receives one slot per key, in key order (`None` when that key produced
/// no match). Returning `None` rejects the item.
pub type ScoreFn = Box<dyn Fn(&[Option<KeyMatch>]) -> Option<f64>>;

/// Options for ranking plain string candidates.
///
/// # Examples
///
/// ```
/// use fuzzrank::SearchOptions;
///
/// let opts = SearchOptions {
///     limit: Some(10),
///     ..Default::default()
/// };
/// assert_eq!(opts.threshold, fuzzrank::DEFAULT_THRESHOLD);
/// ```
pub struct SearchOptions {
    /// Drop results scoring below this value. Defaults to
    /// [`DEFAULT_THRESHOLD`]; results scoring exactly the threshold are kept.
    pub threshold: f64,
    /// Cap on the number of returned results. `None` returns every match.
    pub limit: Option<usize>,
    /// Transformation applied to the query and each candidate before
    /// preparation. Defaults to no transformation.
    pub transform: Option<Transform>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: None,
            transform: None,
        }
    }
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("threshold", &self.threshold)
            .field("limit", &self.limit)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options for ranking items through key extractors.
///
/// Identical to [`SearchOptions`] plus the optional [`ScoreFn`] reduction.
/// When `score_fn` is `None`, an item's ranking score is the maximum of its
/// non-`None` per-key scores, and items where every key misses are rejected.
pub struct KeyedOptions {
    /// Drop items whose reduced score is below this value.
    pub threshold: f64,
    /// Cap on the number of returned items. `None` returns every match.
    pub limit: Option<usize>,
    /// Transformation applied to the query and each extracted field before
    /// preparation.
    pub transform: Option<Transform>,
    /// Custom reduction from per-key results to one ranking score.
    pub score_fn: Option<ScoreFn>,
}

impl Default for KeyedOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: None,
            transform: None,
            score_fn: None,
        }
    }
}

impl fmt::Debug for KeyedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedOptions")
            .field("threshold", &self.threshold)
            .field("limit", &self.limit)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .field("score_fn", &self.score_fn.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Misconfiguration detected at call time.
///
/// Ordinary "no match" outcomes are never errors; they surface as `None` or
/// an empty result list.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
    /// A keyed search was started with an empty key slice, so no field
    /// could ever be extracted or matched.
    #[error("keyed search requires at least one key")]
    NoKeys,
}
