#![warn(missing_docs)]

//! A fuzzy string searching and ranking library.
//!
//! `fuzzrank` ranks candidate strings (or string fields of your own types)
//! against a user-typed query by approximate, non-contiguous character
//! matching. Every result carries a relevance score (exact match is `0.0`,
//! lower is worse) and the matched character positions, ready for
//! highlighting.
//!
//! Matching runs in two phases: a cheap greedy subsequence scan to reject
//! non-matches, then a strict word-boundary-aware pass with bounded
//! backtracking that rewards matches starting at word boundaries,
//! contiguous substrings, and early positions. A whitespace-separated query
//! is matched token by token, with each token free to land anywhere in the
//! target.
//!
//! A [`Searcher`] memoizes per-string preparation (lowercasing, character
//! bitflags, word-boundary tables) so repeated searches over the same
//! candidates only pay that cost once.
//!
//! # Examples
//!
//! ```
//! use fuzzrank::{SearchOptions, Searcher, highlight};
//! use fuzzrank::highlight::{DEFAULT_CLOSE_TAG, DEFAULT_OPEN_TAG};
//!
//! let mut searcher = Searcher::new();
//! let candidates = ["concatenate", "category", "locate"];
//! let results = searcher.search("cat", &candidates, &SearchOptions::default());
//!
//! assert_eq!(results[0].text, "category");
//! let marked = highlight(results[0].text, &results[0].info, DEFAULT_OPEN_TAG, DEFAULT_CLOSE_TAG);
//! assert_eq!(marked, "<b>cat</b>egory");
//! ```

/// Memoization of string preparation.
mod cache;

/// Match highlighting: tag-wrapped strings and typed segment sequences.
pub mod highlight;

/// Search options, defaults, and configuration errors.
pub mod options;

/// String preparation: lowercase codes, bitflags, boundary tables.
mod prepare;

/// The two-phase match/scoring algorithm.
mod score;

/// Search context and entry points.
mod search;

/// Bounded top-K selection.
mod topk;

/// Ready-made string transformations for the `transform` option.
pub mod transform;

// Re-export the primary public API at the crate root.
pub use highlight::{Segment, highlight, highlight_with};
pub use options::{DEFAULT_THRESHOLD, KeyedOptions, ScoreFn, SearchError, SearchOptions, Transform};
pub use score::MatchInfo;
pub use search::{Key, KeyMatch, KeyedMatch, Searcher, StringMatch};
pub use topk::TopK;
