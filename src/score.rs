//! The two-phase match/scoring algorithm.
//!
//! Matching runs in two phases. Phase 1 is a greedy left-to-right
//! subsequence scan that cheaply rejects targets missing any query
//! character. Phase 2 re-runs the match under a stricter rule: characters
//! may only be consumed in place or skipped a whole word at a time via the
//! target's boundary jump table, with bounded backtracking when a word
//! choice dead-ends. A strict success scores far better than the phase-1
//! fallback; an exact full match scores `0.0` and every other match is
//! negative, lower being worse.

use std::collections::BTreeSet;

use memchr::memmem;

use crate::prepare::{PreparedQuery, PreparedTarget};

/// Maximum number of strict-phase backtrack steps before the strict match is
/// abandoned in favor of the phase-1 result.
///
/// Adversarial inputs (query and target built from one repeated character)
/// would otherwise backtrack combinatorially; the cap bounds worst-case
/// per-candidate latency to O(target length + 200).
pub(crate) const BACKTRACK_LIMIT: usize = 200;

/// Word-start count above which a strict match is penalized for living in a
/// target with unusually many word boundaries.
///
/// Both this threshold and [`MANY_BEGINNINGS_MULTIPLIER`] are empirically
/// tuned values inherited from the reference scoring corpus; they are not
/// derived from first principles.
pub(crate) const MANY_BEGINNINGS_THRESHOLD: usize = 24;

/// Per-excess-word-start score multiplier applied past the threshold.
pub(crate) const MANY_BEGINNINGS_MULTIPLIER: f64 = 10.0;

/// The outcome of scoring one query against one target.
///
/// `indexes` are strictly increasing char positions into the (transformed)
/// target string, suitable for [`crate::highlight`]. Each scoring call
/// returns a fresh `MatchInfo` owned by the caller; nothing is retained or
/// overwritten on cached data between calls.
///
/// An exact full-string match scores exactly `0.0`; all other scores are
/// negative with no lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    /// Relevance score: `0.0` for an exact match, negative otherwise.
    pub score: f64,
    /// Matched char positions, ascending.
    pub indexes: Vec<usize>,
}

/// Reusable working arrays for the two match phases.
///
/// Owned by the search context and handed down per call, so the algorithm
/// stays reentrant without a shared global scratch.
pub(crate) struct Scratch {
    simple: Vec<usize>,
    strict: Vec<usize>,
}

impl Scratch {
    pub(crate) fn new() -> Self {
        Self {
            simple: Vec::new(),
            strict: Vec::new(),
        }
    }

    /// Release the backing allocations (used by cache clearing).
    pub(crate) fn reset(&mut self) {
        self.simple = Vec::new();
        self.strict = Vec::new();
    }
}

/// Score a prepared query against a prepared target, dispatching to the
/// multi-token path when the query contains whitespace.
///
/// Returns `None` when no valid subsequence match exists. The caller is
/// expected to have applied the bitflags pre-filter already.
pub(crate) fn score_any(
    query: &PreparedQuery,
    target: &PreparedTarget,
    scratch: &mut Scratch,
) -> Option<MatchInfo> {
    if query.contains_space {
        score_tokens(query, target, scratch)
    } else {
        score_match(&query.lower_codes, &query.lower_text, target, scratch)
    }
}

/// Score a single token (no whitespace handling) against a target.
///
/// This is the core two-phase algorithm; see the module docs for the phase
/// breakdown and the scoring rules below for the tally.
pub(crate) fn score_match(
    q_codes: &[u32],
    q_lower: &str,
    target: &PreparedTarget,
    scratch: &mut Scratch,
) -> Option<MatchInfo> {
    let t_codes = &target.lower_codes;
    let q_len = q_codes.len();
    let t_len = target.len();
    if q_len == 0 || t_len == 0 {
        return None;
    }

    // Phase 1: greedy subsequence scan. Rejects non-matches in O(t_len)
    // before any boundary table is built.
    scratch.simple.clear();
    {
        let mut ti = 0usize;
        for &qc in q_codes {
            loop {
                if ti >= t_len {
                    return None;
                }
                if t_codes[ti] == qc {
                    scratch.simple.push(ti);
                    ti += 1;
                    break;
                }
                ti += 1;
            }
        }
    }

    let first_simple = scratch.simple[0];
    let next_begin = target.next_beginning_indexes();

    // Phase 2: strict match. Start at the word boundary on/after the first
    // phase-1 hit; on mismatch jump to the next word start instead of
    // scanning one character at a time; on running off the end, give back
    // the most recent strict match and resume after it.
    scratch.strict.clear();
    let mut success_strict = false;
    {
        let mut ti = if first_simple == 0 {
            0
        } else {
            next_begin[first_simple - 1]
        };

        if ti != t_len {
            let mut si = 0usize;
            let mut backtracks = 0usize;
            loop {
                if ti >= t_len {
                    if si == 0 {
                        break;
                    }
                    backtracks += 1;
                    if backtracks > BACKTRACK_LIMIT {
                        break;
                    }
                    si -= 1;
                    // The strict stack is non-empty whenever si > 0.
                    let Some(last) = scratch.strict.pop() else {
                        break;
                    };
                    ti = next_begin[last];
                } else if q_codes[si] == t_codes[ti] {
                    scratch.strict.push(ti);
                    si += 1;
                    if si == q_len {
                        success_strict = true;
                        break;
                    }
                    ti += 1;
                } else {
                    ti = next_begin[ti];
                }
            }
        }
    }

    // Substring detection, independent of both phases: a contiguous
    // occurrence of the query at or after the first phase-1 hit.
    let substring_index = find_substring_from(&target.lower_text, q_lower, first_simple);

    if let Some(sub) = substring_index {
        if !success_strict {
            // The fallback indexes are rewritten to the contiguous run,
            // which highlights (and scores) better than scattered hits.
            for (i, slot) in scratch.simple.iter_mut().enumerate() {
                *slot = sub + i;
            }
        }
    }

    // Whether the substring occurrence starts a word. An occurrence at
    // index 0 is looked up one position back and so never sets the flag.
    let substring_beginning = match substring_index {
        Some(sub) if sub > 0 => next_begin[sub - 1] == sub,
        _ => false,
    };

    // Tally.
    let matches: &[usize] = if success_strict {
        &scratch.strict
    } else {
        &scratch.simple
    };

    let mut score = 0.0f64;

    let mut extra_groups = 0usize;
    for i in 1..q_len {
        if matches[i] - matches[i - 1] != 1 {
            score -= matches[i] as f64;
            extra_groups += 1;
        }
    }
    let unmatched_span = (matches[q_len - 1] - matches[0]) - (q_len - 1);
    score -= ((12 + unmatched_span) * extra_groups) as f64;

    if matches[0] != 0 {
        score -= (matches[0] * matches[0]) as f64 * 0.2;
    }

    if !success_strict {
        score *= 1000.0;
    } else {
        // A strict match inside a target with very many word starts is a
        // weak signal; walk the jump table to count them.
        let mut word_starts = 1usize;
        let mut i = next_begin[0];
        while i < t_len {
            word_starts += 1;
            i = next_begin[i];
        }
        if word_starts > MANY_BEGINNINGS_THRESHOLD {
            score *= ((word_starts - MANY_BEGINNINGS_THRESHOLD) as f64)
                * MANY_BEGINNINGS_MULTIPLIER;
        }
    }

    if substring_index.is_some() {
        score /= 1.0 + (q_len * q_len) as f64;
    }
    if substring_beginning {
        score /= 1.0 + (q_len * q_len) as f64;
    }

    score -= (t_len - q_len) as f64;

    Some(MatchInfo {
        score,
        indexes: matches.to_vec(),
    })
}

/// Score a whitespace-containing query token by token.
///
/// Every token must match or the whole query fails. Token scores are
/// summed, with an extra penalty whenever a token's first hit lands before
/// the previous token's first hit (tokens matched out of query order). The
/// whole query is then also scored as one literal space-containing token,
/// and the better of the two results wins: an exact phrase occurrence can
/// outscore separately-matched tokens.
fn score_tokens(
    query: &PreparedQuery,
    target: &PreparedTarget,
    scratch: &mut Scratch,
) -> Option<MatchInfo> {
    let mut seen_indexes: BTreeSet<usize> = BTreeSet::new();
    let mut total = 0.0f64;
    let mut prev_first = 0usize;

    for token in &query.tokens {
        let info = score_match(&token.lower_codes, &token.lower_text, target, scratch)?;
        total += info.score;

        let first = info.indexes[0];
        if first < prev_first {
            total -= (prev_first - first) as f64;
        }
        prev_first = first;

        seen_indexes.extend(info.indexes.iter().copied());
    }

    if let Some(whole) = score_match(&query.lower_codes, &query.lower_text, target, scratch) {
        if whole.score > total {
            return Some(whole);
        }
    }

    Some(MatchInfo {
        score: total,
        indexes: seen_indexes.into_iter().collect(),
    })
}

/// Find `needle` as a contiguous substring of `haystack`, starting the
/// search at char position `from_char`. Returns the char position of the
/// first occurrence.
fn find_substring_from(haystack: &str, needle: &str, from_char: usize) -> Option<usize> {
    if haystack.is_ascii() {
        // Byte positions and char positions coincide.
        let found = memmem::find(&haystack.as_bytes()[from_char..], needle.as_bytes())?;
        return Some(from_char + found);
    }

    let start_byte = haystack
        .char_indices()
        .nth(from_char)
        .map(|(b, _)| b)
        .unwrap_or(haystack.len());
    let found = memmem::find(&haystack.as_bytes()[start_byte..], needle.as_bytes())?;
    // UTF-8 is self-synchronizing, so a valid-needle hit always sits on a
    // char boundary; converting back to a char position is a prefix count.
    let byte_index = start_byte + found;
    Some(haystack[..byte_index].chars().count())
}
