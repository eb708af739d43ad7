//! Render matched character positions as marked-up output.
//!
//! Consumes the [`MatchInfo`](crate::MatchInfo) produced by a search and
//! splits the target text into alternating plain and matched runs, either
//! wrapped in open/close tags ([`highlight`]) or mapped through a callback
//! into typed segments ([`highlight_with`]).

use crate::score::MatchInfo;

/// Default opening tag for [`highlight`].
pub const DEFAULT_OPEN_TAG: &str = "<b>";

/// Default closing tag for [`highlight`].
pub const DEFAULT_CLOSE_TAG: &str = "</b>";

/// One piece of a highlighted string: either text outside any match or the
/// callback's output for one matched run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a, T> {
    /// A run of characters not part of the match.
    Plain(&'a str),
    /// The callback's rendering of one matched run.
    Matched(T),
}

/// Wrap each matched run of `text` in `open_tag`/`close_tag`.
///
/// `info.indexes` must be ascending char positions into `text`, which is
/// what every search entry point produces. Adjacent matched positions are
/// merged into a single tagged run.
///
/// # Examples
///
/// ```
/// use fuzzrank::{Searcher, highlight};
/// use fuzzrank::highlight::{DEFAULT_CLOSE_TAG, DEFAULT_OPEN_TAG};
///
/// let mut searcher = Searcher::new();
/// let info = searcher.single("cat", "concatenate").unwrap();
/// let marked = highlight("concatenate", &info, DEFAULT_OPEN_TAG, DEFAULT_CLOSE_TAG);
/// assert_eq!(marked, "con<b>cat</b>enate");
/// ```
pub fn highlight(text: &str, info: &MatchInfo, open_tag: &str, close_tag: &str) -> String {
    let mut out = String::with_capacity(text.len() + open_tag.len() + close_tag.len());
    for segment in highlight_with(text, info, |run, _| run) {
        match segment {
            Segment::Plain(run) => out.push_str(run),
            Segment::Matched(run) => {
                out.push_str(open_tag);
                out.push_str(run);
                out.push_str(close_tag);
            }
        }
    }
    out
}

/// Split `text` into plain and matched segments, mapping each matched run
/// through `render`.
///
/// The callback receives the matched run's text and its ordinal (0 for the
/// first matched run, 1 for the second, ...), and its return value is
/// carried in [`Segment::Matched`]. Plain runs pass through zero-copy.
///
/// # Examples
///
/// ```
/// use fuzzrank::{Searcher, highlight_with, Segment};
///
/// let mut searcher = Searcher::new();
/// let info = searcher.single("fb", "FooBar").unwrap();
/// let segments = highlight_with("FooBar", &info, |run, i| format!("[{i}:{run}]"));
/// assert_eq!(
///     segments,
///     vec![
///         Segment::Matched("[0:F]".to_owned()),
///         Segment::Plain("oo"),
///         Segment::Matched("[1:B]".to_owned()),
///         Segment::Plain("ar"),
///     ],
/// );
/// ```
pub fn highlight_with<'a, T, F>(text: &'a str, info: &MatchInfo, mut render: F) -> Vec<Segment<'a, T>>
where
    F: FnMut(&'a str, usize) -> T,
{
    debug_assert!(
        info.indexes.windows(2).all(|w| w[0] < w[1]),
        "match indexes must be ascending"
    );

    let mut segments: Vec<Segment<'a, T>> = Vec::new();
    let mut cursor = 0usize; // next unconsumed entry of info.indexes
    let mut plain_start = 0usize; // byte offset where the open plain run began
    let mut match_start: Option<usize> = None; // byte offset of the open matched run
    let mut ordinal = 0usize;

    for (char_i, (byte_i, _)) in text.char_indices().enumerate() {
        let is_match = info.indexes.get(cursor) == Some(&char_i);
        if is_match {
            cursor += 1;
            if match_start.is_none() {
                if byte_i > plain_start {
                    segments.push(Segment::Plain(&text[plain_start..byte_i]));
                }
                match_start = Some(byte_i);
            }
        } else if let Some(start) = match_start.take() {
            segments.push(Segment::Matched(render(&text[start..byte_i], ordinal)));
            ordinal += 1;
            plain_start = byte_i;
        }
    }

    if let Some(start) = match_start {
        segments.push(Segment::Matched(render(&text[start..], ordinal)));
    } else if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(indexes: Vec<usize>) -> MatchInfo {
        MatchInfo {
            score: 0.0,
            indexes,
        }
    }

    // --- highlight (tag output) ---

    #[test]
    fn contiguous_run_gets_one_tag_pair() {
        let marked = highlight("concatenate", &info(vec![3, 4, 5]), "<b>", "</b>");
        assert_eq!(marked, "con<b>cat</b>enate");
    }

    #[test]
    fn scattered_positions_get_separate_tags() {
        let marked = highlight("abcde", &info(vec![0, 2, 4]), "<b>", "</b>");
        assert_eq!(marked, "<b>a</b>b<b>c</b>d<b>e</b>");
    }

    #[test]
    fn full_match_wraps_everything() {
        let marked = highlight("abc", &info(vec![0, 1, 2]), "<b>", "</b>");
        assert_eq!(marked, "<b>abc</b>");
    }

    #[test]
    fn match_at_end_closes_the_tag() {
        let marked = highlight("abc", &info(vec![2]), "<b>", "</b>");
        assert_eq!(marked, "ab<b>c</b>");
    }

    #[test]
    fn custom_tags_are_used_verbatim() {
        let marked = highlight("abc", &info(vec![1]), "<em>", "</em>");
        assert_eq!(marked, "a<em>b</em>c");
    }

    #[test]
    fn empty_indexes_return_text_unchanged() {
        let marked = highlight("abc", &info(vec![]), "<b>", "</b>");
        assert_eq!(marked, "abc");
    }

    #[test]
    fn non_ascii_text_highlights_by_char_position() {
        // 'é' is two bytes; positions are chars, so index 3 is the 'é'.
        let marked = highlight("caf\u{00e9}s", &info(vec![3]), "<b>", "</b>");
        assert_eq!(marked, "caf<b>\u{00e9}</b>s");
    }

    // --- highlight_with (segments) ---

    #[test]
    fn segments_alternate_plain_and_matched() {
        let segments = highlight_with("concatenate", &info(vec![3, 4, 5]), |run, _| run.to_owned());
        assert_eq!(
            segments,
            vec![
                Segment::Plain("con"),
                Segment::Matched("cat".to_owned()),
                Segment::Plain("enate"),
            ],
        );
    }

    #[test]
    fn callback_ordinals_count_runs_not_chars() {
        let mut seen = Vec::new();
        highlight_with("abcde", &info(vec![0, 1, 3]), |run, i| {
            seen.push((run.to_owned(), i));
        });
        assert_eq!(seen, vec![("ab".to_owned(), 0), ("d".to_owned(), 1)]);
    }

    #[test]
    fn leading_plain_run_is_preserved() {
        let segments = highlight_with("xxab", &info(vec![2, 3]), |run, _| run.to_owned());
        assert_eq!(
            segments,
            vec![Segment::Plain("xx"), Segment::Matched("ab".to_owned())],
        );
    }

    #[test]
    fn no_match_yields_single_plain_segment() {
        let segments: Vec<Segment<'_, String>> =
            highlight_with("abc", &info(vec![]), |run, _| run.to_owned());
        assert_eq!(segments, vec![Segment::Plain("abc")]);
    }

    #[test]
    fn empty_text_yields_no_segments() {
        let segments: Vec<Segment<'_, String>> =
            highlight_with("", &info(vec![]), |run, _| run.to_owned());
        assert!(segments.is_empty());
    }

    #[test]
    fn typed_segments_carry_callback_output() {
        #[derive(Debug, PartialEq, Eq)]
        struct Span(usize);
        let segments = highlight_with("abc", &info(vec![1]), |_, i| Span(i));
        assert_eq!(
            segments,
            vec![
                Segment::Plain("a"),
                Segment::Matched(Span(0)),
                Segment::Plain("c"),
            ],
        );
    }

    #[test]
    fn indexes_past_text_are_ignored() {
        let segments: Vec<Segment<'_, String>> =
            highlight_with("ab", &info(vec![0, 5]), |run, _| run.to_owned());
        assert_eq!(
            segments,
            vec![Segment::Matched("a".to_owned()), Segment::Plain("b")],
        );
    }
}
