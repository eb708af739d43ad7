//! String preparation: lowercase code sequences, character-class bitflags,
//! and word-boundary jump tables.
//!
//! Preparation runs once per distinct string (see [`crate::cache`]) and
//! produces everything the matcher needs so that scanning thousands of
//! candidates never re-derives per-character state.

use std::cell::OnceCell;

/// Per-character preparation output shared by queries and targets.
///
/// `lower_codes` holds exactly one lowercase code point per character of the
/// input, so indexes into it line up with char positions of the original
/// string (`lower_text` is built from the same mapped characters). Characters
/// whose full lowercase mapping expands to several code points (e.g. 'İ')
/// contribute only the first, keeping the alignment intact.
pub(crate) struct LowerInfo {
    pub(crate) lower_codes: Vec<u32>,
    pub(crate) bitflags: u32,
    pub(crate) contains_space: bool,
    pub(crate) lower_text: String,
}

/// Map a single character to its lowercase code-point, taking the first
/// character of the mapping when lowercasing expands.
fn lower_char(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// Compute the character-class bit for a lowercase code point.
///
/// Letters a-z map to bits 0-25, digits to bit 26, any other ASCII to bit 30,
/// and everything above ASCII to bit 31. Bits 27-29 are reserved. Space is
/// handled by the caller (it sets `contains_space` and contributes no bit,
/// because spaces act as token separators rather than matchable characters).
fn class_bit(code: u32) -> u32 {
    match code {
        97..=122 => code - 97,
        48..=57 => 26,
        0..=127 => 30,
        _ => 31,
    }
}

/// Lowercase a string and derive its codes, bitflags, and space flag.
pub(crate) fn lower_info(s: &str) -> LowerInfo {
    let mut lower_codes = Vec::with_capacity(s.len());
    let mut lower_text = String::with_capacity(s.len());
    let mut bitflags = 0u32;
    let mut contains_space = false;

    for c in s.chars() {
        let lc = lower_char(c);
        let code = lc as u32;
        lower_codes.push(code);
        lower_text.push(lc);

        if code == 32 {
            contains_space = true;
            continue;
        }
        bitflags |= 1 << class_bit(code);
    }

    LowerInfo {
        lower_codes,
        bitflags,
        contains_space,
        lower_text,
    }
}

/// One whitespace-delimited piece of a multi-token query, prepared on its own.
///
/// Tokens never contain spaces, so they carry no space flag and no bitflags
/// (the whole-query bitflags already cover every token's characters).
pub(crate) struct PreparedToken {
    pub(crate) lower_codes: Vec<u32>,
    pub(crate) lower_text: String,
}

/// A search query, prepared for repeated matching.
pub(crate) struct PreparedQuery {
    pub(crate) lower_codes: Vec<u32>,
    pub(crate) bitflags: u32,
    pub(crate) contains_space: bool,
    pub(crate) lower_text: String,
    /// Non-empty only when `contains_space` is true: the de-duplicated,
    /// order-preserving whitespace-split pieces of the trimmed query.
    pub(crate) tokens: Vec<PreparedToken>,
}

/// Prepare a query string: trim it, lowercase it, and split out tokens when
/// it contains interior whitespace.
pub(crate) fn prepare_query(raw: &str) -> PreparedQuery {
    let trimmed = raw.trim();
    let info = lower_info(trimmed);

    let mut tokens = Vec::new();
    if info.contains_space {
        let mut seen: Vec<&str> = Vec::new();
        for piece in trimmed.split_whitespace() {
            if seen.contains(&piece) {
                continue;
            }
            seen.push(piece);
            let piece_info = lower_info(piece);
            tokens.push(PreparedToken {
                lower_codes: piece_info.lower_codes,
                lower_text: piece_info.lower_text,
            });
        }
    }

    PreparedQuery {
        lower_codes: info.lower_codes,
        bitflags: info.bitflags,
        contains_space: info.contains_space,
        lower_text: info.lower_text,
        tokens,
    }
}

/// A candidate string, prepared for repeated matching.
///
/// Only immutable preparation data lives here; scoring output is returned to
/// the caller as a fresh value per call. The boundary jump table is the one
/// lazily-initialized field: it is built on the first strict-match attempt
/// and reused for every later search against the same cached target.
pub(crate) struct PreparedTarget {
    /// The string exactly as it was handed to preparation (original case).
    pub(crate) text: String,
    pub(crate) lower_text: String,
    pub(crate) lower_codes: Vec<u32>,
    pub(crate) bitflags: u32,
    next_beginning_indexes: OnceCell<Vec<usize>>,
}

impl PreparedTarget {
    /// The word-boundary jump table, built on first use.
    ///
    /// `table[i]` is the char index of the next word-start strictly after
    /// `i`, or the target length when no later word starts. "At or after
    /// `i`" is therefore `table[i - 1]` for `i > 0`, and `0` itself is
    /// always a word start.
    pub(crate) fn next_beginning_indexes(&self) -> &[usize] {
        self.next_beginning_indexes
            .get_or_init(|| next_beginning_indexes(&self.text, self.lower_codes.len()))
    }

    /// Target length in characters.
    pub(crate) fn len(&self) -> usize {
        self.lower_codes.len()
    }
}

/// Prepare a target string. Targets are not trimmed and do not split into
/// tokens; the query side drives token handling.
pub(crate) fn prepare_target(raw: &str) -> PreparedTarget {
    let info = lower_info(raw);
    PreparedTarget {
        text: raw.to_owned(),
        lower_text: info.lower_text,
        lower_codes: info.lower_codes,
        bitflags: info.bitflags,
        next_beginning_indexes: OnceCell::new(),
    }
}

/// Char positions that start a word in `text`.
///
/// A position starts a word when it is the first character, the previous
/// character was not ASCII-alphanumeric, the current character is not
/// ASCII-alphanumeric, or the current character is ASCII-uppercase while the
/// previous was not (camelCase boundary). Non-ASCII characters are not
/// alphanumeric under this definition, so each counts as a word start.
fn beginning_indexes(text: &str) -> Vec<usize> {
    let mut indexes = Vec::new();
    let mut was_upper = false;
    let mut was_alnum = false;

    for (i, c) in text.chars().enumerate() {
        let is_upper = c.is_ascii_uppercase();
        let is_alnum = is_upper || c.is_ascii_lowercase() || c.is_ascii_digit();
        let is_beginning = (is_upper && !was_upper) || !was_alnum || !is_alnum;

        was_upper = is_upper;
        was_alnum = is_alnum;

        if is_beginning {
            indexes.push(i);
        }
    }

    indexes
}

/// Build the jump table mapping every char index to the next word-start
/// strictly after it (or `len` when none remains).
fn next_beginning_indexes(text: &str, len: usize) -> Vec<usize> {
    let begins = beginning_indexes(text);
    let mut table = Vec::with_capacity(len);

    let mut last_begin = begins.first().copied();
    let mut begin_i = 0usize;

    for i in 0..len {
        match last_begin {
            Some(b) if b > i => table.push(b),
            _ => {
                begin_i += 1;
                last_begin = begins.get(begin_i).copied();
                table.push(last_begin.unwrap_or(len));
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- lower_info tests ---

    #[test]
    fn codes_align_with_char_positions() {
        let info = lower_info("AbC");
        assert_eq!(info.lower_codes, vec!['a' as u32, 'b' as u32, 'c' as u32]);
        assert_eq!(info.lower_text, "abc");
    }

    #[test]
    fn letter_bits_cover_a_through_z() {
        let info = lower_info("az");
        assert_eq!(info.bitflags, (1 << 0) | (1 << 25));
    }

    #[test]
    fn digit_bit_is_26() {
        let info = lower_info("7");
        assert_eq!(info.bitflags, 1 << 26);
    }

    #[test]
    fn other_ascii_bit_is_30() {
        let info = lower_info("-_!");
        assert_eq!(info.bitflags, 1 << 30);
    }

    #[test]
    fn non_ascii_bit_is_31() {
        let info = lower_info("\u{4e16}");
        assert_eq!(info.bitflags, 1 << 31);
    }

    #[test]
    fn space_sets_flag_but_no_bit() {
        let info = lower_info("a b");
        assert!(info.contains_space);
        assert_eq!(info.bitflags, (1 << 0) | (1 << 1));
    }

    #[test]
    fn empty_string_is_all_zero() {
        let info = lower_info("");
        assert!(info.lower_codes.is_empty());
        assert_eq!(info.bitflags, 0);
        assert!(!info.contains_space);
        assert_eq!(info.lower_text, "");
    }

    #[test]
    fn precomposed_accent_keeps_alignment() {
        // U+00C9 lowercases to U+00E9, a single character: one code per char.
        let info = lower_info("\u{00C9}x");
        assert_eq!(info.lower_codes.len(), 2);
        assert_eq!(info.lower_codes[0], 0x00E9);
        assert_eq!(info.lower_codes[1], 'x' as u32);
    }

    #[test]
    fn expanding_lowercase_contributes_one_code() {
        // 'İ' (U+0130) lowercases to "i" + combining dot; only the first
        // character is kept so indexes stay aligned.
        let info = lower_info("\u{0130}x");
        assert_eq!(info.lower_codes.len(), 2);
        assert_eq!(info.lower_codes[0], 'i' as u32);
    }

    // --- prepare_query tests ---

    #[test]
    fn query_is_trimmed() {
        let q = prepare_query("  abc  ");
        assert_eq!(q.lower_text, "abc");
        assert!(!q.contains_space);
        assert!(q.tokens.is_empty());
    }

    #[test]
    fn interior_space_splits_tokens() {
        let q = prepare_query("foo bar");
        assert!(q.contains_space);
        assert_eq!(q.tokens.len(), 2);
        assert_eq!(q.tokens[0].lower_text, "foo");
        assert_eq!(q.tokens[1].lower_text, "bar");
    }

    #[test]
    fn duplicate_tokens_are_dropped_order_preserved() {
        let q = prepare_query("foo bar foo baz");
        let texts: Vec<&str> = q.tokens.iter().map(|t| t.lower_text.as_str()).collect();
        assert_eq!(texts, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn runs_of_whitespace_collapse() {
        let q = prepare_query("foo   bar");
        assert_eq!(q.tokens.len(), 2);
    }

    #[test]
    fn tokens_keep_original_case_folding() {
        let q = prepare_query("Foo BAR");
        assert_eq!(q.tokens[0].lower_text, "foo");
        assert_eq!(q.tokens[1].lower_text, "bar");
    }

    #[test]
    fn single_token_query_has_no_tokens() {
        let q = prepare_query("hello");
        assert!(q.tokens.is_empty());
    }

    // --- beginning_indexes tests ---

    #[test]
    fn first_char_is_a_beginning() {
        assert_eq!(beginning_indexes("abc"), vec![0]);
    }

    #[test]
    fn camel_case_starts_words() {
        assert_eq!(beginning_indexes("fooBarBaz"), vec![0, 3, 6]);
    }

    #[test]
    fn consecutive_uppercase_is_one_word() {
        // "HTTPServer": 'H' begins; the run of uppercase after it does not,
        // until 'e'... which is lowercase after uppercase, also not a start.
        assert_eq!(beginning_indexes("ABCd"), vec![0]);
    }

    #[test]
    fn punctuation_and_following_char_are_beginnings() {
        // '-' is non-alphanumeric (a beginning itself) and the char after
        // it begins a new word.
        assert_eq!(beginning_indexes("a-b"), vec![0, 1, 2]);
    }

    #[test]
    fn digits_do_not_break_words() {
        assert_eq!(beginning_indexes("ab12cd"), vec![0]);
    }

    #[test]
    fn empty_string_has_no_beginnings() {
        assert!(beginning_indexes("").is_empty());
    }

    // --- next_beginning_indexes tests ---

    #[test]
    fn table_is_strictly_after_each_index() {
        let table = next_beginning_indexes("fooBar", 6);
        for (i, &next) in table.iter().enumerate() {
            assert!(next > i, "table[{i}] = {next} is not strictly after");
        }
    }

    #[test]
    fn table_points_at_next_word_start() {
        // Beginnings of "fooBar" are 0 and 3.
        let table = next_beginning_indexes("fooBar", 6);
        assert_eq!(table, vec![3, 3, 3, 6, 6, 6]);
    }

    #[test]
    fn table_saturates_at_length() {
        let table = next_beginning_indexes("abc", 3);
        assert_eq!(table, vec![3, 3, 3]);
    }

    // --- PreparedTarget tests ---

    #[test]
    fn target_keeps_original_text() {
        let t = prepare_target("FooBar");
        assert_eq!(t.text, "FooBar");
        assert_eq!(t.lower_text, "foobar");
    }

    #[test]
    fn boundary_table_is_lazy_and_stable() {
        let t = prepare_target("fooBar");
        let first = t.next_beginning_indexes().to_vec();
        let second = t.next_beginning_indexes().to_vec();
        assert_eq!(first, second);
        assert_eq!(first, vec![3, 3, 3, 6, 6, 6]);
    }

    #[test]
    fn boundary_table_uses_original_case() {
        // Word detection must see the uppercase 'B' even though matching
        // runs on the lowercased codes.
        let t = prepare_target("fooBar");
        assert_eq!(t.lower_text, "foobar");
        assert_eq!(t.next_beginning_indexes()[0], 3);
    }

    #[test]
    fn target_len_counts_chars_not_bytes() {
        let t = prepare_target("caf\u{00e9}");
        assert_eq!(t.len(), 4);
    }
}
