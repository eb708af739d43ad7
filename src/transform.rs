//! Ready-made string transformations for the `transform` search option.
//!
//! Matching itself only lowercases; anything beyond that (folding visually
//! or phonetically equivalent characters, stripping accents) is the
//! caller's choice, applied to the query and every target before
//! preparation. The helpers here cover the two common cases.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fixed substitution table folding character variants onto a canonical
/// form, covering Arabic letter variants and Turkish-specific letters.
const FOLD_TABLE: &[(char, char)] = &[
    // Arabic
    ('\u{0623}', '\u{0627}'),
    ('\u{0625}', '\u{0627}'),
    ('\u{0622}', '\u{0627}'),
    ('\u{0630}', '\u{0632}'),
    ('\u{0626}', '\u{064a}'),
    ('\u{0629}', '\u{0647}'),
    // Turkish
    ('\u{00e7}', 'c'),
    ('\u{00c7}', 'C'),
    ('\u{015f}', 's'),
    ('\u{015e}', 'S'),
    ('\u{0131}', 'i'),
    ('\u{00f6}', 'o'),
    ('\u{00d6}', 'O'),
    ('\u{00fc}', 'u'),
    ('\u{00dc}', 'U'),
    ('\u{011f}', 'g'),
    ('\u{011e}', 'G'),
];

fn fold_char(c: char) -> char {
    FOLD_TABLE
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Replace characters listed in the fixed substitution table with their
/// canonical form.
///
/// Intended as a `transform` hook so that, for example, a query typed
/// without Turkish diacritics still matches candidates spelled with them.
///
/// # Examples
///
/// ```
/// use fuzzrank::transform::fold_common_chars;
///
/// assert_eq!(fold_common_chars("\u{00e7}ay"), "cay");
/// assert_eq!(fold_common_chars("G\u{00fc}l"), "Gul");
/// assert_eq!(fold_common_chars("plain"), "plain");
/// ```
pub fn fold_common_chars(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Strip diacritical marks by NFD-decomposing and dropping combining marks.
///
/// Precomposed characters like `é` (U+00E9) decompose into a base letter
/// plus a combining accent; filtering the marks leaves the bare letters, so
/// "caf\u{00e9}" becomes "cafe".
///
/// # Examples
///
/// ```
/// use fuzzrank::transform::strip_diacritics;
///
/// assert_eq!(strip_diacritics("caf\u{00e9}"), "cafe");
/// assert_eq!(strip_diacritics("\u{00fc}ber"), "uber");
/// assert_eq!(strip_diacritics("ascii"), "ascii");
/// ```
pub fn strip_diacritics(s: &str) -> String {
    if s.is_ascii() {
        return s.to_owned();
    }
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}
