//! Text normalisation applied to everything we show a caller.

use unicode_normalization::UnicodeNormalization;

/// Canonicalise raw page text: NFKD compatibility decomposition, drop
/// anything that does not survive as ASCII, collapse whitespace runs to a
/// single space, and trim the ends.
///
/// Idempotent, and total over arbitrary input.
///
/// ```
/// use delver_web::clean::clean;
///
/// assert_eq!(clean("  caf\u{e9}   au\tlait "), "cafe au lait");
/// ```
pub fn clean(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
