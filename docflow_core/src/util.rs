//! Character-based text helpers.
//!
//! Limits are counted in characters, never bytes, so multi-byte input is never
//! split inside a code point.

/// The first `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Short preview: the first `max_chars` characters, with `...` appended when
/// the text was longer.
#[must_use]
pub fn content_preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// Decode bytes as UTF-8, dropping invalid sequences. Valid input, including
/// an encoded U+FFFD, is kept as is.
#[must_use]
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
