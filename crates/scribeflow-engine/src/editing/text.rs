use xi_rope::Rope;
use xi_rope::delta::Builder;

/// Number of characters (Unicode scalar values) in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `char_offset`-th character, clamped to the end of `text`
pub fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Replace the characters in `range` with `insert`.
///
/// Offsets are in characters and clamped to the content; a reversed range is
/// treated as the same span read forwards.
pub fn splice(content: &str, range: std::ops::Range<usize>, insert: &str) -> String {
    let start = byte_offset(content, range.start.min(range.end));
    let end = byte_offset(content, range.start.max(range.end));

    let rope = Rope::from(content);
    let mut builder = Builder::new(rope.len());
    builder.replace(start..end, Rope::from(insert));
    builder.build().apply(&rope).to_string()
}
