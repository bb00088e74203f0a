/// Default upper bound, in characters, for the output carried by one comment.
///
/// GitHub rejects comment bodies above 65,536 characters; the remainder is
/// headroom for the title, run details, template, and markers.
pub const DEFAULT_MAX_PART_CHARS: usize = 55_000;

/// Split `text` into contiguous parts of at most `max_chars` characters.
///
/// Each cut lands just after the last newline inside the current window and
/// falls back to exactly `max_chars` only when the window has no newline.
/// Concatenating the parts yields `text` unchanged; empty input yields no
/// parts. A `max_chars` of zero is treated as one.
pub fn split_output(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let window_end = byte_offset_after_chars(rest, max_chars);
        if window_end == rest.len() {
            parts.push(rest);
            break;
        }
        let cut = match rest[..window_end].rfind('\n') {
            Some(newline) => newline + 1,
            None => window_end,
        };
        let (part, tail) = rest.split_at(cut);
        parts.push(part);
        rest = tail;
    }
    parts
}

fn byte_offset_after_chars(text: &str, count: usize) -> usize {
    text.char_indices()
        .nth(count)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
