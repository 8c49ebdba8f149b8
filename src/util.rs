// src/util.rs — Shared utility functions

/// One-line preview of user text for log lines.
///
/// Newlines become spaces and the result is cut to at most `max_chars`
/// characters, with an ellipsis when something was dropped.
pub fn log_preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if s.chars().nth(max_chars).is_some() {
        out.push('…');
    }
    out
}

/// Cut `text` into pieces of at most `max_chars` characters each.
///
/// A piece ends after the last newline inside its window when there is one,
/// otherwise at the character limit. Concatenating the pieces gives `text`.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some((cut, _)) = rest.char_indices().nth(max_chars) {
        let end = match rest[..cut].rfind('\n') {
            Some(i) if i > 0 => i + 1,
            _ => cut,
        };
        pieces.push(&rest[..end]);
        rest = &rest[end..];
    }
    pieces.push(rest);
    pieces
}
