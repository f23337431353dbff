//! Input sanitization for client-supplied text.
//!
//! Chat text and usernames are rendered into other people's DOM, so the
//! server escapes HTML metacharacters once, at the trust boundary,
//! before the text reaches the buffer or the broadcaster. Escaping here
//! (rather than in each client) means a stored conversation is safe no
//! matter which client replays it.

/// Escapes `&`, `<`, and `>` as HTML entities.
///
/// Returns the input unchanged (no allocation beyond the output string)
/// when nothing needs escaping.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}
