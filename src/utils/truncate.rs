//! Truncation Utilities
//!
//! Cuts response bodies down to a short snippet for error messages without
//! splitting a UTF-8 sequence.

/// Default byte budget for error snippets.
pub const SNIPPET_BYTES: usize = 200;

/// Keep at most `max_bytes` of `content`, cut on a char boundary.
pub fn snippet(content: &str, max_bytes: usize) -> String {
    let content = content.trim();
    if content.len() <= max_bytes {
        return content.to_string();
    }

    let mut end = 0;
    for (idx, c) in content.char_indices() {
        let char_end = idx + c.len_utf8();
        if char_end > max_bytes {
            break;
        }
        end = char_end;
    }

    format!("{}... [{} bytes truncated]", &content[..end], content.len() - end)
}
