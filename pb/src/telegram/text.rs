//! Byte-bounded text splitting on char boundaries

/// Longest text message the Bot API accepts
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Longest photo caption the Bot API accepts
pub const MAX_CAPTION_BYTES: usize = 1024;

/// Split `text` into chunks of at most `max_bytes`, never inside a char
///
/// A zero limit returns the text whole.
pub fn split_by_bytes(text: &str, max_bytes: usize) -> Vec<String> {
    if max_bytes == 0 || text.len() <= max_bytes {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut buf = String::with_capacity(max_bytes);
    for ch in text.chars() {
        if !buf.is_empty() && buf.len() + ch.len_utf8() > max_bytes {
            out.push(std::mem::take(&mut buf));
        }
        buf.push(ch);
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

/// Longest prefix of `text` within `max_bytes`, ending on a char boundary
pub fn truncate_by_bytes(text: &str, max_bytes: usize) -> &str {
    if max_bytes == 0 || text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_by_bytes("hello", 10), vec!["hello"]);
        assert_eq!(split_by_bytes("", 10), vec![""]);
        assert_eq!(split_by_bytes("hello", 0), vec!["hello"]);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        // "ў" is two bytes
        let text = "aўўb";
        let parts = split_by_bytes(text, 3);
        assert_eq!(parts, vec!["aў", "ўb"]);
        assert!(parts.iter().all(|p| p.len() <= 3));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_long_message() {
        let text = "🍌".repeat(2000);
        let parts = split_by_bytes(&text, MAX_MESSAGE_BYTES);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), MAX_MESSAGE_BYTES);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_by_bytes("hello", 3), "hel");
        assert_eq!(truncate_by_bytes("aўb", 2), "a");
        assert_eq!(truncate_by_bytes("short", MAX_CAPTION_BYTES), "short");
    }
}
