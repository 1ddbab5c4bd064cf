//! Text shaping helpers shared by the ingestion and retrieval pipelines.

/// Remove every `\n` from `text`. Carriage returns and other whitespace are
/// left in place.
pub fn strip_newlines(text: &str) -> String {
    text.replace('\n', "")
}

/// Longest prefix of `text` that is at most `max_bytes` bytes long and ends
/// on a character boundary.
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn strip_newlines_removes_only_line_feeds() {
        assert_eq!(strip_newlines("a\nb\r\nc\n"), "ab\rc");
        assert_eq!(strip_newlines("no breaks"), "no breaks");
    }

    #[test]
    fn truncate_bytes_short_text_is_untouched() {
        assert_eq!(truncate_bytes("hello", 10), "hello");
        assert_eq!(truncate_bytes("hello", 5), "hello");
    }

    #[test]
    fn truncate_bytes_cuts_ascii_exactly() {
        let text = "a".repeat(50_000);
        assert_eq!(truncate_bytes(&text, 36_000).len(), 36_000);
    }

    #[test]
    fn truncate_bytes_backs_off_multibyte_characters() {
        // "é" is two bytes, "€" is three.
        assert_eq!(truncate_bytes("aé", 2), "a");
        assert_eq!(truncate_bytes("€€", 4), "€");
        assert_eq!(truncate_bytes("€", 2), "");
    }

    #[test]
    fn truncate_bytes_zero_limit() {
        assert_eq!(truncate_bytes("abc", 0), "");
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    proptest! {
        #[test]
        fn truncate_bytes_respects_limit_and_prefix(text in any::<String>(), limit in 0usize..64) {
            let cut = truncate_bytes(&text, limit);
            prop_assert!(cut.len() <= limit);
            prop_assert!(text.starts_with(cut));
            // Nothing more fits: the next character would overflow the limit.
            if let Some(next) = text[cut.len()..].chars().next() {
                prop_assert!(cut.len() + next.len_utf8() > limit);
            }
        }

        #[test]
        fn truncate_chars_respects_limit(text in any::<String>(), limit in 0usize..64) {
            let cut = truncate_chars(&text, limit);
            prop_assert!(cut.chars().count() <= limit);
            prop_assert!(text.starts_with(cut));
        }
    }
}
