//! Broadcast text sanitization
//!
//! In-game broadcasts are interpolated into a quoted RCON command, so
//! user-supplied text must not be able to break out of the quoting or smuggle
//! control sequences to the server console.

/// Maximum length of a sanitized broadcast, in characters
pub const MAX_BROADCAST_LEN: usize = 200;

/// Sanitize text destined for an in-game broadcast
///
/// Strips quotes and backslashes, drops everything outside printable ASCII,
/// and truncates to [`MAX_BROADCAST_LEN`] characters. May return an empty
/// string; callers treat that as "nothing to send".
///
/// # Examples
///
/// ```
/// use palisade::rcon::sanitize_broadcast;
///
/// assert_eq!(sanitize_broadcast(r#"say "hi" \o/"#), "say hi o/");
/// assert_eq!(sanitize_broadcast("\u{7}\u{200B}"), "");
/// ```
pub fn sanitize_broadcast(text: &str) -> String {
    text.chars()
        .filter(|&c| !matches!(c, '"' | '\'' | '\\'))
        .filter(|&c| matches!(c, ' '..='~'))
        .take(MAX_BROADCAST_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_quotes_and_backslashes() {
        assert_eq!(sanitize_broadcast(r#"a"b'c\d"#), "abcd");
    }

    #[test]
    fn test_strips_non_printable() {
        assert_eq!(sanitize_broadcast("ping\u{0}\u{1F}\u{7F}pong"), "pingpong");
        assert_eq!(sanitize_broadcast("안내 notice"), " notice");
    }

    #[test]
    fn test_truncates_to_limit() {
        let long = "x".repeat(MAX_BROADCAST_LEN * 2);
        assert_eq!(sanitize_broadcast(&long).len(), MAX_BROADCAST_LEN);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(sanitize_broadcast(""), "");
    }

    proptest! {
        #[test]
        fn sanitized_text_is_always_clean(s in "\\PC*") {
            let out = sanitize_broadcast(&s);
            prop_assert!(out.chars().count() <= MAX_BROADCAST_LEN);
            prop_assert!(out.chars().all(|c| matches!(c, ' '..='~')));
            prop_assert!(!out.contains('"'));
            prop_assert!(!out.contains('\''));
            prop_assert!(!out.contains('\\'));
        }
    }
}
