// src/ansi.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// CSI sequences (colors, cursor movement) plus the two-byte escapes some
// progress bars emit. Matching always runs on the raw line; stripping is
// for display only.
static ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[\x30-\x3f]*[\x20-\x2f]*[\x40-\x7e]|\x1b[\x40-\x5f]").unwrap()
});

/// Remove ANSI escape sequences from a line.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ESCAPE.replace_all(line, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_ansi("epoch: 3"), "epoch: 3");
    }

    #[test]
    fn test_color_codes_removed() {
        assert_eq!(
            strip_ansi("\x1b[31merror:\x1b[0m disk full"),
            "error: disk full"
        );
    }

    #[test]
    fn test_cursor_and_erase_codes_removed() {
        assert_eq!(strip_ansi("\x1b[2K\x1b[1Gprogress 42%"), "progress 42%");
    }

    #[test]
    fn test_history_banner_style_codes() {
        // The upstream history feed wraps banners in background colors
        assert_eq!(
            strip_ansi("\x1b[44m\x1b[37m=== history ===\x1b[0m"),
            "=== history ==="
        );
    }
}
