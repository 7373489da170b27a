// src/history.rs
use serde::Deserialize;

/// Bulk-history payload returned by the log backend.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub history: Option<String>,
}

/// Feed configuration payload; `OPEN_HISTORY_LOG` gates history loading.
#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    #[serde(rename = "OPEN_HISTORY_LOG", default)]
    pub open_history_log: bool,
}

/// Whether a feed-config payload enables history loading. An unparseable
/// payload enables it, matching the upstream fallback of loading history
/// even when the config fetch fails.
pub fn history_enabled(config_content: &str) -> bool {
    match serde_json::from_str::<FeedConfig>(config_content) {
        Ok(config) => config.open_history_log,
        Err(_) => true,
    }
}

/// Turn a history payload into replayable lines. Accepts either the JSON
/// envelope `{"success": true, "history": "..."}` or plain newline-joined
/// text. A malformed envelope, `success == false`, or a missing history
/// field all mean "no history" - never an error.
pub fn parse_history(content: &str) -> Vec<String> {
    if content.trim_start().starts_with('{') {
        match serde_json::from_str::<HistoryResponse>(content) {
            Ok(response) if response.success => response
                .history
                .as_deref()
                .map(split_lines)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    } else {
        split_lines(content)
    }
}

/// The trailing `limit` elements of `lines`.
pub fn tail<S>(lines: &[S], limit: usize) -> &[S] {
    &lines[lines.len().saturating_sub(limit)..]
}

// Blank lines never reach ingestion; the trailing-limit cut therefore
// counts only real lines.
fn split_lines(history: &str) -> Vec<String> {
    history
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_payload() {
        let lines = parse_history(r#"{"success": true, "history": "epoch: 1\nepoch: 2"}"#);
        assert_eq!(lines, vec!["epoch: 1", "epoch: 2"]);
    }

    #[test]
    fn test_envelope_filters_blank_lines() {
        let lines = parse_history(r#"{"success": true, "history": "a\n\n   \nb\n"}"#);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_unsuccessful_envelope_is_no_history() {
        assert!(parse_history(r#"{"success": false, "history": "a\nb"}"#).is_empty());
    }

    #[test]
    fn test_missing_history_field_is_no_history() {
        assert!(parse_history(r#"{"success": true}"#).is_empty());
    }

    #[test]
    fn test_malformed_envelope_is_no_history() {
        assert!(parse_history(r#"{"success": tr"#).is_empty());
    }

    #[test]
    fn test_plain_text_payload() {
        let lines = parse_history("line one\nline two\n");
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[test]
    fn test_history_enabled() {
        assert!(history_enabled(r#"{"OPEN_HISTORY_LOG": true}"#));
        assert!(!history_enabled(r#"{"OPEN_HISTORY_LOG": false}"#));
        // Missing key disables, unparseable content falls back to enabled
        assert!(!history_enabled(r#"{}"#));
        assert!(history_enabled("not json at all"));
    }

    #[test]
    fn test_tail() {
        let lines: Vec<String> = (1..=5).map(|i| i.to_string()).collect();
        assert_eq!(tail(&lines, 2), &["4".to_string(), "5".to_string()]);
        assert_eq!(tail(&lines, 10).len(), 5);
        assert!(tail(&lines, 0).is_empty());
    }
}
