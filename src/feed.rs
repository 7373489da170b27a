// src/feed.rs
use serde::Deserialize;

/// Shape of the live input stream.
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum FeedFormat {
    #[value(name = "raw", help = "One raw log line per input line")]
    Raw,
    #[value(
        name = "events",
        help = "One JSON push event per line, e.g. {\"data\": \"epoch: 3\"}"
    )]
    Events,
}

impl std::str::FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(FeedFormat::Raw),
            "events" => Ok(FeedFormat::Events),
            _ => Err(format!("Unknown feed format: {}", s)),
        }
    }
}

impl Default for FeedFormat {
    fn default() -> Self {
        FeedFormat::Raw
    }
}

/// One push event from the line-delivery channel.
#[derive(Debug, Deserialize)]
struct PushEvent {
    data: String,
}

/// Decode one input line into the raw log line it carries.
pub fn decode_line(format: FeedFormat, line: &str) -> Result<String, String> {
    match format {
        FeedFormat::Raw => Ok(line.to_string()),
        FeedFormat::Events => serde_json::from_str::<PushEvent>(line)
            .map(|event| event.data)
            .map_err(|e| format!("Bad push event: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_passthrough() {
        assert_eq!(
            decode_line(FeedFormat::Raw, "epoch: 3").unwrap(),
            "epoch: 3"
        );
    }

    #[test]
    fn test_event_payload() {
        assert_eq!(
            decode_line(FeedFormat::Events, r#"{"data": "loss: 0.5"}"#).unwrap(),
            "loss: 0.5"
        );
    }

    #[test]
    fn test_event_with_extra_fields() {
        assert_eq!(
            decode_line(
                FeedFormat::Events,
                r#"{"data": "loss: 0.5", "seq": 12}"#
            )
            .unwrap(),
            "loss: 0.5"
        );
    }

    #[test]
    fn test_malformed_event() {
        assert!(decode_line(FeedFormat::Events, "not json").is_err());
        assert!(decode_line(FeedFormat::Events, r#"{"other": 1}"#).is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("raw".parse::<FeedFormat>().unwrap(), FeedFormat::Raw);
        assert_eq!("EVENTS".parse::<FeedFormat>().unwrap(), FeedFormat::Events);
        assert!("socket".parse::<FeedFormat>().is_err());
    }
}
