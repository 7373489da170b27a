// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::feed::FeedFormat;
use crate::presets;
use crate::session::ExtractionSession;
use crate::window;

/// Configuration for monitor behavior
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub error_strategy: ErrorStrategy,
    pub debug: bool,
    pub buffer_size: usize,
    pub max_line_length: usize,
    pub history_limit: usize,
    pub window_lines: usize,
    pub feed_format: FeedFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            error_strategy: ErrorStrategy::Skip,
            debug: false,
            buffer_size: 65536,       // 64KB
            max_line_length: 1048576, // 1MB
            history_limit: 50,
            window_lines: window::MAX_LINES,
            feed_format: FeedFormat::Raw,
        }
    }
}

/// Simple error handling strategy
#[derive(Debug, Clone)]
pub enum ErrorStrategy {
    /// Skip problematic lines and continue processing
    Skip,
    /// Stop processing on first error
    FailFast,
}

/// One extractor definition from a rules file or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Key into the preset catalogue; mutually exclusive with `pattern`.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// YAML rules file: a list of extractor definitions under `extractors`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    pub extractors: Vec<ExtractorSpec>,
}

impl RulesFile {
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse rules file")
    }
}

/// Build a session from extractor definitions. Active rules are compiled
/// here, so an invalid pattern surfaces before any line is read.
pub fn session_from_specs(specs: &[ExtractorSpec]) -> Result<ExtractionSession> {
    let mut session = ExtractionSession::new();

    for spec in specs {
        let id = match (&spec.preset, &spec.pattern) {
            (Some(key), None) => {
                let preset = presets::find(key).ok_or_else(|| {
                    anyhow!(
                        "Unknown preset '{}' (available: {})",
                        key,
                        presets::available_keys()
                    )
                })?;
                let name = spec.name.as_deref().unwrap_or(preset.name);
                session.add(Some(name), preset.pattern).id
            }
            (None, Some(pattern)) => session.add(spec.name.as_deref(), pattern).id,
            (Some(key), Some(_)) => {
                return Err(anyhow!(
                    "Extractor '{}' sets both preset and pattern",
                    spec.name.as_deref().unwrap_or(key)
                ))
            }
            (None, None) => {
                return Err(anyhow!(
                    "Extractor '{}' has neither a pattern nor a preset",
                    spec.name.as_deref().unwrap_or("<unnamed>")
                ))
            }
        };

        if spec.active {
            session.toggle(id)?;
        }
    }

    Ok(session)
}
