// src/session.rs
use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::error::RegistryError;
use crate::history;
use crate::presets::Preset;
use crate::registry::{Extractor, ExtractorRegistry, Field};

/// Snapshot of the extraction table: one row, replaced wholesale on every
/// render. `cells` holds one entry per currently defined extractor, in
/// registry order; `None` where no value has ever been recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRow {
    pub timestamp: Option<String>,
    pub cells: Vec<Option<String>>,
}

/// The single owned instance holding the extractor set and the current
/// values. Created once per run; values never expire on their own and are
/// cleared only by `clear_values` or `remove`.
pub struct ExtractionSession {
    registry: ExtractorRegistry,
    values: HashMap<u32, String>,
    last_update: Option<DateTime<Local>>,
}

impl ExtractionSession {
    pub fn new() -> Self {
        ExtractionSession {
            registry: ExtractorRegistry::new(),
            values: HashMap::new(),
            last_update: None,
        }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn add(&mut self, name: Option<&str>, pattern: &str) -> &Extractor {
        self.registry.add(name, pattern)
    }

    pub fn add_preset(&mut self, preset: &Preset) -> &Extractor {
        self.registry.add_preset(preset)
    }

    pub fn update_field(&mut self, id: u32, field: Field, value: &str) -> Result<(), RegistryError> {
        self.registry.update_field(id, field, value)
    }

    pub fn toggle(&mut self, id: u32) -> Result<bool, RegistryError> {
        self.registry.toggle(id)
    }

    /// Remove an extractor together with its last-known value. A rule
    /// re-added later gets a fresh id and starts with no value.
    pub fn remove(&mut self, id: u32) -> bool {
        self.values.remove(&id);
        self.registry.remove(id)
    }

    /// Feed one live line. Returns true when at least one extractor
    /// matched, which is the render trigger; non-matching lines leave all
    /// state untouched.
    pub fn ingest(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }

        let mut matched = false;
        for item in self.registry.iter() {
            if !item.is_active() {
                continue;
            }
            if let Some(re) = item.compiled() {
                // Only the first match on the line is consulted, even if
                // the pattern occurs again later in the same line.
                if let Some(caps) = re.captures(line) {
                    self.values.insert(item.id, extract_value(&caps));
                    matched = true;
                }
            }
        }

        if matched {
            self.last_update = Some(Local::now());
        }
        matched
    }

    /// Replay the trailing `limit` lines of a history payload through the
    /// same path as live ingestion. Returns the number of lines fed.
    pub fn replay_history<S: AsRef<str>>(&mut self, lines: &[S], limit: usize) -> usize {
        let tail = history::tail(lines, limit);
        for line in tail {
            self.ingest(line.as_ref());
        }
        tail.len()
    }

    pub fn value(&self, id: u32) -> Option<&str> {
        self.values.get(&id).map(|s| s.as_str())
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Drop all recorded values and the update timestamp. The extractor
    /// set itself is untouched.
    pub fn clear_values(&mut self) {
        self.values.clear();
        self.last_update = None;
    }

    /// Display names of all defined extractors, in registry order. This is
    /// the header row; recompute after add/remove/rename.
    pub fn header(&self) -> Vec<String> {
        self.registry.iter().map(|e| e.name.clone()).collect()
    }

    /// Current table row. Inactive extractors keep their column (and any
    /// previously recorded value).
    pub fn row(&self) -> ExtractionRow {
        ExtractionRow {
            timestamp: self
                .last_update
                .map(|t| t.format("%H:%M:%S").to_string()),
            cells: self
                .registry
                .iter()
                .map(|e| self.values.get(&e.id).cloned())
                .collect(),
        }
    }
}

impl Default for ExtractionSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Extraction policy, scanning capture groups in declared order and
/// ignoring empty or whitespace-only ones. Rules follow the
/// keyword-then-value shape of the preset catalogue: when two or more
/// groups carry text, the leading one matched the keyword and the next
/// one holds the value. A single non-empty group is the value itself; a
/// groupless match falls back to the whole matched substring. This is a
/// deliberate policy, not a regex-engine default.
fn extract_value(caps: &regex::Captures) -> String {
    let mut groups = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty());

    match (groups.next(), groups.next()) {
        (Some(_keyword), Some(value)) => value.to_string(),
        (Some(value), None) => value.to_string(),
        (None, _) => caps
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}
