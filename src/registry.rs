// src/registry.rs
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::error::RegistryError;
use crate::presets::Preset;

/// Which editable field of an extractor `update_field` targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Pattern,
}

/// One user-defined extraction rule
#[derive(Debug)]
pub struct Extractor {
    pub id: u32,
    pub name: String,
    pub pattern: String,
    compiled: Option<Regex>,
    active: bool,
}

impl Extractor {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Compiled form; present exactly while the extractor is active with a
    /// valid pattern.
    pub fn compiled(&self) -> Option<&Regex> {
        self.compiled.as_ref()
    }

    fn compile(pattern: &str, name: &str) -> Result<Regex, RegistryError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| RegistryError::InvalidPattern {
                name: name.to_string(),
                source: e,
            })
    }
}

/// Ordered set of extraction rules. Insertion order defines column order
/// in the rendered table, and survives removals.
pub struct ExtractorRegistry {
    items: IndexMap<u32, Extractor>,
    next_id: u32,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        ExtractorRegistry {
            items: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Add a rule with the next free id. The pattern is not validated here;
    /// compilation is deferred until activation.
    pub fn add(&mut self, name: Option<&str>, pattern: &str) -> &Extractor {
        let id = self.next_id;
        self.next_id += 1;

        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("项目{}", id),
        };

        self.items.insert(
            id,
            Extractor {
                id,
                name,
                pattern: pattern.to_string(),
                compiled: None,
                active: false,
            },
        );
        &self.items[&id]
    }

    /// Seed a rule from a preset template.
    pub fn add_preset(&mut self, preset: &Preset) -> &Extractor {
        self.add(Some(preset.name), preset.pattern)
    }

    pub fn get(&self, id: u32) -> Option<&Extractor> {
        self.items.get(&id)
    }

    /// Update `name` or `pattern`. Editing the pattern of an active rule
    /// recompiles immediately; on failure the rule is deactivated and the
    /// compile error returned, so it never sits active with a stale regex.
    pub fn update_field(&mut self, id: u32, field: Field, value: &str) -> Result<(), RegistryError> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(RegistryError::UnknownExtractor(id))?;

        match field {
            Field::Name => {
                item.name = value.to_string();
            }
            Field::Pattern => {
                item.pattern = value.to_string();
                if item.active {
                    match Extractor::compile(&item.pattern, &item.name) {
                        Ok(re) => item.compiled = Some(re),
                        Err(e) => {
                            item.active = false;
                            item.compiled = None;
                            return Err(e);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Flip a rule's active state. Turning on compiles the pattern and
    /// reports a compile failure without activating; turning off drops the
    /// compiled regex.
    pub fn toggle(&mut self, id: u32) -> Result<bool, RegistryError> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(RegistryError::UnknownExtractor(id))?;

        if item.active {
            item.active = false;
            item.compiled = None;
        } else {
            item.compiled = Some(Extractor::compile(&item.pattern, &item.name)?);
            item.active = true;
        }
        Ok(item.active)
    }

    /// Remove a rule, keeping the order of the remainder. Ids are never
    /// reused.
    pub fn remove(&mut self, id: u32) -> bool {
        self.items.shift_remove(&id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extractor> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
