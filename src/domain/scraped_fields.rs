use std::fmt::Display;

use serde_json::{Map, Value};

pub const DESCRIPTION_KEY: &str = "description";
pub const ADDITIONAL_NOTES_KEY: &str = "additional_notes";
pub const ERROR_MARKER: &str = "ERROR: ";

/// Fields scraped from one job page. `description` is always present, null
/// until a description block is found.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedFields {
    fields: Map<String, Value>,
}

impl Default for ScrapedFields {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapedFields {
    pub fn new() -> Self {
        let mut fields = Map::new();
        fields.insert(DESCRIPTION_KEY.to_string(), Value::Null);
        ScrapedFields { fields }
    }

    pub fn from_error(error: impl Display) -> Self {
        let mut scraped = Self::new();
        scraped.set_description(format!("{}{}", ERROR_MARKER, error));
        scraped
    }

    pub fn insert_field(&mut self, label: String, value: String) {
        self.fields.insert(label, Value::String(value));
    }

    pub fn set_description(&mut self, text: String) {
        self.fields
            .insert(DESCRIPTION_KEY.to_string(), Value::String(text));
    }

    /// Stores a label-less value, unless a `description` key already exists.
    /// The key is seeded in `new`, so this only lands on a field set whose
    /// description was removed.
    pub fn note_unlabelled(&mut self, note: String) -> bool {
        if note.is_empty() || self.fields.contains_key(DESCRIPTION_KEY) {
            return false;
        }
        self.fields
            .insert(ADDITIONAL_NOTES_KEY.to_string(), Value::String(note));
        true
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get(DESCRIPTION_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for ScrapedFields {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
