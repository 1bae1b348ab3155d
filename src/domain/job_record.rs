use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scraped_fields::{ScrapedFields, DESCRIPTION_KEY};

pub const APPLICATION_URL_KEY: &str = "application_url";
pub const ID_KEY: &str = "id";
pub const TITLE_KEY: &str = "title";

/// Keys an input record is expected to arrive with; anything past these
/// counts as a found field in progress output.
const BASE_FIELD_COUNT: usize = 3;

/// What a record's `application_url` holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UrlField<'a> {
    /// Absent, null, or another empty value: the record is passed through.
    Missing,
    Link(&'a str),
    /// Present and non-empty but not a string; it cannot be requested.
    Malformed(&'a Value),
}

/// One job entry, kept as an ordered JSON object so unknown input keys
/// survive the round trip untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobRecord(Map<String, Value>);

impl JobRecord {
    pub fn new() -> Self {
        JobRecord(Map::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// The URL to scrape, if the record has a non-empty string one.
    pub fn application_url(&self) -> Option<&str> {
        self.0
            .get(APPLICATION_URL_KEY)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn url_field(&self) -> UrlField<'_> {
        match self.0.get(APPLICATION_URL_KEY) {
            Some(Value::String(url)) if !url.is_empty() => UrlField::Link(url),
            Some(value) if is_truthy(value) && !value.is_string() => UrlField::Malformed(value),
            _ => UrlField::Missing,
        }
    }

    pub fn id_label(&self) -> String {
        match self.0.get(ID_KEY) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => "None".to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get(DESCRIPTION_KEY).and_then(Value::as_str)
    }

    /// A usable description: non-empty and without an error marker anywhere.
    pub fn is_described(&self) -> bool {
        self.description()
            .is_some_and(|text| !text.is_empty() && !text.contains("ERROR"))
    }

    pub fn extra_field_count(&self) -> usize {
        self.0.len().saturating_sub(BASE_FIELD_COUNT)
    }

    /// Copies every scraped key in, overwriting keys the record already had.
    pub fn merge(mut self, scraped: ScrapedFields) -> Self {
        for (key, value) in scraped {
            self.0.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

impl From<Map<String, Value>> for JobRecord {
    fn from(fields: Map<String, Value>) -> Self {
        JobRecord(fields)
    }
}

impl From<JobRecord> for Value {
    fn from(record: JobRecord) -> Self {
        Value::Object(record.0)
    }
}
