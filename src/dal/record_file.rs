use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use anyhow::Context;
use serde_json::Value;

use crate::domain::JobRecord;

/// Loads the input records. `Ok(None)` when the file does not exist.
pub fn load_records(path: &Path) -> anyhow::Result<Option<Vec<JobRecord>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let records: Vec<JobRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of objects", path.display()))?;

    Ok(Some(records))
}

#[derive(Debug, PartialEq)]
pub enum ArrayFile {
    Missing,
    Empty,
    Array(Vec<Value>),
    Other(Value),
}

pub fn read_array_file(path: &Path) -> anyhow::Result<ArrayFile> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ArrayFile::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    if raw.trim().is_empty() {
        return Ok(ArrayFile::Empty);
    }

    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

    Ok(match value {
        Value::Array(items) => ArrayFile::Array(items),
        other => ArrayFile::Other(other),
    })
}

pub fn write_array_file(path: &Path, items: &[Value]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, items)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()?;
    Ok(())
}
