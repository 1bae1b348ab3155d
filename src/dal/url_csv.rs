use std::path::Path;

use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, Writer};

pub const URL_COLUMN: &str = "job_url";

/// A CSV of job links with a header row. Rows keep every column so filters
/// can write them back unchanged.
#[derive(Debug, Clone)]
pub struct UrlTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    url_column: usize,
}

impl UrlTable {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        // Falls back to the first column when there is no `job_url` header.
        let url_column = headers
            .iter()
            .position(|header| header.trim() == URL_COLUMN)
            .unwrap_or(0);
        UrlTable {
            headers,
            rows,
            url_column,
        }
    }

    pub fn url<'a>(&self, row: &'a StringRecord) -> &'a str {
        row.get(self.url_column).unwrap_or("").trim()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| self.url(row))
    }

    pub fn retain_rows(mut self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let url_column = self.url_column;
        self.rows
            .retain(|row| keep(row.get(url_column).unwrap_or("").trim()));
        self
    }
}

pub fn read_url_csv(path: &Path) -> anyhow::Result<UrlTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?
        .into_iter()
        .filter(|row| row.iter().any(|field| !field.trim().is_empty()))
        .collect();

    Ok(UrlTable::new(headers, rows))
}

pub fn write_url_csv(path: &Path, table: &UrlTable) -> anyhow::Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
