use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use itertools::Itertools;
use serde_json::Value;
use url::Url;

use crate::{
    dal::{read_array_file, read_url_csv, write_array_file, write_url_csv, ArrayFile, UrlTable},
    domain::{JobRecord, APPLICATION_URL_KEY, DESCRIPTION_KEY, ID_KEY, TITLE_KEY},
};

pub const DEFAULT_PARTS: usize = 10;

pub const BLOCKED_URL_SUBSTRINGS: [&str; 2] = ["linkedin", "wa.me"];

/// Path segments that precede the slugged job title in posting URLs.
const TITLE_MARKERS: [&str; 3] = ["FolderDetail", "JobDetail", "PipelineDetail"];

/// Links carrying these are listing or pipeline pages, not single postings.
const NON_POSTING_MARKERS: [&str; 2] = ["pipelineid", "jobid"];

#[derive(Debug, Default, PartialEq)]
pub struct Partition {
    pub clean: Vec<Value>,
    pub redo: Vec<Value>,
}

pub fn is_error_record(record: &Value, prefix: &str) -> bool {
    record
        .get(DESCRIPTION_KEY)
        .and_then(Value::as_str)
        .is_some_and(|description| description.starts_with(prefix))
}

pub fn partition_records(records: impl IntoIterator<Item = Value>, prefix: &str) -> Partition {
    let (redo, clean): (Vec<Value>, Vec<Value>) = records
        .into_iter()
        .partition(|record| is_error_record(record, prefix));
    Partition { clean, redo }
}

/// Reads every `*.json` array in `input_dir` and separates records whose
/// description starts with `prefix` so they can be scraped again.
pub fn partition_directory(input_dir: &Path, prefix: &str) -> anyhow::Result<Partition> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {}", input_dir.display());
    }

    let mut json_files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to list {}", input_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    json_files.sort();

    if json_files.is_empty() {
        bail!("No JSON files found in: {}", input_dir.display());
    }

    let mut partition = Partition::default();
    for path in json_files {
        log::info!("Processing {} ...", path.display());

        match read_array_file(&path) {
            Ok(ArrayFile::Array(records)) => {
                let Partition { clean, redo } = partition_records(records, prefix);
                partition.clean.extend(clean);
                partition.redo.extend(redo);
            }
            Ok(ArrayFile::Empty) => {
                log::warn!("File is empty or whitespace only, skipping: {}", path.display())
            }
            Ok(ArrayFile::Other(_)) => {
                log::warn!("Top-level JSON is not an array in {}, skipping.", path.display())
            }
            Ok(ArrayFile::Missing) => {}
            Err(e) => log::error!("{:#}", e),
        }
    }

    Ok(partition)
}

pub fn partition_to_files(
    input_dir: &Path,
    prefix: &str,
    clean_output: &Path,
    redo_output: &Path,
) -> anyhow::Result<Partition> {
    let partition = partition_directory(input_dir, prefix)?;

    write_array_file(clean_output, &partition.clean)?;
    log::info!(
        "Wrote {} items to {}",
        partition.clean.len(),
        clean_output.display()
    );
    write_array_file(redo_output, &partition.redo)?;
    log::info!(
        "Wrote {} items to {}",
        partition.redo.len(),
        redo_output.display()
    );

    Ok(partition)
}

/// Contiguous chunk sizes; the first `total % parts` chunks take one extra.
pub fn chunk_sizes(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return vec![];
    }
    let base = total / parts;
    let remainder = total % parts;
    (0..parts)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Part files are named `<prefix>_part_<k>.json`; the prefix defaults to the
/// input file's stem.
pub fn split_file(
    input: &Path,
    output_dir: &Path,
    parts: usize,
    prefix: Option<&str>,
) -> anyhow::Result<Vec<PathBuf>> {
    if parts == 0 {
        bail!("Cannot split into 0 parts");
    }

    let records = match read_array_file(input)? {
        ArrayFile::Array(records) => records,
        ArrayFile::Missing => bail!("{} not found", input.display()),
        _ => bail!("Expected {} to hold a JSON array of objects", input.display()),
    };
    log::info!("Total objects: {}", records.len());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let stem = prefix.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("records")
    });

    let mut remaining = records.into_iter();
    let mut written = Vec::with_capacity(parts);
    for (i, size) in chunk_sizes(remaining.len(), parts).into_iter().enumerate() {
        let chunk: Vec<Value> = remaining.by_ref().take(size).collect();
        let path = output_dir.join(format!("{}_part_{}.json", stem, i + 1));
        write_array_file(&path, &chunk)?;
        log::info!("Wrote {} objects to {}", chunk.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Concatenates the arrays in `inputs`, in order. Unusable files are skipped
/// and a top-level non-array value is kept as a single record.
pub fn combine_files(inputs: &[PathBuf]) -> Vec<Value> {
    let mut combined = Vec::new();

    for path in inputs {
        match read_array_file(path) {
            Ok(ArrayFile::Array(records)) => {
                log::info!("📥 Read {} records from {}", records.len(), path.display());
                combined.extend(records);
            }
            Ok(ArrayFile::Other(value)) => {
                log::warn!(
                    "⚠️ File does not contain an array, wrapping as single item: {}",
                    path.display()
                );
                combined.push(value);
            }
            Ok(ArrayFile::Empty) => log::warn!("⚠️ File is empty, skipping: {}", path.display()),
            Ok(ArrayFile::Missing) => {
                log::warn!("⚠️ Skipping missing file: {}", path.display())
            }
            Err(e) => log::error!("❌ {:#}", e),
        }
    }

    combined
}

pub fn combine_to_file(inputs: &[PathBuf], output: &Path) -> anyhow::Result<usize> {
    let combined = combine_files(inputs);
    write_array_file(output, &combined)?;
    log::info!(
        "✅ Done. Total records: {} written to {}",
        combined.len(),
        output.display()
    );
    Ok(combined.len())
}

pub fn is_blocked_url(url: &str) -> bool {
    let url = url.to_lowercase();
    BLOCKED_URL_SUBSTRINGS
        .iter()
        .any(|blocked| url.contains(blocked))
}

/// Drops rows whose link points at a blocked site.
pub fn remove_blocked_urls(table: UrlTable) -> UrlTable {
    table.retain_rows(|url| !is_blocked_url(url))
}

pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_lowercase)
}

/// Keeps the first row for every host; rows without a parseable URL go.
pub fn first_url_per_host(table: UrlTable) -> UrlTable {
    let mut seen_hosts = HashSet::new();
    table.retain_rows(|url| host_of(url).is_some_and(|host| seen_hosts.insert(host)))
}

/// The slug after a title marker segment, hyphens turned into spaces.
pub fn extract_title_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let lower = url.to_lowercase();
    if NON_POSTING_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        return None;
    }

    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();
    let marker_index = segments
        .iter()
        .position(|segment| TITLE_MARKERS.iter().any(|marker| marker == segment))?;
    let slug = segments.get(marker_index + 1)?;
    let decoded = urlencoding::decode(slug).ok()?;

    let title = decoded.replace('-', " ").split_whitespace().join(" ");
    (!title.is_empty()).then_some(title)
}

/// One record per row whose URL yields a title. Ids are 1-based row numbers,
/// so rows without a title leave gaps.
pub fn job_records_from_urls(table: &UrlTable) -> Vec<JobRecord> {
    table
        .urls()
        .enumerate()
        .filter(|(_, url)| !url.is_empty())
        .filter_map(|(index, url)| {
            extract_title_from_url(url).map(|title| {
                JobRecord::new()
                    .with(ID_KEY, index + 1)
                    .with(APPLICATION_URL_KEY, url)
                    .with(TITLE_KEY, title)
            })
        })
        .collect()
}

pub fn extract_titles_to_file(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let table = read_url_csv(input)?;
    let records: Vec<Value> = job_records_from_urls(&table)
        .into_iter()
        .map(Value::from)
        .collect();
    write_array_file(output, &records)?;
    log::info!("Wrote {} records to {}", records.len(), output.display());
    Ok(records.len())
}

pub fn remove_blocked_to_file(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let table = remove_blocked_urls(read_url_csv(input)?);
    write_url_csv(output, &table)?;
    log::info!("Cleaned file written to {}", output.display());
    Ok(table.rows.len())
}

pub fn first_per_host_to_file(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let table = read_url_csv(input)?;
    if table.rows.is_empty() {
        bail!("{} has no data rows", input.display());
    }
    let table = first_url_per_host(table);
    write_url_csv(output, &table)?;
    log::info!(
        "Wrote {} unique domains to {}",
        table.rows.len(),
        output.display()
    );
    Ok(table.rows.len())
}
