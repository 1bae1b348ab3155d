use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer};

use crate::domain::JobRecord;

const INDENT: &[u8] = b"    ";

/// Appends records to a JSON array on disk, one durable write per record, so
/// a partially written file is readable while the run is in progress.
pub struct StreamWriter {
    out: BufWriter<File>,
    written: usize,
}

impl StreamWriter {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        out.write_all(b"[\n")?;

        Ok(StreamWriter { out, written: 0 })
    }

    pub fn write_record(&mut self, record: &JobRecord) -> anyhow::Result<()> {
        if self.written > 0 {
            self.out.write_all(b",\n")?;
        }

        let mut serializer =
            Serializer::with_formatter(&mut self.out, PrettyFormatter::with_indent(INDENT));
        record
            .serialize(&mut serializer)
            .context("Failed to serialize record")?;

        self.written += 1;
        self.persist()
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.out.write_all(b"\n]\n")?;
        self.persist()
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        self.out.flush().context("Failed to flush output file")?;
        // Not every filesystem supports fsync; the buffered write already landed.
        _ = self.out.get_ref().sync_all();
        Ok(())
    }
}
