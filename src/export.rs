use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::CrawlerError;

/// Excel refuses to decode Korean CSV without this.
const BOM: &str = "\u{feff}";

/// One JSON object per line, unescaped UTF-8, fields in declaration order.
pub fn write_jsonl<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), CrawlerError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Reads a JSONL file back, skipping lines that no longer parse. Partial
/// files happen when a crawl is interrupted mid-write.
pub fn read_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, CrawlerError> {
    let raw = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(err) => warn!("line {}: skipped unparsable record: {}", lineno + 1, err),
        }
    }
    Ok(records)
}

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), CrawlerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let mut out = Vec::with_capacity(BOM.len() + body.len());
    out.extend_from_slice(BOM.as_bytes());
    out.extend_from_slice(&body);
    fs::write(path, out)?;
    Ok(())
}

pub fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, CrawlerError> {
    let raw = fs::read(path)?;
    let body = raw.strip_prefix(BOM.as_bytes()).unwrap_or(&raw);
    let mut reader = csv::Reader::from_reader(body);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
