//! Sales export CSV parser.
//!
//! Reads a header row and turns every following record into a [`RawRow`]
//! keyed by header name. Fields and headers are trimmed, blank and
//! whitespace-only lines are skipped, and a record whose field count differs
//! from the header is an error for the whole file.

use anyhow::bail;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::sale::RawRow;

/// Sales CSV parser instance.
#[derive(Debug, Default)]
pub struct SalesCsvParser;

impl SalesCsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the whole file into rows, in file order.
    pub fn parse(&self, data: &[u8]) -> Result<Vec<RawRow>, anyhow::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            if is_blank(&record) {
                continue;
            }
            if record.len() != headers.len() {
                let line = record.position().map_or(0, |pos| pos.line());
                bail!(
                    "line {line}: expected {} fields, found {}",
                    headers.len(),
                    record.len()
                );
            }
            rows.push(headers.iter().zip(record.iter()).collect());
        }

        Ok(rows)
    }
}

/// A line holding nothing but whitespace trims down to one empty field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}
