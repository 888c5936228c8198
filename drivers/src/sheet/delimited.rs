use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Map, Value};
use spinwheel_abi::{IngestError, IngestResult, RawRecord};

use super::{SheetParser, decode_text, header_names};

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Delimited text with a header row. Every later row becomes an object keyed
/// by the header cells.
///
/// Quoting follows RFC 4180: a field wrapped in `"` may hold delimiters and
/// line breaks, and `""` inside it is a literal quote.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvSheetParser {
    delimiter: Option<u8>,
}

impl CsvSheetParser {
    /// Parser that guesses the delimiter from the header line.
    pub const fn new() -> Self {
        Self { delimiter: None }
    }

    pub const fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }
}

/// Most frequent candidate on the first line, comma on a tie.
fn guess_delimiter(text: &str) -> u8 {
    let first = text.lines().next().unwrap_or("").as_bytes();
    let count = |d: u8| first.iter().filter(|b| **b == d).count();
    let mut best = b',';
    let mut best_count = count(best);
    for candidate in CANDIDATE_DELIMITERS.into_iter().skip(1) {
        let n = count(candidate);
        if n > best_count {
            best = candidate;
            best_count = n;
        }
    }
    best
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(1, |pos| pos.line() as usize)
}

fn malformed(err: csv::Error) -> IngestError {
    IngestError::Malformed {
        line: err.position().map_or(1, |pos| pos.line() as usize),
        reason: err.to_string(),
    }
}

impl SheetParser for CsvSheetParser {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, bytes: &[u8]) -> IngestResult<Vec<RawRecord>> {
        let text = decode_text(bytes)?;
        let delimiter = self.delimiter.unwrap_or_else(|| guess_delimiter(text));
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = reader
            .records()
            .filter(|row| row.as_ref().map_or(true, |r| r.iter().any(|f| !f.is_empty())));

        let header = match rows.next() {
            Some(row) => row.map_err(malformed)?,
            None => return Err(IngestError::Empty),
        };
        let columns = header_names(header.iter().map(str::to_string));

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(malformed)?;
            if row.iter().skip(columns.len()).any(|f| !f.is_empty()) {
                return Err(IngestError::Malformed {
                    line: line_of(&row),
                    reason: format!("{} fields but the header has {}", row.len(), columns.len()),
                });
            }
            let mut object = Map::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let cell = row.get(i).unwrap_or_default();
                object.insert(column.clone(), Value::String(cell.to_string()));
            }
            records.push(Value::Object(object));
        }
        Ok(records)
    }
}
