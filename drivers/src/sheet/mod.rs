//! Spreadsheet parsers.
//!
//! Each parser turns one uploaded file into raw records, in file order. Rows
//! stay untyped here; `normalize_record` in the engine decides what a name or
//! a ticket is.

mod delimited;
mod json;
mod workbook;

pub use delimited::CsvSheetParser;
pub use json::JsonSheetParser;
pub use workbook::WorkbookSheetParser;

use spinwheel_abi::{IngestError, IngestResult, RawRecord};
use spinwheel_lib::klog_debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub trait SheetParser: Send + Sync {
    /// Short format name used in log lines.
    fn name(&self) -> &'static str;

    /// Parse a whole file.
    ///
    /// # Errors
    ///
    /// `IngestError::Empty` when there is nothing but whitespace, otherwise
    /// a format specific error.
    fn parse(&self, bytes: &[u8]) -> IngestResult<Vec<RawRecord>>;
}

static JSON: JsonSheetParser = JsonSheetParser;
static CSV: CsvSheetParser = CsvSheetParser::new();
static WORKBOOK: WorkbookSheetParser = WorkbookSheetParser;

/// Pick a parser by file extension (case-insensitive, no leading dot).
pub fn parser_for(extension: &str) -> IngestResult<&'static dyn SheetParser> {
    match extension.to_ascii_lowercase().as_str() {
        "json" => Ok(&JSON),
        "csv" | "txt" => Ok(&CSV),
        "xlsx" | "xlsm" | "xls" => Ok(&WORKBOOK),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse an upload, choosing the parser from `filename`'s extension.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> IngestResult<Vec<RawRecord>> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let extension = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return Err(IngestError::UnsupportedFormat(base.to_string())),
    };
    let parser = parser_for(extension)?;
    let records = parser.parse(bytes)?;
    klog_debug!(
        "ingest: {} parsed {} records from '{}'",
        parser.name(),
        records.len(),
        base
    );
    Ok(records)
}

/// Decode as UTF-8 without a byte order mark. Blank input is `Empty`.
fn decode_text(bytes: &[u8]) -> IngestResult<&str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = core::str::from_utf8(bytes).map_err(|err| {
        let line = bytes[..err.valid_up_to()].iter().filter(|b| **b == b'\n').count() + 1;
        IngestError::Malformed {
            line,
            reason: "not valid UTF-8".into(),
        }
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(text)
}

/// Column keys from a header row. Blank cells become `Column N` and repeats
/// get a `_2`, `_3` suffix.
fn header_names(cells: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let base = match cell.trim() {
            "" => format!("Column {}", i + 1),
            name => name.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}
