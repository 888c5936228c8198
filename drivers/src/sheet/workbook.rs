use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::{Map, Number, Value};
use spinwheel_abi::{IngestError, IngestResult, RawRecord};
use spinwheel_lib::klog_debug;

use super::{SheetParser, header_names};

/// Largest magnitude an `f64` holds without losing integer precision.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Excel workbooks (`.xlsx`, `.xlsm`, `.xls`). Only the first worksheet is
/// read; its first non-blank row is the header.
///
/// Cells keep their type: numbers stay JSON numbers, text is trimmed, and
/// empty or error cells leave the key out of the row.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkbookSheetParser;

fn unreadable(err: calamine::Error) -> IngestError {
    IngestError::Workbook(err.to_string())
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn number(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < EXACT_INT_LIMIT {
        Some(Value::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number)
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| Value::String(text.to_string()))
        }
        Data::Int(n) => Some(Value::from(*n)),
        Data::Float(f) => number(*f),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Serial day number, as the sheet stores it.
        Data::DateTime(stamp) => number(stamp.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(Value::String(text.clone())),
    }
}

impl SheetParser for WorkbookSheetParser {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn parse(&self, bytes: &[u8]) -> IngestResult<Vec<RawRecord>> {
        if bytes.is_empty() {
            return Err(IngestError::Empty);
        }
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(unreadable)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(unreadable)?,
            None => return Err(IngestError::Empty),
        };
        klog_debug!("ingest: worksheet range {:?}", range.get_size());

        let mut rows = range.rows().filter(|row| !row.iter().all(is_blank));
        let Some(header) = rows.next() else {
            return Err(IngestError::Empty);
        };
        let columns = header_names(header.iter().map(|cell| cell.to_string()));

        let mut records = Vec::new();
        for row in rows {
            let mut object = Map::with_capacity(columns.len());
            for (column, cell) in columns.iter().zip(row) {
                if let Some(value) = cell_value(cell) {
                    object.insert(column.clone(), value);
                }
            }
            records.push(Value::Object(object));
        }
        Ok(records)
    }
}
