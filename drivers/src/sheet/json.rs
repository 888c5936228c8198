use serde_json::Value;
use spinwheel_abi::{IngestError, IngestResult, RawRecord};

use super::{SheetParser, decode_text};

/// JSON sheets: a top level array of rows, or an object holding one under
/// `"data"` (the stored entry set layout).
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSheetParser;

impl SheetParser for JsonSheetParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, bytes: &[u8]) -> IngestResult<Vec<RawRecord>> {
        let text = decode_text(bytes)?;
        let value: Value = serde_json::from_str(text).map_err(|err| IngestError::Json(err.to_string()))?;
        match value {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => Ok(rows),
                _ => Err(IngestError::Malformed {
                    line: 1,
                    reason: "object has no \"data\" array".into(),
                }),
            },
            _ => Err(IngestError::Malformed {
                line: 1,
                reason: "expected an array of rows".into(),
            }),
        }
    }
}
