//! Ingest drivers: turn uploaded bytes into something the store accepts.

pub mod image;
pub mod sheet;


pub use image::{sniff_mime, to_embeddable};
pub use sheet::{CsvSheetParser, JsonSheetParser, SheetParser, WorkbookSheetParser, parse_upload, parser_for};
