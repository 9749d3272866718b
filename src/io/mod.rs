//! I/O module
//!
//! Handles CSV parsing and listing output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `request_reader` - Streaming CSV reader with iterator and batch interfaces

pub mod csv_format;
pub mod request_reader;

pub use csv_format::{convert_csv_record, write_page_json, write_transactions_csv, CsvRecord};
pub use request_reader::RequestReader;
