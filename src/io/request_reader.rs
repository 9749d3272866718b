//! Streaming CSV reader for transaction requests
//!
//! Yields one `Result<TransactionRequest, String>` per data row, delegating
//! format concerns to the csv_format module.
//!
//! ```no_run
//! use transaction_service::io::RequestReader;
//! use std::path::Path;
//!
//! let reader = RequestReader::open(Path::new("requests.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Request: {:?}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `open()`
//! - Individual row errors are yielded as Err variants, prefixed with the line number

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{ImportError, TransactionRequest};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV reader over transaction requests
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: csv::Reader<R>,
    line_num: usize,
}

impl RequestReader<File> {
    /// Open a CSV file for streaming
    ///
    /// # Returns
    ///
    /// * `Ok(RequestReader)` if the file opened successfully
    /// * `Err(ImportError::FileNotFound)` if the path does not exist
    /// * `Err(ImportError::Io)` for any other open failure
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ImportError::from(e),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> RequestReader<R> {
    /// Wrap any reader
    ///
    /// Whitespace is trimmed from every field and rows may omit trailing
    /// columns.
    pub fn from_reader(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(input);

        Self {
            reader,
            line_num: 0,
        }
    }

    /// Read up to `batch_size` rows
    ///
    /// An empty result means the input is exhausted.
    pub fn read_batch(&mut self, batch_size: usize) -> Vec<Result<TransactionRequest, String>> {
        self.by_ref().take(batch_size).collect()
    }
}

impl<R: Read> Iterator for RequestReader<R> {
    type Item = Result<TransactionRequest, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        // Line 1 is the header
        let line = self.line_num + 1;
        Some(match row {
            Ok(csv_record) => {
                convert_csv_record(csv_record).map_err(|e| format!("Line {}: {}", line, e))
            }
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}
