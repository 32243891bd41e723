//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the commands of a script file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<LedgerCommand, LedgerError>` for each CSV row:
//!
//! ```no_run
//! use p2p_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("script.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Command: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Unreadable rows are yielded as `ParseError` carrying the line number
//! - Conversion errors keep their own variant (`UnknownCommand`,
//!   `MalformedAmount`, `UnknownEntryKind`, ...); `line()` gives the row
//! - Iteration continues with the next row after any row error

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerCommand, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with the script.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open a script file
    ///
    /// The CSV reader trims whitespace from all fields and accepts rows with
    /// fewer columns than the header.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file could not be opened.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }

    /// Line number of the row most recently read (the header is line 1)
    pub fn line(&self) -> u64 {
        self.line_num
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerCommand, LedgerError>;

    /// Read and convert the next row
    ///
    /// Rows the CSV layer cannot read become `ParseError` with the row's
    /// line number; conversion errors are returned as they are.
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        let line = self.line_num;
        let result = row
            .map_err(|e| match LedgerError::from(e) {
                LedgerError::ParseError { line: None, message } => LedgerError::ParseError {
                    line: Some(line),
                    message,
                },
                other => other,
            })
            .and_then(convert_csv_record);
        Some(result)
    }
}
