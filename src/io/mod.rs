//! I/O module
//!
//! Handles script parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, balance output)
//! - `render` - Feed entry rendering
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod render;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, write_balances_csv, CsvRecord};
pub use render::{render_entry, write_feed};
pub use sync_reader::SyncReader;
