//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates replay by coordinating between
//! the SyncReader (for CSV input) and the `Ledger` (for business logic).
//!
//! # Memory Efficiency
//!
//! Commands are read and applied one at a time; memory use is bounded by the
//! ledger's accounts and feed, not by the size of the script.

use crate::cli::OutputFormat;
use crate::core::{Ledger, LedgerConfig};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{finish, replay, ProcessingStrategy};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use p2p_ledger::cli::OutputFormat;
/// use p2p_ledger::core::LedgerConfig;
/// use p2p_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(LedgerConfig::default(), OutputFormat::Feed);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("script.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy {
    config: LedgerConfig,
    format: OutputFormat,
}

impl SyncProcessingStrategy {
    pub fn new(config: LedgerConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let mut ledger = Ledger::new(self.config);
        let mut reader = SyncReader::new(input_path)?;

        while let Some(result) = reader.next() {
            match result {
                Ok(command) => replay(&mut ledger, command, self.format, output)?,
                Err(error) => warn!(line = reader.line(), %error, "skipping script row"),
            }
        }

        finish(&ledger, self.format, output)
    }
}
