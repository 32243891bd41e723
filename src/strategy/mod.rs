//! Processing strategy module for script replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing both script parsing and ledger processing. This allows
//! different processing implementations (synchronous, asynchronous batch) to
//! be selected at runtime. Every strategy produces the same output for the
//! same script.

use crate::cli::{OutputFormat, StrategyType};
use crate::core::{apply, CommandOutcome, LedgerConfig, PaymentLedger};
use crate::io::{write_balances_csv, write_feed};
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use tracing::warn;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the script at `input_path` and write results to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be opened, the output cannot be
    /// written, or the runtime fails. Malformed rows and rejected commands are
    /// logged and skipped; they never fail the run.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `batch` is ignored by the sync strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: LedgerConfig,
    format: OutputFormat,
    batch: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config, format)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            config,
            format,
            batch.unwrap_or_default(),
        )),
    }
}

/// Apply one command and write what it produces in `format`
///
/// A rejected command is logged and skipped. Only output failures and
/// unresolvable feed entries are returned.
fn replay<L: PaymentLedger + ?Sized>(
    ledger: &mut L,
    command: LedgerCommand,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    match apply(ledger, command) {
        Ok(CommandOutcome::Feed(entries)) if format == OutputFormat::Feed => {
            write_feed(&entries, |id| ledger.username(id), output)?;
        }
        Ok(_) => {}
        Err(error) => warn!(%error, "command rejected"),
    }
    Ok(())
}

/// Write the end-of-script output in `format`
fn finish<L: PaymentLedger + ?Sized>(
    ledger: &L,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    match format {
        OutputFormat::Feed => output.flush()?,
        OutputFormat::Balances => write_balances_csv(&ledger.accounts(), output)?,
    }
    Ok(())
}
