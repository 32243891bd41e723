//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. The script is read in batches on a tokio runtime
//! and each batch is applied to a `SharedLedger` on the blocking pool while
//! the next batch is being read.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, workers)
//!     ├── AsyncReader (batch CSV reading)
//!     └── Arc<SharedLedger> (thread-safe ledger)
//! ```
//!
//! # Ordering
//!
//! Batches are applied strictly one after another, and the commands of a
//! batch in script order, so the output is identical to the sync strategy.
//! Only reading overlaps with applying.

use crate::cli::OutputFormat;
use crate::core::{LedgerConfig, SharedLedger};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{finish, replay, ProcessingStrategy};
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,

    /// Number of runtime worker threads
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            workers: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, workers: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let workers = if workers == 0 {
            warn!(
                workers,
                default = default.workers,
                "invalid worker count, using default"
            );
            default.workers
        } else {
            workers
        };

        Self {
            batch_size,
            workers,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: LedgerConfig,
    format: OutputFormat,
    batch: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Zero batch sizes or worker counts are replaced with the defaults, as
    /// in `BatchConfig::new`
    pub fn new(config: LedgerConfig, format: OutputFormat, batch: BatchConfig) -> Self {
        Self {
            config,
            format,
            batch: BatchConfig::new(batch.batch_size, batch.workers),
        }
    }
}

/// Apply a batch in order and return what it rendered
fn apply_batch(
    ledger: &SharedLedger,
    batch: Vec<LedgerCommand>,
    format: OutputFormat,
) -> Result<Vec<u8>, LedgerError> {
    let mut handle = ledger;
    let mut rendered = Vec::new();
    for command in batch {
        replay(&mut handle, command, format, &mut rendered)?;
    }
    Ok(rendered)
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch.workers)
            .build()
            .map_err(|e| LedgerError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let ledger = Arc::new(SharedLedger::new(self.config));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::IoError {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                })?;
            let mut reader = AsyncReader::new(file.compat());

            let mut batch = reader.read_batch(self.batch.batch_size).await;
            while !batch.is_empty() {
                debug!(commands = batch.len(), "applying batch");
                let shared = Arc::clone(&ledger);
                let format = self.format;
                let applying =
                    tokio::task::spawn_blocking(move || apply_batch(&shared, batch, format));

                let (applied, next) =
                    futures::join!(applying, reader.read_batch(self.batch.batch_size));

                let rendered = applied.map_err(|e| LedgerError::Runtime {
                    message: format!("Batch task failed: {}", e),
                })??;
                output.write_all(&rendered)?;
                batch = next;
            }

            let handle: &SharedLedger = &ledger;
            finish(&handle, self.format, output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FallbackPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(script: &str, format: OutputFormat, batch: BatchConfig) -> String {
        let file = create_temp_csv(script);
        let strategy = AsyncProcessingStrategy::new(LedgerConfig::default(), format, batch);
        let mut output = Vec::new();
        strategy.process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    const DEMO_SCRIPT: &str = "command,user,counterpart,amount,detail\n\
        user,Bobby,,5.00,4111111111111111\n\
        user,Carol,,10.00,4242424242424242\n\
        pay,Bobby,Carol,5.00,Coffee\n\
        pay,Carol,Bobby,15.00,Lunch\n\
        feed,Bobby,,,\n\
        friend,Bobby,Carol,,\n\
        feed,Carol,,,friendship\n";

    #[test]
    fn test_async_strategy_renders_feed_commands() {
        let output = run(DEMO_SCRIPT, OutputFormat::Feed, BatchConfig::default());
        assert_eq!(
            output,
            "Bobby paid Carol $5.00 for Coffee\n\
             Carol paid Bobby $15.00 for Lunch\n\
             Bobby became a friend of Carol\n"
        );
    }

    #[test]
    fn test_async_strategy_maintains_ordering_across_batches() {
        // Registration, payments, and feeds land in different batches
        let output = run(DEMO_SCRIPT, OutputFormat::Feed, BatchConfig::new(2, 2));
        assert_eq!(
            output,
            "Bobby paid Carol $5.00 for Coffee\n\
             Carol paid Bobby $15.00 for Lunch\n\
             Bobby became a friend of Carol\n"
        );
    }

    #[test]
    fn test_async_strategy_writes_balances() {
        let output = run(DEMO_SCRIPT, OutputFormat::Balances, BatchConfig::new(1, 1));
        assert_eq!(
            output,
            "username,balance,card\nBobby,15.00,1111\nCarol,15.00,4242\n"
        );
    }

    #[test]
    fn test_async_strategy_respects_fallback_policy() {
        let script = "command,user,counterpart,amount,detail\n\
            user,Bobby,,5.00,4111111111111111\n\
            pay,Bobby,Bobby,1.00,Self\n\
            feed,,,,\n";
        let file = create_temp_csv(script);
        let strict = LedgerConfig::new(FallbackPolicy::InsufficientFunds);
        let strategy =
            AsyncProcessingStrategy::new(strict, OutputFormat::Feed, BatchConfig::default());
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        assert!(output.is_empty());
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(
            LedgerConfig::default(),
            OutputFormat::Feed,
            BatchConfig::default(),
        );
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_async_strategy_replaces_zero_batch_config() {
        let script = "command,user,counterpart,amount,detail\n\
            user,Bobby,,5.00,\n\
            feed,,,,\n";
        let unchecked = BatchConfig {
            batch_size: 0,
            workers: 0,
        };

        let output = run(script, OutputFormat::Balances, unchecked);

        assert_eq!(output, "username,balance,card\nBobby,5.00,\n");
    }

    #[rstest::rstest]
    #[case::defaults(1000, 4, 1000, 4)]
    #[case::zero_batch(0, 4, 1000, 4)]
    #[case::zero_workers(10, 0, 10, num_cpus::get())]
    fn test_batch_config_new(
        #[case] batch_size: usize,
        #[case] workers: usize,
        #[case] expected_batch_size: usize,
        #[case] expected_workers: usize,
    ) {
        let config = BatchConfig::new(batch_size, workers);
        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.workers, expected_workers);
    }
}
