use crate::core::{FallbackPolicy, LedgerConfig};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay peer-to-peer payment scripts
#[derive(Parser, Debug)]
#[command(name = "p2p-ledger")]
#[command(
    about = "Replay a peer-to-peer payment script, or the built-in demo when no script is given",
    long_about = None
)]
pub struct CliArgs {
    /// Script CSV file with columns command,user,counterpart,amount,detail
    #[arg(value_name = "INPUT", help = "Path to the script CSV file (runs the demo if omitted)")]
    pub input_file: Option<PathBuf>,

    /// Processing strategy used to replay the script
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for synchronous or 'async' for batched"
    )]
    pub strategy: StrategyType,

    /// When `pay` retries a failed balance payment by card
    #[arg(
        long = "fallback",
        value_name = "POLICY",
        default_value = "any-failure",
        help = "Card fallback policy: 'any-failure' or 'insufficient-funds'"
    )]
    pub fallback: FallbackPolicy,

    /// What to write to stdout
    #[arg(
        long = "output",
        value_name = "FORMAT",
        default_value = "feed",
        help = "Output: 'feed' for rendered feed commands or 'balances' for a final CSV"
    )]
    pub output: OutputFormat,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// What a run writes to its output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One rendered line per entry selected by each `feed` command
    #[default]
    Feed,

    /// `username,balance,card` CSV after the whole script
    Balances,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take their defaults; zero values are replaced by the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.workers.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.workers.unwrap_or(default.workers),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(self.fallback)
    }
}
