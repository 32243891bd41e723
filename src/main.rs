//! Peer-to-peer ledger CLI
//!
//! Replays a command script and writes the rendered feed or the final
//! balances to stdout. Without a script, runs the built-in demo.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- script.csv
//! cargo run -- --strategy sync --output balances script.csv > balances.csv
//! cargo run -- --fallback insufficient-funds --batch-size 2000 --workers 8 script.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, file not readable, output failure, etc.)

use p2p_ledger::{cli, demo, observability, strategy};
use std::process;

fn main() {
    observability::init();

    let args = cli::parse_args();
    let config = args.to_ledger_config();
    let mut output = std::io::stdout();

    let result = match &args.input_file {
        Some(input_file) => {
            let batch = matches!(args.strategy, cli::StrategyType::Async)
                .then(|| args.to_batch_config());
            let strategy = strategy::create_strategy(args.strategy, config, args.output, batch);
            strategy.process(input_file, &mut output)
        }
        None => demo::run(&mut output, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
