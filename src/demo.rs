//! Built-in demo
//!
//! Replays the reference scenario when no script is given: Bobby pays Carol
//! from his balance, Carol pays Bobby beyond her balance so the card takes
//! over, and Bobby's feed is rendered.

use crate::core::{Ledger, LedgerConfig, PaymentLedger};
use crate::io::write_feed;
use crate::types::LedgerError;
use rust_decimal::Decimal;
use std::io::Write;

/// Run the demo scenario and write its output
///
/// Payment failures are written to `output` in place of the feed lines they
/// would have produced.
///
/// # Errors
///
/// Returns an error if the demo accounts cannot be created or the output
/// cannot be written.
pub fn run(output: &mut dyn Write, config: LedgerConfig) -> Result<(), LedgerError> {
    let mut ledger = Ledger::new(config);

    let bobby = ledger.create_user("Bobby", Decimal::new(500, 2), Some("4111111111111111"))?;
    let carol = ledger.create_user("Carol", Decimal::new(1000, 2), Some("4242424242424242"))?;

    let payments = ledger
        .pay(bobby, carol, Decimal::new(500, 2), "Coffee")
        .and_then(|_| ledger.pay(carol, bobby, Decimal::new(1500, 2), "Lunch"));
    if let Err(error) = payments {
        writeln!(output, "{error}")?;
    }

    let feed = ledger.retrieve_feed(bobby)?;
    write_feed(&feed, |id| ledger.username(id), output)?;

    ledger.add_friend(bobby, carol)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_output() {
        let mut output = Vec::new();
        run(&mut output, LedgerConfig::default()).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Bobby paid Carol $5.00 for Coffee\nCarol paid Bobby $15.00 for Lunch\n"
        );
    }
}
