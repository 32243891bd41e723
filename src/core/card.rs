//! Default card collaborators
//!
//! - `AllowListValidator` accepts a fixed set of card numbers (by default the
//!   two test numbers `4111111111111111` and `4242424242424242`)
//! - `NoopCharger` accepts every charge without contacting anything

use crate::core::traits::{CardCharger, CardValidator};
use crate::types::{CardNumber, LedgerError};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

/// Card numbers accepted by the default validator
pub const TEST_CARD_NUMBERS: [&str; 2] = ["4111111111111111", "4242424242424242"];

/// Validator accepting an explicit set of card numbers
#[derive(Debug, Clone)]
pub struct AllowListValidator {
    accepted: HashSet<String>,
}

impl AllowListValidator {
    /// Create a validator accepting exactly `numbers`
    pub fn new<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: numbers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for AllowListValidator {
    fn default() -> Self {
        Self::new(TEST_CARD_NUMBERS)
    }
}

impl CardValidator for AllowListValidator {
    fn is_valid(&self, card_number: &str) -> bool {
        self.accepted.contains(card_number)
    }
}

/// Charge collaborator that accepts every charge
///
/// Stands in for a real card processor; no money moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCharger;

impl CardCharger for NoopCharger {
    fn charge(&self, card: &CardNumber, amount: Decimal) -> Result<(), LedgerError> {
        debug!(%card, %amount, "card charge accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::visa_test("4111111111111111", true)]
    #[case::stripe_test("4242424242424242", true)]
    #[case::other_number("4000056655665556", false)]
    #[case::prefix("411111111111111", false)]
    #[case::padded(" 4111111111111111", false)]
    #[case::empty("", false)]
    fn test_default_allow_list(#[case] number: &str, #[case] expected: bool) {
        assert_eq!(AllowListValidator::default().is_valid(number), expected);
    }

    #[test]
    fn test_custom_allow_list() {
        let validator = AllowListValidator::new(["5555555555554444"]);
        assert!(validator.is_valid("5555555555554444"));
        assert!(!validator.is_valid("4111111111111111"));
    }

    #[test]
    fn test_noop_charger_accepts() {
        let card = CardNumber::accepted("4111111111111111");
        assert!(NoopCharger.charge(&card, Decimal::new(1550, 2)).is_ok());
    }
}
