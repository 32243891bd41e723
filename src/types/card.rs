//! Credit card numbers
//!
//! `CardNumber` only exists once a validator has accepted it; see
//! `core::card` for the validators and charge collaborators.

use std::fmt;

/// A card number accepted by a `CardValidator`
///
/// `Display` masks everything but the last four digits so card numbers
/// never end up verbatim in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    /// Wrap a number that a validator has already accepted
    pub(crate) fn accepted(number: &str) -> Self {
        CardNumber(number.to_string())
    }

    /// The full card number, as handed to the charge collaborator
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last four characters of the number
    pub fn last_four(&self) -> &str {
        let start = self.0.len().saturating_sub(4);
        self.0.get(start..).unwrap_or(&self.0)
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "****{}", self.last_four())
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_four_and_masking() {
        let card = CardNumber::accepted("4111111111111111");
        assert_eq!(card.as_str(), "4111111111111111");
        assert_eq!(card.last_four(), "1111");
        assert_eq!(card.to_string(), "****1111");
        assert_eq!(format!("{:?}", card), "CardNumber(****1111)");
    }

    #[test]
    fn test_last_four_of_short_number() {
        let card = CardNumber::accepted("42");
        assert_eq!(card.last_four(), "42");
    }
}
