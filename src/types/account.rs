//! Account-related types for the peer-to-peer ledger
//!
//! This module defines the Account structure and the handle used to refer to
//! a registered account by identity.

use super::card::CardNumber;
use super::error::LedgerError;
use super::username::Username;
use crate::core::traits::CardValidator;
use rust_decimal::Decimal;
use std::fmt;

/// Handle of an account registered in a ledger
///
/// Handles are assigned by the ledger at registration and never reused
/// within it. Feed entries store handles, so feed queries compare
/// identities rather than copies of account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub(crate) u32);

impl AccountId {
    /// Raw handle value
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User account state
///
/// Represents one user: a validated username, a spendable balance, and at
/// most one credit card used as fallback funding.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account's username, unique within a ledger
    pub username: Username,

    /// Spendable balance
    ///
    /// Only changed through `add_to_balance`. Payments keep it non-negative
    /// in normal flows, but the type itself does not forbid negative values.
    pub balance: Decimal,

    /// Card on file, write-once
    card: Option<CardNumber>,
}

impl Account {
    /// Create a new account with zero balance and no card
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsername` unless the username matches
    /// `^[A-Za-z0-9_-]{4,15}$`.
    pub fn new(username: &str) -> Result<Self, LedgerError> {
        Ok(Account {
            username: Username::parse(username)?,
            balance: Decimal::ZERO,
            card: None,
        })
    }

    /// The card on file, if any
    pub fn card(&self) -> Option<&CardNumber> {
        self.card.as_ref()
    }

    /// Add `amount` to the balance
    ///
    /// `amount` may be negative; debits go through here too. There is no
    /// business validation, callers check amounts before calling.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the new balance is not representable.
    /// The balance is unchanged in that case.
    pub fn add_to_balance(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("add_to_balance", self.username.as_str()))?;
        Ok(())
    }

    /// Attach a credit card
    ///
    /// A card can be set once; there is no way to remove or replace it.
    ///
    /// # Errors
    ///
    /// - `DuplicateCard` if a card is already attached (checked first)
    /// - `InvalidCard` if the validator rejects the number
    pub fn add_credit_card(
        &mut self,
        card_number: &str,
        validator: &dyn CardValidator,
    ) -> Result<(), LedgerError> {
        if self.card.is_some() {
            return Err(LedgerError::duplicate_card(self.username.as_str()));
        }

        if !validator.is_valid(card_number) {
            return Err(LedgerError::invalid_card(self.username.as_str()));
        }

        self.card = Some(CardNumber::accepted(card_number));
        Ok(())
    }
}
