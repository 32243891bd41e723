//! Core traits for ledger operations and external collaborators
//!
//! This module defines the trait abstractions that allow both the
//! single-threaded and the thread-safe ledger to be driven interchangeably,
//! plus the two pluggable seams of the payment flow: card validation and
//! card charging.

use crate::types::{
    Account, AccountId, CardNumber, FeedEntry, Friendship, LedgerError, Payment, Username,
};
use rust_decimal::Decimal;

/// Decides which card numbers may be attached to an account
pub trait CardValidator: Send + Sync {
    /// Whether `card_number` is acceptable
    fn is_valid(&self, card_number: &str) -> bool;
}

/// External card processor
///
/// Called once per card payment, after every validation has passed and
/// before any balance or feed change. A failure aborts the payment.
pub trait CardCharger: Send + Sync {
    /// Charge `amount` to `card`
    ///
    /// # Errors
    ///
    /// Returns `ChargeDeclined` if the processor refuses the charge.
    fn charge(&self, card: &CardNumber, amount: Decimal) -> Result<(), LedgerError>;
}

/// Operations of a ledger registry
///
/// Implemented by `Ledger` (single-threaded) and by `&SharedLedger`
/// (thread-safe). Accounts are addressed by the handle returned from
/// `create_user`.
pub trait PaymentLedger {
    /// Register a user with an opening balance and an optional card
    fn create_user(
        &mut self,
        username: &str,
        balance: Decimal,
        card_number: Option<&str>,
    ) -> Result<AccountId, LedgerError>;

    /// Look up a registered username
    fn find_account(&self, username: &str) -> Result<AccountId, LedgerError>;

    /// Snapshot of an account's state
    fn account(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Username of an account
    fn username(&self, id: AccountId) -> Result<Username, LedgerError>;

    /// Snapshot of all accounts in registration order
    fn accounts(&self) -> Vec<(AccountId, Account)>;

    /// Add `amount` (possibly negative) to an account's balance
    fn add_to_balance(&mut self, id: AccountId, amount: Decimal) -> Result<(), LedgerError>;

    /// Attach a card to an account
    fn add_credit_card(&mut self, id: AccountId, card_number: &str) -> Result<(), LedgerError>;

    /// Pay from balance, falling back to card per the configured policy
    fn pay(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError>;

    /// Pay from the actor's balance only
    fn pay_with_balance(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError>;

    /// Pay with the actor's card only
    fn pay_with_card(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError>;

    /// Record that `actor` befriended `target`
    fn add_friend(&mut self, actor: AccountId, target: AccountId)
        -> Result<Friendship, LedgerError>;

    /// Entries where the account is actor or target, in append order
    fn retrieve_feed(&self, id: AccountId) -> Result<Vec<FeedEntry>, LedgerError>;

    /// The whole feed in append order
    fn activity(&self) -> Vec<FeedEntry>;
}
