//! Payment resolution rules
//!
//! This module holds the checks both ledgers run before touching any state,
//! and the policy deciding when a failed balance payment is retried by card.
//!
//! # Validation Order
//!
//! Balance payments check, in order:
//! 1. actor and target differ (`SelfPayment`)
//! 2. amount is positive (`InvalidAmount`)
//! 3. balance covers the amount (`InsufficientFunds`)
//!
//! Card payments check 1 and 2, then that a card is on file (`MissingCard`).
//! Both then make sure every balance they will touch stays representable, so
//! once the checks pass the mutations cannot fail halfway.
//!
//! # Fallback
//!
//! `pay` tries the balance first. Whether a failure is retried by card is
//! decided by `FallbackPolicy`:
//! - `AnyFailure` retries on every payment failure. Retrying a self-payment or
//!   a non-positive amount is redundant, as the card path rejects it again
//!   with the same error, but it is the historical behavior and the default.
//! - `InsufficientFunds` retries only when the balance is too low.

use crate::types::{Account, CardNumber, LedgerError};
use clap::ValueEnum;
use rust_decimal::Decimal;

/// When `pay` falls back from balance to card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FallbackPolicy {
    /// Retry by card after any payment failure of the balance attempt
    #[default]
    AnyFailure,

    /// Retry by card only after `InsufficientFunds`
    InsufficientFunds,
}

impl FallbackPolicy {
    /// Whether a balance-payment failure should be retried by card
    pub fn allows_fallback(self, error: &LedgerError) -> bool {
        match self {
            FallbackPolicy::AnyFailure => error.is_payment_failure(),
            FallbackPolicy::InsufficientFunds => {
                matches!(error, LedgerError::InsufficientFunds { .. })
            }
        }
    }
}

/// Ledger configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Balance-to-card fallback policy used by `pay`
    pub fallback: FallbackPolicy,
}

impl LedgerConfig {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }
}

/// Reject payments to oneself
pub fn check_parties(actor: &Account, target: &Account) -> Result<(), LedgerError> {
    if actor.username == target.username {
        return Err(LedgerError::self_payment(actor.username.as_str()));
    }
    Ok(())
}

/// Reject zero and negative amounts
pub fn check_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

/// Run every check of a balance payment
///
/// On success, debiting `actor` and crediting `target` by `amount` are both
/// guaranteed to succeed.
pub fn check_balance_payment(
    actor: &Account,
    target: &Account,
    amount: Decimal,
) -> Result<(), LedgerError> {
    check_parties(actor, target)?;
    check_amount(amount)?;

    if actor.balance < amount {
        return Err(LedgerError::insufficient_funds(
            actor.username.as_str(),
            actor.balance,
            amount,
        ));
    }

    actor.balance.checked_sub(amount).ok_or_else(|| {
        LedgerError::arithmetic_overflow("pay_with_balance", actor.username.as_str())
    })?;
    check_credit(target, amount, "pay_with_balance")
}

/// Run every check of a card payment
///
/// Returns the card to charge. On success, crediting `target` by `amount` is
/// guaranteed to succeed.
pub fn check_card_payment<'a>(
    actor: &'a Account,
    target: &Account,
    amount: Decimal,
) -> Result<&'a CardNumber, LedgerError> {
    check_parties(actor, target)?;
    check_amount(amount)?;

    let card = actor
        .card()
        .ok_or_else(|| LedgerError::missing_card(actor.username.as_str()))?;

    check_credit(target, amount, "pay_with_card")?;
    Ok(card)
}

fn check_credit(target: &Account, amount: Decimal, operation: &str) -> Result<(), LedgerError> {
    target
        .balance
        .checked_add(amount)
        .map(|_| ())
        .ok_or_else(|| LedgerError::arithmetic_overflow(operation, target.username.as_str()))
}
