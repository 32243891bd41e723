//! Script command types
//!
//! A `LedgerCommand` is one row of a command script, already converted from
//! CSV. Commands name accounts by username; the dispatcher resolves them to
//! handles against the ledger being driven.

use super::entry::EntryKind;
use rust_decimal::Decimal;

/// Which payment operation a `pay*` command invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Balance first, card fallback (`pay`)
    Auto,
    /// Balance only (`pay_balance`)
    Balance,
    /// Card only (`pay_card`)
    Card,
}

/// One command of a ledger script
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// Register a user with an opening balance and optional card
    CreateUser {
        username: String,
        balance: Decimal,
        card_number: Option<String>,
    },

    /// Attach a card to an existing user
    AddCard {
        username: String,
        card_number: String,
    },

    /// Pay another user
    Pay {
        actor: String,
        target: String,
        amount: Decimal,
        note: String,
        method: PaymentMethod,
    },

    /// Befriend another user
    AddFriend { actor: String, target: String },

    /// Show one user's feed, or the whole feed when `username` is `None`
    ShowFeed {
        username: Option<String>,
        kind: Option<EntryKind>,
    },
}
