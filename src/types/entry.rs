//! Feed entry types for the peer-to-peer ledger
//!
//! This module defines the two recordable events, payments and friendships,
//! and the closed `FeedEntry` sum type the activity feed stores.

use super::account::AccountId;
use super::error::LedgerError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payment identifier
///
/// A random v4 UUID generated when the payment is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentId(Uuid);

impl PaymentId {
    fn generate() -> Self {
        PaymentId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which funding source settled a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingSource {
    /// Debited from the actor's ledger balance
    Balance,

    /// Charged to the actor's card; the actor's balance is untouched
    Card,
}

/// A settled payment
///
/// Created exactly once per successful payment and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    /// Unique payment identifier
    pub id: PaymentId,

    /// Amount paid, always positive
    pub amount: Decimal,

    /// Paying account
    pub actor: AccountId,

    /// Receiving account
    pub target: AccountId,

    /// Free-text note
    pub note: String,

    /// Funding source that settled the payment
    pub funding: FundingSource,
}

impl Payment {
    pub(crate) fn new(
        amount: Decimal,
        actor: AccountId,
        target: AccountId,
        note: &str,
        funding: FundingSource,
    ) -> Self {
        Payment {
            id: PaymentId::generate(),
            amount,
            actor,
            target,
            note: note.to_string(),
            funding,
        }
    }
}

/// A friendship: `actor` befriended `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Friendship {
    /// Initiating account
    pub actor: AccountId,

    /// The new friend
    pub target: AccountId,
}

/// An entry of the activity feed
///
/// Closed over the two entry kinds: every consumer matches exhaustively, so
/// adding a kind is a compile-time decision for each of them.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEntry {
    Payment(Payment),
    Friendship(Friendship),
}

impl FeedEntry {
    /// Account that created the entry
    pub fn actor(&self) -> AccountId {
        match self {
            FeedEntry::Payment(payment) => payment.actor,
            FeedEntry::Friendship(friendship) => friendship.actor,
        }
    }

    /// Counterpart of the entry
    pub fn target(&self) -> AccountId {
        match self {
            FeedEntry::Payment(payment) => payment.target,
            FeedEntry::Friendship(friendship) => friendship.target,
        }
    }

    /// Whether `account` is the actor or the target
    pub fn involves(&self, account: AccountId) -> bool {
        self.actor() == account || self.target() == account
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            FeedEntry::Payment(_) => EntryKind::Payment,
            FeedEntry::Friendship(_) => EntryKind::Friendship,
        }
    }
}

/// Discriminant of `FeedEntry`, used to filter the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Payment,
    Friendship,
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    /// Parse a kind name, case insensitive
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntryKind` for anything but `payment` or `friendship`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payment" => Ok(EntryKind::Payment),
            "friendship" => Ok(EntryKind::Friendship),
            _ => Err(LedgerError::unknown_entry_kind(s)),
        }
    }
}
