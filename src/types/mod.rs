//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and account handles
//! - `username`: Validated usernames
//! - `card`: Accepted card numbers
//! - `entry`: Payment and friendship feed entries
//! - `command`: Script commands
//! - `error`: Error types for the ledger

pub mod account;
pub mod card;
pub mod command;
pub mod entry;
pub mod error;
pub mod username;

pub use account::{Account, AccountId};
pub use card::CardNumber;
pub use command::{LedgerCommand, PaymentMethod};
pub use entry::{EntryKind, FeedEntry, Friendship, FundingSource, Payment, PaymentId};
pub use error::LedgerError;
pub use username::Username;
