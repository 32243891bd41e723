//! Peer-to-peer payment ledger library
//! # Overview
//!
//! This library provides a small peer-to-peer payment ledger: users with a
//! balance and an optional card pay each other, befriend each other, and
//! share an activity feed. Scripts of ledger commands can be replayed with a
//! sync or an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, FeedEntry, LedgerError, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Single-threaded registry
//!   - [`core::r#async`] - Thread-safe registry
//!   - [`core::resolver`] - Payment checks and balance-to-card fallback
//!   - [`core::dispatch`] - Applies script commands to a ledger
//! - [`io`] - Script parsing, feed rendering, and balance output
//! - [`strategy`] - Sync and async replay pipelines
//! - [`demo`] - Built-in demo scenario
//!
//! # Payments
//!
//! - **pay_with_balance**: Debit the actor, credit the target
//! - **pay_with_card**: Charge the actor's card, credit the target
//! - **pay**: Balance first, card on failure (see [`core::FallbackPolicy`])
//!
//! A payment either completes fully, with exactly one feed entry, or fails
//! without changing any balance or the feed.

pub mod cli;
pub mod core;
pub mod demo;
pub mod io;
pub mod observability;
pub mod strategy;
pub mod types;

pub use core::{
    AllowListValidator, CardCharger, CardValidator, FallbackPolicy, Ledger, LedgerConfig,
    NoopCharger, PaymentLedger, SharedLedger,
};
pub use io::{render_entry, write_balances_csv};
pub use types::{
    Account, AccountId, CardNumber, EntryKind, FeedEntry, Friendship, FundingSource,
    LedgerError, Payment, PaymentId, Username,
};
