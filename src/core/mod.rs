//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Ledger operations and the card collaborator seams
//! - `ledger` - Single-threaded registry
//! - `account_book` - Account storage and username lookup
//! - `feed` - Append-only activity feed
//! - `resolver` - Payment checks and fallback policy
//! - `card` - Default card validator and charger
//! - `dispatch` - Applies script commands to any ledger
//! - `async` - Thread-safe registry

pub mod account_book;
pub mod r#async;
pub mod card;
pub mod dispatch;
pub mod feed;
pub mod ledger;
pub mod resolver;
pub mod traits;

pub use account_book::AccountBook;
pub use card::{AllowListValidator, NoopCharger};
pub use dispatch::{apply, CommandOutcome};
pub use feed::ActivityFeed;
pub use ledger::Ledger;
pub use r#async::SharedLedger;
pub use resolver::{FallbackPolicy, LedgerConfig};
pub use traits::{CardCharger, CardValidator, PaymentLedger};
