//! Thread-safe implementations of core components
//!
//! This module provides the concurrent counterpart of `Ledger`, built on
//! `DashMap` for fine-grained locking.
//!
//! # Thread Safety
//!
//! - Operations on different accounts proceed in parallel
//! - Operations on the same account are serialized by its lock
//! - Only feed appends go through a single lock

pub mod shared_ledger;

pub use shared_ledger::SharedLedger;
