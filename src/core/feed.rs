//! Activity feed
//!
//! This module provides the append-only log of payments and friendships
//! shared by every account of a ledger. The order of `append` calls is the
//! only order the feed knows; per-account views filter the full sequence
//! and keep that order.

use crate::types::{AccountId, FeedEntry};

/// Append-only sequence of feed entries
#[derive(Debug, Clone, Default)]
pub struct ActivityFeed {
    entries: Vec<FeedEntry>,
}

impl ActivityFeed {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the feed
    pub fn append(&mut self, entry: FeedEntry) {
        self.entries.push(entry);
    }

    /// All entries in append order
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Entries where `account` is the actor or the target, in append order
    pub fn entries_for(&self, account: AccountId) -> impl Iterator<Item = &FeedEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.involves(account))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
