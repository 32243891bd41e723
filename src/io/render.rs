//! Feed rendering
//!
//! Turns feed entries into human-readable lines. Rendering is a pure
//! consumer of the feed: it resolves handles to usernames through a lookup
//! and never touches ledger state.

use crate::types::{AccountId, FeedEntry, LedgerError, Username};
use std::io::Write;

/// Render one feed entry
///
/// - payment: `"{actor} paid {target} ${amount} for {note}"`, amount rounded
///   to two decimal places
/// - friendship: `"{actor} became a friend of {target}"`
///
/// # Errors
///
/// Returns whatever `username_of` returns for a handle it cannot resolve.
pub fn render_entry<F>(entry: &FeedEntry, username_of: F) -> Result<String, LedgerError>
where
    F: Fn(AccountId) -> Result<Username, LedgerError>,
{
    let actor = username_of(entry.actor())?;
    let target = username_of(entry.target())?;

    let line = match entry {
        FeedEntry::Payment(payment) => format!(
            "{actor} paid {target} ${:.2} for {}",
            payment.amount.round_dp(2),
            payment.note
        ),
        FeedEntry::Friendship(_) => format!("{actor} became a friend of {target}"),
    };
    Ok(line)
}

/// Render entries one per line
pub fn write_feed<F>(
    entries: &[FeedEntry],
    username_of: F,
    output: &mut dyn Write,
) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> Result<Username, LedgerError>,
{
    for entry in entries {
        writeln!(output, "{}", render_entry(entry, &username_of)?)?;
    }
    Ok(())
}
