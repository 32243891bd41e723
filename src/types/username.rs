//! Validated usernames
//!
//! A `Username` can only be built from text matching `^[A-Za-z0-9_-]{4,15}$`,
//! so every account name held by the ledger is already known to be valid.

use super::error::LedgerError;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Account username
///
/// Case sensitive: `Bobby` and `bobby` are different users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Shortest accepted username
    pub const MIN_LEN: usize = 4;

    /// Longest accepted username
    pub const MAX_LEN: usize = 15;

    /// Validate and wrap a username
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsername` unless the text is 4 to 15 characters long
    /// and made only of ASCII letters, digits, `_` and `-`.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        if Self::is_valid(raw) {
            Ok(Username(raw.to_string()))
        } else {
            Err(LedgerError::invalid_username(raw))
        }
    }

    /// Check a candidate username without allocating
    pub fn is_valid(raw: &str) -> bool {
        // Every accepted character is ASCII, so byte length equals char length
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&raw.len())
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Username::parse(s)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets username-keyed maps be queried with a plain &str
impl Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}
