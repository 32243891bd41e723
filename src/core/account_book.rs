//! Account book module
//!
//! This module provides the `AccountBook` struct which holds every account
//! registered in a ledger and resolves handles and usernames to them.
//!
//! The AccountBook is responsible for:
//! - Assigning handles at registration and rejecting duplicate usernames
//! - Looking accounts up by handle or by username
//! - Routing balance mutations to the right account
//! - Listing accounts in registration order for output

use crate::types::{Account, AccountId, LedgerError, Username};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Registry of accounts
///
/// Handles are indexes into the account list, so they are dense, assigned in
/// registration order, and never reused.
#[derive(Debug, Default)]
pub struct AccountBook {
    /// Accounts indexed by handle
    accounts: Vec<Account>,

    /// Username index
    by_username: HashMap<Username, AccountId>,
}

impl AccountBook {
    /// Create a new AccountBook with no accounts
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and assign it a handle
    ///
    /// # Errors
    ///
    /// Returns `DuplicateUsername` if the username is already registered.
    /// The book is unchanged in that case.
    pub fn register(&mut self, account: Account) -> Result<AccountId, LedgerError> {
        if self.by_username.contains_key(&account.username) {
            return Err(LedgerError::duplicate_username(account.username.as_str()));
        }

        let index = u32::try_from(self.accounts.len())
            .map_err(|_| LedgerError::arithmetic_overflow("register", account.username.as_str()))?;
        let id = AccountId(index);

        self.by_username.insert(account.username.clone(), id);
        self.accounts.push(account);

        Ok(id)
    }

    /// Get an account by handle
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the handle was not issued by this book.
    pub fn get(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts
            .get(id.0 as usize)
            .ok_or_else(|| LedgerError::unknown_account(id))
    }

    /// Get a mutable account by handle
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the handle was not issued by this book.
    pub fn get_mut(&mut self, id: AccountId) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(id.0 as usize)
            .ok_or_else(|| LedgerError::unknown_account(id))
    }

    /// Find the handle of a username
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if no account has this username.
    pub fn find(&self, username: &str) -> Result<AccountId, LedgerError> {
        self.by_username
            .get(username)
            .copied()
            .ok_or_else(|| LedgerError::unknown_account(username))
    }

    /// Add `amount` to an account's balance
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` for a foreign handle, or `ArithmeticOverflow`
    /// if the new balance is not representable.
    pub fn add_to_balance(&mut self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.get_mut(id)?.add_to_balance(amount)
    }

    /// Iterate over accounts in registration order
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(index, account)| (AccountId(index as u32), account))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
