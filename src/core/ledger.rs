//! Single-threaded ledger
//!
//! This module provides the `Ledger` registry: it owns the account book and
//! the activity feed, and runs every account operation against them.
//!
//! The ledger enforces business rules such as:
//! - Username and card validation at registration
//! - Payment validation before any mutation (see `resolver`)
//! - Exactly one feed entry per successful payment or friendship

use crate::core::account_book::AccountBook;
use crate::core::card::{AllowListValidator, NoopCharger};
use crate::core::feed::ActivityFeed;
use crate::core::resolver::{self, LedgerConfig};
use crate::core::traits::{CardCharger, CardValidator, PaymentLedger};
use crate::types::{
    Account, AccountId, FeedEntry, Friendship, FundingSource, LedgerError, Payment, Username,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Payment ledger registry
///
/// Accounts are referred to by the `AccountId` returned from `create_user`;
/// the ledger is the only owner of account state and of the feed.
#[derive(Debug)]
pub struct Ledger<V = AllowListValidator, C = NoopCharger> {
    book: AccountBook,
    feed: ActivityFeed,
    config: LedgerConfig,
    validator: V,
    charger: C,
}

impl Ledger {
    /// Create an empty ledger with the default card collaborators
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_collaborators(config, AllowListValidator::default(), NoopCharger)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl<V: CardValidator, C: CardCharger> Ledger<V, C> {
    /// Create an empty ledger with custom card collaborators
    pub fn with_collaborators(config: LedgerConfig, validator: V, charger: C) -> Self {
        Self {
            book: AccountBook::new(),
            feed: ActivityFeed::new(),
            config,
            validator,
            charger,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The shared activity feed
    pub fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    /// The charge collaborator
    pub fn charger(&self) -> &C {
        &self.charger
    }

    fn record(&mut self, payment: Payment) -> Payment {
        self.feed.append(FeedEntry::Payment(payment.clone()));
        payment
    }
}

impl<V: CardValidator, C: CardCharger> PaymentLedger for Ledger<V, C> {
    /// Register a user
    ///
    /// The account is built, seeded, and given its card before it is
    /// registered, so a failure at any step registers nothing.
    ///
    /// # Errors
    ///
    /// `InvalidUsername`, `InvalidCard`, `ArithmeticOverflow`, or
    /// `DuplicateUsername`.
    fn create_user(
        &mut self,
        username: &str,
        balance: Decimal,
        card_number: Option<&str>,
    ) -> Result<AccountId, LedgerError> {
        let mut account = Account::new(username)?;
        account.add_to_balance(balance)?;
        if let Some(number) = card_number {
            account.add_credit_card(number, &self.validator)?;
        }

        let id = self.book.register(account)?;
        info!(%id, username, %balance, "account registered");
        Ok(id)
    }

    fn find_account(&self, username: &str) -> Result<AccountId, LedgerError> {
        self.book.find(username)
    }

    fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.book.get(id).cloned()
    }

    fn username(&self, id: AccountId) -> Result<Username, LedgerError> {
        Ok(self.book.get(id)?.username.clone())
    }

    fn accounts(&self) -> Vec<(AccountId, Account)> {
        self.book
            .iter()
            .map(|(id, account)| (id, account.clone()))
            .collect()
    }

    fn add_to_balance(&mut self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.book.add_to_balance(id, amount)
    }

    fn add_credit_card(&mut self, id: AccountId, card_number: &str) -> Result<(), LedgerError> {
        let validator = &self.validator;
        self.book.get_mut(id)?.add_credit_card(card_number, validator)
    }

    fn pay(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        match self.pay_with_balance(actor, target, amount, note) {
            Ok(payment) => Ok(payment),
            Err(error) if self.config.fallback.allows_fallback(&error) => {
                debug!(%actor, %target, %error, "balance payment failed, trying card");
                self.pay_with_card(actor, target, amount, note)
            }
            Err(error) => Err(error),
        }
    }

    fn pay_with_balance(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        resolver::check_balance_payment(self.book.get(actor)?, self.book.get(target)?, amount)?;

        self.book.add_to_balance(actor, -amount)?;
        self.book.add_to_balance(target, amount)?;

        let payment = Payment::new(amount, actor, target, note, FundingSource::Balance);
        debug!(payment = %payment.id, %actor, %target, %amount, "paid from balance");
        Ok(self.record(payment))
    }

    fn pay_with_card(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        let card =
            resolver::check_card_payment(self.book.get(actor)?, self.book.get(target)?, amount)?
                .clone();

        self.charger.charge(&card, amount)?;
        self.book.add_to_balance(target, amount)?;

        let payment = Payment::new(amount, actor, target, note, FundingSource::Card);
        debug!(payment = %payment.id, %actor, %target, %amount, %card, "paid by card");
        Ok(self.record(payment))
    }

    fn add_friend(
        &mut self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Friendship, LedgerError> {
        self.book.get(actor)?;
        self.book.get(target)?;

        let friendship = Friendship { actor, target };
        self.feed.append(FeedEntry::Friendship(friendship));
        debug!(%actor, %target, "friendship recorded");
        Ok(friendship)
    }

    fn retrieve_feed(&self, id: AccountId) -> Result<Vec<FeedEntry>, LedgerError> {
        self.book.get(id)?;
        Ok(self.feed.entries_for(id).cloned().collect())
    }

    fn activity(&self) -> Vec<FeedEntry> {
        self.feed.entries().to_vec()
    }
}
