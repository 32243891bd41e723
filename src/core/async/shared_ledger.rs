//! Thread-safe ledger for concurrent command processing
//!
//! This module provides the `SharedLedger` struct, which implements the same
//! operations as `Ledger` behind `&self` so that it can be shared across
//! threads.
//!
//! # Design
//!
//! Accounts live in a `DashMap` of `Arc<Mutex<Account>>` cells. An operation
//! clones the cells it needs out of the map, so no map shard stays locked
//! while it works, then locks them:
//! - single-account operations lock one cell
//! - payments lock both cells in ascending `AccountId` order
//! - the feed mutex is only taken while the account locks are held, so feed
//!   order agrees with the order in which balances changed
//!
//! Usernames are claimed through the `DashMap` entry API before the account
//! is published, which makes registration of one name race-free.

use crate::core::card::{AllowListValidator, NoopCharger};
use crate::core::feed::ActivityFeed;
use crate::core::resolver::{self, LedgerConfig};
use crate::core::traits::{CardCharger, CardValidator, PaymentLedger};
use crate::types::{
    Account, AccountId, FeedEntry, Friendship, FundingSource, LedgerError, Payment, Username,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

type AccountCell = Arc<Mutex<Account>>;

/// Thread-safe payment ledger
///
/// Every method takes `&self`. `PaymentLedger` is implemented for
/// `&SharedLedger`, so the shared dispatcher can drive it through a plain
/// reference while other threads do the same.
#[derive(Debug)]
pub struct SharedLedger<V = AllowListValidator, C = NoopCharger> {
    /// Account cells by handle
    accounts: DashMap<AccountId, AccountCell>,

    /// Username index
    usernames: DashMap<Username, AccountId>,

    /// Next handle to issue
    next_id: AtomicU32,

    feed: Mutex<ActivityFeed>,
    config: LedgerConfig,
    validator: V,
    charger: C,
}

impl SharedLedger {
    /// Create an empty shared ledger with the default card collaborators
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_collaborators(config, AllowListValidator::default(), NoopCharger)
    }
}

impl Default for SharedLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

// A panic while a lock was held cannot leave an account half-updated: every
// check runs before the first mutation. Poisoned locks are therefore taken over.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V: CardValidator, C: CardCharger> SharedLedger<V, C> {
    /// Create an empty shared ledger with custom card collaborators
    pub fn with_collaborators(config: LedgerConfig, validator: V, charger: C) -> Self {
        Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            next_id: AtomicU32::new(0),
            feed: Mutex::new(ActivityFeed::new()),
            config,
            validator,
            charger,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The charge collaborator
    pub fn charger(&self) -> &C {
        &self.charger
    }

    fn cell(&self, id: AccountId) -> Result<AccountCell, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::unknown_account(id))
    }

    /// Lock the accounts of a two-party operation and run `f` on them
    ///
    /// Cells are locked in ascending handle order. When both handles are the
    /// same the operation is a self-payment and `f` never runs.
    fn with_pair<T, F>(&self, actor: AccountId, target: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<T, LedgerError>,
    {
        let actor_cell = self.cell(actor)?;
        if actor == target {
            let account = lock(&actor_cell);
            return Err(LedgerError::self_payment(account.username.as_str()));
        }
        let target_cell = self.cell(target)?;

        let (mut actor_guard, mut target_guard) = if actor < target {
            let first = lock(&actor_cell);
            (first, lock(&target_cell))
        } else {
            let first = lock(&target_cell);
            (lock(&actor_cell), first)
        };

        f(&mut *actor_guard, &mut *target_guard)
    }

    fn record(&self, entry: FeedEntry) {
        lock(&self.feed).append(entry);
    }

    fn issue_id(&self, username: &Username) -> Result<AccountId, LedgerError> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map(AccountId)
            .map_err(|_| LedgerError::arithmetic_overflow("register", username.as_str()))
    }

    pub fn create_user(
        &self,
        username: &str,
        balance: Decimal,
        card_number: Option<&str>,
    ) -> Result<AccountId, LedgerError> {
        let mut account = Account::new(username)?;
        account.add_to_balance(balance)?;
        if let Some(number) = card_number {
            account.add_credit_card(number, &self.validator)?;
        }

        // The slot stays locked until the account is published, so a lookup
        // of this username never sees a handle without an account behind it.
        let id = match self.usernames.entry(account.username.clone()) {
            Entry::Occupied(_) => return Err(LedgerError::duplicate_username(username)),
            Entry::Vacant(slot) => {
                let id = self.issue_id(&account.username)?;
                self.accounts.insert(id, Arc::new(Mutex::new(account)));
                slot.insert(id);
                id
            }
        };

        info!(%id, username, %balance, "account registered");
        Ok(id)
    }

    pub fn find_account(&self, username: &str) -> Result<AccountId, LedgerError> {
        self.usernames
            .get(username)
            .map(|entry| *entry.value())
            .ok_or_else(|| LedgerError::unknown_account(username))
    }

    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let cell = self.cell(id)?;
        let account = lock(&cell).clone();
        Ok(account)
    }

    pub fn username(&self, id: AccountId) -> Result<Username, LedgerError> {
        Ok(self.account(id)?.username)
    }

    /// Snapshot of all accounts in registration order
    ///
    /// Each account is copied under its own lock; the snapshot is consistent
    /// per account, not across accounts.
    pub fn accounts(&self) -> Vec<(AccountId, Account)> {
        let cells: Vec<(AccountId, AccountCell)> = self
            .accounts
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut accounts: Vec<_> = cells
            .into_iter()
            .map(|(id, cell)| (id, lock(&cell).clone()))
            .collect();
        accounts.sort_by_key(|(id, _)| *id);
        accounts
    }

    pub fn add_to_balance(&self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        let cell = self.cell(id)?;
        let result = lock(&cell).add_to_balance(amount);
        result
    }

    pub fn add_credit_card(&self, id: AccountId, card_number: &str) -> Result<(), LedgerError> {
        let cell = self.cell(id)?;
        let result = lock(&cell).add_credit_card(card_number, &self.validator);
        result
    }

    /// Pay from balance, falling back to card per the configured policy
    ///
    /// The two attempts lock the accounts separately; another payment may run
    /// in between.
    pub fn pay(
        &self,
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

    pub fn pay_with_balance(
        &self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        self.with_pair(actor, target, |from, to| {
            resolver::check_balance_payment(from, to, amount)?;

            from.add_to_balance(-amount)?;
            to.add_to_balance(amount)?;

            let payment = Payment::new(amount, actor, target, note, FundingSource::Balance);
            debug!(payment = %payment.id, %actor, %target, %amount, "paid from balance");
            self.record(FeedEntry::Payment(payment.clone()));
            Ok(payment)
        })
    }

    pub fn pay_with_card(
        &self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        self.with_pair(actor, target, |from, to| {
            let card = resolver::check_card_payment(from, to, amount)?;

            self.charger.charge(card, amount)?;
            to.add_to_balance(amount)?;

            let payment = Payment::new(amount, actor, target, note, FundingSource::Card);
            debug!(payment = %payment.id, %actor, %target, %amount, %card, "paid by card");
            self.record(FeedEntry::Payment(payment.clone()));
            Ok(payment)
        })
    }

    pub fn add_friend(
        &self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Friendship, LedgerError> {
        let actor_cell = self.cell(actor)?;
        let target_cell = self.cell(target)?;
        let _guards = if actor <= target {
            (lock(&actor_cell), (actor != target).then(|| lock(&target_cell)))
        } else {
            let first = lock(&target_cell);
            (lock(&actor_cell), Some(first))
        };

        let friendship = Friendship { actor, target };
        self.record(FeedEntry::Friendship(friendship));
        debug!(%actor, %target, "friendship recorded");
        Ok(friendship)
    }

    pub fn retrieve_feed(&self, id: AccountId) -> Result<Vec<FeedEntry>, LedgerError> {
        self.cell(id)?;
        let feed = lock(&self.feed);
        Ok(feed.entries_for(id).cloned().collect())
    }

    pub fn activity(&self) -> Vec<FeedEntry> {
        lock(&self.feed).entries().to_vec()
    }
}

impl<V: CardValidator, C: CardCharger> PaymentLedger for &SharedLedger<V, C> {
    fn create_user(
        &mut self,
        username: &str,
        balance: Decimal,
        card_number: Option<&str>,
    ) -> Result<AccountId, LedgerError> {
        (**self).create_user(username, balance, card_number)
    }

    fn find_account(&self, username: &str) -> Result<AccountId, LedgerError> {
        (**self).find_account(username)
    }

    fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        (**self).account(id)
    }

    fn username(&self, id: AccountId) -> Result<Username, LedgerError> {
        (**self).username(id)
    }

    fn accounts(&self) -> Vec<(AccountId, Account)> {
        (**self).accounts()
    }

    fn add_to_balance(&mut self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        (**self).add_to_balance(id, amount)
    }

    fn add_credit_card(&mut self, id: AccountId, card_number: &str) -> Result<(), LedgerError> {
        (**self).add_credit_card(id, card_number)
    }

    fn pay(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        (**self).pay(actor, target, amount, note)
    }

    fn pay_with_balance(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        (**self).pay_with_balance(actor, target, amount, note)
    }

    fn pay_with_card(
        &mut self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
        note: &str,
    ) -> Result<Payment, LedgerError> {
        (**self).pay_with_card(actor, target, amount, note)
    }

    fn add_friend(
        &mut self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Friendship, LedgerError> {
        (**self).add_friend(actor, target)
    }

    fn retrieve_feed(&self, id: AccountId) -> Result<Vec<FeedEntry>, LedgerError> {
        (**self).retrieve_feed(id)
    }

    fn activity(&self) -> Vec<FeedEntry> {
        (**self).activity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::FallbackPolicy;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn bobby_and_carol(ledger: &SharedLedger) -> (AccountId, AccountId) {
        let bobby = ledger
            .create_user("Bobby", Decimal::new(500, 2), Some("4111111111111111"))
            .unwrap();
        let carol = ledger
            .create_user("Carol", Decimal::new(1000, 2), Some("4242424242424242"))
            .unwrap();
        (bobby, carol)
    }

    #[test]
    fn test_balance_then_card_fallback() {
        let ledger = SharedLedger::default();
        let (bobby, carol) = bobby_and_carol(&ledger);

        let coffee = ledger.pay(bobby, carol, Decimal::new(500, 2), "Coffee").unwrap();
        let lunch = ledger.pay(carol, bobby, Decimal::new(1500, 2), "Lunch").unwrap();

        assert_eq!(coffee.funding, FundingSource::Balance);
        assert_eq!(lunch.funding, FundingSource::Card);
        assert_eq!(ledger.account(bobby).unwrap().balance, Decimal::new(1500, 2));
        assert_eq!(ledger.account(carol).unwrap().balance, Decimal::new(1500, 2));
        assert_eq!(
            ledger.retrieve_feed(bobby).unwrap(),
            vec![FeedEntry::Payment(coffee), FeedEntry::Payment(lunch)]
        );
    }

    #[test]
    fn test_self_payment_rejected_without_deadlock() {
        let ledger = SharedLedger::new(LedgerConfig::new(FallbackPolicy::InsufficientFunds));
        let (bobby, _) = bobby_and_carol(&ledger);

        let result = ledger.pay(bobby, bobby, Decimal::ONE, "Tea");

        assert_eq!(result, Err(LedgerError::self_payment("Bobby")));
        assert!(ledger.activity().is_empty());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let ledger = SharedLedger::default();
        ledger.create_user("Bobby", Decimal::ONE, None).unwrap();

        let result = ledger.create_user("Bobby", Decimal::ONE, None);

        assert_eq!(result, Err(LedgerError::duplicate_username("Bobby")));
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn test_accounts_in_registration_order() {
        let ledger = SharedLedger::default();
        for name in ["Zelda", "Alice", "Mallory"] {
            ledger.create_user(name, Decimal::ZERO, None).unwrap();
        }

        let names: Vec<_> = ledger
            .accounts()
            .into_iter()
            .map(|(_, account)| account.username.to_string())
            .collect();
        assert_eq!(names, vec!["Zelda", "Alice", "Mallory"]);
    }

    #[test]
    fn test_friendship_with_self_is_recorded() {
        let ledger = SharedLedger::default();
        let (bobby, _) = bobby_and_carol(&ledger);

        ledger.add_friend(bobby, bobby).unwrap();

        assert_eq!(ledger.retrieve_feed(bobby).unwrap().len(), 1);
    }

    #[test]
    fn test_driven_through_trait() {
        let ledger = SharedLedger::default();
        let mut handle = &ledger;

        let bobby = PaymentLedger::create_user(&mut handle, "Bobby", Decimal::TEN, None).unwrap();
        let carol = PaymentLedger::create_user(&mut handle, "Carol", Decimal::ZERO, None).unwrap();
        PaymentLedger::pay(&mut handle, bobby, carol, Decimal::ONE, "Tea").unwrap();

        assert_eq!(handle.activity().len(), 1);
        assert_eq!(ledger.account(carol).unwrap().balance, Decimal::ONE);
    }

    #[test]
    fn test_concurrent_registration_of_one_name() {
        let ledger = SharedLedger::default();
        let registered = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    if ledger.create_user("Bobby", Decimal::ONE, None).is_ok() {
                        registered.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(registered.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn test_concurrent_balance_payments_conserve_money() {
        let ledger = SharedLedger::default();
        let ids: Vec<AccountId> = (0..6)
            .map(|i| {
                ledger
                    .create_user(&format!("user{i}"), Decimal::new(10_000, 2), None)
                    .unwrap()
            })
            .collect();
        let paid = AtomicUsize::new(0);

        thread::scope(|scope| {
            for worker in 0..ids.len() {
                let (ledger, ids, paid) = (&ledger, &ids, &paid);
                scope.spawn(move || {
                    for round in 0..200 {
                        let actor = ids[(worker + round) % ids.len()];
                        let target = ids[(worker + round * 7 + 1) % ids.len()];
                        if ledger
                            .pay_with_balance(actor, target, Decimal::new(375, 2), "Round")
                            .is_ok()
                        {
                            paid.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        let total: Decimal = ledger
            .accounts()
            .iter()
            .map(|(_, account)| account.balance)
            .sum();
        assert_eq!(total, Decimal::new(60_000, 2));
        assert!(ledger
            .accounts()
            .iter()
            .all(|(_, account)| account.balance >= Decimal::ZERO));
        assert_eq!(ledger.activity().len(), paid.load(Ordering::SeqCst));
    }

    /// Charge collaborator shared by the threads of the ledger
    #[derive(Debug, Default)]
    struct RecordingCharger {
        charges: Mutex<Vec<(String, Decimal)>>,
        decline: bool,
    }

    impl CardCharger for RecordingCharger {
        fn charge(
            &self,
            card: &crate::types::CardNumber,
            amount: Decimal,
        ) -> Result<(), LedgerError> {
            lock(&self.charges).push((card.as_str().to_string(), amount));
            if self.decline {
                return Err(LedgerError::charge_declined("card blocked"));
            }
            Ok(())
        }
    }

    fn ledger_with(
        charger: RecordingCharger,
    ) -> SharedLedger<AllowListValidator, RecordingCharger> {
        SharedLedger::with_collaborators(
            LedgerConfig::default(),
            AllowListValidator::default(),
            charger,
        )
    }

    #[test]
    fn test_card_payments_charge_once_per_payment() {
        let ledger = ledger_with(RecordingCharger::default());
        let bobby = ledger
            .create_user("Bobby", Decimal::new(500, 2), Some("4111111111111111"))
            .unwrap();
        let carol = ledger
            .create_user("Carol", Decimal::new(1000, 2), Some("4242424242424242"))
            .unwrap();

        let lunch = ledger.pay(carol, bobby, Decimal::new(1500, 2), "Lunch").unwrap();
        let tickets = ledger
            .pay_with_card(bobby, carol, Decimal::new(250, 2), "Tickets")
            .unwrap();

        assert_eq!(lunch.funding, FundingSource::Card);
        assert_eq!(tickets.funding, FundingSource::Card);
        assert_eq!(
            *lock(&ledger.charger().charges),
            vec![
                ("4242424242424242".to_string(), Decimal::new(1500, 2)),
                ("4111111111111111".to_string(), Decimal::new(250, 2)),
            ]
        );
        assert_eq!(ledger.account(carol).unwrap().balance, Decimal::new(1250, 2));
        assert_eq!(ledger.account(bobby).unwrap().balance, Decimal::new(2000, 2));
        assert_eq!(ledger.activity().len(), 2);
    }

    #[test]
    fn test_declined_charge_mutates_nothing() {
        let ledger = ledger_with(RecordingCharger {
            decline: true,
            ..RecordingCharger::default()
        });
        let bobby = ledger
            .create_user("Bobby", Decimal::new(500, 2), Some("4111111111111111"))
            .unwrap();
        let carol = ledger
            .create_user("Carol", Decimal::new(1000, 2), Some("4242424242424242"))
            .unwrap();

        let fallback = ledger.pay(carol, bobby, Decimal::new(1500, 2), "Lunch");
        let direct = ledger.pay_with_card(bobby, carol, Decimal::new(100, 2), "Snack");

        assert_eq!(fallback, Err(LedgerError::charge_declined("card blocked")));
        assert_eq!(direct, Err(LedgerError::charge_declined("card blocked")));
        assert_eq!(lock(&ledger.charger().charges).len(), 2);
        assert_eq!(ledger.account(bobby).unwrap().balance, Decimal::new(500, 2));
        assert_eq!(ledger.account(carol).unwrap().balance, Decimal::new(1000, 2));
        assert!(ledger.activity().is_empty());
        assert!(ledger.retrieve_feed(carol).unwrap().is_empty());
    }
}
