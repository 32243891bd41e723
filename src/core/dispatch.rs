//! Command dispatch
//!
//! Applies one `LedgerCommand` to any `PaymentLedger`, resolving usernames
//! to handles first. Both processing strategies replay scripts through
//! `apply`, so a script produces the same results whichever ledger runs it.

use crate::core::traits::PaymentLedger;
use crate::types::{
    AccountId, FeedEntry, Friendship, LedgerCommand, LedgerError, Payment, PaymentMethod,
};

/// Result of a successfully applied command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Registered(AccountId),
    CardAdded(AccountId),
    Paid(Payment),
    Befriended(Friendship),
    /// Entries selected by a `feed` command, in append order
    Feed(Vec<FeedEntry>),
}

/// Apply a command to a ledger
///
/// # Errors
///
/// Returns `UnknownAccount` when a named user is not registered, or whatever
/// the underlying ledger operation returns.
pub fn apply<L: PaymentLedger + ?Sized>(
    ledger: &mut L,
    command: LedgerCommand,
) -> Result<CommandOutcome, LedgerError> {
    match command {
        LedgerCommand::CreateUser {
            username,
            balance,
            card_number,
        } => ledger
            .create_user(&username, balance, card_number.as_deref())
            .map(CommandOutcome::Registered),

        LedgerCommand::AddCard {
            username,
            card_number,
        } => {
            let id = ledger.find_account(&username)?;
            ledger.add_credit_card(id, &card_number)?;
            Ok(CommandOutcome::CardAdded(id))
        }

        LedgerCommand::Pay {
            actor,
            target,
            amount,
            note,
            method,
        } => {
            let actor = ledger.find_account(&actor)?;
            let target = ledger.find_account(&target)?;
            let payment = match method {
                PaymentMethod::Auto => ledger.pay(actor, target, amount, &note),
                PaymentMethod::Balance => ledger.pay_with_balance(actor, target, amount, &note),
                PaymentMethod::Card => ledger.pay_with_card(actor, target, amount, &note),
            }?;
            Ok(CommandOutcome::Paid(payment))
        }

        LedgerCommand::AddFriend { actor, target } => {
            let actor = ledger.find_account(&actor)?;
            let target = ledger.find_account(&target)?;
            ledger
                .add_friend(actor, target)
                .map(CommandOutcome::Befriended)
        }

        LedgerCommand::ShowFeed { username, kind } => {
            let mut entries = match username {
                Some(name) => {
                    let id = ledger.find_account(&name)?;
                    ledger.retrieve_feed(id)?
                }
                None => ledger.activity(),
            };
            if let Some(kind) = kind {
                entries.retain(|entry| entry.kind() == kind);
            }
            Ok(CommandOutcome::Feed(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ledger;
    use crate::types::{EntryKind, FundingSource};
    use rust_decimal::Decimal;

    fn create(username: &str, balance: i64, card: Option<&str>) -> LedgerCommand {
        LedgerCommand::CreateUser {
            username: username.to_string(),
            balance: Decimal::new(balance, 2),
            card_number: card.map(str::to_string),
        }
    }

    fn pay(actor: &str, target: &str, amount: i64, method: PaymentMethod) -> LedgerCommand {
        LedgerCommand::Pay {
            actor: actor.to_string(),
            target: target.to_string(),
            amount: Decimal::new(amount, 2),
            note: "Coffee".to_string(),
            method,
        }
    }

    fn seeded() -> Ledger {
        let mut ledger = Ledger::default();
        apply(&mut ledger, create("Bobby", 500, Some("4111111111111111"))).unwrap();
        apply(&mut ledger, create("Carol", 1000, None)).unwrap();
        ledger
    }

    #[test]
    fn test_create_user_returns_handle() {
        let mut ledger = Ledger::default();
        let outcome = apply(&mut ledger, create("Bobby", 500, None)).unwrap();

        let id = ledger.find_account("Bobby").unwrap();
        assert_eq!(outcome, CommandOutcome::Registered(id));
    }

    #[test]
    fn test_add_card_resolves_username() {
        let mut ledger = seeded();
        let command = LedgerCommand::AddCard {
            username: "Carol".to_string(),
            card_number: "4242424242424242".to_string(),
        };

        apply(&mut ledger, command).unwrap();

        let carol = ledger.find_account("Carol").unwrap();
        assert!(ledger.account(carol).unwrap().card().is_some());
    }

    #[test]
    fn test_pay_methods_route_to_operations() {
        let mut ledger = seeded();

        let by_card = apply(&mut ledger, pay("Bobby", "Carol", 100, PaymentMethod::Card)).unwrap();
        let by_balance =
            apply(&mut ledger, pay("Bobby", "Carol", 100, PaymentMethod::Balance)).unwrap();

        let CommandOutcome::Paid(by_card) = by_card else {
            panic!("expected a payment");
        };
        let CommandOutcome::Paid(by_balance) = by_balance else {
            panic!("expected a payment");
        };
        assert_eq!(by_card.funding, FundingSource::Card);
        assert_eq!(by_balance.funding, FundingSource::Balance);
    }

    #[test]
    fn test_pay_balance_does_not_fall_back() {
        let mut ledger = seeded();

        let result = apply(&mut ledger, pay("Bobby", "Carol", 600, PaymentMethod::Balance));

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
    }

    #[test]
    fn test_unknown_user_is_reported() {
        let mut ledger = seeded();

        let result = apply(&mut ledger, pay("Bobby", "Dave1", 100, PaymentMethod::Auto));

        assert_eq!(result, Err(LedgerError::unknown_account("Dave1")));
        assert!(ledger.activity().is_empty());
    }

    #[test]
    fn test_feed_with_kind_filter() {
        let mut ledger = seeded();
        apply(&mut ledger, pay("Bobby", "Carol", 100, PaymentMethod::Auto)).unwrap();
        apply(
            &mut ledger,
            LedgerCommand::AddFriend {
                actor: "Carol".to_string(),
                target: "Bobby".to_string(),
            },
        )
        .unwrap();

        let everything = apply(
            &mut ledger,
            LedgerCommand::ShowFeed {
                username: None,
                kind: None,
            },
        )
        .unwrap();
        let friendships = apply(
            &mut ledger,
            LedgerCommand::ShowFeed {
                username: Some("Bobby".to_string()),
                kind: Some(EntryKind::Friendship),
            },
        )
        .unwrap();

        let CommandOutcome::Feed(everything) = everything else {
            panic!("expected a feed");
        };
        let CommandOutcome::Feed(friendships) = friendships else {
            panic!("expected a feed");
        };
        assert_eq!(everything.len(), 2);
        assert_eq!(friendships.len(), 1);
        assert_eq!(friendships[0].kind(), EntryKind::Friendship);
    }
}
