//! CSV format handling for command scripts and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to `LedgerCommand`
//! - Balance output serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Script Format
//!
//! ```text
//! command,user,counterpart,amount,detail
//! user,Bobby,,5.00,4111111111111111
//! pay,Bobby,Carol,5.00,Coffee
//! feed,Bobby,,,
//! ```

use crate::types::{
    Account, AccountId, EntryKind, LedgerCommand, LedgerError, PaymentMethod,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the script columns: command, user, counterpart, amount, detail.
/// Every column but `command` is optional; which ones a command needs is
/// checked by `convert_csv_record`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    pub command: String,
    pub user: Option<String>,
    pub counterpart: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, command: &str, field: &str) -> Result<String, LedgerError> {
    present(value).ok_or_else(|| LedgerError::missing_field(command, field))
}

fn parse_amount(value: Option<String>, command: &str) -> Result<Decimal, LedgerError> {
    let raw = required(value, command, "amount")?;
    Decimal::from_str(raw.trim()).map_err(|_| LedgerError::malformed_amount(&raw))
}

/// Convert a CsvRecord to a LedgerCommand
///
/// Command names are case insensitive. The `detail` column carries the card
/// number for `user` and `card`, the note for the `pay` family, and the
/// entry kind filter for `feed`.
///
/// # Errors
///
/// - `UnknownCommand` for an unrecognized command
/// - `MissingField` when a required column is empty
/// - `MalformedAmount` when the amount is not a decimal number
/// - `UnknownEntryKind` for a `feed` filter other than payment or friendship
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<LedgerCommand, LedgerError> {
    let command = csv_record.command.trim().to_lowercase();

    let method = match command.as_str() {
        "pay" => Some(PaymentMethod::Auto),
        "pay_balance" => Some(PaymentMethod::Balance),
        "pay_card" => Some(PaymentMethod::Card),
        _ => None,
    };
    if let Some(method) = method {
        return Ok(LedgerCommand::Pay {
            actor: required(csv_record.user, &command, "user")?,
            target: required(csv_record.counterpart, &command, "counterpart")?,
            amount: parse_amount(csv_record.amount, &command)?,
            note: csv_record.detail.unwrap_or_default(),
            method,
        });
    }

    match command.as_str() {
        "user" => Ok(LedgerCommand::CreateUser {
            username: required(csv_record.user, &command, "user")?,
            balance: parse_amount(csv_record.amount, &command)?,
            card_number: present(csv_record.detail),
        }),
        "card" => Ok(LedgerCommand::AddCard {
            username: required(csv_record.user, &command, "user")?,
            card_number: required(csv_record.detail, &command, "detail")?,
        }),
        "friend" => Ok(LedgerCommand::AddFriend {
            actor: required(csv_record.user, &command, "user")?,
            target: required(csv_record.counterpart, &command, "counterpart")?,
        }),
        "feed" => Ok(LedgerCommand::ShowFeed {
            username: present(csv_record.user),
            kind: present(csv_record.detail)
                .map(|kind| EntryKind::from_str(&kind))
                .transpose()?,
        }),
        _ => Err(LedgerError::unknown_command(&csv_record.command)),
    }
}

/// Write account balances in CSV format
///
/// Columns: username, balance, card. Accounts are written in the order given
/// (registration order for both ledgers). Balances are rounded to two
/// decimal places; the card column holds the last four digits, or nothing.
///
/// # Errors
///
/// Returns `IoError` if a write fails.
pub fn write_balances_csv(
    accounts: &[(AccountId, Account)],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["username", "balance", "card"])?;

    for (_, account) in accounts {
        let balance = format!("{:.2}", account.balance.round_dp(2));
        let card = account.card().map(|card| card.last_four()).unwrap_or_default();
        writer.write_record([account.username.as_str(), balance.as_str(), card])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AllowListValidator;
    use rstest::rstest;

    fn record(
        command: &str,
        user: Option<&str>,
        counterpart: Option<&str>,
        amount: Option<&str>,
        detail: Option<&str>,
    ) -> CsvRecord {
        CsvRecord {
            command: command.to_string(),
            user: user.map(str::to_string),
            counterpart: counterpart.map(str::to_string),
            amount: amount.map(str::to_string),
            detail: detail.map(str::to_string),
        }
    }

    #[rstest]
    #[case("pay", PaymentMethod::Auto)]
    #[case("PAY", PaymentMethod::Auto)]
    #[case("pay_balance", PaymentMethod::Balance)]
    #[case("Pay_Card", PaymentMethod::Card)]
    fn test_convert_payment_commands(#[case] command: &str, #[case] expected: PaymentMethod) {
        let csv_record = record(command, Some("Bobby"), Some("Carol"), Some(" 5.50 "), Some("Tea"));

        let result = convert_csv_record(csv_record).unwrap();

        assert_eq!(
            result,
            LedgerCommand::Pay {
                actor: "Bobby".to_string(),
                target: "Carol".to_string(),
                amount: Decimal::new(550, 2),
                note: "Tea".to_string(),
                method: expected,
            }
        );
    }

    #[test]
    fn test_convert_payment_without_note() {
        let csv_record = record("pay", Some("Bobby"), Some("Carol"), Some("1"), None);

        let LedgerCommand::Pay { note, .. } = convert_csv_record(csv_record).unwrap() else {
            panic!("expected a payment");
        };
        assert_eq!(note, "");
    }

    #[test]
    fn test_convert_user_with_and_without_card() {
        let with_card = record("user", Some("Bobby"), None, Some("5.00"), Some("4111111111111111"));
        let without_card = record("user", Some("Carol"), None, Some("10"), Some(""));

        assert_eq!(
            convert_csv_record(with_card).unwrap(),
            LedgerCommand::CreateUser {
                username: "Bobby".to_string(),
                balance: Decimal::new(500, 2),
                card_number: Some("4111111111111111".to_string()),
            }
        );
        assert_eq!(
            convert_csv_record(without_card).unwrap(),
            LedgerCommand::CreateUser {
                username: "Carol".to_string(),
                balance: Decimal::TEN,
                card_number: None,
            }
        );
    }

    #[test]
    fn test_convert_feed_commands() {
        let whole = record("feed", None, None, None, None);
        let filtered = record("feed", Some("Bobby"), None, None, Some("Friendship"));

        assert_eq!(
            convert_csv_record(whole).unwrap(),
            LedgerCommand::ShowFeed {
                username: None,
                kind: None
            }
        );
        assert_eq!(
            convert_csv_record(filtered).unwrap(),
            LedgerCommand::ShowFeed {
                username: Some("Bobby".to_string()),
                kind: Some(EntryKind::Friendship),
            }
        );
    }

    #[rstest]
    #[case::unknown_command(record("refund", Some("Bobby"), None, None, None), LedgerError::unknown_command("refund"))]
    #[case::missing_user(record("card", None, None, None, Some("4111111111111111")), LedgerError::missing_field("card", "user"))]
    #[case::missing_card(record("card", Some("Bobby"), None, None, None), LedgerError::missing_field("card", "detail"))]
    #[case::missing_counterpart(record("friend", Some("Bobby"), Some(" "), None, None), LedgerError::missing_field("friend", "counterpart"))]
    #[case::missing_amount(record("pay", Some("Bobby"), Some("Carol"), None, None), LedgerError::missing_field("pay", "amount"))]
    #[case::malformed_amount(record("pay", Some("Bobby"), Some("Carol"), Some("ten"), None), LedgerError::malformed_amount("ten"))]
    #[case::unknown_kind(record("feed", None, None, None, Some("gift")), LedgerError::unknown_entry_kind("gift"))]
    fn test_convert_csv_record_errors(#[case] csv_record: CsvRecord, #[case] expected: LedgerError) {
        assert_eq!(convert_csv_record(csv_record), Err(expected));
    }

    fn account(username: &str, balance: Decimal, card: Option<&str>) -> (AccountId, Account) {
        let mut account = Account::new(username).unwrap();
        account.add_to_balance(balance).unwrap();
        if let Some(number) = card {
            account
                .add_credit_card(number, &AllowListValidator::default())
                .unwrap();
        }
        (AccountId(0), account)
    }

    #[rstest]
    #[case::with_card(
        vec![account("Bobby", Decimal::new(1500, 2), Some("4111111111111111"))],
        "username,balance,card\nBobby,15.00,1111\n"
    )]
    #[case::without_card(
        vec![account("Danilo", Decimal::new(12250, 2), None)],
        "username,balance,card\nDanilo,122.50,\n"
    )]
    #[case::rounded(
        vec![account("Carol", Decimal::new(100_056, 4), None)],
        "username,balance,card\nCarol,10.01,\n"
    )]
    #[case::order_preserved(
        vec![account("Zelda", Decimal::ONE, None), account("Alice", Decimal::TWO, None)],
        "username,balance,card\nZelda,1.00,\nAlice,2.00,\n"
    )]
    #[case::empty(vec![], "username,balance,card\n")]
    fn test_write_balances_csv(
        #[case] accounts: Vec<(AccountId, Account)>,
        #[case] expected_output: &str,
    ) {
        let mut output = Vec::new();
        write_balances_csv(&accounts, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }
}
