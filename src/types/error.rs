//! Error types for the peer-to-peer ledger
//!
//! This module defines every error that can occur while registering users,
//! attaching cards, resolving payments, and replaying command scripts.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Registration Errors**: invalid or duplicate usernames
//! - **Card Errors**: duplicate or rejected card numbers
//! - **Payment Errors**: self-payment, non-positive amount, insufficient funds,
//!   missing card, declined charge, arithmetic overflow
//! - **Script Errors**: I/O, malformed CSV, unknown commands or entry kinds

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// No variant is ever produced after a partial mutation: every payment check
/// runs before any balance or feed change.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Username does not match `^[A-Za-z0-9_-]{4,15}$`
    #[error("Username '{username}' is not valid")]
    InvalidUsername {
        /// The rejected username
        username: String,
    },

    /// Username is already registered in this ledger
    #[error("Username '{username}' is already taken")]
    DuplicateUsername {
        /// The username that is already registered
        username: String,
    },

    /// The account already holds a card (one card per user)
    #[error("Only one credit card per user: {username} already has one")]
    DuplicateCard {
        /// Account that already holds a card
        username: String,
    },

    /// The card validator rejected the number
    #[error("Invalid credit card number for {username}")]
    InvalidCard {
        /// Account the card was offered to
        username: String,
    },

    /// Actor and target are the same account
    #[error("User {username} cannot pay themselves")]
    SelfPayment {
        /// The paying account
        username: String,
    },

    /// Amount is zero or negative
    #[error("Amount must be a positive number, got {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Balance is lower than the requested amount
    ///
    /// This is the only failure the strict fallback policy retries by card.
    #[error("Insufficient funds for {username}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The paying account
        username: String,
        /// Balance at the time of the attempt
        balance: Decimal,
        /// Requested payment amount
        requested: Decimal,
    },

    /// A card payment was attempted without a card on file
    #[error("User {username} must have a credit card to make a card payment")]
    MissingCard {
        /// The paying account
        username: String,
    },

    /// The card processor refused the charge
    #[error("Card charge declined: {reason}")]
    ChargeDeclined {
        /// Reason reported by the charge collaborator
        reason: String,
    },

    /// A feed entry kind given as text is not a known kind
    #[error("Unknown feed entry kind '{kind}'")]
    UnknownEntryKind {
        /// The unrecognised kind
        kind: String,
    },

    /// Account handle or username is not registered in this ledger
    #[error("Unknown account {account}")]
    UnknownAccount {
        /// Handle or username that was looked up
        account: String,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for {username}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        username: String,
    },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Script command is not recognised
    #[error("Unknown command '{command}'")]
    UnknownCommand {
        /// The unrecognised command
        command: String,
    },

    /// Script command is missing a required column
    #[error("{command} command requires the {field} column")]
    MissingField {
        /// Command being converted
        command: String,
        /// Column that was empty
        field: String,
    },

    /// Amount column is not a decimal number
    #[error("Malformed amount '{value}'")]
    MalformedAmount {
        /// The raw amount text
        value: String,
    },

    /// Async runtime failure (runtime construction, task join)
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidUsername error
    pub fn invalid_username(username: &str) -> Self {
        LedgerError::InvalidUsername {
            username: username.to_string(),
        }
    }

    /// Create a DuplicateUsername error
    pub fn duplicate_username(username: &str) -> Self {
        LedgerError::DuplicateUsername {
            username: username.to_string(),
        }
    }

    /// Create a DuplicateCard error
    pub fn duplicate_card(username: &str) -> Self {
        LedgerError::DuplicateCard {
            username: username.to_string(),
        }
    }

    /// Create an InvalidCard error
    pub fn invalid_card(username: &str) -> Self {
        LedgerError::InvalidCard {
            username: username.to_string(),
        }
    }

    /// Create a SelfPayment error
    pub fn self_payment(username: &str) -> Self {
        LedgerError::SelfPayment {
            username: username.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(username: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            username: username.to_string(),
            balance,
            requested,
        }
    }

    /// Create a MissingCard error
    pub fn missing_card(username: &str) -> Self {
        LedgerError::MissingCard {
            username: username.to_string(),
        }
    }

    /// Create a ChargeDeclined error
    pub fn charge_declined(reason: &str) -> Self {
        LedgerError::ChargeDeclined {
            reason: reason.to_string(),
        }
    }

    /// Create an UnknownEntryKind error
    pub fn unknown_entry_kind(kind: &str) -> Self {
        LedgerError::UnknownEntryKind {
            kind: kind.to_string(),
        }
    }

    /// Create an UnknownAccount error
    pub fn unknown_account(account: impl ToString) -> Self {
        LedgerError::UnknownAccount {
            account: account.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, username: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            username: username.to_string(),
        }
    }

    /// Create an UnknownCommand error
    pub fn unknown_command(command: &str) -> Self {
        LedgerError::UnknownCommand {
            command: command.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(command: &str, field: &str) -> Self {
        LedgerError::MissingField {
            command: command.to_string(),
            field: field.to_string(),
        }
    }

    /// Create a MalformedAmount error
    pub fn malformed_amount(value: &str) -> Self {
        LedgerError::MalformedAmount {
            value: value.to_string(),
        }
    }

    /// Whether this error is a payment validation failure
    ///
    /// These are the failures a payment attempt can raise once both accounts
    /// are known. Lookup and script errors are not payment failures and never
    /// trigger the balance-to-card fallback.
    pub fn is_payment_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::SelfPayment { .. }
                | LedgerError::InvalidAmount { .. }
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::MissingCard { .. }
                | LedgerError::ChargeDeclined { .. }
                | LedgerError::ArithmeticOverflow { .. }
        )
    }
}
