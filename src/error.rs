//! Error types for the ATM front end.
//!
//! [`EngineError`] is fatal and aborts the run. [`CommandError`] rejects a
//! single command: it is reported on the console and the session carries on
//! with nothing mutated.

use crate::account::AccountNumber;
use crate::money::Money;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that stop the program.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open, read or write a file or stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV snapshot writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed row in the accounts file
    #[error("Invalid accounts file row at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Missing command-line argument
    #[error(
        "Missing required arguments. Usage: atm-frontend <accounts-file> <atf-output-file> [accounts-snapshot.csv]"
    )]
    MissingArgument,
}

/// Category of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown keyword or a missing/unparseable parameter.
    CommandSyntax,
    /// Not logged in, missing privileges, or an unusable account.
    Authorization,
    /// Amount above the plan ceiling, available balance, or field maximum.
    LimitExceeded,
    /// Paybill company outside the allow-set.
    InvalidCompanyCode,
}

/// Reasons a single command is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),

    #[error("Missing parameter: {0}.")]
    MissingParameter(&'static str),

    #[error("Invalid session type '{0}'. Expected 'standard' or 'admin'.")]
    InvalidSessionType(String),

    #[error("Invalid amount: {0}.")]
    InvalidAmount(String),

    #[error("Invalid account number '{0}'.")]
    InvalidAccountNumber(String),

    #[error("Invalid account holder name '{0}'.")]
    InvalidName(String),

    #[error("Cannot transfer from account {0} to itself.")]
    SameAccount(AccountNumber),

    #[error("Not logged in.")]
    NotLoggedIn,

    #[error("Already logged in.")]
    AlreadyLoggedIn,

    #[error("'{0}' is only available in admin sessions.")]
    AdminOnly(&'static str),

    #[error("Account {0} does not exist.")]
    AccountNotFound(AccountNumber),

    #[error("Account {0} is disabled.")]
    AccountDisabled(AccountNumber),

    #[error("Account {0} does not belong to {1}.")]
    HolderMismatch(AccountNumber, String),

    #[error("{kind} of {amount} exceeds the per-transaction limit of {ceiling}.")]
    CeilingExceeded {
        kind: &'static str,
        amount: Money,
        ceiling: Money,
    },

    #[error("Insufficient funds in account {account}: {available} available.")]
    InsufficientFunds { account: AccountNumber, available: Money },

    #[error("Account {0} balance would exceed the maximum of 99999.99.")]
    BalanceOverflow(AccountNumber),

    #[error("Invalid bill company '{0}'. Expected EC, CQ or FI.")]
    InvalidCompanyCode(String),
}

impl CommandError {
    /// Groups the rejection into its error category.
    pub fn kind(&self) -> ErrorKind {
        use CommandError::*;
        match self {
            UnknownCommand(_)
            | MissingParameter(_)
            | InvalidSessionType(_)
            | InvalidAmount(_)
            | InvalidAccountNumber(_)
            | InvalidName(_)
            | SameAccount(_) => ErrorKind::CommandSyntax,
            NotLoggedIn
            | AlreadyLoggedIn
            | AdminOnly(_)
            | AccountNotFound(_)
            | AccountDisabled(_)
            | HolderMismatch(..) => ErrorKind::Authorization,
            CeilingExceeded { .. } | InsufficientFunds { .. } | BalanceOverflow(_) => {
                ErrorKind::LimitExceeded
            }
            InvalidCompanyCode(_) => ErrorKind::InvalidCompanyCode,
        }
    }
}
