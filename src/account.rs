//! Bank account model and the fixed-width accounts file row codec.
//!
//! An accounts file row is exactly 40 characters:
//!
//! ```text
//! NNNNN HHHHHHHHHHHHHHHHHHHH S BBBBBBBB PP
//! ```
//!
//! account number, holder name (20), status (`A`/`D`), balance (`00000.00`)
//! and plan code (`ST`/`AD`), separated by single spaces.

use crate::error::CommandError;
use crate::money::{Money, FIELD_WIDTH};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of one accounts file row.
pub const ROW_LEN: usize = 40;

/// Width of the holder name field in the accounts file.
pub const NAME_WIDTH: usize = 20;

/// Holder name that marks the end of the accounts file.
pub const END_OF_FILE: &str = "END_OF_FILE";

/// A five digit account number.
///
/// `00000` is reserved: it marks the end-of-file row and stands in for
/// accounts whose number has not been assigned yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountNumber(u32);

impl AccountNumber {
    /// Number of digits in a rendered account number.
    pub const WIDTH: usize = 5;

    /// Placeholder for accounts without an assigned number.
    pub const UNASSIGNED: Self = AccountNumber(0);

    /// Creates an account number, returning `None` when it needs more than
    /// five digits.
    pub fn new(value: u32) -> Option<Self> {
        (value <= 99_999).then_some(AccountNumber(value))
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for AccountNumber {
    type Err = CommandError;

    /// Parses 1 to 5 ASCII digits. Shorter input is treated as zero padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CommandError::InvalidAccountNumber(trimmed.to_string());

        if trimmed.is_empty()
            || trimmed.len() > Self::WIDTH
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let value: u32 = trimmed.parse().map_err(|_| invalid())?;
        AccountNumber::new(value).ok_or_else(invalid)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl Serialize for AccountNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Account tier. Governs transaction ceilings and privileged operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Standard,
    Admin,
}

impl Plan {
    /// Two-letter code used in the accounts file and ATF.
    pub fn code(&self) -> &'static str {
        match self {
            Plan::Standard => "ST",
            Plan::Admin => "AD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ST" => Some(Plan::Standard),
            "AD" => Some(Plan::Admin),
            _ => None,
        }
    }

    /// The other plan. Used by `changeplan`.
    pub fn toggled(&self) -> Self {
        match self {
            Plan::Standard => Plan::Admin,
            Plan::Admin => Plan::Standard,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Standard => write!(f, "standard"),
            Plan::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Disabled,
}

impl Status {
    pub fn code(&self) -> char {
        match self {
            Status::Active => 'A',
            Status::Disabled => 'D',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Status::Active),
            "D" => Some(Status::Disabled),
            _ => None,
        }
    }
}

/// A bank account loaded from the accounts file.
///
/// # Invariants
///
/// - `balance` is never negative and never exceeds `99999.99`
/// - Only the validator's accept path mutates an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub number: AccountNumber,
    pub holder: String,
    pub plan: Plan,
    pub balance: Money,
    pub status: Status,
}

impl Account {
    pub fn new(number: AccountNumber, holder: &str, plan: Plan, balance: Money) -> Self {
        Account {
            number,
            holder: holder.to_string(),
            plan,
            balance,
            status: Status::Active,
        }
    }

    /// Returns `true` if the account accepts transactions.
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Subtracts funds. Callers check the available balance first.
    pub fn debit(&mut self, amount: Money) {
        self.balance -= amount;
    }

    /// Adds funds. Callers check the field maximum first.
    pub fn credit(&mut self, amount: Money) {
        self.balance += amount;
    }

    pub fn disable(&mut self) {
        self.status = Status::Disabled;
    }

    /// Switches to the other plan and returns it.
    pub fn change_plan(&mut self) -> Plan {
        self.plan = self.plan.toggled();
        self.plan
    }

    /// Returns `true` if `row` is the end-of-file marker row.
    pub fn is_end_marker(row: &str) -> bool {
        row.get(6..6 + NAME_WIDTH)
            .or_else(|| row.get(6..))
            .map(|name| name.trim() == END_OF_FILE)
            .unwrap_or(false)
    }

    /// Parses one fixed-width accounts file row.
    ///
    /// Returns a human-readable message describing the first problem found.
    pub fn parse_row(row: &str) -> std::result::Result<Account, String> {
        if !row.is_ascii() {
            return Err("row contains non-ASCII characters".to_string());
        }
        if row.len() != ROW_LEN {
            return Err(format!(
                "expected {} characters, found {}",
                ROW_LEN,
                row.len()
            ));
        }
        for col in [5, 26, 28, 37] {
            if row.as_bytes()[col] != b' ' {
                return Err(format!("expected a space separator at column {}", col + 1));
            }
        }

        let number_field = &row[0..5];
        let holder = row[6..26].trim_end();
        let status_field = &row[27..28];
        let balance_field = &row[29..29 + FIELD_WIDTH];
        let plan_field = &row[38..40];

        if !number_field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid account number '{}'", number_field));
        }
        let number = AccountNumber::from_str(number_field).map_err(|e| e.to_string())?;
        if number.is_unassigned() {
            return Err("account number 00000 is reserved".to_string());
        }

        if holder.trim().is_empty() {
            return Err("holder name is empty".to_string());
        }

        let status = Status::from_code(status_field)
            .ok_or_else(|| format!("invalid status flag '{}'", status_field))?;

        let balance = Money::from_str(balance_field)
            .map_err(|e| format!("invalid balance: {}", e))?;
        if !balance.fits_field() {
            return Err(format!("balance {} out of range", balance));
        }

        let plan = Plan::from_code(plan_field)
            .ok_or_else(|| format!("invalid plan code '{}'", plan_field))?;

        Ok(Account {
            number,
            holder: holder.to_string(),
            plan,
            balance,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_active_standard_row() {
        let row = "00101 John Doe             A 01000.00 ST";
        let account = Account::parse_row(row).unwrap();

        assert_eq!(account.number.to_string(), "00101");
        assert_eq!(account.holder, "John Doe");
        assert_eq!(account.plan, Plan::Standard);
        assert_eq!(account.balance, money("1000"));
        assert!(account.is_active());
    }

    #[test]
    fn test_parse_disabled_admin_row() {
        let row = "12345 Jane Q Public        D 00000.50 AD";
        let account = Account::parse_row(row).unwrap();

        assert_eq!(account.status, Status::Disabled);
        assert_eq!(account.plan, Plan::Admin);
        assert_eq!(account.balance.to_string(), "0.50");
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let err = Account::parse_row("00101 John Doe A 01000.00 ST").unwrap_err();
        assert!(err.contains("expected 40 characters"));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert!(Account::parse_row("0010X John Doe             A 01000.00 ST").is_err());
        assert!(Account::parse_row("00101 John Doe             X 01000.00 ST").is_err());
        assert!(Account::parse_row("00101 John Doe             A 01000.0x ST").is_err());
        assert!(Account::parse_row("00101 John Doe             A 01000.00 ZZ").is_err());
        assert!(Account::parse_row("00101 John Doe             A-01000.00 ST").is_err());
        assert!(Account::parse_row("00000 John Doe             A 01000.00 ST").is_err());
        assert!(Account::parse_row("00101                      A 01000.00 ST").is_err());
    }

    #[test]
    fn test_end_marker() {
        assert!(Account::is_end_marker(
            "00000 END_OF_FILE          A 00000.00 ST"
        ));
        assert!(Account::is_end_marker("00000 END_OF_FILE"));
        assert!(!Account::is_end_marker(
            "00101 John Doe             A 01000.00 ST"
        ));
    }

    #[test]
    fn test_account_number_parsing() {
        assert_eq!(AccountNumber::from_str("101").unwrap().to_string(), "00101");
        assert_eq!(AccountNumber::from_str(" 00202 ").unwrap().to_string(), "00202");
        assert!(AccountNumber::from_str("123456").is_err());
        assert!(AccountNumber::from_str("12a").is_err());
        assert!(AccountNumber::from_str("").is_err());
        assert!(AccountNumber::from_str("-1").is_err());
    }

    #[test]
    fn test_debit_credit_and_admin_changes() {
        let number = AccountNumber::new(7).unwrap();
        let mut account = Account::new(number, "Ann", Plan::Standard, money("100"));

        account.debit(money("40"));
        account.credit(money("15.25"));
        assert_eq!(account.balance.to_string(), "75.25");

        assert_eq!(account.change_plan(), Plan::Admin);
        assert_eq!(account.change_plan(), Plan::Standard);

        account.disable();
        assert!(!account.is_active());
    }
}
