//! Command keywords and their parameters as read from the console stream.
//!
//! A command is a keyword line followed by one parameter per line. All
//! parameter lines owed by a command are consumed before any of them is
//! parsed, so a bad value never shifts the following lines out of place.

use crate::account::{AccountNumber, NAME_WIDTH};
use crate::error::CommandError;
use crate::money::Money;
use crate::transaction::HOLDER_WIDTH;
use std::str::FromStr;

/// Recognized command keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Login,
    Logout,
    Withdrawal,
    Deposit,
    Transfer,
    Paybill,
    Create,
    Delete,
    Disable,
    ChangePlan,
}

impl Keyword {
    /// Lowercase keyword as typed on the console.
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Login => "login",
            Keyword::Logout => "logout",
            Keyword::Withdrawal => "withdrawal",
            Keyword::Deposit => "deposit",
            Keyword::Transfer => "transfer",
            Keyword::Paybill => "paybill",
            Keyword::Create => "create",
            Keyword::Delete => "delete",
            Keyword::Disable => "disable",
            Keyword::ChangePlan => "changeplan",
        }
    }

    /// Commands that require an admin session.
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Keyword::Create | Keyword::Delete | Keyword::Disable | Keyword::ChangePlan
        )
    }

    /// Commands that move money and are validated against plan ceilings.
    pub fn moves_money(&self) -> bool {
        matches!(
            self,
            Keyword::Withdrawal | Keyword::Deposit | Keyword::Transfer | Keyword::Paybill
        )
    }

    /// Parameter lines owed by this command, in input order.
    ///
    /// Money-movement commands ask admins which holder they act for;
    /// standard sessions act for the logged-in holder.
    fn fields(&self, admin: bool) -> &'static [&'static str] {
        match (self, admin) {
            (Keyword::Login | Keyword::Logout, _) => &[],
            (Keyword::Withdrawal | Keyword::Deposit, true) => {
                &["account holder name", "account number", "amount"]
            }
            (Keyword::Withdrawal | Keyword::Deposit, false) => &["account number", "amount"],
            (Keyword::Transfer, true) => &[
                "account holder name",
                "from account number",
                "to account number",
                "amount",
            ],
            (Keyword::Transfer, false) => &["from account number", "to account number", "amount"],
            (Keyword::Paybill, true) => &[
                "account holder name",
                "account number",
                "company code",
                "amount",
            ],
            (Keyword::Paybill, false) => &["account number", "company code", "amount"],
            (Keyword::Create, _) => &["new account holder name", "initial balance"],
            (Keyword::Delete | Keyword::Disable | Keyword::ChangePlan, _) => {
                &["account holder name", "account number"]
            }
        }
    }
}

impl FromStr for Keyword {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_lowercase();
        match keyword.as_str() {
            "login" => Ok(Keyword::Login),
            "logout" => Ok(Keyword::Logout),
            "withdrawal" => Ok(Keyword::Withdrawal),
            "deposit" => Ok(Keyword::Deposit),
            "transfer" => Ok(Keyword::Transfer),
            "paybill" => Ok(Keyword::Paybill),
            "create" => Ok(Keyword::Create),
            "delete" => Ok(Keyword::Delete),
            "disable" => Ok(Keyword::Disable),
            "changeplan" => Ok(Keyword::ChangePlan),
            _ => Err(CommandError::UnknownCommand(s.trim().to_string())),
        }
    }
}

/// A transaction command with its parsed parameters.
///
/// `named` is the holder an admin session says it acts for; it is `None`
/// in standard sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Withdrawal {
        named: Option<String>,
        account: AccountNumber,
        amount: Money,
    },
    Deposit {
        named: Option<String>,
        account: AccountNumber,
        amount: Money,
    },
    Transfer {
        named: Option<String>,
        from: AccountNumber,
        to: AccountNumber,
        amount: Money,
    },
    Paybill {
        named: Option<String>,
        account: AccountNumber,
        company: String,
        amount: Money,
    },
    Create {
        holder: String,
        initial: Money,
    },
    Delete {
        holder: String,
        account: AccountNumber,
    },
    Disable {
        holder: String,
        account: AccountNumber,
    },
    ChangePlan {
        holder: String,
        account: AccountNumber,
    },
}

/// Identity given on `login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRequest {
    /// A standard session acting for the named account holder.
    Standard(String),
    Admin,
}

/// Pulls parameter lines off the console stream.
pub struct Params<'a, I: Iterator<Item = String>> {
    lines: &'a mut I,
}

impl<'a, I: Iterator<Item = String>> Params<'a, I> {
    pub fn new(lines: &'a mut I) -> Self {
        Params { lines }
    }

    /// Takes the next line, trimmed.
    fn next(&mut self, what: &'static str) -> Result<String, CommandError> {
        self.lines
            .next()
            .map(|line| line.trim().to_string())
            .ok_or(CommandError::MissingParameter(what))
    }

    /// Takes one line per field name, stopping at the first missing one.
    fn take(&mut self, fields: &'static [&'static str]) -> Result<Vec<String>, CommandError> {
        fields.iter().map(|what| self.next(what)).collect()
    }

    /// Reads the login parameters: session type, then the holder name for
    /// standard sessions.
    pub fn read_login(&mut self) -> Result<LoginRequest, CommandError> {
        let kind = self.next("session type")?;
        match kind.to_lowercase().as_str() {
            "standard" => {
                let holder = parse_name(&self.next("account holder name")?)?;
                Ok(LoginRequest::Standard(holder))
            }
            "admin" => Ok(LoginRequest::Admin),
            _ => Err(CommandError::InvalidSessionType(kind)),
        }
    }

    /// Reads and parses the parameters of a transaction command.
    pub fn read_request(
        &mut self,
        keyword: Keyword,
        admin: bool,
    ) -> Result<Request, CommandError> {
        let raw = self.take(keyword.fields(admin))?;
        let mut values = raw.iter().map(String::as_str);
        let mut next = || values.next().unwrap_or_default();

        let named = if admin && keyword.moves_money() {
            Some(parse_name(next())?)
        } else {
            None
        };

        let request = match keyword {
            Keyword::Withdrawal | Keyword::Deposit => {
                let account = AccountNumber::from_str(next())?;
                let amount = parse_amount(next(), false)?;
                if keyword == Keyword::Withdrawal {
                    Request::Withdrawal {
                        named,
                        account,
                        amount,
                    }
                } else {
                    Request::Deposit {
                        named,
                        account,
                        amount,
                    }
                }
            }
            Keyword::Transfer => {
                let from = AccountNumber::from_str(next())?;
                let to = AccountNumber::from_str(next())?;
                let amount = parse_amount(next(), false)?;
                if from == to {
                    return Err(CommandError::SameAccount(from));
                }
                Request::Transfer {
                    named,
                    from,
                    to,
                    amount,
                }
            }
            Keyword::Paybill => {
                let account = AccountNumber::from_str(next())?;
                let company = next().to_uppercase();
                let amount = parse_amount(next(), false)?;
                Request::Paybill {
                    named,
                    account,
                    company,
                    amount,
                }
            }
            Keyword::Create => {
                let holder = parse_new_holder(next())?;
                let initial = parse_amount(next(), true)?;
                Request::Create { holder, initial }
            }
            Keyword::Delete | Keyword::Disable | Keyword::ChangePlan => {
                let holder = parse_name(next())?;
                let account = AccountNumber::from_str(next())?;
                match keyword {
                    Keyword::Delete => Request::Delete { holder, account },
                    Keyword::Disable => Request::Disable { holder, account },
                    _ => Request::ChangePlan { holder, account },
                }
            }
            Keyword::Login | Keyword::Logout => {
                return Err(CommandError::UnknownCommand(keyword.name().to_string()));
            }
        };

        Ok(request)
    }
}

/// Validates an account holder name: 1 to 20 printable ASCII characters.
pub fn parse_name(value: &str) -> Result<String, CommandError> {
    let name = value.trim();
    let printable = name.chars().all(|c| c.is_ascii_graphic() || c == ' ');
    if name.is_empty() || name.len() > NAME_WIDTH || !printable {
        return Err(CommandError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Validates the holder name of a new account.
///
/// The ATF record is the only place a created account's holder is written,
/// so the name must fit its 14-character field.
pub fn parse_new_holder(value: &str) -> Result<String, CommandError> {
    let name = parse_name(value)?;
    if name.len() > HOLDER_WIDTH {
        return Err(CommandError::InvalidName(name));
    }
    Ok(name)
}

/// Parses an amount. Money movement needs a positive amount; a create's
/// initial balance may be zero. Both are capped at the field maximum.
pub fn parse_amount(value: &str, allow_zero: bool) -> Result<Money, CommandError> {
    let amount =
        Money::from_str(value).map_err(|e| CommandError::InvalidAmount(e.to_string()))?;

    if amount.is_negative() || (!allow_zero && amount.is_zero()) {
        return Err(CommandError::InvalidAmount(format!(
            "'{}' must be greater than zero",
            value.trim()
        )));
    }
    if !amount.fits_field() {
        return Err(CommandError::InvalidAmount(format!(
            "'{}' exceeds the maximum of {}",
            value.trim(),
            Money::max()
        )));
    }
    Ok(amount)
}
