//! Accepted transaction records and their 40-character ATF encoding.
//!
//! Record layout:
//!
//! ```text
//! CC NNNNNNNNNNNNNN SSSSS TTTTT MMMMMMMMXX
//! ```
//!
//! type code, holder name (14), source account, target account, amount
//! (`00000.00`) and a two character misc field. The misc field carries the
//! paybill company code or the new plan code for `changeplan`.

use crate::account::{AccountNumber, Plan};
use crate::money::Money;
use std::fmt;

/// Length of one ATF record, excluding the newline.
pub const RECORD_LEN: usize = 40;

/// Width of the holder name field in an ATF record.
pub const HOLDER_WIDTH: usize = 14;

/// Transaction type variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Withdrawal,
    Transfer,
    Paybill,
    Deposit,
    Create,
    Delete,
    Disable,
    ChangePlan,
}

impl TxKind {
    /// Two-digit ATF transaction code.
    pub fn code(&self) -> &'static str {
        match self {
            TxKind::Withdrawal => "01",
            TxKind::Transfer => "02",
            TxKind::Paybill => "03",
            TxKind::Deposit => "04",
            TxKind::Create => "05",
            TxKind::Delete => "06",
            TxKind::Disable => "07",
            TxKind::ChangePlan => "08",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Withdrawal => "Withdrawal",
            TxKind::Transfer => "Transfer",
            TxKind::Paybill => "Paybill",
            TxKind::Deposit => "Deposit",
            TxKind::Create => "Create",
            TxKind::Delete => "Delete",
            TxKind::Disable => "Disable",
            TxKind::ChangePlan => "Changeplan",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One accepted transaction.
///
/// Accounts are referenced by number only. Once appended to a ledger a
/// record is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Position within the session, starting at 0.
    pub seq: usize,
    pub kind: TxKind,
    pub holder: String,
    pub account: AccountNumber,
    pub target: Option<AccountNumber>,
    pub amount: Money,
    /// Paybill company code.
    pub company: Option<String>,
    /// New plan for `changeplan`.
    pub plan: Option<Plan>,
}

impl Transaction {
    /// Creates a record with no target, company or plan. `seq` is assigned
    /// by the ledger on append.
    pub fn new(kind: TxKind, holder: &str, account: AccountNumber, amount: Money) -> Self {
        Transaction {
            seq: 0,
            kind,
            holder: holder.to_string(),
            account,
            target: None,
            amount,
            company: None,
            plan: None,
        }
    }

    pub fn with_target(mut self, target: AccountNumber) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    fn misc(&self) -> &str {
        match (&self.company, self.plan) {
            (Some(company), _) => company.as_str(),
            (None, Some(plan)) => plan.code(),
            (None, None) => "",
        }
    }

    /// Encodes the record into its fixed 40-character form.
    pub fn encode(&self) -> String {
        let holder: String = self.holder.chars().take(HOLDER_WIDTH).collect();
        let misc: String = self.misc().chars().take(2).collect();
        let target = self.target.unwrap_or(AccountNumber::UNASSIGNED);

        let record = format!(
            "{} {:<hw$} {} {} {}{:<2}",
            self.kind.code(),
            holder,
            self.account,
            target,
            self.amount.to_field(),
            misc,
            hw = HOLDER_WIDTH,
        );
        debug_assert_eq!(record.len(), RECORD_LEN, "malformed ATF record {:?}", record);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn number(s: &str) -> AccountNumber {
        AccountNumber::from_str(s).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_encode_withdrawal() {
        let tx = Transaction::new(TxKind::Withdrawal, "John Doe", number("101"), money("500"));
        let record = tx.encode();

        assert_eq!(record, "01 John Doe       00101 00000 00500.00  ");
        assert_eq!(record.len(), RECORD_LEN);
    }

    #[test]
    fn test_encode_transfer_carries_target() {
        let tx = Transaction::new(TxKind::Transfer, "John Doe", number("101"), money("75.5"))
            .with_target(number("202"));

        assert_eq!(tx.encode(), "02 John Doe       00101 00202 00075.50  ");
    }

    #[test]
    fn test_encode_paybill_company() {
        let tx = Transaction::new(TxKind::Paybill, "Jane", number("202"), money("2000"))
            .with_company("EC");

        assert_eq!(tx.encode(), "03 Jane           00202 00000 02000.00EC");
    }

    #[test]
    fn test_encode_changeplan_new_plan() {
        let tx = Transaction::new(TxKind::ChangePlan, "Jane", number("202"), Money::ZERO)
            .with_plan(Plan::Admin);

        assert_eq!(tx.encode(), "08 Jane           00202 00000 00000.00AD");
    }

    #[test]
    fn test_encode_truncates_long_names() {
        let tx = Transaction::new(
            TxKind::Create,
            "Bartholomew Montgomery",
            AccountNumber::UNASSIGNED,
            money("99999.99"),
        );
        let record = tx.encode();

        assert_eq!(record, "05 Bartholomew Mo 00000 00000 99999.99  ");
        assert_eq!(record.len(), RECORD_LEN);
    }

    #[test]
    fn test_every_kind_encodes_to_fixed_length() {
        let kinds = [
            TxKind::Withdrawal,
            TxKind::Transfer,
            TxKind::Paybill,
            TxKind::Deposit,
            TxKind::Create,
            TxKind::Delete,
            TxKind::Disable,
            TxKind::ChangePlan,
        ];
        for kind in kinds {
            let record = Transaction::new(kind, "", number("1"), Money::ZERO).encode();
            assert_eq!(record.len(), RECORD_LEN, "{:?}", kind);
            assert!(record.starts_with(kind.code()));
        }
    }
}
