//! Transaction rule checks.
//!
//! Every check is a pure function of the session, the account store and the
//! request. Nothing here mutates state: the engine applies a transaction only
//! after its validator returns `Ok`.
//!
//! Money movement is checked in this order: the account exists, it is
//! active, the holder matches, the amount is within the plan ceiling, the
//! available balance covers it, and for paybill the company is recognized.

use crate::account::{Account, AccountNumber, Plan};
use crate::error::CommandError;
use crate::money::Money;
use crate::session::Session;
use crate::store::AccountStore;
use crate::transaction::TxKind;

/// Bill payment companies accepted by `paybill`.
pub const COMPANY_CODES: [&str; 3] = ["EC", "CQ", "FI"];

/// Per-transaction ceiling for a session plan. `None` means unrestricted.
///
/// Ceilings are inclusive.
pub fn ceiling(actor: Plan, kind: TxKind) -> Option<Money> {
    match (actor, kind) {
        (Plan::Standard, TxKind::Withdrawal) => Some(Money::from_units(500)),
        (Plan::Standard, TxKind::Transfer) => Some(Money::from_units(1000)),
        (Plan::Standard, TxKind::Paybill) => Some(Money::from_units(2000)),
        _ => None,
    }
}

/// Balance usable for validation: same-session credits are excluded.
pub fn available(session: &Session, account: &Account) -> Money {
    account.balance - session.pending(account.number)
}

/// Looks up an account the session wants to act on and checks that it is
/// active and belongs to the right holder.
///
/// Standard sessions act for the logged-in holder; admin sessions name the
/// holder on each command.
pub fn check_account<'s>(
    session: &Session,
    store: &'s AccountStore,
    named: Option<&str>,
    number: AccountNumber,
) -> Result<&'s Account, CommandError> {
    let account = store.find(number)?;
    if !account.is_active() {
        return Err(CommandError::AccountDisabled(number));
    }
    check_holder(account, named.or(session.holder()))?;
    Ok(account)
}

fn check_holder(account: &Account, holder: Option<&str>) -> Result<(), CommandError> {
    match holder {
        Some(name) if name == account.holder => Ok(()),
        Some(name) => Err(CommandError::HolderMismatch(account.number, name.to_string())),
        None => Err(CommandError::HolderMismatch(account.number, String::new())),
    }
}

pub fn check_ceiling(actor: Plan, kind: TxKind, amount: Money) -> Result<(), CommandError> {
    match ceiling(actor, kind) {
        Some(limit) if amount > limit => Err(CommandError::CeilingExceeded {
            kind: kind.label(),
            amount,
            ceiling: limit,
        }),
        _ => Ok(()),
    }
}

pub fn check_available(
    session: &Session,
    account: &Account,
    amount: Money,
) -> Result<(), CommandError> {
    let available = available(session, account);
    if amount > available {
        return Err(CommandError::InsufficientFunds {
            account: account.number,
            available,
        });
    }
    Ok(())
}

/// Rejects a credit that would push the balance past the field maximum.
pub fn check_credit(account: &Account, amount: Money) -> Result<(), CommandError> {
    if !(account.balance + amount).fits_field() {
        return Err(CommandError::BalanceOverflow(account.number));
    }
    Ok(())
}

pub fn check_company(company: &str) -> Result<(), CommandError> {
    if COMPANY_CODES.contains(&company) {
        Ok(())
    } else {
        Err(CommandError::InvalidCompanyCode(company.to_string()))
    }
}

/// Validates a withdrawal and returns the account holder to record.
pub fn withdrawal(
    session: &Session,
    store: &AccountStore,
    named: Option<&str>,
    number: AccountNumber,
    amount: Money,
) -> Result<String, CommandError> {
    let account = check_account(session, store, named, number)?;
    check_ceiling(session.actor(), TxKind::Withdrawal, amount)?;
    check_available(session, account, amount)?;
    Ok(account.holder.clone())
}

/// Validates a deposit. Deposits have no plan ceiling.
pub fn deposit(
    session: &Session,
    store: &AccountStore,
    named: Option<&str>,
    number: AccountNumber,
    amount: Money,
) -> Result<String, CommandError> {
    let account = check_account(session, store, named, number)?;
    check_credit(account, amount)?;
    Ok(account.holder.clone())
}

/// Validates both legs of a transfer before either balance can change.
///
/// The destination may belong to anyone but must exist and be active.
pub fn transfer(
    session: &Session,
    store: &AccountStore,
    named: Option<&str>,
    from: AccountNumber,
    to: AccountNumber,
    amount: Money,
) -> Result<String, CommandError> {
    if from == to {
        return Err(CommandError::SameAccount(from));
    }
    let source = check_account(session, store, named, from)?;
    let destination = store.find(to)?;
    if !destination.is_active() {
        return Err(CommandError::AccountDisabled(to));
    }
    check_ceiling(session.actor(), TxKind::Transfer, amount)?;
    check_available(session, source, amount)?;
    check_credit(destination, amount)?;
    Ok(source.holder.clone())
}

pub fn paybill(
    session: &Session,
    store: &AccountStore,
    named: Option<&str>,
    number: AccountNumber,
    company: &str,
    amount: Money,
) -> Result<String, CommandError> {
    let account = check_account(session, store, named, number)?;
    check_ceiling(session.actor(), TxKind::Paybill, amount)?;
    check_available(session, account, amount)?;
    check_company(company)?;
    Ok(account.holder.clone())
}

/// Validates a delete. Disabled accounts may still be deleted.
pub fn delete(
    store: &AccountStore,
    holder: &str,
    number: AccountNumber,
) -> Result<(), CommandError> {
    let account = store.find(number)?;
    check_holder(account, Some(holder))
}

/// Validates a disable or changeplan: the account must still be active.
pub fn administer(
    store: &AccountStore,
    holder: &str,
    number: AccountNumber,
) -> Result<(), CommandError> {
    let account = store.find(number)?;
    if !account.is_active() {
        return Err(CommandError::AccountDisabled(number));
    }
    check_holder(account, Some(holder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;
    use std::str::FromStr;

    const ACCOUNTS: &str = "\
00101 John Doe             A 01000.00 ST
00202 Jane Smith           A 00750.00 ST
00303 John Doe             D 00300.00 ST
00404 Rich Person          A 99999.00 ST
";

    fn store() -> AccountStore {
        AccountStore::from_reader(Cursor::new(ACCOUNTS)).unwrap()
    }

    fn number(s: &str) -> AccountNumber {
        AccountNumber::from_str(s).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_standard_withdrawal_ceiling_is_inclusive() {
        let store = store();
        let session = Session::standard("John Doe");

        assert!(withdrawal(&session, &store, None, number("101"), money("500")).is_ok());

        let err = withdrawal(&session, &store, None, number("101"), money("500.01")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert!(matches!(err, CommandError::CeilingExceeded { .. }));
    }

    #[test]
    fn test_admin_has_no_ceiling() {
        let store = store();
        let session = Session::admin();

        let named = Some("John Doe");
        assert!(withdrawal(&session, &store, named, number("101"), money("1000")).is_ok());
        assert_eq!(ceiling(Plan::Admin, TxKind::Paybill), None);
    }

    #[test]
    fn test_ceilings_by_kind() {
        assert_eq!(ceiling(Plan::Standard, TxKind::Transfer), Some(money("1000")));
        assert_eq!(ceiling(Plan::Standard, TxKind::Paybill), Some(money("2000")));
        assert_eq!(ceiling(Plan::Standard, TxKind::Deposit), None);
    }

    #[test]
    fn test_pending_deposits_are_not_available() {
        let store = store();
        let mut session = Session::admin();
        session.hold(number("202"), money("700"));

        let account = store.find(number("202")).unwrap();
        assert_eq!(available(&session, account), money("50"));

        let err = withdrawal(&session, &store, Some("Jane Smith"), number("202"), money("51"))
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientFunds {
                account: number("202"),
                available: money("50"),
            }
        );
    }

    #[test]
    fn test_standard_session_cannot_touch_other_holders() {
        let store = store();
        let session = Session::standard("John Doe");

        let err = deposit(&session, &store, None, number("202"), money("5")).unwrap_err();
        assert_eq!(
            err,
            CommandError::HolderMismatch(number("202"), "John Doe".to_string())
        );
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_admin_named_holder_must_match() {
        let store = store();
        let session = Session::admin();

        assert!(deposit(&session, &store, Some("Jane Smith"), number("202"), money("5")).is_ok());
        assert!(deposit(&session, &store, Some("John Doe"), number("202"), money("5")).is_err());
    }

    #[test]
    fn test_missing_and_disabled_accounts() {
        let store = store();
        let session = Session::admin();

        assert_eq!(
            withdrawal(&session, &store, Some("X"), number("999"), money("1")).unwrap_err(),
            CommandError::AccountNotFound(number("999"))
        );
        assert_eq!(
            deposit(&session, &store, Some("John Doe"), number("303"), money("1")).unwrap_err(),
            CommandError::AccountDisabled(number("303"))
        );
    }

    #[test]
    fn test_transfer_checks_destination() {
        let store = store();
        let session = Session::standard("John Doe");

        assert_eq!(
            transfer(&session, &store, None, number("101"), number("303"), money("1")).unwrap_err(),
            CommandError::AccountDisabled(number("303"))
        );
        assert_eq!(
            transfer(&session, &store, None, number("101"), number("404"), money("999.01"))
                .unwrap_err(),
            CommandError::BalanceOverflow(number("404"))
        );
        let (from, to) = (number("101"), number("202"));
        assert!(transfer(&session, &store, None, from, to, money("1000")).is_ok());
        assert!(transfer(&session, &store, None, from, to, money("1000.01")).is_err());
    }

    #[test]
    fn test_paybill_company_codes() {
        let store = store();
        let session = Session::standard("John Doe");

        for code in COMPANY_CODES {
            assert!(paybill(&session, &store, None, number("101"), code, money("10")).is_ok());
        }
        let err = paybill(&session, &store, None, number("101"), "XX", money("10")).unwrap_err();
        assert_eq!(err, CommandError::InvalidCompanyCode("XX".to_string()));
        assert_eq!(err.kind(), ErrorKind::InvalidCompanyCode);
    }

    #[test]
    fn test_deposit_overflow() {
        let store = store();
        let session = Session::admin();

        let named = Some("Rich Person");
        assert!(deposit(&session, &store, named, number("404"), money("0.99")).is_ok());
        assert_eq!(
            deposit(&session, &store, named, number("404"), money("1")).unwrap_err(),
            CommandError::BalanceOverflow(number("404"))
        );
    }

    #[test]
    fn test_admin_account_changes() {
        let store = store();

        assert!(delete(&store, "John Doe", number("303")).is_ok());
        assert_eq!(
            administer(&store, "John Doe", number("303")).unwrap_err(),
            CommandError::AccountDisabled(number("303"))
        );
        assert!(administer(&store, "Jane Smith", number("202")).is_ok());
        assert!(administer(&store, "John Doe", number("202")).is_err());
        assert!(delete(&store, "John Doe", number("999")).is_err());
    }
}
