//! Command processing engine.
//!
//! Reads the console stream one command at a time, gates each command
//! through the session state machine, validates it, applies accepted effects
//! to the account store and the session ledger, and answers on the console.
//! The ledger is flushed to the ATF on `logout` only.

use crate::account::AccountNumber;
use crate::command::{Keyword, LoginRequest, Params, Request};
use crate::error::{CommandError, Result};
use crate::ledger::AtfWriter;
use crate::money::Money;
use crate::session::{Session, SessionState};
use crate::store::AccountStore;
use crate::transaction::{Transaction, TxKind};
use crate::validator;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

/// Console answer to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Accepted(String),
    Rejected(CommandError),
}

impl From<std::result::Result<String, CommandError>> for Response {
    fn from(result: std::result::Result<String, CommandError>) -> Self {
        match result {
            Ok(message) => Response::Accepted(message),
            Err(e) => Response::Rejected(e),
        }
    }
}

/// The ATM front end.
///
/// Owns the account table for the run, the current session state and the
/// ATF writer. Commands are processed strictly in input order.
pub struct AtmEngine {
    store: AccountStore,
    /// Account table as of the last login. Restored if the session is
    /// abandoned, so only logged-out sessions change the run's state.
    checkpoint: Option<AccountStore>,
    state: SessionState,
    atf: AtfWriter,
}

impl AtmEngine {
    /// Creates an engine over a loaded account table, writing the ATF to
    /// `atf_path` at each logout.
    pub fn new<P: AsRef<Path>>(store: AccountStore, atf_path: P) -> Self {
        AtmEngine {
            store,
            checkpoint: None,
            state: SessionState::LoggedOut,
            atf: AtfWriter::new(atf_path),
        }
    }

    /// Processes the command stream from a reader until end of input.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and handled like
    /// any other line. A read error is logged and treated as end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, console: W) -> Result<()> {
        let mut lines = std::iter::from_fn(move || read_line(&mut input));
        self.process_lines(&mut lines, console)
    }

    /// Processes commands from an iterator of lines.
    ///
    /// Ending the input while logged in discards the session: its
    /// transactions are never written and its balance changes are rolled
    /// back.
    pub fn process_lines<I, W>(&mut self, lines: &mut I, mut console: W) -> Result<()>
    where
        I: Iterator<Item = String>,
        W: Write,
    {
        let mut command_no = 0;

        while let Some(line) = lines.next() {
            let keyword = line.trim();
            if keyword.is_empty() {
                continue;
            }
            command_no += 1;

            match self.handle(keyword, lines)? {
                Response::Accepted(message) => writeln!(console, "{}", message)?,
                Response::Rejected(e) => {
                    warn!("Command {} ({}): rejected: {}", command_no, keyword, e);
                    writeln!(console, "ERROR: {}", e)?;
                }
            }
        }

        if let SessionState::LoggedIn(session) = std::mem::take(&mut self.state) {
            warn!(
                "End of input while logged in, discarding {} unwritten transaction(s)",
                session.ledger().len()
            );
            if let Some(committed) = self.checkpoint.take() {
                self.store = committed;
            }
        }

        console.flush()?;
        Ok(())
    }

    /// Handles one command keyword, reading its parameters from `lines`.
    ///
    /// Only ATF write failures are fatal; every other problem becomes a
    /// rejected response.
    pub fn handle<I: Iterator<Item = String>>(
        &mut self,
        keyword: &str,
        lines: &mut I,
    ) -> Result<Response> {
        let keyword = match Keyword::from_str(keyword) {
            Ok(keyword) => keyword,
            Err(e) => return Ok(Response::Rejected(e)),
        };

        match keyword {
            Keyword::Login => Ok(self.login(lines).into()),
            Keyword::Logout => self.logout(),
            Keyword::Withdrawal
            | Keyword::Deposit
            | Keyword::Transfer
            | Keyword::Paybill
            | Keyword::Create
            | Keyword::Delete
            | Keyword::Disable
            | Keyword::ChangePlan => Ok(self.transact(keyword, lines).into()),
        }
    }

    fn login<I: Iterator<Item = String>>(
        &mut self,
        lines: &mut I,
    ) -> std::result::Result<String, CommandError> {
        self.state.ensure_logged_out()?;

        let session = match Params::new(lines).read_login()? {
            LoginRequest::Standard(holder) => Session::standard(&holder),
            LoginRequest::Admin => Session::admin(),
        };
        let actor = session.actor();
        match session.holder() {
            Some(holder) => info!("Login: {} session for {}", actor, holder),
            None => info!("Login: {} session", actor),
        }

        self.state.login(session)?;
        self.checkpoint = Some(self.store.clone());
        Ok(format!("Login successful ({} session).", actor))
    }

    fn logout(&mut self) -> Result<Response> {
        let session = match self.state.logout() {
            Ok(session) => session,
            Err(e) => return Ok(Response::Rejected(e)),
        };

        let written = self.atf.flush(session.ledger())?;
        self.checkpoint = None;
        info!("Logout: {} session ended", session.actor());

        Ok(Response::Accepted(format!(
            "Logout successful. {} transaction(s) recorded.",
            written
        )))
    }

    fn transact<I: Iterator<Item = String>>(
        &mut self,
        keyword: Keyword,
        lines: &mut I,
    ) -> std::result::Result<String, CommandError> {
        let session = self.state.authorize(keyword)?;
        let request = Params::new(lines).read_request(keyword, session.is_admin())?;
        apply(session, &mut self.store, request)
    }

    /// The account table as mutated so far in the run.
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn atf_path(&self) -> &Path {
        self.atf.path()
    }
}

/// Reads one line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = Vec::new();
    match input.read_until(b'\n', &mut buf) {
        Ok(0) => None,
        Ok(_) => {
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                warn!("Input line is not valid UTF-8: {:?}", line);
            }
            Some(line.into_owned())
        }
        Err(e) => {
            warn!("Input read error, treating as end of input: {}", e);
            None
        }
    }
}

/// Validates a request and, if accepted, applies it and records it.
fn apply(
    session: &mut Session,
    store: &mut AccountStore,
    request: Request,
) -> std::result::Result<String, CommandError> {
    match request {
        Request::Withdrawal {
            named,
            account,
            amount,
        } => {
            let holder = validator::withdrawal(session, store, named.as_deref(), account, amount)?;
            let balance = debit(store, account, amount)?;
            record(session, Transaction::new(TxKind::Withdrawal, &holder, account, amount));
            Ok(format!(
                "Withdrawal accepted. Account {} balance: {}",
                account, balance
            ))
        }
        Request::Deposit {
            named,
            account,
            amount,
        } => {
            let holder = validator::deposit(session, store, named.as_deref(), account, amount)?;
            let balance = credit(store, account, amount)?;
            session.hold(account, amount);
            record(session, Transaction::new(TxKind::Deposit, &holder, account, amount));
            Ok(format!(
                "Deposit accepted. Account {} balance: {} (available next session)",
                account, balance
            ))
        }
        Request::Transfer {
            named,
            from,
            to,
            amount,
        } => {
            let holder =
                validator::transfer(session, store, named.as_deref(), from, to, amount)?;
            let balance = debit(store, from, amount)?;
            credit(store, to, amount)?;
            session.hold(to, amount);
            record(
                session,
                Transaction::new(TxKind::Transfer, &holder, from, amount).with_target(to),
            );
            Ok(format!(
                "Transfer to {} accepted. Account {} balance: {}",
                to, from, balance
            ))
        }
        Request::Paybill {
            named,
            account,
            company,
            amount,
        } => {
            let holder =
                validator::paybill(session, store, named.as_deref(), account, &company, amount)?;
            let balance = debit(store, account, amount)?;
            record(
                session,
                Transaction::new(TxKind::Paybill, &holder, account, amount).with_company(&company),
            );
            Ok(format!(
                "Paybill to {} accepted. Account {} balance: {}",
                company, account, balance
            ))
        }
        Request::Create { holder, initial } => {
            // The account number is assigned downstream, so nothing enters
            // the store yet.
            record(
                session,
                Transaction::new(TxKind::Create, &holder, AccountNumber::UNASSIGNED, initial),
            );
            Ok(format!(
                "Create accepted for {} with initial balance {}.",
                holder, initial
            ))
        }
        Request::Delete { holder, account } => {
            validator::delete(store, &holder, account)?;
            store.remove(account);
            session.forget(account);
            record(
                session,
                Transaction::new(TxKind::Delete, &holder, account, Money::ZERO),
            );
            Ok(format!("Account {} deleted.", account))
        }
        Request::Disable { holder, account } => {
            validator::administer(store, &holder, account)?;
            store.find_mut(account)?.disable();
            record(
                session,
                Transaction::new(TxKind::Disable, &holder, account, Money::ZERO),
            );
            Ok(format!("Account {} disabled.", account))
        }
        Request::ChangePlan { holder, account } => {
            validator::administer(store, &holder, account)?;
            let plan = store.find_mut(account)?.change_plan();
            record(
                session,
                Transaction::new(TxKind::ChangePlan, &holder, account, Money::ZERO)
                    .with_plan(plan),
            );
            Ok(format!("Account {} plan changed to {}.", account, plan))
        }
    }
}

fn debit(
    store: &mut AccountStore,
    number: AccountNumber,
    amount: Money,
) -> std::result::Result<Money, CommandError> {
    let account = store.find_mut(number)?;
    account.debit(amount);
    Ok(account.balance)
}

fn credit(
    store: &mut AccountStore,
    number: AccountNumber,
    amount: Money,
) -> std::result::Result<Money, CommandError> {
    let account = store.find_mut(number)?;
    account.credit(amount);
    Ok(account.balance)
}

fn record(session: &mut Session, tx: Transaction) {
    let tx = session.ledger_mut().append(tx);
    debug!(
        "Recorded #{} {} for account {}: {}",
        tx.seq, tx.kind, tx.account, tx.amount
    );
}
