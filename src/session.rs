//! Session state machine.
//!
//! `LoggedOut` is the initial and terminal state. `login` moves to
//! `LoggedIn` and `logout` hands the finished [`Session`] back so its ledger
//! can be flushed. Dropping a logged-in state (end of input) discards the
//! session's transactions without writing them.

use crate::account::{AccountNumber, Plan};
use crate::command::Keyword;
use crate::error::CommandError;
use crate::ledger::Ledger;
use crate::money::Money;
use std::collections::HashMap;

/// The authenticated identity and the in-memory effects of one session.
#[derive(Debug)]
pub struct Session {
    actor: Plan,
    holder: Option<String>,
    /// Credits received this session that may not be spent until the next.
    pending: HashMap<AccountNumber, Money>,
    ledger: Ledger,
}

impl Session {
    /// A standard session acting for the named account holder.
    pub fn standard(holder: &str) -> Self {
        Session {
            actor: Plan::Standard,
            holder: Some(holder.to_string()),
            pending: HashMap::new(),
            ledger: Ledger::new(),
        }
    }

    /// An admin session. Admins name the holder on every command.
    pub fn admin() -> Self {
        Session {
            actor: Plan::Admin,
            holder: None,
            pending: HashMap::new(),
            ledger: Ledger::new(),
        }
    }

    pub fn actor(&self) -> Plan {
        self.actor
    }

    pub fn is_admin(&self) -> bool {
        self.actor == Plan::Admin
    }

    /// Logged-in holder name for standard sessions.
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    /// Same-session credits held back from the available balance.
    pub fn pending(&self, account: AccountNumber) -> Money {
        self.pending.get(&account).copied().unwrap_or(Money::ZERO)
    }

    /// Records a credit that becomes spendable in the next session.
    pub fn hold(&mut self, account: AccountNumber, amount: Money) {
        *self.pending.entry(account).or_insert(Money::ZERO) += amount;
    }

    /// Forgets holds on an account that no longer exists.
    pub fn forget(&mut self, account: AccountNumber) {
        self.pending.remove(&account);
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }
}

/// Login state of the front end. Exactly one session may be active.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    /// Rejects `login` while a session is already active.
    pub fn ensure_logged_out(&self) -> Result<(), CommandError> {
        match self {
            SessionState::LoggedOut => Ok(()),
            SessionState::LoggedIn(_) => Err(CommandError::AlreadyLoggedIn),
        }
    }

    /// Starts a session.
    pub fn login(&mut self, session: Session) -> Result<(), CommandError> {
        self.ensure_logged_out()?;
        *self = SessionState::LoggedIn(session);
        Ok(())
    }

    /// Ends the active session and returns it for flushing.
    pub fn logout(&mut self) -> Result<Session, CommandError> {
        match std::mem::take(self) {
            SessionState::LoggedIn(session) => Ok(session),
            SessionState::LoggedOut => Err(CommandError::NotLoggedIn),
        }
    }

    /// Gatekeeper for transaction commands.
    ///
    /// Fails when nobody is logged in, or when a standard session invokes an
    /// admin-only command. Runs before any parameter is read.
    pub fn authorize(&mut self, keyword: Keyword) -> Result<&mut Session, CommandError> {
        match self {
            SessionState::LoggedOut => Err(CommandError::NotLoggedIn),
            SessionState::LoggedIn(session) => {
                if keyword.is_admin_only() && !session.is_admin() {
                    return Err(CommandError::AdminOnly(keyword.name()));
                }
                Ok(session)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transactions_require_login() {
        let mut state = SessionState::default();

        assert_eq!(
            state.authorize(Keyword::Withdrawal).unwrap_err(),
            CommandError::NotLoggedIn
        );
        assert_eq!(state.logout().unwrap_err(), CommandError::NotLoggedIn);
        assert!(!state.is_logged_in());
    }

    #[test]
    fn test_second_login_rejected_and_session_kept() {
        let mut state = SessionState::default();
        state.login(Session::standard("John Doe")).unwrap();

        assert_eq!(
            state.login(Session::admin()).unwrap_err(),
            CommandError::AlreadyLoggedIn
        );

        let session = state.authorize(Keyword::Deposit).unwrap();
        assert!(!session.is_admin());
        assert_eq!(session.holder(), Some("John Doe"));
    }

    #[test]
    fn test_admin_only_commands() {
        let mut state = SessionState::default();
        state.login(Session::standard("John Doe")).unwrap();

        for keyword in [
            Keyword::Create,
            Keyword::Delete,
            Keyword::Disable,
            Keyword::ChangePlan,
        ] {
            assert_eq!(
                state.authorize(keyword).unwrap_err(),
                CommandError::AdminOnly(keyword.name())
            );
        }

        state.logout().unwrap();
        state.login(Session::admin()).unwrap();
        assert!(state.authorize(Keyword::Disable).is_ok());
    }

    #[test]
    fn test_logout_returns_to_logged_out() {
        let mut state = SessionState::default();
        state.login(Session::admin()).unwrap();

        let session = state.logout().unwrap();
        assert!(session.is_admin());
        assert!(!state.is_logged_in());
        assert!(state.login(Session::standard("Jane")).is_ok());
    }

    #[test]
    fn test_pending_holds_accumulate() {
        let account = AccountNumber::new(101).unwrap();
        let mut session = Session::standard("John Doe");

        assert_eq!(session.pending(account), Money::ZERO);
        session.hold(account, Money::from_units(100));
        session.hold(account, Money::from_units(50));
        assert_eq!(session.pending(account), Money::from_units(150));

        session.forget(account);
        assert_eq!(session.pending(account), Money::ZERO);
    }
}
