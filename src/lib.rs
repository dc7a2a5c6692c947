//! # ATM Front End
//!
//! A single-session ATM simulator. It loads a fixed-width accounts file,
//! reads login, transaction and logout commands line by line, enforces plan
//! ceilings and account rules, and writes accepted transactions to a
//! fixed-width transaction file (ATF) at each logout.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 2 decimal places via `rust_decimal`
//! - **Explicit session state**: one session object, no global state
//! - **Validate, then apply**: a rejected command mutates nothing
//! - **Fixed-width output**: every ATF record is exactly 40 characters
//!
//! ## Example
//!
//! ```no_run
//! use atm_frontend::{AccountStore, AtmEngine};
//! use std::io::Cursor;
//!
//! let store = AccountStore::load("accounts.txt").unwrap();
//! let mut engine = AtmEngine::new(store, "session.atf");
//! let commands = "login\nstandard\nJohn Doe\nwithdrawal\n00101\n20\nlogout\n";
//! engine.run(Cursor::new(commands), std::io::stdout()).unwrap();
//! ```

pub mod account;
pub mod command;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod session;
pub mod store;
pub mod transaction;
pub mod validator;

pub use account::{Account, AccountNumber, Plan, Status};
pub use command::{Keyword, LoginRequest, Request};
pub use engine::{AtmEngine, Response};
pub use error::{CommandError, EngineError, ErrorKind, Result};
pub use ledger::{AtfWriter, Ledger};
pub use money::Money;
pub use session::{Session, SessionState};
pub use store::AccountStore;
pub use transaction::{Transaction, TxKind, RECORD_LEN};
