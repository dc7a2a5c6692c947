//! In-memory account table loaded once from the accounts file.

use crate::account::{Account, AccountNumber, Plan};
use crate::error::{CommandError, EngineError, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Accounts indexed by account number.
///
/// Owned by the engine for the whole run. Balances mutated during a session
/// stay in place after logout and become the starting point of the next one.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: HashMap<AccountNumber, Account>,
}

impl AccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        AccountStore {
            accounts: HashMap::new(),
        }
    }

    /// Loads the accounts file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} accounts from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    /// Parses accounts file rows from any reader.
    ///
    /// Blank lines are skipped and the `END_OF_FILE` row stops the load. Any
    /// malformed row fails the whole load.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut store = AccountStore::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let row = line.trim_end_matches('\r');

            if row.trim().is_empty() {
                continue;
            }
            if Account::is_end_marker(row) {
                debug!("Line {}: end of accounts file", line_no);
                break;
            }

            let account = Account::parse_row(row).map_err(|message| EngineError::Format {
                line: line_no,
                message,
            })?;

            if store.accounts.contains_key(&account.number) {
                return Err(EngineError::Format {
                    line: line_no,
                    message: format!("duplicate account number {}", account.number),
                });
            }
            store.insert(account);
        }

        Ok(store)
    }

    /// Adds or replaces an account.
    pub fn insert(&mut self, account: Account) {
        self.accounts.insert(account.number, account);
    }

    /// Looks up an account.
    pub fn find(&self, number: AccountNumber) -> std::result::Result<&Account, CommandError> {
        self.accounts
            .get(&number)
            .ok_or(CommandError::AccountNotFound(number))
    }

    pub(crate) fn find_mut(
        &mut self,
        number: AccountNumber,
    ) -> std::result::Result<&mut Account, CommandError> {
        self.accounts
            .get_mut(&number)
            .ok_or(CommandError::AccountNotFound(number))
    }

    pub(crate) fn remove(&mut self, number: AccountNumber) -> Option<Account> {
        self.accounts.remove(&number)
    }

    /// Accounts on the given plan, sorted by account number.
    pub fn with_plan(&self, plan: Plan) -> Vec<&Account> {
        let mut matching: Vec<_> = self.accounts.values().filter(|a| a.plan == plan).collect();
        matching.sort_by_key(|a| a.number);
        matching
    }

    /// All accounts sorted by account number.
    pub fn sorted(&self) -> Vec<&Account> {
        let mut accounts: Vec<_> = self.accounts.values().collect();
        accounts.sort_by_key(|a| a.number);
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Writes the current account table as CSV.
    ///
    /// Output is sorted by account number for deterministic diffs.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for account in self.sorted() {
            csv_writer.serialize(account)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
