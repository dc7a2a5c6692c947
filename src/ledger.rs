//! Per-session transaction ledger and the ATF file writer.

use crate::transaction::Transaction;
use log::info;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Accepted transactions of the active session, in arrival order.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            records: Vec::new(),
        }
    }

    /// Appends a transaction, stamping its position in the session.
    pub fn append(&mut self, mut tx: Transaction) -> &Transaction {
        tx.seq = self.records.len();
        self.records.push(tx);
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.records.iter()
    }

    /// Encodes every record, one per line, in session order.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.records.len() * 41);
        for tx in &self.records {
            out.push_str(&tx.encode());
            out.push('\n');
        }
        out
    }
}

/// Writes session ledgers to the ATF output file.
///
/// The first flush of a run creates or truncates the file; later flushes
/// append. Each flush is a single write of fully encoded records.
#[derive(Debug)]
pub struct AtfWriter {
    path: PathBuf,
    started: bool,
}

impl AtfWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        AtfWriter {
            path: path.as_ref().to_path_buf(),
            started: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes a finished session's ledger and returns the record count.
    pub fn flush(&mut self, ledger: &Ledger) -> std::io::Result<usize> {
        let encoded = ledger.encode();

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.started)
            .truncate(!self.started)
            .open(&self.path)?;
        file.write_all(encoded.as_bytes())?;
        file.flush()?;
        self.started = true;

        info!(
            "Wrote {} transaction record(s) to {}",
            ledger.len(),
            self.path.display()
        );
        Ok(ledger.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountNumber;
    use crate::money::Money;
    use crate::transaction::{TxKind, RECORD_LEN};
    use std::fs;

    fn withdrawal(account: u32, units: i64) -> Transaction {
        Transaction::new(
            TxKind::Withdrawal,
            "John Doe",
            AccountNumber::new(account).unwrap(),
            Money::from_units(units),
        )
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut ledger = Ledger::new();
        ledger.append(withdrawal(101, 20));
        let second = ledger.append(withdrawal(101, 40));

        assert_eq!(second.seq, 1);
        assert_eq!(ledger.len(), 2);
        let amounts: Vec<_> = ledger.iter().map(|t| t.amount.to_string()).collect();
        assert_eq!(amounts, vec!["20.00", "40.00"]);
    }

    #[test]
    fn test_encode_one_line_per_record() {
        let mut ledger = Ledger::new();
        for units in [1, 2, 3] {
            ledger.append(withdrawal(101, units));
        }

        let encoded = ledger.encode();
        let lines: Vec<_> = encoded.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == RECORD_LEN));
    }

    #[test]
    fn test_writer_truncates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.atf");
        fs::write(&path, "stale contents from an earlier run\n").unwrap();

        let mut writer = AtfWriter::new(&path);

        let mut first = Ledger::new();
        first.append(withdrawal(101, 10));
        assert_eq!(writer.flush(&first).unwrap(), 1);

        let mut second = Ledger::new();
        second.append(withdrawal(202, 20));
        second.append(withdrawal(202, 30));
        assert_eq!(writer.flush(&second).unwrap(), 2);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("00101"));
        assert!(lines[2].contains("00030.00"));
    }

    #[test]
    fn test_empty_session_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.atf");

        let mut writer = AtfWriter::new(&path);
        assert_eq!(writer.flush(&Ledger::new()).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
