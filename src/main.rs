//! ATM Front End CLI
//!
//! Reads commands from standard input, answers on standard output and
//! writes the transaction file at each logout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.txt session.atf < commands.txt > console.txt
//! cargo run -- accounts.txt session.atf final_accounts.csv < commands.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info` or `debug` to control logging verbosity

use atm_frontend::{AccountStore, AtmEngine, EngineError, Result};
use log::info;
use std::env;
use std::fs::File;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(EngineError::MissingArgument);
    }

    let accounts_path = &args[1];
    let atf_path = &args[2];
    let snapshot_path = args.get(3);

    let store = AccountStore::load(accounts_path)?;
    let mut engine = AtmEngine::new(store, atf_path);

    let stdin = io::stdin();
    let stdout = io::stdout();
    engine.run(stdin.lock(), stdout.lock())?;

    if let Some(path) = snapshot_path {
        let file = File::create(path)?;
        engine.store().write_snapshot(file)?;
        info!("Wrote account snapshot to {}", path);
    }

    Ok(())
}
