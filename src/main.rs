//! `ccg` — cohort causal-network toolkit.
//!
//! # Usage
//!
//! ```bash
//! # Build the refined causal network from a run config
//! ccg network --config run.json --audit
//!
//! # Descriptive statistics with -1/-3 treated as missing
//! ccg stats --data wave1.csv -c aIRSsum9 -c Sexe:categorical --sentinels=-1,-3
//!
//! # Missing-value overview
//! ccg missing --data wave1.csv --describe
//! ```

use ccg_network_core::cli::{run_command, Cli};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
