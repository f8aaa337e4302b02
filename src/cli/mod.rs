//! Command-line front end.

pub mod logging;

use crate::analysis::missingness::{correlation_matrix, describe_missingness, missing_counts};
use crate::analysis::stats::{ColumnKind, ColumnRequest, StatisticsReport};
use crate::compute::PrecomputedPdag;
use crate::config::NetworkConfig;
use crate::data::{load_waves, Dataset};
use crate::display::report;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ccg", version, about = "Cohort causal-network and descriptive statistics toolkit")]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Merge the waves, refine the learned CPDAG and save the edge list
    Network {
        /// JSON run configuration
        #[arg(long)]
        config: PathBuf,
        /// Print the refinement audit to stdout
        #[arg(long)]
        audit: bool,
    },

    /// Descriptive statistics for selected columns
    Stats {
        /// CSV file with a header row
        #[arg(long)]
        data: PathBuf,
        /// Column to summarise as NAME or NAME:continuous / NAME:categorical
        #[arg(short, long = "column", value_parser = parse_column_request, required = true)]
        columns: Vec<ColumnRequest>,
        /// Codes treated as missing, e.g. --sentinels=-1,-3
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        sentinels: Vec<f64>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Missing-value overview
    Missing {
        #[arg(long)]
        data: PathBuf,
        /// Also print summary statistics of incomplete columns
        #[arg(long)]
        describe: bool,
    },

    /// Pearson correlation matrix of selected columns
    Correlate {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },
}

fn parse_column_request(raw: &str) -> Result<ColumnRequest, String> {
    let (name, kind) = match raw.rsplit_once(':') {
        Some((name, "continuous")) => (name, ColumnKind::Continuous),
        Some((name, "categorical")) => (name, ColumnKind::Categorical),
        Some((_, other)) => return Err(format!("unknown column kind '{}'", other)),
        None => (raw, ColumnKind::Continuous),
    };
    if name.is_empty() {
        return Err("column name must not be empty".to_string());
    }
    Ok(ColumnRequest { column: name.to_string(), kind })
}

pub fn run_command(cli: Cli) -> Result<()> {
    logging::init_tracing(cli.quiet);

    match cli.command {
        Command::Network { config, audit } => {
            let cfg = NetworkConfig::load(&config)?;
            let drop: Vec<&str> = cfg.data.drop_columns.iter().map(String::as_str).collect();
            let data = load_waves(&cfg.data.baseline, &cfg.data.follow_up, &cfg.data.key, &drop)?;
            let job = cfg.job(data.columns())?;
            let outcome = job.run(&data, &PrecomputedPdag::new(&cfg.candidate_graph))?;
            if audit {
                print!("{}", report::format_refinement(&outcome.report));
                print!("{}", report::format_order(outcome.order.as_deref()));
            }
            println!("Network saved to {}", outcome.output.display());
        }
        Command::Stats { data, columns, sentinels, output } => {
            let ds = Dataset::from_csv_path(&data)?;
            let stats = StatisticsReport::generate(&ds, &columns, &sentinels)?;
            match output {
                Some(path) => report::write_statistics(&stats, &path)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{}", report::format_statistics(&stats)),
            }
        }
        Command::Missing { data, describe } => {
            let ds = Dataset::from_csv_path(&data)?;
            let counts = missing_counts(&ds);
            if counts.is_empty() {
                println!("No missing values.");
            }
            for (col, n) in &counts {
                println!("{}: {}", col, n);
            }
            if describe && !counts.is_empty() {
                print!("\n{}", report::format_describe(&describe_missingness(&ds)?));
            }
        }
        Command::Correlate { data, columns } => {
            let ds = Dataset::from_csv_path(&data)?;
            let names: Vec<&str> = columns.iter().map(String::as_str).collect();
            let m = correlation_matrix(&ds, &names)?;
            if m.columns.is_empty() {
                bail!("no columns selected");
            }
            print!("{:<16}", "");
            for c in &m.columns {
                print!(" {:>10}", c);
            }
            println!();
            for (c, row) in m.columns.iter().zip(&m.values) {
                print!("{:<16}", c);
                for v in row {
                    match v {
                        Some(r) => print!(" {:>10.2}", r),
                        None => print!(" {:>10}", "n/a"),
                    }
                }
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Age", "Age", ColumnKind::Continuous)]
    #[case("Sexe:categorical", "Sexe", ColumnKind::Categorical)]
    #[case("aIL6:continuous", "aIL6", ColumnKind::Continuous)]
    fn test_column_request_parsing(#[case] raw: &str, #[case] name: &str, #[case] kind: ColumnKind) {
        assert_eq!(parse_column_request(raw).unwrap(), ColumnRequest { column: name.to_string(), kind });
    }

    #[test]
    fn test_column_request_rejects_unknown_kind() {
        assert!(parse_column_request("Sexe:ordinal").is_err());
        assert!(parse_column_request(":categorical").is_err());
    }

    #[test]
    fn test_parse_stats_command() {
        let cli = Cli::try_parse_from([
            "ccg", "stats", "--data", "w1.csv", "-c", "aIRSsum9", "-c", "Sexe:categorical", "--sentinels=-1,-3",
        ])
        .unwrap();

        match cli.command {
            Command::Stats { columns, sentinels, output, .. } => {
                assert_eq!(columns.len(), 2);
                assert_eq!(columns[1].kind, ColumnKind::Categorical);
                assert_eq!(sentinels, vec![-1.0, -3.0]);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_stats_command_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("wave1.csv");
        let out = dir.path().join("stats.txt");
        std::fs::write(&data, "pident,aIRSsum9,Sexe\n1,-1,1\n2,3,2\n3,-3,2\n4,5,1\n5,7,2\n").unwrap();

        let (data, out_arg) = (data.to_str().unwrap(), out.to_str().unwrap());

        let cli = Cli::try_parse_from([
            "ccg", "--quiet", "stats", "--data", data, "-c", "aIRSsum9", "-c", "Sexe:categorical",
            "--sentinels=-1,-3", "--output", out_arg,
        ])
        .unwrap();
        run_command(cli).unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "aIRSsum9\n  N: 3\n  Mean: 5.00\n  StdDev: 2.00\n\nSexe\n  N: 5\n  2: 3 (0.60)\n  1: 2 (0.40)\n"
        );
    }

    #[test]
    fn test_stats_command_reports_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("wave1.csv");
        std::fs::write(&data, "pident,aIRSsum9\n1,3\n").unwrap();
        let out = dir.path().join("stats.txt");

        let cli = Cli {
            quiet: true,
            command: Command::Stats {
                data,
                columns: vec![ColumnRequest { column: "aedu".into(), kind: ColumnKind::Continuous }],
                sentinels: vec![],
                output: Some(out.clone()),
            },
        };

        let err = run_command(cli).unwrap_err();
        assert!(err.to_string().contains("aedu"), "Msg: {}", err);
        assert!(!out.exists());
    }
}
