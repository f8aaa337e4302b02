//! Tabular cohort data: parsing, merging and pure column transforms.
pub mod load;
pub mod table;

pub use load::{load_waves, DEFAULT_DROP_COLUMNS, SUBJECT_KEY};
pub use table::{Cell, Dataset};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Column(s) not found in dataset: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self { DataError::Csv(e.to_string()) }
}

// io::Error is not comparable; tests compare the structural variants only.
impl PartialEq for DataError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingColumns(a), Self::MissingColumns(b)) => a == b,
            (Self::DuplicateColumn(a), Self::DuplicateColumn(b)) => a == b,
            (
                Self::RaggedRow { row: r1, expected: e1, actual: a1 },
                Self::RaggedRow { row: r2, expected: e2, actual: a2 },
            ) => r1 == r2 && e1 == e2 && a1 == a2,
            (Self::Csv(a), Self::Csv(b)) => a == b,
            _ => false,
        }
    }
}
