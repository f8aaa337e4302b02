//! CSV ingestion of the study waves.

use super::table::{Cell, Dataset};
use super::DataError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Subject identifier shared by all waves.
pub const SUBJECT_KEY: &str = "pident";

/// Columns removed after merging: the identifier and the income item.
pub const DEFAULT_DROP_COLUMNS: &[&str] = &["pident", "eincom01"];

impl Dataset {
    /// Parses comma-separated data with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Dataset::new(columns, rows)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
        let data = Self::from_csv_reader(file)?;
        info!(path = %path.display(), rows = data.n_rows(), columns = data.n_cols(), "Loaded dataset");
        Ok(data)
    }
}

/// Loads the baseline and follow-up waves, merges them on `key` and drops `drop`.
pub fn load_waves(
    baseline: impl AsRef<Path>,
    follow_up: impl AsRef<Path>,
    key: &str,
    drop: &[&str],
) -> Result<Dataset, DataError> {
    let w1 = Dataset::from_csv_path(baseline)?;
    let w5 = Dataset::from_csv_path(follow_up)?;
    let merged = w1.inner_join(&w5, key)?;
    info!(rows = merged.n_rows(), baseline_rows = w1.n_rows(), follow_up_rows = w5.n_rows(), "Merged waves");
    merged.drop_columns(drop)
}
