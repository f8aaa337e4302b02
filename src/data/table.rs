//! An immutable, row-oriented table of cohort measurements.
//!
//! Every transformation returns a new `Dataset`; the receiver is never modified, so
//! the same table can be handed to several analyses without aliasing surprises.

use super::DataError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Spellings treated as a missing value when parsing.
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if MISSING_TOKENS.contains(&raw) {
            return Cell::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Missing,
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool { matches!(self, Cell::Missing) }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Key used for joins and category labels.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Number(v) => Some(format_number(*v)),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(v) => f.write_str(&format_number(*v)),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Integral values print without a fractional part (`1` rather than `1.0`).
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(DataError::DuplicateColumn(c.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataError::RaggedRow { row: i, expected: columns.len(), actual: row.len() });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }
    pub fn n_rows(&self) -> usize { self.rows.len() }
    pub fn n_cols(&self) -> usize { self.columns.len() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>, DataError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| DataError::MissingColumns(vec![name.to_string()]))?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Present numeric values of one column.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, DataError> {
        Ok(self.column(name)?.into_iter().filter_map(Cell::as_f64).collect())
    }

    fn require(&self, names: &[&str]) -> Result<Vec<usize>, DataError> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for &name in names {
            match self.column_index(name) {
                Some(i) => found.push(i),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() { Ok(found) } else { Err(DataError::MissingColumns(missing)) }
    }

    fn project(&self, keep: &[usize]) -> Self {
        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self.rows.iter().map(|r| keep.iter().map(|&i| r[i].clone()).collect()).collect(),
        }
    }

    /// Keeps only `names`, in the order given. A name may be selected once.
    pub fn select(&self, names: &[&str]) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(**n)) {
            return Err(DataError::DuplicateColumn(dup.to_string()));
        }
        let idx = self.require(names)?;
        Ok(self.project(&idx))
    }

    /// Removes `names`. Every name must exist.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self, DataError> {
        let drop: HashSet<usize> = self.require(names)?.into_iter().collect();
        let keep: Vec<usize> = (0..self.columns.len()).filter(|i| !drop.contains(i)).collect();
        Ok(self.project(&keep))
    }

    /// Removes index columns left behind by spreadsheet exports (`Unnamed: 0`, ...).
    pub fn drop_unnamed(&self) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !self.columns[i].starts_with("Unnamed"))
            .collect();
        self.project(&keep)
    }

    /// Replaces sentinel codes (e.g. `-1` = "not asked") by missing values in `columns`.
    pub fn replace_with_missing(&self, columns: &[&str], sentinels: &[f64]) -> Result<Self, DataError> {
        let targets: HashSet<usize> = self.require(columns)?.into_iter().collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| match cell {
                        Cell::Number(v) if targets.contains(&i) && sentinels.contains(v) => Cell::Missing,
                        other => other.clone(),
                    })
                    .collect()
            })
            .collect();
        Ok(Self { columns: self.columns.clone(), rows })
    }

    /// Inner join on `key`, keeping the row order of `self`.
    ///
    /// Every pair of matching rows is emitted. Rows with a missing key never match.
    /// Other columns present on both sides are suffixed `_x` (left) and `_y` (right).
    pub fn inner_join(&self, other: &Dataset, key: &str) -> Result<Self, DataError> {
        let lk = self.require(&[key])?[0];
        let rk = other.require(&[key])?[0];

        let shared: HashSet<&str> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != key && other.column_index(c).is_some())
            .map(String::as_str)
            .collect();
        let rename = |c: &str, suffix: &str| {
            if shared.contains(c) { format!("{}{}", c, suffix) } else { c.to_string() }
        };

        let mut columns: Vec<String> = self.columns.iter().map(|c| rename(c, "_x")).collect();
        let right_cols: Vec<usize> = (0..other.columns.len()).filter(|&i| i != rk).collect();
        columns.extend(right_cols.iter().map(|&i| rename(&other.columns[i], "_y")));

        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            if let Some(k) = row[rk].label() {
                by_key.entry(k).or_default().push(i);
            }
        }

        let mut rows = Vec::new();
        for left in &self.rows {
            let Some(k) = left[lk].label() else { continue };
            let Some(matches) = by_key.get(&k) else { continue };
            for &ri in matches {
                let right = &other.rows[ri];
                let mut row = left.clone();
                row.extend(right_cols.iter().map(|&i| right[i].clone()));
                rows.push(row);
            }
        }

        Dataset::new(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ds(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|v| Cell::parse(v)).collect()).collect(),
        )
        .unwrap()
    }

    #[rstest]
    #[case("", Cell::Missing)]
    #[case("NA", Cell::Missing)]
    #[case("nan", Cell::Missing)]
    #[case(" 3 ", Cell::Number(3.0))]
    #[case("-1.5", Cell::Number(-1.5))]
    #[case("male", Cell::Text("male".into()))]
    fn test_cell_parsing(#[case] raw: &str, #[case] expected: Cell) {
        assert_eq!(Cell::parse(raw), expected);
    }

    #[test]
    fn test_inner_join_keeps_left_order_and_suffixes_overlap() {
        let w1 = ds(&["pident", "aedu", "site"], &[&["3", "12", "A"], &["1", "10", "B"], &["2", "8", "C"]]);
        let w5 = ds(&["pident", "eIL6", "site"], &[&["1", "0.4", "B"], &["3", "1.1", "A"]]);

        let joined = w1.inner_join(&w5, "pident").unwrap();

        assert_eq!(joined.columns(), &["pident", "aedu", "site_x", "eIL6", "site_y"]);
        assert_eq!(joined.n_rows(), 2);
        assert_eq!(joined.rows()[0][0], Cell::Number(3.0));
        assert_eq!(joined.rows()[1][3], Cell::Number(0.4));
    }

    #[test]
    fn test_inner_join_duplicate_keys_multiply() {
        let l = ds(&["k", "a"], &[&["1", "x"], &["1", "y"], &["", "z"]]);
        let r = ds(&["k", "b"], &[&["1", "p"], &["1", "q"]]);

        assert_eq!(l.inner_join(&r, "k").unwrap().n_rows(), 4);
    }

    #[test]
    fn test_join_on_absent_key_fails() {
        let l = ds(&["k"], &[]);
        let r = ds(&["id"], &[]);
        assert_eq!(l.inner_join(&r, "k").unwrap_err(), DataError::MissingColumns(vec!["k".into()]));
    }

    #[test]
    fn test_replace_with_missing_is_pure() {
        let d = ds(&["x", "y"], &[&["-1", "-1"], &["3", "4"]]);

        let cleaned = d.replace_with_missing(&["x"], &[-1.0, -3.0]).unwrap();

        assert_eq!(cleaned.rows()[0][0], Cell::Missing);
        assert_eq!(cleaned.rows()[0][1], Cell::Number(-1.0));
        assert_eq!(d.rows()[0][0], Cell::Number(-1.0));
    }

    #[test]
    fn test_drop_columns_and_unnamed() {
        let d = ds(&["Unnamed: 0", "pident", "eincom01", "aedu"], &[&["0", "1", "2", "3"]]);

        let out = d.drop_unnamed().drop_columns(&["pident", "eincom01"]).unwrap();
        assert_eq!(out.columns(), &["aedu"]);

        let err = d.drop_columns(&["nope", "aedu", "other"]).unwrap_err();
        assert_eq!(err, DataError::MissingColumns(vec!["nope".into(), "other".into()]));
    }

    #[test]
    fn test_select_keeps_order_and_rejects_repeats() {
        let d = ds(&["aIL6", "ahsCRP", "aedu"], &[&["0.5", "1.2", "12"]]);

        assert_eq!(d.select(&["aedu", "aIL6"]).unwrap().columns(), &["aedu", "aIL6"]);

        let err = d.select(&["aIL6", "aIL6"]).unwrap_err();
        assert_eq!(err, DataError::DuplicateColumn("aIL6".into()));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = Dataset::new(vec!["a".into(), "b".into()], vec![vec![Cell::Missing]]).unwrap_err();
        assert!(matches!(err, DataError::RaggedRow { row: 0, expected: 2, actual: 1 }));
    }
}
