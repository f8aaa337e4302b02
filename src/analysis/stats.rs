//! Descriptive statistics for the cohort characteristics table.

use crate::data::{DataError, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Requested column(s) not in dataset: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Continuous,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRequest {
    pub column: String,
    pub kind: ColumnKind,
}

impl ColumnRequest {
    pub fn continuous(column: &str) -> Self { Self { column: column.to_string(), kind: ColumnKind::Continuous } }
    pub fn categorical(column: &str) -> Self { Self { column: column.to_string(), kind: ColumnKind::Categorical } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousSummary {
    pub n: usize,
    /// `None` when the column has no values.
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Continuous(ContinuousSummary),
    Categorical { n: usize, categories: Vec<CategoryCount> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnBlock {
    pub column: String,
    pub summary: ColumnSummary,
}

/// One block per requested column, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub blocks: Vec<ColumnBlock>,
}

pub fn round2(v: f64) -> f64 { (v * 100.0).round() / 100.0 }

impl StatisticsReport {
    /// Summarises `requests` after treating every value in `sentinels` as missing.
    ///
    /// All requested columns are checked up front; nothing is computed if any is absent.
    pub fn generate(data: &Dataset, requests: &[ColumnRequest], sentinels: &[f64]) -> Result<Self, StatsError> {
        let missing: Vec<String> = requests
            .iter()
            .filter(|r| data.column_index(&r.column).is_none())
            .map(|r| r.column.clone())
            .collect();
        if !missing.is_empty() {
            return Err(StatsError::MissingColumns(missing));
        }

        let names: Vec<&str> = requests.iter().map(|r| r.column.as_str()).collect();
        let cleaned = data.replace_with_missing(&names, sentinels)?;

        let mut blocks = Vec::with_capacity(requests.len());
        for req in requests {
            let summary = match req.kind {
                ColumnKind::Continuous => ColumnSummary::Continuous(continuous(&cleaned.numeric_values(&req.column)?)),
                ColumnKind::Categorical => {
                    let labels: Vec<String> =
                        cleaned.column(&req.column)?.into_iter().filter_map(|c| c.label()).collect();
                    ColumnSummary::Categorical { n: labels.len(), categories: categorical(&labels) }
                }
            };
            blocks.push(ColumnBlock { column: req.column.clone(), summary });
        }
        Ok(Self { blocks })
    }

    pub fn block(&self, column: &str) -> Option<&ColumnBlock> {
        self.blocks.iter().find(|b| b.column == column)
    }
}

/// Count, mean and sample standard deviation, rounded to two decimals.
pub fn continuous(values: &[f64]) -> ContinuousSummary {
    let n = values.len();
    if n == 0 {
        return ContinuousSummary { n, mean: None, std_dev: None };
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let std_dev = if n > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some(round2((ss / (n - 1) as f64).sqrt()))
    } else {
        None
    };
    ContinuousSummary { n, mean: Some(round2(mean)), std_dev }
}

/// Frequency table, most common category first (ties by label).
pub fn categorical(labels: &[String]) -> Vec<CategoryCount> {
    let total = labels.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for l in labels {
        *counts.entry(l.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
            proportion: round2(count as f64 / total as f64),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use rstest::rstest;

    fn single_column(name: &str, values: &[f64]) -> Dataset {
        Dataset::new(vec![name.to_string()], values.iter().map(|&v| vec![Cell::Number(v)]).collect()).unwrap()
    }

    #[test]
    fn test_sentinels_are_treated_as_missing() {
        let data = single_column("aIRSsum9", &[-1.0, 3.0, -3.0, 5.0, 7.0]);

        let report =
            StatisticsReport::generate(&data, &[ColumnRequest::continuous("aIRSsum9")], &[-1.0, -3.0]).unwrap();

        assert_eq!(
            report.blocks[0].summary,
            ColumnSummary::Continuous(ContinuousSummary { n: 3, mean: Some(5.0), std_dev: Some(2.0) })
        );
    }

    #[rstest]
    #[case(&[], 0, None, None)]
    #[case(&[4.0], 1, Some(4.0), None)]
    #[case(&[1.0, 2.0], 2, Some(1.5), Some(0.71))]
    #[case(&[0.333, 0.333, 0.334], 3, Some(0.33), Some(0.0))]
    fn test_continuous_edge_cases(
        #[case] values: &[f64],
        #[case] n: usize,
        #[case] mean: Option<f64>,
        #[case] std_dev: Option<f64>,
    ) {
        assert_eq!(continuous(values), ContinuousSummary { n, mean, std_dev });
    }

    #[test]
    fn test_categorical_proportions_and_order() {
        let labels: Vec<String> = ["2", "1", "2", "3", "1", "2"].iter().map(|s| s.to_string()).collect();

        let table = categorical(&labels);

        let got: Vec<(&str, usize, f64)> = table.iter().map(|c| (c.label.as_str(), c.count, c.proportion)).collect();
        assert_eq!(got, vec![("2", 3, 0.5), ("1", 2, 0.33), ("3", 1, 0.17)]);
    }

    #[test]
    fn test_missing_columns_abort_the_report() {
        let data = single_column("Age", &[40.0]);
        let requests = [ColumnRequest::continuous("Age"), ColumnRequest::categorical("Sexe"), ColumnRequest::continuous("aIL6")];

        let err = StatisticsReport::generate(&data, &requests, &[]).unwrap_err();
        assert_eq!(err, StatsError::MissingColumns(vec!["Sexe".into(), "aIL6".into()]));
    }

    #[test]
    fn test_blocks_follow_request_order() {
        let data = Dataset::new(
            vec!["Sexe".into(), "Age".into()],
            vec![vec![Cell::Number(1.0), Cell::Number(40.0)], vec![Cell::Number(2.0), Cell::Missing]],
        )
        .unwrap();

        let report = StatisticsReport::generate(
            &data,
            &[ColumnRequest::continuous("Age"), ColumnRequest::categorical("Sexe")],
            &[],
        )
        .unwrap();

        assert_eq!(report.blocks[0].column, "Age");
        assert_eq!(report.blocks[1].column, "Sexe");
        match &report.block("Sexe").unwrap().summary {
            ColumnSummary::Categorical { n, categories } => {
                assert_eq!(*n, 2);
                assert_eq!(categories[0].label, "1");
                assert_eq!(categories[0].proportion, 0.5);
            }
            other => panic!("expected categorical, got {:?}", other),
        }
    }
}
