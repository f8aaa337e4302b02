//! Missing-data overview and pairwise correlations.
//!
//! These produce the numbers behind the exploratory charts; rendering is left to the caller.

use crate::data::{DataError, Dataset};
use serde::Serialize;

pub fn feature_names(data: &Dataset) -> Vec<String> {
    data.columns().to_vec()
}

/// `(column, missing cells)` for every column with at least one gap, in column order.
pub fn missing_counts(data: &Dataset) -> Vec<(String, usize)> {
    data.columns()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), data.rows().iter().filter(|r| r[i].is_missing()).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    pub fn of(column: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = (n > 0).then(|| sorted.iter().sum::<f64>() / n as f64);
        let std = match (mean, n) {
            (Some(m), n) if n > 1 => {
                Some((sorted.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt())
            }
            _ => None,
        };
        Self {
            column: column.to_string(),
            count: n,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Summary statistics of the present values of every incomplete column.
pub fn describe_missingness(data: &Dataset) -> Result<Vec<Describe>, DataError> {
    missing_counts(data)
        .into_iter()
        .map(|(col, _)| Ok(Describe::of(&col, &data.numeric_values(&col)?)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where fewer than two complete pairs exist or a side is constant.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation using pairwise-complete observations.
pub fn correlation_matrix(data: &Dataset, columns: &[&str]) -> Result<CorrelationMatrix, DataError> {
    let subset = data.select(columns)?;
    let series: Vec<Vec<Option<f64>>> = (0..subset.n_cols())
        .map(|j| subset.rows().iter().map(|r| r[j].as_f64()).collect())
        .collect();

    let k = series.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { columns: subset.columns().to_vec(), values })
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}
