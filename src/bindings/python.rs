use crate::analysis::refine::EdgeRefiner;
use crate::analysis::stats::{ColumnRequest, StatisticsReport};
use crate::data::Dataset;
use crate::display::report;
use crate::store::{Edge, EdgeSet, TierMap};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;

fn to_edge_set(pairs: Vec<(String, String)>) -> EdgeSet {
    pairs.into_iter().map(|(s, t)| Edge::new(s, t)).collect()
}

/// Refines candidate edges and returns `(edges, dropped)`.
///
/// `dropped` holds `(source, target, reason_code)` triples.
#[pyfunction]
#[pyo3(signature = (candidates, blacklist, whitelist, tiers, default_tier = 0))]
pub fn refine_edges(
    candidates: Vec<(String, String)>,
    blacklist: Vec<(String, String)>,
    whitelist: Vec<(String, String)>,
    tiers: HashMap<String, i64>,
    default_tier: i64,
) -> (Vec<(String, String)>, Vec<(String, String, String)>) {
    let mut tier_map = TierMap::with_default(default_tier);
    for (var, level) in tiers {
        tier_map.insert(var, level);
    }
    let (blacklist, whitelist) = (to_edge_set(blacklist), to_edge_set(whitelist));

    let out = EdgeRefiner::new(&blacklist, &whitelist, &tier_map).refine(&to_edge_set(candidates));

    let edges = out.edges.into_iter().map(|e| (e.source.0, e.target.0)).collect();
    let dropped = out
        .dropped
        .into_iter()
        .map(|d| (d.edge.source.0, d.edge.target.0, d.reason.code().to_string()))
        .collect();
    (edges, dropped)
}

/// Reads a CSV file and returns the rendered statistics report.
#[pyfunction]
#[pyo3(signature = (path, continuous, categorical, sentinels = Vec::new()))]
pub fn statistics_report(
    path: &str,
    continuous: Vec<String>,
    categorical: Vec<String>,
    sentinels: Vec<f64>,
) -> PyResult<String> {
    let data = Dataset::from_csv_path(path).map_err(|e| PyIOError::new_err(e.to_string()))?;
    let requests: Vec<ColumnRequest> = continuous
        .iter()
        .map(|c| ColumnRequest::continuous(c))
        .chain(categorical.iter().map(|c| ColumnRequest::categorical(c)))
        .collect();
    let stats = StatisticsReport::generate(&data, &requests, &sentinels)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(report::format_statistics(&stats))
}

/// Defines the `ccg._core` Python module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(refine_edges, m)?)?;
    m.add_function(wrap_pyfunction!(statistics_report, m)?)?;
    Ok(())
}
