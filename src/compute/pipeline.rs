//! Builds the causal network: learn, refine, audit, save.
//!
//! Any failure before the final rename leaves the destination untouched, so a crashed
//! run never leaves a half-written edge list behind.

use super::learner::{LearnError, PcParams, StructureLearner};
use crate::analysis::refine::{EdgeRefiner, RefinementReport};
use crate::analysis::topology;
use crate::data::{DataError, Dataset};
use crate::store::{Edge, EdgeSet, Network, TierMap, Variable};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error(transparent)]
    Learner(#[from] LearnError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Cannot write network to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Variable name '{variable}' cannot be written with delimiter '{delimiter}'")]
    UnwritableName { variable: Variable, delimiter: String },
    #[error("Refined network has {} edge(s) pointing backwards in time, first: {}", .0.len(), .0[0])]
    TemporalViolation(Vec<Edge>),
}

/// Everything needed to turn a dataset into a saved edge list.
#[derive(Debug, Clone)]
pub struct NetworkJob {
    pub params: PcParams,
    pub blacklist: EdgeSet,
    pub whitelist: EdgeSet,
    pub tiers: TierMap,
    pub output: PathBuf,
    pub delimiter: String,
}

#[derive(Debug, Clone)]
pub struct NetworkOutcome {
    pub report: RefinementReport,
    pub network: Network,
    /// Groups of variables that feed back into each other. Reported, not rejected.
    pub cycles: Vec<Vec<Variable>>,
    /// Causes before effects; `None` when the network has a cycle.
    pub order: Option<Vec<Variable>>,
    pub output: PathBuf,
}

impl NetworkJob {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            params: PcParams::default(),
            blacklist: EdgeSet::new(),
            whitelist: EdgeSet::new(),
            tiers: TierMap::new(),
            output: output.as_ref().to_path_buf(),
            delimiter: " ".to_string(),
        }
    }

    pub fn run(&self, data: &Dataset, learner: &dyn StructureLearner) -> Result<NetworkOutcome, NetworkError> {
        let result = self.build(data, learner);
        if let Err(e) = &result {
            error!(error = %e, "Error processing dataset");
        }
        result
    }

    fn build(&self, data: &Dataset, learner: &dyn StructureLearner) -> Result<NetworkOutcome, NetworkError> {
        info!(rows = data.n_rows(), columns = data.n_cols(), "Processing combined dataset");

        let pdag = learner.estimate(data, &self.params)?;
        let candidates = pdag.candidate_edges();
        info!(
            directed = pdag.directed.len(),
            undirected = pdag.undirected.len(),
            candidates = candidates.len(),
            "Structure learned"
        );

        let report = EdgeRefiner::new(&self.blacklist, &self.whitelist, &self.tiers).refine(&candidates);
        let mut network = Network::from_edges(&report.edges);
        // Keep isolated variables so the node set matches the dataset.
        for col in data.columns() {
            network.ensure_node(&Variable::from(col.as_str()));
        }

        let cycles = self.audit(&network)?;
        let order = topology::sort(&network).ok();

        self.save(&network)?;
        info!(
            path = %self.output.display(),
            edges = network.edge_count(),
            dropped = report.dropped.len(),
            "Network saved to {}",
            self.output.display()
        );

        Ok(NetworkOutcome { report, network, cycles, order, output: self.output.clone() })
    }

    /// Re-checks the refined network against the tiers and lists its cycles.
    fn audit(&self, network: &Network) -> Result<Vec<Vec<Variable>>, NetworkError> {
        let violations = topology::temporal_violations(network, &self.tiers);
        if !violations.is_empty() {
            return Err(NetworkError::TemporalViolation(violations));
        }

        let cycles = topology::find_cycles(network);
        for cycle in &cycles {
            let names: Vec<&str> = cycle.iter().map(Variable::as_str).collect();
            warn!(variables = ?names, "Refined network contains a cycle");
        }
        Ok(cycles)
    }

    /// Writes to a temporary sibling file, then renames it over the destination.
    ///
    /// Names that are empty, contain the delimiter or start with `#` would not read
    /// back, so they are refused before anything touches the disk.
    fn save(&self, network: &Network) -> Result<(), NetworkError> {
        let unwritable = |v: &&Variable| {
            let name = v.as_str();
            name.is_empty() || name.starts_with('#') || name.contains(self.delimiter.as_str())
        };
        if let Some(bad) = network.variables().find(unwritable) {
            return Err(NetworkError::UnwritableName { variable: bad.clone(), delimiter: self.delimiter.clone() });
        }
        let wrap = |source: io::Error| NetworkError::Write { path: self.output.clone(), source };

        let dir = match self.output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let tmp = NamedTempFile::new_in(&dir).map_err(wrap)?;
        network.write_edgelist(BufWriter::new(tmp.as_file()), &self.delimiter).map_err(wrap)?;
        // Temp files are created owner-only; publish with the usual output mode.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file().set_permissions(std::fs::Permissions::from_mode(0o644)).map_err(wrap)?;
        }
        tmp.persist(&self.output).map_err(|e| wrap(e.error))?;
        Ok(())
    }
}
