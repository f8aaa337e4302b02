//! Boundary to the constraint-based structure learner (PC algorithm).
//!
//! The conditional-independence search runs outside this crate. Implementations of
//! [`StructureLearner`] hand back its CPDAG; everything downstream treats it as data.

use crate::data::Dataset;
use crate::store::{Edge, EdgeSet, Variable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearnError {
    #[error("Invalid learner parameters: {0}")]
    InvalidParams(String),
    #[error("Line {line}: cannot parse adjacency '{text}'")]
    Parse { line: usize, text: String },
    #[error("Variable '{0}' in the learned graph is not a dataset column")]
    UnknownVariable(String),
    #[error("Structure learning failed: {0}")]
    Failed(String),
    #[error("Cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcVariant {
    Orig,
    #[default]
    Stable,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiTest {
    #[default]
    ChiSquare,
    GSq,
    Pearsonr,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcParams {
    pub variant: PcVariant,
    pub ci_test: CiTest,
    pub significance_level: f64,
    pub max_cond_vars: usize,
}

impl Default for PcParams {
    fn default() -> Self {
        Self { variant: PcVariant::Stable, ci_test: CiTest::ChiSquare, significance_level: 0.01, max_cond_vars: 5 }
    }
}

impl PcParams {
    pub fn validate(&self) -> Result<(), LearnError> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(LearnError::InvalidParams(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        Ok(())
    }
}

/// A partially directed acyclic graph: directed edges plus unoriented adjacencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pdag {
    pub directed: EdgeSet,
    /// Stored with the smaller name first.
    pub undirected: BTreeSet<(Variable, Variable)>,
}

impl Pdag {
    pub fn add_directed(&mut self, source: impl Into<Variable>, target: impl Into<Variable>) {
        self.directed.insert(Edge::new(source, target));
    }

    pub fn add_undirected(&mut self, a: impl Into<Variable>, b: impl Into<Variable>) {
        let (a, b) = (a.into(), b.into());
        if a <= b { self.undirected.insert((a, b)); } else { self.undirected.insert((b, a)); }
    }

    pub fn variables(&self) -> BTreeSet<&Variable> {
        self.directed
            .iter()
            .flat_map(|e| [&e.source, &e.target])
            .chain(self.undirected.iter().flat_map(|(a, b)| [a, b]))
            .collect()
    }

    /// Every adjacency as directed pairs; an undirected one contributes both orientations.
    pub fn candidate_edges(&self) -> EdgeSet {
        let mut out = self.directed.clone();
        for (a, b) in &self.undirected {
            out.insert(Edge { source: a.clone(), target: b.clone() });
            out.insert(Edge { source: b.clone(), target: a.clone() });
        }
        out
    }

    /// Parses `u -> v` / `u -- v` lines. Blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Result<Self, LearnError> {
        let mut pdag = Pdag::default();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let err = || LearnError::Parse { line: i + 1, text: line.to_string() };
            if let Some((u, v)) = line.split_once("->") {
                let (u, v) = (u.trim(), v.trim());
                if u.is_empty() || v.is_empty() { return Err(err()); }
                pdag.add_directed(u, v);
            } else if let Some((u, v)) = line.split_once("--") {
                let (u, v) = (u.trim(), v.trim());
                if u.is_empty() || v.is_empty() { return Err(err()); }
                pdag.add_undirected(u, v);
            } else {
                return Err(err());
            }
        }
        Ok(pdag)
    }
}

/// Estimates a CPDAG from data.
pub trait StructureLearner {
    fn estimate(&self, data: &Dataset, params: &PcParams) -> Result<Pdag, LearnError>;
}

/// A CPDAG computed beforehand by an external PC run and exported as text.
#[derive(Debug, Clone)]
pub struct PrecomputedPdag {
    path: PathBuf,
}

impl PrecomputedPdag {
    pub fn new(path: impl AsRef<Path>) -> Self { Self { path: path.as_ref().to_path_buf() } }
}

impl StructureLearner for PrecomputedPdag {
    fn estimate(&self, data: &Dataset, params: &PcParams) -> Result<Pdag, LearnError> {
        params.validate()?;
        let text = fs::read_to_string(&self.path)
            .map_err(|source| LearnError::Io { path: self.path.clone(), source })?;
        let pdag = Pdag::parse(&text)?;
        if let Some(unknown) = pdag.variables().into_iter().find(|v| data.column_index(v.as_str()).is_none()) {
            return Err(LearnError::UnknownVariable(unknown.to_string()));
        }
        Ok(pdag)
    }
}
