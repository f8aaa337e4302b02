//! JSON description of a network run.

use crate::analysis::tiers::{immutable_blacklist, TierError, TierPlan};
use crate::compute::{LearnError, NetworkJob, PcParams};
use crate::data::{DEFAULT_DROP_COLUMNS, SUBJECT_KEY};
use crate::store::{EdgeSet, Variable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error(transparent)]
    Learner(#[from] LearnError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    pub baseline: PathBuf,
    pub follow_up: PathBuf,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
}

fn default_key() -> String { SUBJECT_KEY.to_string() }
fn default_drop_columns() -> Vec<String> { DEFAULT_DROP_COLUMNS.iter().map(|s| s.to_string()).collect() }
fn default_delimiter() -> String { " ".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub data: DataSources,
    /// CPDAG exported by the external PC run.
    pub candidate_graph: PathBuf,
    #[serde(default)]
    pub learner: PcParams,
    #[serde(default)]
    pub whitelist: EdgeSet,
    #[serde(default)]
    pub blacklist: EdgeSet,
    /// Variables nothing may cause (sex, age). Expanded into blacklist entries.
    #[serde(default)]
    pub immutable_variables: Vec<Variable>,
    #[serde(default)]
    pub tiers: TierPlan,
    #[serde(default)]
    pub default_tier: i64,
    pub output: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl NetworkConfig {
    /// Reads and validates a config. Relative paths are resolved against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let mut cfg: NetworkConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        if let Some(base) = path.parent() {
            cfg.resolve_paths(base);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.data.baseline,
            &mut self.data.follow_up,
            &mut self.candidate_graph,
            &mut self.output,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.learner.validate()?;
        if self.delimiter.is_empty() {
            return Err(ConfigError::Invalid("delimiter must not be empty".into()));
        }
        self.tiers.to_tier_map(self.default_tier)?;
        Ok(())
    }

    /// Turns the config into a runnable job for a dataset with `columns`.
    ///
    /// The immutable-variable bans are computed against the merged columns.
    pub fn job(&self, columns: &[String]) -> Result<NetworkJob, ConfigError> {
        let vars: Vec<Variable> = columns.iter().map(|c| Variable::from(c.as_str())).collect();
        let mut blacklist = self.blacklist.clone();
        blacklist.extend(immutable_blacklist(&vars, &self.immutable_variables));

        Ok(NetworkJob {
            params: self.learner,
            blacklist,
            whitelist: self.whitelist.clone(),
            tiers: self.tiers.to_tier_map(self.default_tier)?,
            output: self.output.clone(),
            delimiter: self.delimiter.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Edge;

    const MINIMAL: &str = r#"{
        "data": { "baseline": "w1.csv", "follow_up": "w5.csv" },
        "candidate_graph": "cpdag.txt",
        "whitelist": [["Sexe", "aHDL_C"]],
        "immutable_variables": ["Sexe"],
        "tiers": [
            { "name": "Context B", "level": 1, "variables": ["Sexe"] },
            { "name": "B", "level": 2, "variables": ["aHDL_C"] }
        ],
        "output": "network.csv"
    }"#;

    #[test]
    fn test_defaults_are_filled_in() {
        let cfg: NetworkConfig = serde_json::from_str(MINIMAL).unwrap();

        assert_eq!(cfg.data.key, "pident");
        assert_eq!(cfg.data.drop_columns, vec!["pident", "eincom01"]);
        assert_eq!(cfg.learner, PcParams::default());
        assert_eq!(cfg.delimiter, " ");
        assert_eq!(cfg.default_tier, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_job_expands_immutable_blacklist() {
        let cfg: NetworkConfig = serde_json::from_str(MINIMAL).unwrap();

        let job = cfg.job(&["Sexe".to_string(), "aHDL_C".to_string()]).unwrap();

        assert!(job.blacklist.contains(&Edge::new("aHDL_C", "Sexe")));
        assert_eq!(job.blacklist.len(), 1);
        assert_eq!(job.tiers.tier_of(&"aHDL_C".into()), 2);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, MINIMAL).unwrap();

        let cfg = NetworkConfig::load(&path).unwrap();

        assert_eq!(cfg.output, dir.path().join("network.csv"));
        assert_eq!(cfg.data.baseline, dir.path().join("w1.csv"));
    }

    #[test]
    fn test_invalid_significance_level_is_rejected() {
        let mut cfg: NetworkConfig = serde_json::from_str(MINIMAL).unwrap();
        cfg.learner.significance_level = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Learner(_))));
    }
}
