//! Causal-network refinement and descriptive statistics for a two-wave cohort study.
//!
//! The structure learner (PC algorithm) runs elsewhere; this crate takes its CPDAG,
//! applies the study's domain knowledge (blacklist, whitelist, temporal tiers) and
//! writes the final edge list. The `data` and `analysis` modules cover the tabular
//! side: merging the waves and producing the cohort characteristics tables.

pub mod analysis;
pub mod cli;
pub mod compute;
pub mod config;
pub mod data;
pub mod display;
pub mod store;

#[cfg(feature = "python")]
pub mod bindings;

pub use analysis::refine::{refine, EdgeRefiner, RefinementReport};
pub use store::{Edge, EdgeSet, Network, TierMap, Variable};
