//! Domain-knowledge refinement of a learned candidate graph.
//!
//! The structure learner only reports statistical dependencies. This pass applies the
//! study's prior knowledge in a fixed order:
//!
//! 1. remove blacklisted edges,
//! 2. add whitelisted edges (the whitelist wins over the blacklist for the same pair),
//! 3. drop every edge whose source is measured later than its target.
//!
//! Whitelisted edges are still subject to step 3.

use crate::store::{Edge, EdgeSet, TierMap};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Why an edge did not make it into the final network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum DropReason {
    Blacklisted,
    BackwardInTime { source_tier: i64, target_tier: i64 },
}

impl DropReason {
    /// Stable reason code, as written in audit output.
    pub fn code(&self) -> &'static str {
        match self {
            DropReason::Blacklisted => "blacklisted",
            DropReason::BackwardInTime { .. } => "backward-in-time",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Blacklisted => f.write_str("blacklisted"),
            DropReason::BackwardInTime { source_tier, target_tier } => {
                write!(f, "backward-in-time (tier {} -> tier {})", source_tier, target_tier)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedEdge {
    pub edge: Edge,
    #[serde(flatten)]
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RefineWarning {
    /// A whitelisted edge was removed because it points backwards in time.
    WhitelistDroppedByTier { edge: Edge, source_tier: i64, target_tier: i64 },
}

impl fmt::Display for RefineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefineWarning::WhitelistDroppedByTier { edge, source_tier, target_tier } => write!(
                f,
                "whitelisted edge {} dropped: tier {} is later than tier {}",
                edge, source_tier, target_tier
            ),
        }
    }
}

/// The final edge set plus everything that happened on the way there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefinementReport {
    pub edges: EdgeSet,
    /// Whitelisted edges that were not among the candidates.
    pub added: Vec<Edge>,
    pub dropped: Vec<DroppedEdge>,
    pub warnings: Vec<RefineWarning>,
}

impl RefinementReport {
    pub fn dropped_with(&self, code: &str) -> impl Iterator<Item = &Edge> + '_ {
        let code = code.to_string();
        self.dropped.iter().filter(move |d| d.reason.code() == code).map(|d| &d.edge)
    }
}

/// Applies blacklist, whitelist and tier constraints to candidate edges.
pub struct EdgeRefiner<'a> {
    blacklist: &'a EdgeSet,
    whitelist: &'a EdgeSet,
    tiers: &'a TierMap,
}

impl<'a> EdgeRefiner<'a> {
    pub fn new(blacklist: &'a EdgeSet, whitelist: &'a EdgeSet, tiers: &'a TierMap) -> Self {
        Self { blacklist, whitelist, tiers }
    }

    /// Runs the three passes on a copy of `candidates`. Never fails.
    pub fn refine(&self, candidates: &EdgeSet) -> RefinementReport {
        let mut report = RefinementReport::default();
        let mut working = candidates.clone();

        // --- Blacklist ---
        for edge in self.blacklist {
            if working.remove(edge) {
                debug!(source = %edge.source, target = %edge.target, "Removing blacklisted edge");
                report.dropped.push(DroppedEdge { edge: edge.clone(), reason: DropReason::Blacklisted });
            }
        }

        // --- Whitelist ---
        for edge in self.whitelist {
            if working.insert(edge.clone()) {
                debug!(source = %edge.source, target = %edge.target, "Adding whitelisted edge");
                report.added.push(edge.clone());
            }
        }

        // --- Tier filter ---
        for edge in working {
            let source_tier = self.tiers.tier_of(&edge.source);
            let target_tier = self.tiers.tier_of(&edge.target);

            if source_tier <= target_tier {
                report.edges.insert(edge);
                continue;
            }

            info!(
                source = %edge.source,
                target = %edge.target,
                "Skipping edge from {} to {} as it would point backwards in time.",
                edge.source,
                edge.target
            );
            if self.whitelist.contains(&edge) {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    source_tier,
                    target_tier,
                    "Whitelisted edge contradicts the tier ordering and was dropped"
                );
                report.warnings.push(RefineWarning::WhitelistDroppedByTier {
                    edge: edge.clone(),
                    source_tier,
                    target_tier,
                });
            }
            report.dropped.push(DroppedEdge {
                edge,
                reason: DropReason::BackwardInTime { source_tier, target_tier },
            });
        }

        report
    }
}

/// Convenience wrapper around [`EdgeRefiner`] returning only the surviving edges.
pub fn refine(candidates: &EdgeSet, blacklist: &EdgeSet, whitelist: &EdgeSet, tiers: &TierMap) -> EdgeSet {
    EdgeRefiner::new(blacklist, whitelist, tiers).refine(candidates).edges
}
