//! Temporal tiers of the study design and the edge constraints derived from them.

use crate::store::{Edge, EdgeSet, TierMap, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    #[error("Variable '{variable}' is assigned to tier '{first}' (level {first_level}) and tier '{second}' (level {second_level})")]
    ConflictingAssignment {
        variable: String,
        first: String,
        first_level: i64,
        second: String,
        second_level: i64,
    },
}

/// One named measurement tier, e.g. `"Context B"` at level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub level: i64,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Tier {
    pub fn new(name: &str, level: i64, variables: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            level,
            variables: variables.iter().map(|&v| Variable::from(v)).collect(),
        }
    }
}

/// The ordered tier layout of a study. Several tiers may share a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierPlan {
    pub tiers: Vec<Tier>,
}

impl TierPlan {
    pub fn new(tiers: Vec<Tier>) -> Self { Self { tiers } }

    /// Flattens the plan into a variable -> level map.
    ///
    /// Listing a variable twice is tolerated only when both tiers have the same level.
    pub fn to_tier_map(&self, default_tier: i64) -> Result<TierMap, TierError> {
        let mut map = TierMap::with_default(default_tier);
        let mut owner: HashMap<&Variable, &Tier> = HashMap::new();

        for tier in &self.tiers {
            for var in &tier.variables {
                if let Some(prev) = owner.get(var) {
                    if prev.level != tier.level {
                        return Err(TierError::ConflictingAssignment {
                            variable: var.to_string(),
                            first: prev.name.clone(),
                            first_level: prev.level,
                            second: tier.name.clone(),
                            second_level: tier.level,
                        });
                    }
                    continue;
                }
                owner.insert(var, tier);
                map.insert(var.clone(), tier.level);
            }
        }
        Ok(map)
    }
}

/// Forbids every variable from causing one of the `immutable` ones (sex, age...).
///
/// An immutable variable is never blacklisted against itself. Immutable variables
/// missing from `variables` still receive incoming bans, so a renamed column stays covered.
pub fn immutable_blacklist<'a>(
    variables: impl IntoIterator<Item = &'a Variable>,
    immutable: &[Variable],
) -> EdgeSet {
    let mut out = EdgeSet::new();
    for var in variables {
        for fixed in immutable {
            if var != fixed {
                out.insert(Edge { source: var.clone(), target: fixed.clone() });
            }
        }
    }
    out
}
