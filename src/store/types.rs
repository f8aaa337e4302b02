use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A named column of the cohort data (e.g. `aSerum_TG`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(pub String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for Variable {
    fn from(s: String) -> Self { Self(s) }
}

/// A directed dependency `source -> target`.
///
/// Serialises as a two-element array so config files can write `["Sexe", "aHDL_C"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(Variable, Variable)", into = "(Variable, Variable)")]
pub struct Edge {
    pub source: Variable,
    pub target: Variable,
}

impl Edge {
    pub fn new(source: impl Into<Variable>, target: impl Into<Variable>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

impl From<(Variable, Variable)> for Edge {
    fn from((source, target): (Variable, Variable)) -> Self { Self { source, target } }
}

impl From<Edge> for (Variable, Variable) {
    fn from(e: Edge) -> Self { (e.source, e.target) }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Ordered so that every traversal (and therefore every written edge list) is deterministic.
pub type EdgeSet = BTreeSet<Edge>;

/// Builds an `EdgeSet` from string pairs. Mostly a convenience for tests and bindings.
pub fn edge_set<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> EdgeSet {
    pairs.into_iter().map(|(s, t)| Edge::new(s, t)).collect()
}

/// Temporal rank of each variable. Lower ranks are measured earlier.
///
/// Variables without an explicit rank fall back to `default_tier`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMap {
    levels: HashMap<Variable, i64>,
    #[serde(default)]
    pub default_tier: i64,
}

impl TierMap {
    pub fn new() -> Self { Self::default() }

    pub fn with_default(default_tier: i64) -> Self {
        Self { levels: HashMap::new(), default_tier }
    }

    pub fn insert(&mut self, var: impl Into<Variable>, level: i64) -> Option<i64> {
        self.levels.insert(var.into(), level)
    }

    #[inline]
    pub fn tier_of(&self, var: &Variable) -> i64 {
        self.levels.get(var).copied().unwrap_or(self.default_tier)
    }

    /// An edge may stay within a tier or point forward in time, never backwards.
    #[inline]
    pub fn allows(&self, edge: &Edge) -> bool {
        self.tier_of(&edge.source) <= self.tier_of(&edge.target)
    }

    pub fn len(&self) -> usize { self.levels.len() }
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }
}

impl<V: Into<Variable>> FromIterator<(V, i64)> for TierMap {
    fn from_iter<I: IntoIterator<Item = (V, i64)>>(iter: I) -> Self {
        let mut map = TierMap::new();
        for (var, level) in iter {
            map.insert(var, level);
        }
        map
    }
}
