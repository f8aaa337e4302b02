//! Graph refinement and exploratory statistics.
pub mod missingness;
pub mod refine;
pub mod stats;
pub mod tiers;
pub mod topology;

pub use refine::{refine, DropReason, DroppedEdge, EdgeRefiner, RefineWarning, RefinementReport};
pub use stats::{ColumnKind, ColumnRequest, StatisticsReport, StatsError};
pub use tiers::{immutable_blacklist, Tier, TierError, TierPlan};
