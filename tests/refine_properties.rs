//! Property tests for the edge refinement policy.

use proptest::prelude::*;

use ccg_network_core::analysis::refine::EdgeRefiner;
use ccg_network_core::{Edge, EdgeSet, TierMap};

const VARS: &[&str] = &["Age", "Sexe", "aedu", "aIL6", "ahsCRP", "eIL6", "eHSCRP"];

fn edges_strategy() -> impl Strategy<Value = EdgeSet> {
    prop::collection::btree_set((0..VARS.len(), 0..VARS.len()), 0..20)
        .prop_map(|pairs| pairs.into_iter().map(|(s, t)| Edge::new(VARS[s], VARS[t])).collect())
}

fn tiers_strategy() -> impl Strategy<Value = TierMap> {
    (prop::collection::vec(prop::option::of(0i64..4), VARS.len()), -1i64..4).prop_map(|(levels, default_tier)| {
        let mut map = TierMap::with_default(default_tier);
        for (var, level) in VARS.iter().zip(levels) {
            if let Some(l) = level {
                map.insert(*var, l);
            }
        }
        map
    })
}

proptest! {
    #[test]
    fn prop_without_lists_output_is_tier_filtered_candidates(
        candidates in edges_strategy(),
        tiers in tiers_strategy(),
    ) {
        let out = EdgeRefiner::new(&EdgeSet::new(), &EdgeSet::new(), &tiers).refine(&candidates);

        let expected: EdgeSet = candidates.iter().filter(|e| tiers.allows(e)).cloned().collect();
        prop_assert_eq!(out.edges, expected);
    }

    #[test]
    fn prop_blacklisted_candidates_only_survive_when_whitelisted(
        candidates in edges_strategy(),
        blacklist in edges_strategy(),
        whitelist in edges_strategy(),
        tiers in tiers_strategy(),
    ) {
        let out = EdgeRefiner::new(&blacklist, &whitelist, &tiers).refine(&candidates);

        for edge in blacklist.intersection(&candidates) {
            if !whitelist.contains(edge) {
                prop_assert!(!out.edges.contains(edge), "{} should be blacklisted", edge);
            }
        }
    }

    #[test]
    fn prop_whitelist_present_iff_tier_consistent(
        candidates in edges_strategy(),
        blacklist in edges_strategy(),
        whitelist in edges_strategy(),
        tiers in tiers_strategy(),
    ) {
        let out = EdgeRefiner::new(&blacklist, &whitelist, &tiers).refine(&candidates);

        for edge in &whitelist {
            prop_assert_eq!(out.edges.contains(edge), tiers.allows(edge));
        }
        let expected_warnings = whitelist.iter().filter(|e| !tiers.allows(e)).count();
        prop_assert_eq!(out.warnings.len(), expected_warnings);
    }

    #[test]
    fn prop_refine_is_idempotent(
        candidates in edges_strategy(),
        blacklist in edges_strategy(),
        whitelist in edges_strategy(),
        tiers in tiers_strategy(),
    ) {
        let refiner = EdgeRefiner::new(&blacklist, &whitelist, &tiers);
        let once = refiner.refine(&candidates).edges;
        let twice = refiner.refine(&once).edges;

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_every_output_edge_points_forward_in_time(
        candidates in edges_strategy(),
        whitelist in edges_strategy(),
        tiers in tiers_strategy(),
    ) {
        let out = EdgeRefiner::new(&EdgeSet::new(), &whitelist, &tiers).refine(&candidates);

        for edge in &out.edges {
            prop_assert!(tiers.tier_of(&edge.source) <= tiers.tier_of(&edge.target));
        }
        // Nothing is lost without a recorded reason.
        prop_assert_eq!(
            out.edges.len() + out.dropped.len(),
            candidates.union(&whitelist).count()
        );
    }
}
