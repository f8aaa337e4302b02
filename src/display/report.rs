use crate::analysis::missingness::Describe;
use crate::analysis::refine::RefinementReport;
use crate::analysis::stats::{ColumnSummary, StatisticsReport};
use crate::store::Variable;
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::Path;

fn opt2(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Plain-text statistics report, one block per column separated by a blank line.
///
/// ```text
/// aIRSsum9
///   N: 3
///   Mean: 5.00
///   StdDev: 2.00
/// ```
pub fn format_statistics(report: &StatisticsReport) -> String {
    let mut out = String::new();
    for (i, block) in report.blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", block.column);
        match &block.summary {
            ColumnSummary::Continuous(s) => {
                let _ = writeln!(out, "  N: {}", s.n);
                let _ = writeln!(out, "  Mean: {}", opt2(s.mean));
                let _ = writeln!(out, "  StdDev: {}", opt2(s.std_dev));
            }
            ColumnSummary::Categorical { n, categories } => {
                let _ = writeln!(out, "  N: {}", n);
                for c in categories {
                    let _ = writeln!(out, "  {}: {} ({:.2})", c.label, c.count, c.proportion);
                }
            }
        }
    }
    out
}

pub fn write_statistics(report: &StatisticsReport, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, format_statistics(report))
}

/// Human-readable account of what the refiner did.
pub fn format_refinement(report: &RefinementReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "REFINEMENT AUDIT");
    let _ = writeln!(out, "--------------------------------------------------");
    let _ = writeln!(out, "Kept: {}  Added: {}  Dropped: {}", report.edges.len(), report.added.len(), report.dropped.len());

    if !report.added.is_empty() {
        let _ = writeln!(out, "Added from whitelist:");
        for e in &report.added {
            let _ = writeln!(out, "|-- {}", e);
        }
    }
    if !report.dropped.is_empty() {
        let _ = writeln!(out, "Dropped:");
        for d in &report.dropped {
            let _ = writeln!(out, "|-- {} [{}]", d.edge, d.reason);
        }
    }
    if !report.warnings.is_empty() {
        let _ = writeln!(out, "Warnings:");
        for w in &report.warnings {
            let _ = writeln!(out, "|-- {}", w);
        }
    }
    out
}

/// Causal order of the saved network, or a note when cycles prevent one.
pub fn format_order(order: Option<&[Variable]>) -> String {
    let mut out = String::new();
    match order {
        Some(vars) => {
            let _ = writeln!(out, "Causal order:");
            for (i, v) in vars.iter().enumerate() {
                let _ = writeln!(out, "|-- {:>3}. {}", i + 1, v);
            }
        }
        None => {
            let _ = writeln!(out, "Causal order: none (network has cycles)");
        }
    }
    out
}

/// Fixed-width table of `describe_missingness` output.
pub fn format_describe(rows: &[Describe]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for d in rows {
        let _ = writeln!(
            out,
            "{:<16} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            d.column,
            d.count,
            opt2(d.mean),
            opt2(d.std),
            opt2(d.min),
            opt2(d.q25),
            opt2(d.median),
            opt2(d.q75),
            opt2(d.max)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::refine::EdgeRefiner;
    use crate::analysis::stats::{CategoryCount, ColumnBlock, ContinuousSummary};
    use crate::store::{edge_set, EdgeSet, TierMap};

    #[test]
    fn test_statistics_text_layout() {
        let report = StatisticsReport {
            blocks: vec![
                ColumnBlock {
                    column: "aIRSsum9".into(),
                    summary: ColumnSummary::Continuous(ContinuousSummary { n: 3, mean: Some(5.0), std_dev: Some(2.0) }),
                },
                ColumnBlock {
                    column: "Sexe".into(),
                    summary: ColumnSummary::Categorical {
                        n: 3,
                        categories: vec![
                            CategoryCount { label: "2".into(), count: 2, proportion: 0.67 },
                            CategoryCount { label: "1".into(), count: 1, proportion: 0.33 },
                        ],
                    },
                },
            ],
        };

        assert_eq!(
            format_statistics(&report),
            "aIRSsum9\n  N: 3\n  Mean: 5.00\n  StdDev: 2.00\n\nSexe\n  N: 3\n  2: 2 (0.67)\n  1: 1 (0.33)\n"
        );
    }

    #[test]
    fn test_undefined_values_render_as_na() {
        let report = StatisticsReport {
            blocks: vec![ColumnBlock {
                column: "x".into(),
                summary: ColumnSummary::Continuous(ContinuousSummary { n: 1, mean: Some(4.0), std_dev: None }),
            }],
        };
        assert!(format_statistics(&report).contains("StdDev: n/a"));
    }

    #[test]
    fn test_refinement_audit_lists_reasons() {
        let candidates = edge_set([("A", "B"), ("B", "A")]);
        let blacklist = edge_set([("A", "B")]);
        let tiers: TierMap = [("A", 1), ("B", 2)].into_iter().collect();

        let report = EdgeRefiner::new(&blacklist, &EdgeSet::new(), &tiers).refine(&candidates);
        let text = format_refinement(&report);

        assert!(text.contains("Kept: 0  Added: 0  Dropped: 2"));
        assert!(text.contains("|-- A -> B [blacklisted]"));
        assert!(text.contains("|-- B -> A [backward-in-time (tier 2 -> tier 1)]"));
    }

    #[test]
    fn test_order_listing() {
        let order = vec![Variable::from("Sexe"), Variable::from("aIL6")];

        assert_eq!(format_order(Some(order.as_slice())), "Causal order:\n|--   1. Sexe\n|--   2. aIL6\n");
        assert!(format_order(None).contains("none"));
    }
}
