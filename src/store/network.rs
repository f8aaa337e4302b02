//! The output causal network: a directed graph over cohort variables.

use super::types::{Edge, EdgeSet, Variable};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) graph: DiGraph<Variable, ()>,
    // Name -> node lookup, one node per variable.
    index: HashMap<Variable, NodeIndex>,
}

impl Network {
    pub fn new() -> Self { Self::default() }

    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Self {
        let mut net = Self::new();
        for edge in edges {
            net.add_edge(edge);
        }
        net
    }

    /// Returns the node for `var`, creating it on first use.
    pub fn ensure_node(&mut self, var: &Variable) -> NodeIndex {
        if let Some(&idx) = self.index.get(var) {
            return idx;
        }
        let idx = self.graph.add_node(var.clone());
        self.index.insert(var.clone(), idx);
        idx
    }

    /// Adds `edge` unless it is already present. Returns whether it was new.
    pub fn add_edge(&mut self, edge: &Edge) -> bool {
        let s = self.ensure_node(&edge.source);
        let t = self.ensure_node(&edge.target);
        if self.graph.contains_edge(s, t) {
            return false;
        }
        self.graph.add_edge(s, t, ());
        true
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        match (self.index.get(&edge.source), self.index.get(&edge.target)) {
            (Some(&s), Some(&t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize { self.graph.node_count() }
    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    /// Variables in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    pub fn node(&self, var: &Variable) -> Option<NodeIndex> { self.index.get(var).copied() }
    pub fn variable(&self, idx: NodeIndex) -> &Variable { &self.graph[idx] }

    /// All edges in lexicographic order.
    pub fn edges(&self) -> EdgeSet {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(s, t)| Edge { source: self.graph[s].clone(), target: self.graph[t].clone() })
            .collect()
    }

    /// Writes one `source<delimiter>target` line per edge, no header.
    pub fn write_edgelist<W: Write>(&self, mut out: W, delimiter: &str) -> io::Result<()> {
        for edge in self.edges() {
            writeln!(out, "{}{}{}", edge.source, delimiter, edge.target)?;
        }
        out.flush()
    }

    /// Reads a file produced by `write_edgelist`. Blank lines and `#` comments are skipped.
    pub fn read_edgelist<R: BufRead>(input: R, delimiter: &str) -> io::Result<Self> {
        let mut net = Self::new();
        for (lineno, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split(delimiter).filter(|p| !p.is_empty());
            match (parts.next(), parts.next(), parts.next()) {
                (Some(s), Some(t), None) => {
                    net.add_edge(&Edge::new(s, t));
                }
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {}: expected '<source>{}<target>', got '{}'", lineno + 1, delimiter, line),
                    ));
                }
            }
        }
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::edge_set;

    #[test]
    fn test_duplicate_edges_are_collapsed() {
        let mut net = Network::new();
        assert!(net.add_edge(&Edge::new("A", "B")));
        assert!(!net.add_edge(&Edge::new("A", "B")));
        assert!(net.add_edge(&Edge::new("B", "A")));

        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn test_edgelist_is_sorted_and_headerless() {
        let edges = edge_set([("b", "c"), ("a", "c"), ("a", "b")]);
        let net = Network::from_edges(&edges);

        let mut buf = Vec::new();
        net.write_edgelist(&mut buf, " ").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a b\na c\nb c\n");
    }

    #[test]
    fn test_edgelist_read_back() {
        let edges = edge_set([("Sexe", "aHDL_C"), ("aHDL_C", "amet_syn2")]);
        let mut buf = Vec::new();
        Network::from_edges(&edges).write_edgelist(&mut buf, " ").unwrap();

        let net = Network::read_edgelist(buf.as_slice(), " ").unwrap();
        assert_eq!(net.edges(), edges);
    }

    #[test]
    fn test_edgelist_rejects_malformed_line() {
        let err = Network::read_edgelist("a b\na b c\n".as_bytes(), " ").unwrap_err();
        assert!(err.to_string().contains("line 2"), "Msg: {}", err);
    }
}
