use crate::store::{Edge, Network, TierMap, Variable};
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Cycle detected involving variable '{0}'")]
    Cycle(Variable),
}

/// Performs a topological sort using depth-first search.
///
/// Causes appear before their effects. Ties follow node insertion order, so the
/// result is stable for a given network.
pub fn sort(network: &Network) -> Result<Vec<Variable>, TopologyError> {
    let graph = &network.graph;
    let count = graph.node_count();
    let mut state = vec![VisitState::None; count];
    let mut order = Vec::with_capacity(count);

    // Visit every node so disconnected variables are included.
    for idx in graph.node_indices() {
        if state[idx.index()] == VisitState::None {
            visit(idx, network, &mut state, &mut order)?;
        }
    }

    // Post-order on incoming edges yields parents first.
    Ok(order.into_iter().map(|idx| network.variable(idx).clone()).collect())
}

#[derive(Clone, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

fn visit(
    node: NodeIndex,
    network: &Network,
    state: &mut Vec<VisitState>,
    order: &mut Vec<NodeIndex>,
) -> Result<(), TopologyError> {
    let idx = node.index();

    match state[idx] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => return Err(TopologyError::Cycle(network.variable(node).clone())),
        VisitState::None => state[idx] = VisitState::Visiting,
    }

    for parent in network.graph.neighbors_directed(node, Direction::Incoming) {
        visit(parent, network, state, order)?;
    }

    state[idx] = VisitState::Visited;
    order.push(node);
    Ok(())
}

/// Strongly connected components with more than one variable, i.e. the cycles.
///
/// Each component is sorted by name; components are sorted by their first member.
pub fn find_cycles(network: &Network) -> Vec<Vec<Variable>> {
    let mut cycles: Vec<Vec<Variable>> = tarjan_scc(&network.graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut vars: Vec<Variable> = scc.into_iter().map(|i| network.variable(i).clone()).collect();
            vars.sort();
            vars
        })
        .collect();
    cycles.sort();
    cycles
}

/// Edges of `network` that point backwards in time under `tiers`.
///
/// Empty for any network produced by the refiner with the same tiers.
pub fn temporal_violations(network: &Network, tiers: &TierMap) -> Vec<Edge> {
    network.edges().into_iter().filter(|e| !tiers.allows(e)).collect()
}
