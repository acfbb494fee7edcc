use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::node::NodeId;

/// Kahn's algorithm over `nodes` and directed `(from, to)` pairs.
///
/// Ties are broken by the smallest id so the order is deterministic. On a
/// cycle, returns the ids that could not be scheduled.
pub fn topological_sort(
    nodes: impl IntoIterator<Item = NodeId>,
    edges: impl IntoIterator<Item = (NodeId, NodeId)>,
) -> Result<Vec<NodeId>, Vec<NodeId>> {
    let mut in_degree: BTreeMap<NodeId, usize> = nodes.into_iter().map(|n| (n, 0)).collect();
    let mut successors: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();

    for (from, to) in edges {
        successors.entry(from).or_default().push(to);
        *in_degree.entry(to).or_insert(0) += 1;
        in_degree.entry(from).or_insert(0);
    }

    let mut ready: BinaryHeap<Reverse<NodeId>> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&n, _)| Reverse(n))
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(Reverse(n)) = ready.pop() {
        order.push(n);
        for succ in successors.get(&n).into_iter().flatten() {
            if let Some(d) = in_degree.get_mut(succ) {
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(*succ));
                }
            }
        }
    }

    if order.len() == in_degree.len() {
        Ok(order)
    } else {
        let stuck = in_degree.into_iter().filter(|(_, d)| *d > 0).map(|(n, _)| n).collect();
        Err(stuck)
    }
}
