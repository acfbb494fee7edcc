pub mod node;
pub mod port;
mod utils;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

pub use node::{Attributes, InferStrategy, Node, NodeBuilder, NodeId, RawNode};
pub use port::{InputPort, OutputPort};
pub use utils::topological_sort;

/// Connection from an output port of one node to an input port of another
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from:      NodeId,
    pub from_port: u32,
    pub to:        NodeId,
    pub to_port:   u32,
}

impl Edge {
    pub fn new(from: NodeId, from_port: u32, to: NodeId, to_port: u32) -> Self {
        Self { from, from_port, to, to_port }
    }
}

/// Errors while building or traversing a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("node {node} has no {kind} port {port}")]
    UnknownPort { node: NodeId, port: u32, kind: &'static str },
    #[error("node {node} declares {kind} port {port} more than once")]
    DuplicatePort { node: NodeId, port: u32, kind: &'static str },
    #[error("input port {port} of node {node} is already connected")]
    InputAlreadyConnected { node: NodeId, port: u32 },
    #[error("node {node} has {expected} output ports but {found} shapes were given")]
    OutputCountMismatch { node: NodeId, expected: usize, found: usize },
    #[error("graph contains a cycle through nodes {0:?}")]
    Cycle(Vec<NodeId>),
}

/// Operator graph: nodes keyed by IR layer id plus port-level edges
#[derive(Debug, Clone, Default)]
pub struct Graph {
    name:    String,
    version: u32,
    nodes:   BTreeMap<NodeId, Node>,
    edges:   Vec<Edge>,
    /// `(consumer, input port)` -> index into `edges`
    feeds:   BTreeMap<(NodeId, u32), usize>,
}

impl Graph {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self { name: name.into(), version, nodes: BTreeMap::new(), edges: Vec::new(), feeds: BTreeMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// IR format version the graph was read from
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        check_unique_ports(id, node.inputs().iter().map(|p| p.id), "input")?;
        check_unique_ports(id, node.outputs().iter().map(|p| p.id), "output")?;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Connect two existing ports. Every input port accepts at most one edge.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let from = self.nodes.get(&edge.from).ok_or(GraphError::UnknownNode(edge.from))?;
        if from.output(edge.from_port).is_none() {
            return Err(GraphError::UnknownPort { node: edge.from, port: edge.from_port, kind: "output" });
        }
        let to = self.nodes.get(&edge.to).ok_or(GraphError::UnknownNode(edge.to))?;
        if to.input(edge.to_port).is_none() {
            return Err(GraphError::UnknownPort { node: edge.to, port: edge.to_port, kind: "input" });
        }
        if self.feeds.contains_key(&(edge.to, edge.to_port)) {
            return Err(GraphError::InputAlreadyConnected { node: edge.to, port: edge.to_port });
        }
        self.feeds.insert((edge.to, edge.to_port), self.edges.len());
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_of_type<'a>(&'a self, op_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.op_type() == op_type)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The edge feeding input `port` of `node`, if connected
    pub fn producer(&self, node: NodeId, port: u32) -> Option<&Edge> {
        self.feeds.get(&(node, port)).and_then(|&i| self.edges.get(i))
    }

    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == node)
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == node)
    }

    /// Node ids ordered so every producer precedes its consumers.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        topological_sort(
            self.nodes.keys().copied(),
            self.edges.iter().map(|e| (e.from, e.to)),
        )
        .map_err(GraphError::Cycle)
    }
}

fn check_unique_ports(
    node: NodeId,
    ids: impl Iterator<Item = u32>,
    kind: &'static str,
) -> Result<(), GraphError> {
    let mut seen = BTreeSet::new();
    for port in ids {
        if !seen.insert(port) {
            return Err(GraphError::DuplicatePort { node, port, kind });
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ElementType, Shape};

    fn node(id: u64, op_type: &str, n_in: u32, n_out: u32) -> Node {
        NodeBuilder::new(RawNode {
            id: NodeId(id),
            name: format!("{op_type}_{id}"),
            op_type: op_type.into(),
            version: None,
            attrs: Attributes::new(),
            inputs: (0..n_in).map(|p| InputPort::new(p, None)).collect(),
            outputs: (n_in..n_in + n_out)
                .map(|p| OutputPort::new(p, Some(ElementType::F32), Some(Shape::from_static(&[4]))))
                .collect(),
        })
        .finish()
    }

    fn chain() -> Graph {
        // 0:Parameter -> 1:Relu -> 2:Add <- 0, 2 -> 3:Result
        let mut g = Graph::new("chain", 11);
        g.add_node(node(0, "Parameter", 0, 1)).unwrap();
        g.add_node(node(1, "Relu", 1, 1)).unwrap();
        g.add_node(node(2, "Add", 2, 1)).unwrap();
        g.add_node(node(3, "Result", 1, 0)).unwrap();
        g.add_edge(Edge::new(NodeId(0), 0, NodeId(1), 0)).unwrap();
        g.add_edge(Edge::new(NodeId(1), 1, NodeId(2), 0)).unwrap();
        g.add_edge(Edge::new(NodeId(0), 0, NodeId(2), 1)).unwrap();
        g.add_edge(Edge::new(NodeId(2), 2, NodeId(3), 0)).unwrap();
        g
    }

    #[test]
    fn build_and_query() {
        let g = chain();
        assert_eq!(g.name(), "chain");
        assert_eq!(g.version(), 11);
        assert_eq!(g.len(), 4);
        assert!(!g.is_empty());
        assert_eq!(g.nodes_of_type("Add").count(), 1);
        assert_eq!(g.in_edges(NodeId(2)).count(), 2);
        assert_eq!(g.out_edges(NodeId(0)).count(), 2);
        assert_eq!(g.producer(NodeId(2), 1).map(|e| e.from), Some(NodeId(0)));
        assert!(g.producer(NodeId(0), 0).is_none());
        assert_eq!(
            g.topological_order().unwrap(),
            vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]
        );
    }

    #[test]
    fn rejects_bad_nodes_and_edges() {
        let mut g = chain();
        assert_eq!(g.add_node(node(1, "Relu", 1, 1)), Err(GraphError::DuplicateNode(NodeId(1))));
        assert_eq!(
            g.add_edge(Edge::new(NodeId(9), 0, NodeId(1), 0)),
            Err(GraphError::UnknownNode(NodeId(9)))
        );
        assert_eq!(
            g.add_edge(Edge::new(NodeId(0), 5, NodeId(1), 0)),
            Err(GraphError::UnknownPort { node: NodeId(0), port: 5, kind: "output" })
        );
        assert_eq!(
            g.add_edge(Edge::new(NodeId(0), 0, NodeId(3), 1)),
            Err(GraphError::UnknownPort { node: NodeId(3), port: 1, kind: "input" })
        );
        assert_eq!(
            g.add_edge(Edge::new(NodeId(0), 0, NodeId(1), 0)),
            Err(GraphError::InputAlreadyConnected { node: NodeId(1), port: 0 })
        );
    }

    #[test]
    fn repeated_port_ids_are_rejected() {
        let mut g = Graph::new("ports", 11);
        let twin_inputs = NodeBuilder::new(RawNode {
            id: NodeId(0),
            name: "add".into(),
            op_type: "Add".into(),
            version: None,
            attrs: Attributes::new(),
            inputs: vec![InputPort::new(0, None), InputPort::new(0, None)],
            outputs: vec![OutputPort::new(2, Some(ElementType::F32), None)],
        })
        .finish();
        assert_eq!(
            g.add_node(twin_inputs),
            Err(GraphError::DuplicatePort { node: NodeId(0), port: 0, kind: "input" })
        );

        let twin_outputs = NodeBuilder::new(RawNode {
            id: NodeId(1),
            name: "split".into(),
            op_type: "Split".into(),
            version: None,
            attrs: Attributes::new(),
            inputs: vec![InputPort::new(0, None)],
            outputs: vec![
                OutputPort::new(1, Some(ElementType::F32), None),
                OutputPort::new(1, Some(ElementType::F32), None),
            ],
        })
        .finish();
        assert_eq!(
            g.add_node(twin_outputs),
            Err(GraphError::DuplicatePort { node: NodeId(1), port: 1, kind: "output" })
        );
        assert!(g.is_empty());
    }

    #[test]
    fn producer_lookup_follows_insertion() {
        let mut g = Graph::new("fan", 11);
        g.add_node(node(0, "Parameter", 0, 1)).unwrap();
        g.add_node(node(1, "Concat", 64, 1)).unwrap();
        for port in (0..64).rev() {
            g.add_edge(Edge::new(NodeId(0), 0, NodeId(1), port)).unwrap();
        }
        for port in 0..64 {
            let e = g.producer(NodeId(1), port).unwrap();
            assert_eq!((e.from, e.to_port), (NodeId(0), port));
        }
        assert_eq!(g.edges()[0].to_port, 63);
        assert!(g.producer(NodeId(1), 64).is_none());
    }

    #[test]
    fn cycle_is_reported() {
        let mut g = Graph::new("loop", 11);
        g.add_node(node(0, "Add", 2, 1)).unwrap();
        g.add_node(node(1, "Relu", 1, 1)).unwrap();
        g.add_edge(Edge::new(NodeId(0), 2, NodeId(1), 0)).unwrap();
        g.add_edge(Edge::new(NodeId(1), 1, NodeId(0), 0)).unwrap();
        assert_eq!(
            g.topological_order(),
            Err(GraphError::Cycle(vec![NodeId(0), NodeId(1)]))
        );
    }
}
