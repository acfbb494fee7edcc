use core_types::Shape;
use graph::{GraphError, NodeId};
use thiserror::Error;

/// Errors raised while propagating shapes through a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    #[error("node {node}: output port {port} has no shape stored in the IR")]
    MissingIrShape { node: NodeId, port: u32 },
    #[error("node {node}: input port {port} is not connected or its producer has no shape")]
    MissingInput { node: NodeId, port: u32 },
    #[error("node {node} ({op_type}) has no shape inference strategy")]
    NoInferStrategy { node: NodeId, op_type: String },
    #[error("node {node}: cannot broadcast {lhs} with {rhs}")]
    IncompatibleBroadcast { node: NodeId, lhs: Shape, rhs: Shape },
    #[error("node {node}: attribute '{attr}' {reason}")]
    BadAttribute { node: NodeId, attr: &'static str, reason: String },
    #[error("node {node}: inferred {inferred} on port {port} but the IR stores {stored}")]
    ShapeMismatch { node: NodeId, port: u32, inferred: Shape, stored: Shape },
    #[error("node {node}: input port {port} receives {incoming} but the IR recorded {stored}")]
    InputShapeMismatch { node: NodeId, port: u32, incoming: Shape, stored: Shape },
    #[error(transparent)]
    Graph(#[from] GraphError),
}
