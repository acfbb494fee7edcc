use core_types::{Dim, Shape};
use graph::{InferStrategy, Node};

use crate::InferError;

/// Strategy a node gets before any extender has looked at it.
pub fn default_strategy(op_type: &str) -> InferStrategy {
    match op_type {
        "Parameter" | "Const" => InferStrategy::FromAttribute,
        "Result" | "Relu" | "Sigmoid" | "Tanh" | "Exp" | "Abs" | "Negative" | "Convert"
        | "Clamp" | "Softmax" => InferStrategy::Identity,
        "Add" | "Subtract" | "Multiply" | "Divide" | "Maximum" | "Minimum" | "Power" => {
            InferStrategy::Broadcast
        }
        _ => InferStrategy::Unspecified,
    }
}

/// Run `strategy` for `node`. `inputs` holds the runtime shapes of the node's
/// input ports in port order and is only consulted by strategies that read
/// inputs.
pub fn infer_node(
    node: &Node,
    strategy: InferStrategy,
    inputs: &[Shape],
) -> Result<Vec<Shape>, InferError> {
    match strategy {
        InferStrategy::FromIr => use_shapes_from_ir(node),
        InferStrategy::Identity => identity(node, inputs),
        InferStrategy::Broadcast => broadcast(node, inputs),
        InferStrategy::FromAttribute => from_attribute(node),
        InferStrategy::Unspecified => Err(InferError::NoInferStrategy {
            node: node.id(),
            op_type: node.op_type().to_string(),
        }),
    }
}

/// Copy the shapes the IR file stored on each output port, unchanged.
pub fn use_shapes_from_ir(node: &Node) -> Result<Vec<Shape>, InferError> {
    node.outputs()
        .iter()
        .map(|port| {
            port.ir_shape
                .clone()
                .ok_or(InferError::MissingIrShape { node: node.id(), port: port.id })
        })
        .collect()
}

fn identity(node: &Node, inputs: &[Shape]) -> Result<Vec<Shape>, InferError> {
    let first = inputs.first().ok_or_else(|| InferError::MissingInput {
        node: node.id(),
        port: node.inputs().first().map_or(0, |p| p.id),
    })?;
    Ok(vec![first.clone(); node.outputs().len()])
}

fn broadcast(node: &Node, inputs: &[Shape]) -> Result<Vec<Shape>, InferError> {
    let (first, rest) = inputs.split_first().ok_or_else(|| InferError::MissingInput {
        node: node.id(),
        port: node.inputs().first().map_or(0, |p| p.id),
    })?;
    let mut acc = first.clone();
    for rhs in rest {
        acc = broadcast_shapes(&acc, rhs).ok_or_else(|| InferError::IncompatibleBroadcast {
            node: node.id(),
            lhs: acc.clone(),
            rhs: rhs.clone(),
        })?;
    }
    Ok(vec![acc; node.outputs().len()])
}

fn from_attribute(node: &Node) -> Result<Vec<Shape>, InferError> {
    let text = node.attr("shape").ok_or_else(|| InferError::BadAttribute {
        node: node.id(),
        attr: "shape",
        reason: "is missing".to_string(),
    })?;
    let shape = Shape::parse(text).map_err(|e| InferError::BadAttribute {
        node: node.id(),
        attr: "shape",
        reason: format!("is not a shape: {e}"),
    })?;
    Ok(vec![shape; node.outputs().len()])
}

/// Numpy-style broadcast of two shapes, right-aligned.
///
/// A dynamic dimension against a static one other than `1` resolves to the
/// static extent; against `1` or another dynamic dimension it stays dynamic.
pub fn broadcast_shapes(lhs: &Shape, rhs: &Shape) -> Option<Shape> {
    let rank = lhs.rank().max(rhs.rank());
    let pad = |s: &Shape, i: usize| {
        let offset = rank - s.rank();
        if i < offset { Dim::Static(1) } else { s.dims()[i - offset] }
    };

    let dims = (0..rank)
        .map(|i| match (pad(lhs, i), pad(rhs, i)) {
            (a, b) if a == b => Some(a),
            (Dim::Static(1), other) | (other, Dim::Static(1)) => Some(other),
            (Dim::Dynamic, other) | (other, Dim::Dynamic) => Some(other),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Shape::new(dims))
}

/// Equal rank and every dimension pair equal, or at least one side dynamic.
pub fn shapes_compatible(a: &Shape, b: &Shape) -> bool {
    a.rank() == b.rank()
        && a.dims()
            .iter()
            .zip(b.dims())
            .all(|(x, y)| x == y || *x == Dim::Dynamic || *y == Dim::Dynamic)
}
