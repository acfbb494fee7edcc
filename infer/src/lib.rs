mod error;
pub mod strategies;

use core_types::Shape;
use graph::{Graph, InferStrategy, Node, NodeId};
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};

pub use error::InferError;
pub use strategies::{broadcast_shapes, default_strategy, infer_node, use_shapes_from_ir};


/// Knobs for [`ShapeInferenceEngine`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferOptions {
    /// Nodes without a strategy reuse the shapes stored in the IR instead of failing
    pub fallback_to_ir_shapes: bool,
    /// Computed shapes must agree with the shapes stored in the IR
    pub verify_against_ir: bool,
}

/// What a run did, node by node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferReport {
    pub visited:   usize,
    pub from_ir:   usize,
    pub computed:  usize,
    pub fallbacks: usize,
}

/// Walks a graph in topological order and writes every node's runtime output shapes.
pub struct ShapeInferenceEngine {
    options: InferOptions,
}

impl ShapeInferenceEngine {
    pub fn new(options: InferOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> InferOptions {
        self.options
    }

    #[instrument(skip_all, fields(graph = %graph.name(), nodes = graph.len()))]
    pub fn run(&self, graph: &mut Graph) -> Result<InferReport, InferError> {
        let order = graph.topological_order()?;
        let mut report = InferReport::default();

        for id in order {
            let (strategy, shapes) = {
                let node = graph.node(id).ok_or(graph::GraphError::UnknownNode(id))?;
                let strategy = self.effective_strategy(node, &mut report);
                let inputs = if strategy.reads_inputs() {
                    gather_inputs(graph, node)?
                } else {
                    Vec::new()
                };
                if self.options.verify_against_ir && strategy == InferStrategy::FromIr {
                    verify_inputs(graph, node)?;
                }
                let shapes = infer_node(node, strategy, &inputs)?;
                if self.options.verify_against_ir && strategy != InferStrategy::FromIr {
                    verify(node, &shapes)?;
                }
                (strategy, shapes)
            };

            trace!(node = %id, %strategy, ?shapes, "inferred");
            if let Some(node) = graph.node_mut(id) {
                node.set_output_shapes(shapes)?;
            }

            report.visited += 1;
            if strategy == InferStrategy::FromIr {
                report.from_ir += 1;
            } else {
                report.computed += 1;
            }
        }

        debug!(?report, "shape inference finished");
        Ok(report)
    }

    fn effective_strategy(&self, node: &Node, report: &mut InferReport) -> InferStrategy {
        match node.infer() {
            InferStrategy::Unspecified if self.options.fallback_to_ir_shapes => {
                warn!(
                    node = %node.id(),
                    op_type = node.op_type(),
                    "no shape inference strategy, falling back to IR shapes"
                );
                report.fallbacks += 1;
                InferStrategy::FromIr
            }
            other => other,
        }
    }
}

/// Runtime shapes reaching each input port of `node`, in port order
fn gather_inputs(graph: &Graph, node: &Node) -> Result<Vec<Shape>, InferError> {
    node.inputs()
        .iter()
        .map(|port| {
            let missing = || InferError::MissingInput { node: node.id(), port: port.id };
            let edge = graph.producer(node.id(), port.id).ok_or_else(missing)?;
            graph
                .node(edge.from)
                .and_then(|p| p.output(edge.from_port))
                .and_then(|p| p.shape())
                .cloned()
                .ok_or_else(missing)
        })
        .collect()
}

/// Stored outputs are only trusted when the shapes arriving at the node match
/// the input shapes the IR recorded. Unconnected ports and ports without a
/// recorded shape are skipped.
fn verify_inputs(graph: &Graph, node: &Node) -> Result<(), InferError> {
    for port in node.inputs() {
        let Some(stored) = &port.ir_shape else { continue };
        let incoming = graph
            .producer(node.id(), port.id)
            .and_then(|e| graph.node(e.from).and_then(|p| p.output(e.from_port)))
            .and_then(|p| p.shape());
        if let Some(incoming) = incoming {
            if !strategies::shapes_compatible(incoming, stored) {
                return Err(InferError::InputShapeMismatch {
                    node: node.id(),
                    port: port.id,
                    incoming: incoming.clone(),
                    stored: stored.clone(),
                });
            }
        }
    }
    Ok(())
}

fn verify(node: &Node, shapes: &[Shape]) -> Result<(), InferError> {
    for (port, inferred) in node.outputs().iter().zip(shapes) {
        if let Some(stored) = &port.ir_shape {
            if !strategies::shapes_compatible(inferred, stored) {
                return Err(InferError::ShapeMismatch {
                    node: node.id(),
                    port: port.id,
                    inferred: inferred.clone(),
                    stored: stored.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Shapes of `id`'s outputs after a run, `None` where not yet inferred
pub fn output_shapes(graph: &Graph, id: NodeId) -> Option<Vec<Option<Shape>>> {
    graph
        .node(id)
        .map(|n| n.output_shapes().into_iter().map(|s| s.cloned()).collect())
}


/* ------------------------------------------------------------------------- */
/*                                  Tests                                    */
/* ------------------------------------------------------------------------- */
