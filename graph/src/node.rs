use std::collections::BTreeMap;

use core_types::Shape;
use derive_more::{Display, From};

use crate::port::{InputPort, OutputPort};
use crate::GraphError;

/// Layer id as written in the IR file
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[display("{_0}")]
pub struct NodeId(pub u64);

/// Operator attributes, kept as the strings the IR stores them as
pub type Attributes = BTreeMap<String, String>;

/// How a node's output shapes are obtained when inference runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum InferStrategy {
    /// Trust the per-port shapes stored in the IR file
    #[display("from-ir")]
    FromIr,
    /// Every output takes the shape of input 0
    #[display("identity")]
    Identity,
    /// Numpy-style broadcast across all inputs
    #[display("broadcast")]
    Broadcast,
    /// Parse the `shape` attribute
    #[display("from-attribute")]
    FromAttribute,
    #[default]
    #[display("unspecified")]
    Unspecified,
}

impl InferStrategy {
    /// Whether the strategy looks at the shapes flowing into the node
    pub fn reads_inputs(self) -> bool {
        matches!(self, InferStrategy::Identity | InferStrategy::Broadcast)
    }
}

/// A layer exactly as deserialized, before any extender has seen it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub id:      NodeId,
    pub name:    String,
    pub op_type: String,
    pub version: Option<String>,
    pub attrs:   Attributes,
    pub inputs:  Vec<InputPort>,
    pub outputs: Vec<OutputPort>,
}

/// Finalization stage between a [`RawNode`] and a [`Node`].
///
/// Extenders receive a `&mut NodeBuilder`; the only things they can change are
/// the inference strategy and attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBuilder {
    raw:   RawNode,
    infer: InferStrategy,
}

impl NodeBuilder {
    pub fn new(raw: RawNode) -> Self {
        Self { raw, infer: InferStrategy::Unspecified }
    }

    pub fn with_infer(mut self, infer: InferStrategy) -> Self {
        self.infer = infer;
        self
    }

    pub fn id(&self) -> NodeId { self.raw.id }
    pub fn name(&self) -> &str { &self.raw.name }
    pub fn op_type(&self) -> &str { &self.raw.op_type }
    pub fn version(&self) -> Option<&str> { self.raw.version.as_deref() }
    pub fn attrs(&self) -> &Attributes { &self.raw.attrs }
    pub fn inputs(&self) -> &[InputPort] { &self.raw.inputs }
    pub fn outputs(&self) -> &[OutputPort] { &self.raw.outputs }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.raw.attrs.get(key).map(String::as_str)
    }

    pub fn infer(&self) -> InferStrategy {
        self.infer
    }

    pub fn set_infer(&mut self, infer: InferStrategy) {
        self.infer = infer;
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.raw.attrs.insert(key.into(), value.into())
    }

    pub fn finish(self) -> Node {
        let RawNode { id, name, op_type, version, attrs, inputs, outputs } = self.raw;
        Node { id, name, op_type, version, attrs, inputs, outputs, infer: self.infer }
    }
}

/// A fully initialized operator instance owned by a [`crate::Graph`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id:      NodeId,
    name:    String,
    op_type: String,
    version: Option<String>,
    attrs:   Attributes,
    inputs:  Vec<InputPort>,
    outputs: Vec<OutputPort>,
    infer:   InferStrategy,
}

impl Node {
    pub fn id(&self) -> NodeId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn op_type(&self) -> &str { &self.op_type }
    pub fn version(&self) -> Option<&str> { self.version.as_deref() }
    pub fn attrs(&self) -> &Attributes { &self.attrs }
    pub fn inputs(&self) -> &[InputPort] { &self.inputs }
    pub fn outputs(&self) -> &[OutputPort] { &self.outputs }
    pub fn infer(&self) -> InferStrategy { self.infer }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn input(&self, port: u32) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.id == port)
    }

    pub fn output(&self, port: u32) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.id == port)
    }

    /// Runtime shapes of all outputs, in port order
    pub fn output_shapes(&self) -> Vec<Option<&Shape>> {
        self.outputs.iter().map(OutputPort::shape).collect()
    }

    /// Write runtime shapes, one per output port in port order.
    pub fn set_output_shapes(&mut self, shapes: Vec<Shape>) -> Result<(), GraphError> {
        if shapes.len() != self.outputs.len() {
            return Err(GraphError::OutputCountMismatch {
                node: self.id,
                expected: self.outputs.len(),
                found: shapes.len(),
            });
        }
        for (port, shape) in self.outputs.iter_mut().zip(shapes) {
            port.set_shape(Some(shape));
        }
        Ok(())
    }

    pub fn clear_output_shapes(&mut self) {
        for port in &mut self.outputs {
            port.set_shape(None);
        }
    }
}
