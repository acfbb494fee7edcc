use core_types::{ElementType, Shape};

/// Consumer side of a node; `ir_shape` is the shape the file recorded, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPort {
    pub id:       u32,
    pub ir_shape: Option<Shape>,
}

impl InputPort {
    pub fn new(id: u32, ir_shape: Option<Shape>) -> Self {
        Self { id, ir_shape }
    }
}

/// Producer side of a node.
///
/// `ir_shape` holds what was serialized; `shape` is the runtime value written
/// by shape inference and stays `None` until inference has visited the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPort {
    pub id:           u32,
    pub element_type: Option<ElementType>,
    pub ir_shape:     Option<Shape>,
    shape:            Option<Shape>,
}

impl OutputPort {
    pub fn new(id: u32, element_type: Option<ElementType>, ir_shape: Option<Shape>) -> Self {
        Self { id, element_type, ir_shape, shape: None }
    }

    /// Runtime shape, once inferred
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub(crate) fn set_shape(&mut self, shape: Option<Shape>) {
        self.shape = shape;
    }
}
