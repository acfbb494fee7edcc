use graph::{InferStrategy, NodeBuilder};

use crate::extender::{Extender, RegistrationInfo};


/// "Parameter": the graph input's shape lives in its `shape` attribute.
///
/// Older IRs spell the element type attribute `precision`; it is copied to
/// `element_type` when the latter is absent.
#[derive(Debug, Default)]
pub struct ParameterExtender;

impl ParameterExtender {
    pub fn new() -> Self {
        Self
    }
}

impl RegistrationInfo for ParameterExtender {
    const OP_TYPE: &'static str = "Parameter";
}

impl Extender for ParameterExtender {
    fn op_type(&self) -> &'static str { Self::OP_TYPE }

    fn extend(&self, node: &mut NodeBuilder) {
        if node.attr("element_type").is_none() {
            if let Some(precision) = node.attr("precision").map(str::to_string) {
                node.set_attr("element_type", precision.to_ascii_lowercase());
            }
        }
        node.set_infer(InferStrategy::FromAttribute);
    }
}
