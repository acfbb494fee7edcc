use graph::{InferStrategy, NodeBuilder};

use crate::extender::{Extender, RegistrationInfo};


/// "GRUSequence": output shapes are restored from the IR, never recomputed
#[derive(Debug, Default)]
pub struct GruSequenceExtender;

impl GruSequenceExtender {
    pub fn new() -> Self {
        Self
    }
}

impl RegistrationInfo for GruSequenceExtender {
    const OP_TYPE: &'static str = "GRUSequence";
}

impl Extender for GruSequenceExtender {
    fn op_type(&self) -> &'static str { Self::OP_TYPE }

    fn extend(&self, node: &mut NodeBuilder) {
        node.set_infer(InferStrategy::FromIr);
    }
}
