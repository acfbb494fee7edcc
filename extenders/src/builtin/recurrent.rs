use graph::{InferStrategy, NodeBuilder};

use crate::extender::{Extender, RegistrationInfo};


/// "LSTMSequence": shapes restored from the IR
#[derive(Debug, Default)]
pub struct LstmSequenceExtender;

impl LstmSequenceExtender {
    pub fn new() -> Self {
        Self
    }
}

impl RegistrationInfo for LstmSequenceExtender {
    const OP_TYPE: &'static str = "LSTMSequence";
}

impl Extender for LstmSequenceExtender {
    fn op_type(&self) -> &'static str { Self::OP_TYPE }

    fn extend(&self, node: &mut NodeBuilder) {
        node.set_infer(InferStrategy::FromIr);
    }
}


/// "RNNSequence": shapes restored from the IR
#[derive(Debug, Default)]
pub struct RnnSequenceExtender;

impl RnnSequenceExtender {
    pub fn new() -> Self {
        Self
    }
}

impl RegistrationInfo for RnnSequenceExtender {
    const OP_TYPE: &'static str = "RNNSequence";
}

impl Extender for RnnSequenceExtender {
    fn op_type(&self) -> &'static str { Self::OP_TYPE }

    fn extend(&self, node: &mut NodeBuilder) {
        node.set_infer(InferStrategy::FromIr);
    }
}
