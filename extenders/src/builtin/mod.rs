mod gru_sequence;
mod parameter;
mod recurrent;

pub use gru_sequence::GruSequenceExtender;
pub use parameter::ParameterExtender;
pub use recurrent::{LstmSequenceExtender, RnnSequenceExtender};

use crate::ExtenderRegistry;

/// Register every extender shipped with this crate.
pub fn register_all(registry: &mut ExtenderRegistry) {
    registry.register(GruSequenceExtender::new());
    registry.register(LstmSequenceExtender::new());
    registry.register(RnnSequenceExtender::new());
    registry.register(ParameterExtender::new());
}
