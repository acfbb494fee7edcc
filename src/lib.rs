//! Restores operator graphs from serialized IR documents.
//!
//! Layers are read into raw records, finalized by per-operator extenders
//! (see [`extenders`]) and then given runtime output shapes by the shape
//! inference engine (see [`infer`]).

pub use core_types;
pub use graph;
pub use irloom_extenders as extenders;
pub use irloom_infer as infer;
pub use reader;

pub use ::graph::{Graph, InferStrategy, Node, NodeId};
pub use irloom_extenders::{Extender, ExtenderRegistry};
pub use ::reader::{restore_graph_from_ir, IrReader, ReadError, ReaderConfig};
