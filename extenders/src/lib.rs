pub mod extender;
pub mod builtin;

use std::collections::HashMap;

use graph::NodeBuilder;
use tracing::{debug, trace, warn};

pub use extender::{Extender, ExtenderFactory, RegistrationInfo};
pub use inventory;


/// Register an extender with the inventory system.
///
/// Registered extenders are picked up by [`ExtenderRegistry::collect_inventory`].
#[macro_export]
macro_rules! register_extender {
    ($ext_type:ident) => {
        $crate::inventory::submit! {
            $crate::ExtenderFactory {
                op_type: <$ext_type as $crate::RegistrationInfo>::OP_TYPE,
                factory: || Box::new($ext_type::new()),
            }
        }
    };
}


/// Maps operator type tags to the extender finalizing nodes of that type
#[derive(Default)]
pub struct ExtenderRegistry {
    map: HashMap<&'static str, Box<dyn Extender>>,
}

impl ExtenderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Registry holding every extender in [`builtin`]
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        builtin::register_all(&mut reg);
        reg
    }

    /// Add extenders submitted with [`register_extender!`]. Tags that are
    /// already registered keep their current extender.
    pub fn collect_inventory(&mut self) {
        for factory in inventory::iter::<ExtenderFactory> {
            if self.map.contains_key(factory.op_type) {
                debug!(op_type = factory.op_type, "inventory extender shadowed by explicit registration");
                continue;
            }
            self.register_boxed(factory.op_type, (factory.factory)());
        }
    }

    /// Register an extender under its own op type, returning any extender it replaced
    pub fn register<E: Extender + 'static>(&mut self, ext: E) -> Option<Box<dyn Extender>> {
        let op_type = ext.op_type();
        self.register_boxed(op_type, Box::new(ext))
    }

    /// Register a boxed extender with an explicit op type
    pub fn register_boxed(
        &mut self,
        op_type: &'static str,
        ext: Box<dyn Extender>,
    ) -> Option<Box<dyn Extender>> {
        let previous = self.map.insert(op_type, ext);
        if previous.is_some() {
            warn!(op_type, "extender replaced");
        } else {
            trace!(op_type, "extender registered");
        }
        previous
    }

    pub fn get(&self, op_type: &str) -> Option<&dyn Extender> {
        self.map.get(op_type).map(|b| b.as_ref())
    }

    pub fn contains(&self, op_type: &str) -> bool {
        self.map.contains_key(op_type)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered op types, sorted
    pub fn op_types(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.map.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Run the extender matching `node`'s op type, if any.
    ///
    /// Returns whether an extender ran. Nodes of unregistered types are left untouched.
    pub fn apply(&self, node: &mut NodeBuilder) -> bool {
        match self.map.get(node.op_type()) {
            Some(ext) => {
                ext.extend(node);
                trace!(node = %node.id(), op_type = node.op_type(), infer = %node.infer(), "extender applied");
                true
            }
            None => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use builtin::GruSequenceExtender;
    use core_types::{ElementType, Shape};
    use graph::{Attributes, InferStrategy, InputPort, NodeId, OutputPort, RawNode};
    use proptest::prelude::*;

    fn raw(op_type: &str) -> RawNode {
        RawNode {
            id: NodeId(4),
            name: "seq".into(),
            op_type: op_type.into(),
            version: Some("opset5".into()),
            attrs: Attributes::from([
                ("hidden_size".to_string(), "16".to_string()),
                ("direction".to_string(), "forward".to_string()),
            ]),
            inputs: vec![
                InputPort::new(0, Some(Shape::from_static(&[1, 8, 16]))),
                InputPort::new(1, Some(Shape::from_static(&[1, 1, 16]))),
            ],
            outputs: vec![
                OutputPort::new(2, Some(ElementType::F32), Some(Shape::from_static(&[1, 8, 16]))),
                OutputPort::new(3, Some(ElementType::F32), Some(Shape::from_static(&[1, 8, 16]))),
            ],
        }
    }

    #[test]
    fn gru_sequence_uses_shapes_from_ir() {
        let reg = ExtenderRegistry::with_builtins();
        let mut node = NodeBuilder::new(raw("GRUSequence"));
        let before = node.clone();

        assert!(reg.apply(&mut node));
        assert_eq!(node.infer(), InferStrategy::FromIr);

        // only the inference slot changed
        assert_eq!(node, before.with_infer(InferStrategy::FromIr));
    }

    #[test]
    fn gru_sequence_is_idempotent() {
        let ext = GruSequenceExtender::new();
        let mut once = NodeBuilder::new(raw("GRUSequence"));
        ext.extend(&mut once);
        let mut twice = once.clone();
        ext.extend(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn other_op_types_are_left_alone() {
        let reg = ExtenderRegistry::with_builtins();
        for op_type in ["GRUCell", "Relu", "gru_sequence", "GRUSequenceX"] {
            let mut node = NodeBuilder::new(raw(op_type)).with_infer(InferStrategy::Identity);
            let before = node.clone();
            assert!(!reg.apply(&mut node), "{op_type} should have no extender");
            assert_eq!(node, before);
        }
    }

    #[test]
    fn builtin_catalog() {
        let reg = ExtenderRegistry::with_builtins();
        assert_eq!(reg.op_types(), vec!["GRUSequence", "LSTMSequence", "Parameter", "RNNSequence"]);
        assert_eq!(reg.get("GRUSequence").map(|e| e.op_type()), Some("GRUSequence"));
        assert!(reg.get("Add").is_none());
        assert!(ExtenderRegistry::new().is_empty());
    }

    #[test]
    fn recurrent_sequences_restore_from_ir() {
        let reg = ExtenderRegistry::with_builtins();
        for op_type in ["LSTMSequence", "RNNSequence"] {
            let mut node = NodeBuilder::new(raw(op_type));
            assert!(reg.apply(&mut node));
            assert_eq!(node.infer(), InferStrategy::FromIr);
        }
    }

    #[test]
    fn parameter_normalizes_precision() {
        let reg = ExtenderRegistry::with_builtins();
        let mut r = raw("Parameter");
        r.attrs = Attributes::from([
            ("shape".to_string(), "1,8,16".to_string()),
            ("precision".to_string(), "FP32".to_string()),
        ]);
        let mut node = NodeBuilder::new(r);
        assert!(reg.apply(&mut node));
        assert_eq!(node.infer(), InferStrategy::FromAttribute);
        assert_eq!(node.attr("element_type"), Some("fp32"));

        let snapshot = node.clone();
        reg.apply(&mut node);
        assert_eq!(node, snapshot);
    }

    #[test]
    fn replacing_an_extender_returns_the_old_one() {
        struct Recompute;
        impl Extender for Recompute {
            fn op_type(&self) -> &'static str { "GRUSequence" }
            fn extend(&self, node: &mut NodeBuilder) { node.set_infer(InferStrategy::Identity); }
        }

        let mut reg = ExtenderRegistry::with_builtins();
        assert!(reg.register(Recompute).is_some());
        assert_eq!(reg.len(), 4);

        let mut node = NodeBuilder::new(raw("GRUSequence"));
        reg.apply(&mut node);
        assert_eq!(node.infer(), InferStrategy::Identity);
    }

    /// Submitted through the inventory only
    struct TopKProbe;

    impl TopKProbe {
        fn new() -> Self { Self }
    }

    impl RegistrationInfo for TopKProbe {
        const OP_TYPE: &'static str = "TopKProbe";
    }

    impl Extender for TopKProbe {
        fn op_type(&self) -> &'static str { Self::OP_TYPE }
        fn extend(&self, node: &mut NodeBuilder) { node.set_infer(InferStrategy::FromIr); }
    }

    crate::register_extender!(TopKProbe);

    #[test]
    fn inventory_collection() {
        let mut reg = ExtenderRegistry::new();
        reg.collect_inventory();
        assert!(reg.contains("TopKProbe"));

        let mut node = NodeBuilder::new(raw("TopKProbe"));
        assert!(reg.apply(&mut node));
        assert_eq!(node.infer(), InferStrategy::FromIr);
    }

    fn strategy() -> impl Strategy<Value = InferStrategy> {
        prop_oneof![
            Just(InferStrategy::FromIr),
            Just(InferStrategy::Identity),
            Just(InferStrategy::Broadcast),
            Just(InferStrategy::FromAttribute),
            Just(InferStrategy::Unspecified),
        ]
    }

    proptest! {
        #[test]
        fn gru_extension_ignores_prior_state(
            start in strategy(),
            attrs in proptest::collection::btree_map("[a-z_]{1,8}", "[0-9a-z]{0,6}", 0..6),
        ) {
            let reg = ExtenderRegistry::with_builtins();
            let mut r = raw("GRUSequence");
            r.attrs = attrs;
            let mut node = NodeBuilder::new(r).with_infer(start);
            let expected = node.clone().with_infer(InferStrategy::FromIr);

            reg.apply(&mut node);
            prop_assert_eq!(&node, &expected);
            reg.apply(&mut node);
            prop_assert_eq!(&node, &expected);
        }
    }
}
