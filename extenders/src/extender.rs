use graph::NodeBuilder;


/// Trait to implement for each operator type that needs finalizing after deserialization
pub trait Extender: Send + Sync {
    /// Operator type tag this extender handles, e.g. `"GRUSequence"`
    fn op_type(&self) -> &'static str;

    /// Finalize a freshly deserialized node of [`Extender::op_type`].
    ///
    /// Must be idempotent and must not touch anything the extender does not own.
    fn extend(&self, node: &mut NodeBuilder);
}


/// Wrapper for extender factory functions
pub struct ExtenderFactory {
    pub op_type: &'static str,
    pub factory: fn() -> Box<dyn Extender>,
}

// Collect all registered extenders
inventory::collect!(ExtenderFactory);


/// Trait to implement for each extender to work with inventory
pub trait RegistrationInfo {
    /// Operator type tag
    const OP_TYPE: &'static str;
}
