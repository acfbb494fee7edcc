mod config;
mod error;
pub mod format;

use std::fs;
use std::path::Path;

use core_types::{ElementType, Shape};
use graph::{Edge, Graph, InputPort, NodeBuilder, NodeId, OutputPort, RawNode};
use irloom_extenders::ExtenderRegistry;
use irloom_infer::{default_strategy, InferReport, ShapeInferenceEngine};
use tracing::{debug, info, instrument};

pub use config::ReaderConfig;
pub use error::ReadError;
pub use format::{AttrScalar, IrDocument, IrEdge, IrLayer, IrPort};


/// Turns IR documents into graphs whose nodes have been finalized by the
/// registered extenders.
pub struct IrReader {
    registry: ExtenderRegistry,
}

impl IrReader {
    pub fn new(registry: ExtenderRegistry) -> Self {
        Self { registry }
    }

    /// Reader using [`ExtenderRegistry::with_builtins`]
    pub fn with_builtins() -> Self {
        Self::new(ExtenderRegistry::with_builtins())
    }

    pub fn registry(&self) -> &ExtenderRegistry {
        &self.registry
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Graph, ReadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
        self.read_str(&text)
    }

    pub fn read_str(&self, text: &str) -> Result<Graph, ReadError> {
        let doc: IrDocument = serde_yaml::from_str(text)?;
        self.build(doc)
    }

    /// Build the graph: each layer becomes a raw record, gets its default
    /// strategy, passes through its extender (if any), then joins the graph.
    #[instrument(skip_all, fields(graph = %doc.name))]
    pub fn build(&self, doc: IrDocument) -> Result<Graph, ReadError> {
        info!(layers = doc.layers.len(), edges = doc.edges.len(), "reading IR");
        let mut graph = Graph::new(doc.name, doc.version);
        let mut extended = 0usize;

        for layer in doc.layers {
            let raw = raw_node(layer)?;
            let infer = default_strategy(&raw.op_type);
            let mut builder = NodeBuilder::new(raw).with_infer(infer);
            if self.registry.apply(&mut builder) {
                extended += 1;
            }
            debug!(
                node = %builder.id(),
                op_type = builder.op_type(),
                infer = %builder.infer(),
                "layer finalized"
            );
            graph.add_node(builder.finish())?;
        }

        for e in doc.edges {
            graph.add_edge(Edge::new(NodeId(e.from_layer), e.from_port, NodeId(e.to_layer), e.to_port))?;
        }

        debug!(extended, "extenders applied");
        Ok(graph)
    }
}

fn raw_node(layer: IrLayer) -> Result<RawNode, ReadError> {
    let id = layer.id;
    let inputs = layer
        .input
        .into_iter()
        .map(|p| -> Result<InputPort, ReadError> { Ok(InputPort::new(p.id, port_shape(id, &p)?)) })
        .collect::<Result<Vec<_>, ReadError>>()?;
    let outputs = layer
        .output
        .into_iter()
        .map(|p| -> Result<OutputPort, ReadError> {
            let element_type = p
                .precision
                .as_deref()
                .map(|name| {
                    ElementType::from_ir_name(name).ok_or_else(|| ReadError::UnknownPrecision {
                        layer: id,
                        port: p.id,
                        precision: name.to_string(),
                    })
                })
                .transpose()?;
            Ok(OutputPort::new(p.id, element_type, port_shape(id, &p)?))
        })
        .collect::<Result<Vec<_>, ReadError>>()?;

    Ok(RawNode {
        id: NodeId(id),
        name: layer.name,
        op_type: layer.op_type,
        version: layer.version,
        attrs: layer.data.into_iter().map(|(k, v)| (k, v.to_string())).collect(),
        inputs,
        outputs,
    })
}

fn port_shape(layer: u64, port: &IrPort) -> Result<Option<Shape>, ReadError> {
    port.dims
        .as_deref()
        .map(Shape::from_ir_dims)
        .transpose()
        .map_err(|source| ReadError::BadDims { layer, port: port.id, source })
}

/// Read an IR file with the builtin extenders and run shape inference on it.
pub fn restore_graph_from_ir(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
) -> Result<(Graph, InferReport), ReadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
    restore_graph_from_str(&text, config)
}

/// [`restore_graph_from_ir`] on an in-memory document.
pub fn restore_graph_from_str(
    text: &str,
    config: &ReaderConfig,
) -> Result<(Graph, InferReport), ReadError> {
    let mut registry = ExtenderRegistry::with_builtins();
    if config.collect_inventory {
        registry.collect_inventory();
    }
    let mut graph = IrReader::new(registry).read_str(text)?;
    let report = ShapeInferenceEngine::new(config.infer).run(&mut graph)?;
    Ok((graph, report))
}


/* ------------------------------------------------------------------------- */
/*                                  Tests                                    */
/* ------------------------------------------------------------------------- */
