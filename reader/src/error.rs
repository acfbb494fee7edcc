use std::path::PathBuf;

use core_types::ShapeParseError;
use graph::GraphError;
use irloom_infer::InferError;
use thiserror::Error;

/// Errors raised while reading an IR document or a reader config
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("layer {layer}, port {port}: unknown precision '{precision}'")]
    UnknownPrecision { layer: u64, port: u32, precision: String },
    #[error("layer {layer}, port {port}: {source}")]
    BadDims {
        layer: u64,
        port: u32,
        #[source]
        source: ShapeParseError,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Infer(#[from] InferError),
}
