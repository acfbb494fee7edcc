//! Serialized IR document, as stored on disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Top-level IR document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrDocument {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub layers: Vec<IrLayer>,
    #[serde(default)]
    pub edges: Vec<IrEdge>,
}

fn default_version() -> u32 {
    11
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrLayer {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, AttrScalar>,
    #[serde(default)]
    pub input: Vec<IrPort>,
    #[serde(default)]
    pub output: Vec<IrPort>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrPort {
    pub id: u32,
    #[serde(default)]
    pub precision: Option<String>,
    /// Absent when the file carries no shape for the port; `-1` marks a dynamic dim
    #[serde(default)]
    pub dims: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrEdge {
    pub from_layer: u64,
    pub from_port: u32,
    pub to_layer: u64,
    pub to_port: u32,
}

/// Attribute value in `data`. The graph keeps attributes as IR strings, so
/// every variant renders to the string the IR would have stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrScalar>),
}

impl fmt::Display for AttrScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrScalar::Bool(b) => write!(f, "{b}"),
            AttrScalar::Int(i) => write!(f, "{i}"),
            // `{:?}` keeps the decimal point on whole values (`0.0`, not `0`)
            AttrScalar::Float(x) => write!(f, "{x:?}"),
            AttrScalar::Str(s) => f.write_str(s),
            AttrScalar::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
