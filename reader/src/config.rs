use std::fs;
use std::path::Path;

use irloom_infer::InferOptions;
use serde::Deserialize;

use crate::ReadError;

/// Reader settings, loadable from YAML; every field has a default
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Also pick up extenders submitted with `register_extender!`
    pub collect_inventory: bool,
    pub infer: InferOptions,
}

impl ReaderConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ReadError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&text)
    }
}
