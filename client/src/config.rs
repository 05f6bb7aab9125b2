//! Client configuration file

use crate::error::ClientError;
use serde::Deserialize;
use std::path::Path;

/// How answers to questions are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Typed by the player
    #[default]
    You,
    /// Computed locally
    Auto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub username: String,
    #[serde(default)]
    pub client_mode: ClientMode,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path).map_err(|source| ClientError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }
}
