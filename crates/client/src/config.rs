use std::fs;
use std::path::Path;

use miro_transport::TlsConfig;
use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_SENDER: &str = "someone@example.com";

/// Who the client sends as, who it sends to, and where envelopes go next.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `source` of every message.
    pub sender: String,
    /// Default `receiver` set; empty means the field is omitted.
    pub receiver: Vec<String>,
    /// Transport URI (`https://...`, `uds:<path>`, `file://<path>`). Without
    /// one, built messages are handed back instead of sent.
    pub nexthop: Option<String>,
    /// Client certificate for HTTPS nexthops.
    pub tls: Option<TlsConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sender: DEFAULT_SENDER.to_string(),
            receiver: Vec::new(),
            nexthop: None,
            tls: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))?;
        if config.sender.is_empty() {
            return Err(ClientError::Config("sender must not be empty".into()));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
