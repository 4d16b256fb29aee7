use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tally_indexer::IndexerConfig;
use tally_node::NodeConfig;
use tally_stream::JournalConfig;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// When false, append requests without credentials are denied.
    pub allow_anonymous_append: bool,
    /// Upper bound on each ledger, stream, and commit log call during a
    /// refresh, in milliseconds.
    pub call_timeout_ms: u64,
    /// Capacity of per-subscriber notification channels.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9610".parse().unwrap(),
            allow_anonymous_append: true,
            call_timeout_ms: 5_000,
            channel_capacity: 1024,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// The node configuration this server configuration implies.
    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            journal: JournalConfig {
                channel_capacity: self.channel_capacity,
            },
            indexer: IndexerConfig {
                call_timeout: self.call_timeout(),
            },
        }
    }
}
