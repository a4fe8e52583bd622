//! TOML configuration for the ringcache daemon.
//!
//! Every section is optional. Without a config file the daemon runs with a
//! four-replica murmur3 ring and three local in-memory nodes.

use std::path::Path;

use anyhow::Context;
use ringcache_types::{Node, NodeCategory, NodeId, RingConfig};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Hash ring parameters.
    pub ring: RingConfig,
    /// Logging configuration.
    pub log: LogSection,
    /// Storage nodes the demo brings up, in join order.
    pub nodes: Vec<NodeSection>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One `[[nodes]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Hostname the node listens on.
    pub host: String,
    /// Port the node listens on. Together with `host` it derives the node id.
    pub port: u16,
    /// Category selecting the connection implementation (`"A"` or `"B"`).
    pub category: NodeCategory,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7001,
            category: NodeCategory::A,
        }
    }
}

impl NodeSection {
    /// Build the node. The id is derived from the address, so the same
    /// entry always lands on the same ring positions.
    pub fn to_node(&self) -> Node {
        let address = format!("{}:{}", self.host, self.port);
        Node::new(
            NodeId::from_data(address.as_bytes()),
            self.host.clone(),
            self.port,
            self.category,
        )
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Configured nodes, or three local nodes (A, B, A) when none are set.
    pub fn nodes(&self) -> Vec<Node> {
        if !self.nodes.is_empty() {
            return self.nodes.iter().map(NodeSection::to_node).collect();
        }
        [
            (7001, NodeCategory::A),
            (7002, NodeCategory::B),
            (7003, NodeCategory::A),
        ]
        .into_iter()
        .map(|(port, category)| {
            NodeSection {
                port,
                category,
                ..NodeSection::default()
            }
            .to_node()
        })
        .collect()
    }
}
