//! Connection factories.

use std::collections::HashMap;
use std::sync::Arc;

use ringcache_types::{Node, NodeCategory};
use tracing::debug;

use crate::error::ConnectionError;
use crate::memory::MemoryConnection;
use crate::traits::NodeConnection;

/// Builds unopened connections for nodes.
pub trait ConnectionFactory: Send + Sync {
    /// Create a connection for `node`. The connection is not opened.
    fn create_for(&self, node: &Node) -> Result<Arc<dyn NodeConnection>, ConnectionError>;
}

/// Constructor registered for one node category.
pub type Constructor = Arc<dyn Fn(&Node) -> Arc<dyn NodeConnection> + Send + Sync>;

/// Dispatch table from [`NodeCategory`] to a connection constructor.
///
/// New categories are supported by registering a constructor rather than
/// by branching on the category. Nodes whose category has no constructor
/// are rejected with [`ConnectionError::UnsupportedCategory`].
#[derive(Clone, Default)]
pub struct CategoryFactory {
    constructors: HashMap<NodeCategory, Constructor>,
}

impl CategoryFactory {
    /// A factory with no categories registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory that serves every category with a [`MemoryConnection`].
    pub fn in_memory() -> Self {
        Self::new()
            .with(NodeCategory::A, memory_connection)
            .with(NodeCategory::B, memory_connection)
    }

    /// Register `constructor` for `category`, builder style.
    pub fn with<F>(mut self, category: NodeCategory, constructor: F) -> Self
    where
        F: Fn(&Node) -> Arc<dyn NodeConnection> + Send + Sync + 'static,
    {
        self.register(category, constructor);
        self
    }

    /// Register `constructor` for `category`, replacing any previous one.
    pub fn register<F>(&mut self, category: NodeCategory, constructor: F)
    where
        F: Fn(&Node) -> Arc<dyn NodeConnection> + Send + Sync + 'static,
    {
        self.constructors.insert(category, Arc::new(constructor));
    }

    /// Whether `category` has a constructor.
    pub fn supports(&self, category: NodeCategory) -> bool {
        self.constructors.contains_key(&category)
    }
}

impl ConnectionFactory for CategoryFactory {
    fn create_for(&self, node: &Node) -> Result<Arc<dyn NodeConnection>, ConnectionError> {
        let constructor = self
            .constructors
            .get(&node.category)
            .ok_or(ConnectionError::UnsupportedCategory(node.category))?;
        debug!(node_id = %node.id, category = %node.category, "creating connection");
        Ok(constructor(node))
    }
}

fn memory_connection(node: &Node) -> Arc<dyn NodeConnection> {
    Arc::new(MemoryConnection::new(node.clone()))
}
