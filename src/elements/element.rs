//! Mesh element record

use serde::{Deserialize, Serialize};

/// An element of the mesh, identified by its 1-based position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Name of the element attribute
    pub attribute: String,
    /// Connected node numbers (1-based)
    #[serde(default)]
    pub nodes: Vec<usize>,
}

impl Element {
    /// Create an element referencing an attribute
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            nodes: Vec::new(),
        }
    }

    /// Set the connectivity
    pub fn with_nodes(mut self, nodes: &[usize]) -> Self {
        self.nodes = nodes.to_vec();
        self
    }
}
