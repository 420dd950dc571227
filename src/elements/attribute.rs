//! Element attributes

use serde::{Deserialize, Serialize};

use super::ElementFamily;

/// Named attribute record shared by elements of one kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementAttribute {
    /// Element type tag, e.g. "FRAME_2D" or "SHELL_4N"
    pub element_type: String,
    /// Hardening curve seeded into every evaluation of elements using this attribute
    #[serde(default)]
    pub hardening_curve: Option<String>,
}

impl ElementAttribute {
    /// Create an attribute for an element type
    pub fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.to_string(),
            hardening_curve: None,
        }
    }

    /// Set the hardening curve
    pub fn with_hardening_curve(mut self, curve: &str) -> Self {
        self.hardening_curve = Some(curve.to_string());
        self
    }

    /// Family resolved from the type tag
    pub fn family(&self) -> ElementFamily {
        ElementFamily::from_type_name(&self.element_type)
    }
}
