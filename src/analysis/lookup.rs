//! Symbolic configuration lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of named numeric configuration quantities
pub trait ConfigLookup {
    /// Value of `name`, or `None` if it was never defined
    fn quantity(&self, name: &str) -> Option<f64>;
}

impl ConfigLookup for HashMap<String, f64> {
    fn quantity(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// A flat table of named quantities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    values: HashMap<String, f64>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a quantity, replacing any previous value
    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    /// Builder form of [`SymbolTable::set`]
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }
}

impl ConfigLookup for SymbolTable {
    fn quantity(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table_lookup() {
        let mut table = SymbolTable::new();
        assert!(table.quantity("InPlaneIntegPts").is_none());
        table.set("InPlaneIntegPts", 9.0);
        assert_eq!(table.quantity("InPlaneIntegPts"), Some(9.0));
    }

    #[test]
    fn test_symbol_table_from_json() {
        let table: SymbolTable = serde_json::from_str(r#"{"ThicknessIntegPts": 3}"#).unwrap();
        assert_eq!(table.quantity("ThicknessIntegPts"), Some(3.0));
    }
}
