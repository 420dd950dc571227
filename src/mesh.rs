//! Mesh - element topology and attribute table

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::elements::{Element, ElementAttribute};
use crate::error::{ResponseError, ResponseResult};

/// Element topology as seen by the response subsystem.
///
/// Elements are numbered from 1 in insertion order. Attribute names are
/// resolved lazily, so elements may reference attributes added later (or
/// never); unresolved names are reported when response storage is sized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// Degrees of freedom per node
    pub dof_per_node: usize,
    /// Nodes per element (largest element in the mesh)
    pub nodes_per_element: usize,
    /// Element attributes by name
    #[serde(default)]
    pub attributes: HashMap<String, ElementAttribute>,
    /// Elements, in 1-based index order
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new(dof_per_node: usize, nodes_per_element: usize) -> Self {
        Self {
            dof_per_node,
            nodes_per_element,
            attributes: HashMap::new(),
            elements: Vec::new(),
        }
    }

    /// Add an element attribute
    pub fn add_attribute(&mut self, name: &str, attribute: ElementAttribute) -> ResponseResult<()> {
        if self.attributes.contains_key(name) {
            return Err(ResponseError::DuplicateName(name.to_string()));
        }
        self.attributes.insert(name.to_string(), attribute);
        Ok(())
    }

    /// Add an element, returning its 1-based index
    pub fn add_element(&mut self, element: Element) -> ResponseResult<usize> {
        if element.nodes.len() > self.nodes_per_element {
            return Err(ResponseError::InvalidInput(format!(
                "element has {} nodes, mesh allows {}",
                element.nodes.len(),
                self.nodes_per_element
            )));
        }
        self.elements.push(element);
        Ok(self.elements.len())
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Element by 1-based index
    pub fn element(&self, index: usize) -> ResponseResult<&Element> {
        index
            .checked_sub(1)
            .and_then(|i| self.elements.get(i))
            .ok_or(ResponseError::ElementNotFound(index))
    }

    /// Attribute of the element at a 1-based index
    pub fn element_attribute(&self, index: usize) -> ResponseResult<&ElementAttribute> {
        let element = self.element(index)?;
        self.attributes
            .get(&element.attribute)
            .ok_or_else(|| ResponseError::AttributeNotFound {
                element: index,
                attribute: element.attribute.clone(),
            })
    }

    /// Iterate over `(index, element)` with 1-based indices
    pub fn indexed_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.elements.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(6, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_indices_start_at_one() {
        let mut mesh = Mesh::new(3, 2);
        mesh.add_attribute("beam", ElementAttribute::new("FRAME_2D")).unwrap();
        assert_eq!(mesh.add_element(Element::new("beam")).unwrap(), 1);
        assert_eq!(mesh.add_element(Element::new("beam")).unwrap(), 2);
        assert!(mesh.element(0).is_err());
        assert!(mesh.element(2).is_ok());
        assert!(matches!(mesh.element(3), Err(ResponseError::ElementNotFound(3))));
    }

    #[test]
    fn test_duplicate_attribute() {
        let mut mesh = Mesh::default();
        mesh.add_attribute("a", ElementAttribute::new("FIBER")).unwrap();
        assert!(matches!(
            mesh.add_attribute("a", ElementAttribute::new("FIBER")),
            Err(ResponseError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_unresolved_attribute() {
        let mut mesh = Mesh::default();
        mesh.add_element(Element::new("missing")).unwrap();
        match mesh.element_attribute(1) {
            Err(ResponseError::AttributeNotFound { element, attribute }) => {
                assert_eq!(element, 1);
                assert_eq!(attribute, "missing");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_too_many_nodes() {
        let mut mesh = Mesh::new(6, 2);
        assert!(mesh.add_element(Element::new("a").with_nodes(&[1, 2, 3])).is_err());
    }
}
