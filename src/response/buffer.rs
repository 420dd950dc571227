//! Transient per-element response buffer

use serde::{Deserialize, Serialize};

use crate::elements::{ElementState, HardeningState};
use crate::error::{ResponseError, ResponseResult};
use crate::math::{Mat, TENSOR_COMPONENTS};

/// Trial response of one element, written during iterations and read at commit.
///
/// Unlike [`ElementResponse`](crate::results::ElementResponse), the plastic
/// strain fields hold the current trial values and increments, not totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSlot {
    /// State flag from the last evaluation
    pub state: ElementState,
    /// Nodal forces, dof_per_node x nodes_per_element
    pub forces: Mat,
    /// Nodal displacements, dof_per_node x nodes_per_element
    pub displacement: Mat,
    /// Trial stress, 9 x integration points
    pub stress: Mat,
    /// Trial plastic strain, 9 x integration points
    pub plastic_strain: Mat,
    /// Plastic strain increment, 9 x integration points
    pub plastic_strain_increment: Mat,
    /// Trial effective plastic strain per integration point
    pub effective_plastic_strain: Vec<f64>,
    /// Effective plastic strain increment per integration point
    pub effective_plastic_strain_increment: Vec<f64>,
    /// Family-specific moment extremum
    pub max_moment: f64,
    /// Staged hardening curve and moduli
    pub load_curve: HardeningState,
}

impl BufferSlot {
    /// Zeroed slot at its final size
    pub fn new(dof_per_node: usize, nodes_per_element: usize, integration_points: usize) -> Self {
        Self {
            state: ElementState::Elastic,
            forces: Mat::zeros(dof_per_node, nodes_per_element),
            displacement: Mat::zeros(dof_per_node, nodes_per_element),
            stress: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            plastic_strain: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            plastic_strain_increment: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            effective_plastic_strain: vec![0.0; integration_points],
            effective_plastic_strain_increment: vec![0.0; integration_points],
            max_moment: 0.0,
            load_curve: HardeningState::new(integration_points),
        }
    }
}

/// Buffer slots for every element of a mesh, keyed by 1-based element index.
///
/// The shape is fixed at allocation; a different integration scheme needs
/// a new buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBuffer {
    integration_points: usize,
    dof_per_node: usize,
    nodes_per_element: usize,
    slots: Vec<BufferSlot>,
}

impl ResponseBuffer {
    /// Allocate `elements` slots at their final size
    pub fn new(
        elements: usize,
        dof_per_node: usize,
        nodes_per_element: usize,
        integration_points: usize,
    ) -> Self {
        let slots = (0..elements)
            .map(|_| BufferSlot::new(dof_per_node, nodes_per_element, integration_points))
            .collect();
        Self {
            integration_points,
            dof_per_node,
            nodes_per_element,
            slots,
        }
    }

    pub fn integration_points(&self) -> usize {
        self.integration_points
    }

    pub fn dof_per_node(&self) -> usize {
        self.dof_per_node
    }

    pub fn nodes_per_element(&self) -> usize {
        self.nodes_per_element
    }

    /// Number of slots (one per element)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot of the element at a 1-based index
    pub fn slot(&self, element: usize) -> ResponseResult<&BufferSlot> {
        element
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .ok_or(ResponseError::ElementNotFound(element))
    }

    /// Mutable slot of the element at a 1-based index
    pub fn slot_mut(&mut self, element: usize) -> ResponseResult<&mut BufferSlot> {
        element
            .checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(ResponseError::ElementNotFound(element))
    }

    /// All slots in element order
    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [BufferSlot] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_shapes() {
        let buffer = ResponseBuffer::new(3, 6, 2, 8);
        assert_eq!(buffer.len(), 3);
        for slot in buffer.slots() {
            assert_eq!(slot.forces.shape(), (6, 2));
            assert_eq!(slot.displacement.shape(), (6, 2));
            assert_eq!(slot.stress.shape(), (9, 8));
            assert_eq!(slot.plastic_strain_increment.shape(), (9, 8));
            assert_eq!(slot.effective_plastic_strain_increment.len(), 8);
            assert_eq!(slot.load_curve.back_stress.shape(), (6, 8));
            assert!(slot.load_curve.curve.is_none());
        }
    }

    #[test]
    fn test_slot_indexing() {
        let mut buffer = ResponseBuffer::new(2, 3, 2, 4);
        assert!(buffer.slot(0).is_err());
        assert!(buffer.slot(2).is_ok());
        assert!(matches!(buffer.slot_mut(3), Err(ResponseError::ElementNotFound(3))));
    }
}
