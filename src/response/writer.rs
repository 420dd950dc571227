//! Trial-state writes into the response buffer
//!
//! Element routines call [`write_integration_point`] once per integration
//! point each time they evaluate an element. Writes overwrite; the last
//! write before a commit wins.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::buffer::{BufferSlot, ResponseBuffer};
use crate::elements::{ElementFamily, ElementState, HardeningState};
use crate::error::{ResponseError, ResponseResult};
use crate::math::{copy_column, Mat, BACK_STRESS_COMPONENTS, TENSOR_COMPONENTS};

/// Working record of one element evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEvaluation {
    /// 1-based element index
    pub element: usize,
    /// Element family
    pub family: ElementFamily,
    /// Material state reached by the evaluation
    pub state: ElementState,
    /// Degrees of freedom per node
    pub dof_per_node: usize,
    /// Nodes of this element
    pub nodes_per_element: usize,
    /// Hardening curve and moduli
    pub hardening: HardeningState,
    /// Trial effective plastic strain per integration point
    pub effective_plastic_strain: Vec<f64>,
    /// Effective plastic strain increment per integration point
    pub effective_plastic_strain_increment: Vec<f64>,
    /// Trial stress, 9 x integration points
    pub stress: Mat,
    /// Trial plastic strain, 9 x integration points
    pub plastic_strain: Mat,
    /// Plastic strain increment, 9 x integration points
    pub plastic_strain_increment: Mat,
    /// Local nodal loads, node-major: load[dof_per_node * node + dof]
    pub nodal_loads: Vec<f64>,
    /// Nodal displacements, dof_per_node x nodes_per_element
    pub displacement: Mat,
}

impl ElementEvaluation {
    /// Zeroed, elastic evaluation
    pub fn new(
        element: usize,
        family: ElementFamily,
        dof_per_node: usize,
        nodes_per_element: usize,
        integration_points: usize,
    ) -> Self {
        Self {
            element,
            family,
            state: ElementState::Elastic,
            dof_per_node,
            nodes_per_element,
            hardening: HardeningState::new(integration_points),
            effective_plastic_strain: vec![0.0; integration_points],
            effective_plastic_strain_increment: vec![0.0; integration_points],
            stress: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            plastic_strain: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            plastic_strain_increment: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            nodal_loads: vec![0.0; dof_per_node * nodes_per_element],
            displacement: Mat::zeros(dof_per_node, nodes_per_element),
        }
    }

    /// Set the material state
    pub fn with_state(mut self, state: ElementState) -> Self {
        self.state = state;
        self
    }

    /// Set the local nodal load vector
    pub fn with_nodal_loads(mut self, loads: &[f64]) -> Self {
        self.nodal_loads = loads.to_vec();
        self
    }

    /// Set the hardening curve name
    pub fn with_hardening_curve(mut self, curve: &str) -> Self {
        self.hardening.curve = Some(curve.to_string());
        self
    }

    pub fn integration_points(&self) -> usize {
        self.effective_plastic_strain.len()
    }

    fn check_fits(&self, buffer: &ResponseBuffer) -> ResponseResult<()> {
        if self.element == 0 || self.element > buffer.len() {
            return Err(ResponseError::ElementNotFound(self.element));
        }
        if self.dof_per_node > buffer.dof_per_node()
            || self.nodes_per_element > buffer.nodes_per_element()
        {
            return Err(ResponseError::DimensionMismatch(format!(
                "element {} has {} dof x {} nodes, buffer holds {} x {}",
                self.element,
                self.dof_per_node,
                self.nodes_per_element,
                buffer.dof_per_node(),
                buffer.nodes_per_element()
            )));
        }
        if self.nodal_loads.len() < self.dof_per_node * self.nodes_per_element
            || self.displacement.nrows() < self.dof_per_node
            || self.displacement.ncols() < self.nodes_per_element
        {
            return Err(ResponseError::DimensionMismatch(format!(
                "element {} nodal loads/displacements smaller than {} dof x {} nodes",
                self.element, self.dof_per_node, self.nodes_per_element
            )));
        }
        if let Some(policy) = self.family.policy().max_moment {
            let needed = policy.first.max(policy.second);
            if self.nodal_loads.len() < needed {
                return Err(ResponseError::DimensionMismatch(format!(
                    "element {} ({:?}) needs {needed} nodal load components for its max moment, has {}",
                    self.element,
                    self.family,
                    self.nodal_loads.len()
                )));
            }
        }
        Ok(())
    }

    fn check_point(&self, point: usize, available: usize) -> ResponseResult<()> {
        if point == 0 || point > available {
            return Err(ResponseError::IntegrationPointOutOfRange { point, available });
        }
        let col = point - 1;
        let stored = [
            self.effective_plastic_strain.len(),
            self.effective_plastic_strain_increment.len(),
            self.hardening.r.len(),
            self.hardening.h.len(),
            self.hardening.back_stress.ncols(),
            self.stress.ncols(),
            self.plastic_strain.ncols(),
            self.plastic_strain_increment.ncols(),
        ];
        if stored.iter().any(|&n| n <= col) || self.hardening.back_stress.nrows() < BACK_STRESS_COMPONENTS {
            return Err(ResponseError::DimensionMismatch(format!(
                "element {} evaluation has no data for integration point {point}",
                self.element
            )));
        }
        Ok(())
    }
}

/// Write one integration point of an evaluation into its element's slot.
///
/// `point` is 1-based. Nodal forces, displacements, the state flag and the
/// max moment are element-wide and rewritten on every call.
pub fn write_integration_point(
    buffer: &mut ResponseBuffer,
    eval: &ElementEvaluation,
    point: usize,
) -> ResponseResult<()> {
    eval.check_fits(buffer)?;
    eval.check_point(point, buffer.integration_points())?;
    let slot = buffer.slot_mut(eval.element)?;
    write_point(slot, eval, point - 1);
    write_nodal(slot, eval);
    Ok(())
}

/// Write every integration point of an evaluation
pub fn write_element(buffer: &mut ResponseBuffer, eval: &ElementEvaluation) -> ResponseResult<()> {
    let points = buffer.integration_points();
    eval.check_fits(buffer)?;
    eval.check_point(points, points)?;
    let slot = buffer.slot_mut(eval.element)?;
    write_all(slot, eval, points);
    Ok(())
}

/// Write many evaluations in order.
///
/// All evaluations are checked before anything is written, so a bad entry
/// leaves the buffer untouched.
pub fn write_elements(buffer: &mut ResponseBuffer, evals: &[ElementEvaluation]) -> ResponseResult<()> {
    check_batch(buffer, evals)?;
    let points = buffer.integration_points();
    for eval in evals {
        let slot = buffer.slot_mut(eval.element)?;
        write_all(slot, eval, points);
    }
    Ok(())
}

/// Write many evaluations, distributing elements over the rayon pool.
///
/// Same checks and result as [`write_elements`]. When several evaluations
/// target one element, the last one in `evals` wins.
pub fn write_elements_par(
    buffer: &mut ResponseBuffer,
    evals: &[ElementEvaluation],
) -> ResponseResult<()> {
    check_batch(buffer, evals)?;
    let points = buffer.integration_points();

    let latest: HashMap<usize, &ElementEvaluation> =
        evals.iter().map(|eval| (eval.element, eval)).collect();

    buffer
        .slots_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, slot)| {
            if let Some(eval) = latest.get(&(i + 1)) {
                write_all(slot, eval, points);
            }
        });
    Ok(())
}

fn check_batch(buffer: &ResponseBuffer, evals: &[ElementEvaluation]) -> ResponseResult<()> {
    let points = buffer.integration_points();
    evals.iter().try_for_each(|eval| {
        eval.check_fits(buffer)?;
        eval.check_point(points, points)
    })
}

fn write_all(slot: &mut BufferSlot, eval: &ElementEvaluation, points: usize) {
    for col in 0..points {
        write_point(slot, eval, col);
    }
    write_nodal(slot, eval);
}

fn write_point(slot: &mut BufferSlot, eval: &ElementEvaluation, col: usize) {
    slot.state = eval.state;
    slot.load_curve.curve = eval.hardening.curve.clone();
    slot.load_curve.r[col] = eval.hardening.r[col];
    slot.load_curve.h[col] = eval.hardening.h[col];
    for row in 0..BACK_STRESS_COMPONENTS {
        slot.load_curve.back_stress[(row, col)] = eval.hardening.back_stress[(row, col)];
    }

    slot.effective_plastic_strain[col] = eval.effective_plastic_strain[col];
    slot.effective_plastic_strain_increment[col] = eval.effective_plastic_strain_increment[col];

    copy_column(&mut slot.stress, &eval.stress, col);
    copy_column(&mut slot.plastic_strain, &eval.plastic_strain, col);
    copy_column(&mut slot.plastic_strain_increment, &eval.plastic_strain_increment, col);

    log::trace!("element {} point {} written ({:?})", eval.element, col + 1, eval.state);
}

fn write_nodal(slot: &mut BufferSlot, eval: &ElementEvaluation) {
    for dof in 0..eval.dof_per_node {
        for node in 0..eval.nodes_per_element {
            slot.forces[(dof, node)] = eval.nodal_loads[eval.dof_per_node * node + dof];
            slot.displacement[(dof, node)] = eval.displacement[(dof, node)];
        }
    }

    if let Some(policy) = eval.family.policy().max_moment {
        if let Some(moment) = policy.evaluate(&eval.nodal_loads) {
            slot.max_moment = moment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> ResponseBuffer {
        ResponseBuffer::new(2, 3, 2, 4)
    }

    #[test]
    fn test_write_point_overwrites() {
        let mut buffer = buffer();
        let mut eval = ElementEvaluation::new(1, ElementFamily::Shell4N, 3, 2, 4)
            .with_state(ElementState::Plastic)
            .with_hardening_curve("bilinear");
        eval.effective_plastic_strain_increment[1] = 0.01;
        eval.stress[(4, 1)] = 120.0;
        eval.hardening.back_stress[(5, 1)] = 3.0;

        write_integration_point(&mut buffer, &eval, 2).unwrap();
        eval.effective_plastic_strain_increment[1] = 0.004;
        write_integration_point(&mut buffer, &eval, 2).unwrap();

        let slot = buffer.slot(1).unwrap();
        assert_eq!(slot.state, ElementState::Plastic);
        assert_eq!(slot.effective_plastic_strain_increment[1], 0.004);
        assert_eq!(slot.stress[(4, 1)], 120.0);
        assert_eq!(slot.load_curve.back_stress[(5, 1)], 3.0);
        assert_eq!(slot.load_curve.curve.as_deref(), Some("bilinear"));
        assert_eq!(buffer.slot(2).unwrap(), &BufferSlot::new(3, 2, 4));
    }

    #[test]
    fn test_curve_cleared_when_absent() {
        let mut buffer = buffer();
        let eval = ElementEvaluation::new(1, ElementFamily::Shell4N, 3, 2, 4).with_hardening_curve("c");
        write_integration_point(&mut buffer, &eval, 1).unwrap();
        let eval = ElementEvaluation::new(1, ElementFamily::Shell4N, 3, 2, 4);
        write_integration_point(&mut buffer, &eval, 1).unwrap();
        assert!(buffer.slot(1).unwrap().load_curve.curve.is_none());
    }

    #[test]
    fn test_nodal_layout_is_node_major() {
        let mut buffer = buffer();
        let eval = ElementEvaluation::new(2, ElementFamily::Unclassified, 3, 2, 4)
            .with_nodal_loads(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        write_integration_point(&mut buffer, &eval, 1).unwrap();
        let slot = buffer.slot(2).unwrap();
        assert_eq!(slot.forces[(0, 0)], 1.0);
        assert_eq!(slot.forces[(2, 0)], 3.0);
        assert_eq!(slot.forces[(0, 1)], 4.0);
        assert_eq!(slot.forces[(2, 1)], 6.0);
        assert_eq!(slot.max_moment, 0.0);
    }

    #[test]
    fn test_frame_2d_max_moment() {
        let mut buffer = buffer();
        let eval = ElementEvaluation::new(1, ElementFamily::Frame2D, 3, 2, 4)
            .with_nodal_loads(&[0.0, 0.0, 5.0, 0.0, 0.0, 12.0]);
        write_element(&mut buffer, &eval).unwrap();
        assert_eq!(buffer.slot(1).unwrap().max_moment, 12.0);
    }

    #[test]
    fn test_frame_3d_max_moment() {
        let mut buffer = ResponseBuffer::new(1, 6, 2, 1);
        let mut loads = vec![0.0; 12];
        loads[5] = -8.0;
        loads[11] = -2.5;
        let eval = ElementEvaluation::new(1, ElementFamily::Frame3D, 6, 2, 1).with_nodal_loads(&loads);
        write_element(&mut buffer, &eval).unwrap();
        assert_eq!(buffer.slot(1).unwrap().max_moment, -2.5);
    }

    #[test]
    fn test_out_of_range() {
        let mut buffer = buffer();
        let eval = ElementEvaluation::new(3, ElementFamily::Frame2D, 3, 2, 4);
        assert!(matches!(
            write_integration_point(&mut buffer, &eval, 1),
            Err(ResponseError::ElementNotFound(3))
        ));
        let eval = ElementEvaluation::new(1, ElementFamily::Frame2D, 3, 2, 4);
        assert!(matches!(
            write_integration_point(&mut buffer, &eval, 5),
            Err(ResponseError::IntegrationPointOutOfRange { point: 5, available: 4 })
        ));
        assert!(write_integration_point(&mut buffer, &eval, 0).is_err());
        let eval = ElementEvaluation::new(1, ElementFamily::Frame2D, 6, 2, 4);
        assert!(matches!(
            write_element(&mut buffer, &eval),
            Err(ResponseError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let evals: Vec<_> = (1..=2)
            .map(|element| {
                let mut eval = ElementEvaluation::new(element, ElementFamily::Frame2D, 3, 2, 4)
                    .with_nodal_loads(&[1.0, 2.0, element as f64, 4.0, 5.0, 0.5]);
                eval.stress[(0, 3)] = 10.0 * element as f64;
                eval
            })
            .collect();

        let mut sequential = buffer();
        for eval in &evals {
            write_element(&mut sequential, eval).unwrap();
        }
        let mut parallel = buffer();
        write_elements_par(&mut parallel, &evals).unwrap();

        assert_eq!(sequential.slots(), parallel.slots());
    }

    #[test]
    fn test_parallel_last_write_wins() {
        let first = ElementEvaluation::new(1, ElementFamily::Frame2D, 3, 2, 4)
            .with_nodal_loads(&[0.0, 0.0, 1.0, 0.0, 0.0, 2.0]);
        let second = ElementEvaluation::new(1, ElementFamily::Frame2D, 3, 2, 4)
            .with_nodal_loads(&[0.0, 0.0, 9.0, 0.0, 0.0, 2.0]);
        let mut buffer = buffer();
        write_elements_par(&mut buffer, &[first, second]).unwrap();
        assert_eq!(buffer.slot(1).unwrap().max_moment, 9.0);
    }

    #[test]
    fn test_frame_too_small_for_max_moment() {
        let mut buffer = ResponseBuffer::new(1, 2, 2, 4);
        let eval = ElementEvaluation::new(1, ElementFamily::Frame2D, 2, 2, 4)
            .with_nodal_loads(&[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            write_integration_point(&mut buffer, &eval, 1),
            Err(ResponseError::DimensionMismatch(_))
        ));
        assert_eq!(buffer.slot(1).unwrap(), &BufferSlot::new(2, 2, 4));

        let eval = ElementEvaluation::new(1, ElementFamily::Shell4N, 2, 2, 4);
        assert!(write_integration_point(&mut buffer, &eval, 1).is_ok());
    }

    #[test]
    fn test_batch_with_bad_entry_writes_nothing() {
        let good = ElementEvaluation::new(1, ElementFamily::Frame2D, 3, 2, 4)
            .with_nodal_loads(&[0.0, 0.0, 4.0, 0.0, 0.0, 1.0]);
        let bad = ElementEvaluation::new(99, ElementFamily::Frame2D, 3, 2, 4);
        let evals = [good, bad];

        let mut sequential = buffer();
        assert!(matches!(
            write_elements(&mut sequential, &evals),
            Err(ResponseError::ElementNotFound(99))
        ));
        let mut parallel = buffer();
        assert!(matches!(
            write_elements_par(&mut parallel, &evals),
            Err(ResponseError::ElementNotFound(99))
        ));

        assert_eq!(sequential.slots(), buffer().slots());
        assert_eq!(parallel.slots(), buffer().slots());
    }
}
