//! Committed element response records

use serde::{Deserialize, Serialize};

use crate::elements::{ElementState, HardeningState};
use crate::math::{Mat, TENSOR_COMPONENTS};
use crate::units::UnitDescriptor;

/// Permanent response history of one element.
///
/// Updated only by the commit pass at converged steps. Plastic strain and
/// effective plastic strain are accumulated totals; everything else holds
/// the value from the most recent commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementResponse {
    /// Nodal forces, dof_per_node x nodes_per_element
    pub forces: Mat,
    /// Nodal displacements, dof_per_node x nodes_per_element
    pub displacement: Mat,
    /// Stress tensor, 9 x integration points
    pub stress: Mat,
    /// Physical unit of each stress row, set when units checking is on
    pub stress_units: Vec<Option<UnitDescriptor>>,
    /// Accumulated plastic strain tensor, 9 x integration points
    pub plastic_strain: Mat,
    /// Accumulated effective plastic strain per integration point
    pub effective_plastic_strain: Vec<f64>,
    /// Family-specific moment extremum (frame elements)
    pub max_moment: f64,
    /// Material state at the last commit
    pub state: ElementState,
    /// Hardening curve and moduli
    pub hardening: HardeningState,
}

impl ElementResponse {
    /// Zeroed record sized for the mesh and integration scheme
    pub fn new(dof_per_node: usize, nodes_per_element: usize, integration_points: usize) -> Self {
        Self {
            forces: Mat::zeros(dof_per_node, nodes_per_element),
            displacement: Mat::zeros(dof_per_node, nodes_per_element),
            stress: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            stress_units: vec![None; TENSOR_COMPONENTS],
            plastic_strain: Mat::zeros(TENSOR_COMPONENTS, integration_points),
            effective_plastic_strain: vec![0.0; integration_points],
            max_moment: 0.0,
            state: ElementState::Elastic,
            hardening: HardeningState::new(integration_points),
        }
    }

    pub fn integration_points(&self) -> usize {
        self.effective_plastic_strain.len()
    }

    /// Largest accumulated effective plastic strain over the integration points
    pub fn max_effective_plastic_strain(&self) -> f64 {
        self.effective_plastic_strain
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Von Mises equivalent stress at an integration point (0-based column).
    ///
    /// Rows are the full tensor in row-major order: xx, xy, xz, yx, yy, yz, zx, zy, zz.
    pub fn von_mises(&self, point: usize) -> Option<f64> {
        if point >= self.stress.ncols() {
            return None;
        }
        let s = |row: usize| self.stress[(row, point)];
        let (sxx, syy, szz) = (s(0), s(4), s(8));
        let sxy = 0.5 * (s(1) + s(3));
        let syz = 0.5 * (s(5) + s(7));
        let szx = 0.5 * (s(2) + s(6));
        let vm = (0.5 * ((sxx - syy).powi(2) + (syy - szz).powi(2) + (szz - sxx).powi(2))
            + 3.0 * (sxy.powi(2) + syz.powi(2) + szx.powi(2)))
        .sqrt();
        Some(vm)
    }
}

/// Counts of elements committed per state in one commit pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Elements committed with the elastic policy
    pub elastic: usize,
    /// Elements committed with the plastic policy
    pub plastic: usize,
    /// Elements whose state flag had no merge policy
    pub undefined: usize,
}

impl CommitSummary {
    /// Total elements visited
    pub fn total(&self) -> usize {
        self.elastic + self.plastic + self.undefined
    }

    pub(crate) fn record(&mut self, state: ElementState) {
        match state {
            ElementState::Elastic => self.elastic += 1,
            ElementState::Plastic => self.plastic += 1,
            ElementState::Undefined(_) => self.undefined += 1,
        }
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            elastic: self.elastic + other.elastic,
            plastic: self.plastic + other.plastic,
            undefined: self.undefined + other.undefined,
        }
    }
}
