//! Hardening state per integration point

use serde::{Deserialize, Serialize};

use crate::math::{Mat, BACK_STRESS_COMPONENTS};

/// Hardening curve reference plus its per-integration-point moduli.
///
/// Used both as the permanent hardening record of an element and as the
/// staging copy held in the response buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardeningState {
    /// Name of the hardening (load) curve, if any
    pub curve: Option<String>,
    /// Isotropic hardening modulus per integration point
    pub r: Vec<f64>,
    /// Kinematic hardening modulus per integration point
    pub h: Vec<f64>,
    /// Back-stress, 6 x integration points
    pub back_stress: Mat,
}

impl HardeningState {
    /// Zeroed state for `integration_points` points
    pub fn new(integration_points: usize) -> Self {
        Self {
            curve: None,
            r: vec![0.0; integration_points],
            h: vec![0.0; integration_points],
            back_stress: Mat::zeros(BACK_STRESS_COMPONENTS, integration_points),
        }
    }

    /// Set the curve name
    pub fn with_curve(mut self, curve: &str) -> Self {
        self.curve = Some(curve.to_string());
        self
    }

    pub fn integration_points(&self) -> usize {
        self.r.len()
    }
}
