//! Analysis options and integration scheme

mod lookup;

pub use lookup::{ConfigLookup, SymbolTable};

use serde::{Deserialize, Serialize};

use crate::error::{ResponseError, ResponseResult};
use crate::units::{UnitSystem, UnitsContext};

/// Lookup key for the number of in-plane integration points
pub const IN_PLANE_POINTS_KEY: &str = "InPlaneIntegPts";
/// Lookup key for the number of through-thickness integration points
pub const THICKNESS_POINTS_KEY: &str = "ThicknessIntegPts";

/// Integration points per element: in-plane (2x2 by default) times thickness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationScheme {
    /// Integration points on the mid-surface
    pub in_plane_points: usize,
    /// Integration points through the thickness
    pub thickness_points: usize,
}

impl Default for IntegrationScheme {
    fn default() -> Self {
        Self {
            in_plane_points: 4,
            thickness_points: 2,
        }
    }
}

impl IntegrationScheme {
    /// Create a scheme, rejecting empty point counts
    pub fn new(in_plane_points: usize, thickness_points: usize) -> ResponseResult<Self> {
        let scheme = Self {
            in_plane_points,
            thickness_points,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Read the scheme from a configuration lookup, using defaults for missing keys
    pub fn from_lookup(lookup: &dyn ConfigLookup) -> ResponseResult<Self> {
        let defaults = Self::default();
        let in_plane_points = point_count(lookup, IN_PLANE_POINTS_KEY, defaults.in_plane_points)?;
        let thickness_points =
            point_count(lookup, THICKNESS_POINTS_KEY, defaults.thickness_points)?;
        Self::new(in_plane_points, thickness_points)
    }

    /// Total integration points per element
    pub fn integration_points(&self) -> usize {
        self.in_plane_points * self.thickness_points
    }

    /// Reject schemes with no integration points
    pub fn validate(&self) -> ResponseResult<()> {
        if self.in_plane_points == 0 || self.thickness_points == 0 {
            return Err(ResponseError::InvalidIntegrationScheme(format!(
                "{} in-plane x {} thickness points",
                self.in_plane_points, self.thickness_points
            )));
        }
        Ok(())
    }
}

fn point_count(lookup: &dyn ConfigLookup, key: &str, default: usize) -> ResponseResult<usize> {
    match lookup.quantity(key) {
        None => Ok(default),
        Some(value) if value.is_finite() && value >= 1.0 => Ok(value.trunc() as usize),
        Some(value) => Err(ResponseError::InvalidIntegrationScheme(format!(
            "{key} = {value}"
        ))),
    }
}

/// When the shared per-integration-point tensor buffer gets allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TensorBufferGuard {
    /// Any element whose family stores per-integration-point tensors
    #[default]
    TensorFamilies,
    /// Only when fiber elements are present
    FiberElements,
    /// Regardless of mesh composition
    Always,
}

/// Options for a nonlinear response run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Integration scheme used to size per-point storage
    #[serde(default)]
    pub integration: IntegrationScheme,
    /// Allocation guard for the tensor buffer
    #[serde(default)]
    pub buffer_guard: TensorBufferGuard,
    /// Unit tagging of committed stresses
    #[serde(default)]
    pub units: UnitsContext,
    /// Run element writes and commits on the rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Enable progress logging at info level
    #[serde(default)]
    pub log: bool,
}

impl AnalysisOptions {
    /// Options with a given integration scheme
    pub fn with_integration(mut self, integration: IntegrationScheme) -> Self {
        self.integration = integration;
        self
    }

    /// Enable unit checking in the given system
    pub fn with_units(mut self, system: UnitSystem) -> Self {
        self.units = UnitsContext::checked(system);
        self
    }

    /// Set the tensor buffer guard
    pub fn with_buffer_guard(mut self, guard: TensorBufferGuard) -> Self {
        self.buffer_guard = guard;
        self
    }

    /// Use the parallel write/commit passes
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Enable logging
    pub fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }
}
