//! FEA Response - element response persistence for nonlinear analysis
//!
//! During a nonlinear solve every element is evaluated many times per
//! load step. This crate keeps the trial material state from those
//! evaluations in a transient buffer and, once the step converges,
//! commits it into each element's permanent response record:
//! - Buffer allocation sized from mesh composition and integration scheme
//! - Per-integration-point writes of stress, plastic strain and hardening state
//! - State-dependent commit (elastic reset vs. plastic accumulation)
//! - Optional unit tagging of committed stresses
//!
//! ## Example
//! ```rust
//! use fea_response::prelude::*;
//!
//! let mut mesh = Mesh::new(3, 2);
//! mesh.add_attribute("beam", ElementAttribute::new("FRAME_2D")).unwrap();
//! mesh.add_element(Element::new("beam")).unwrap();
//!
//! let mut session = AnalysisSession::new(mesh, AnalysisOptions::default()).unwrap();
//!
//! // An element routine fills in its evaluation...
//! let eval = session
//!     .evaluation(1)
//!     .unwrap()
//!     .with_nodal_loads(&[0.0, 0.0, 5.0, 0.0, 0.0, 12.0]);
//! session.record_evaluation(&eval).unwrap();
//!
//! // ...and the converged step is committed.
//! session.commit_step().unwrap();
//! assert_eq!(session.response(1).unwrap().max_moment, 12.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod math;
pub mod mesh;
pub mod response;
pub mod results;
pub mod session;
pub mod units;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        AnalysisOptions, ConfigLookup, IntegrationScheme, SymbolTable, TensorBufferGuard,
    };
    pub use crate::elements::{
        Element, ElementAttribute, ElementFamily, ElementState, HardeningState,
    };
    pub use crate::error::{ResponseError, ResponseResult};
    pub use crate::mesh::Mesh;
    pub use crate::response::{
        BufferSlot, ElementEvaluation, FamilyCounts, FiberStateAllocator, ResponseBuffer,
    };
    pub use crate::results::{CommitSummary, ElementResponse};
    pub use crate::session::AnalysisSession;
    pub use crate::units::{UnitDescriptor, UnitSystem, UnitsContext};
}
