//! Hook for the fiber-section state store

use crate::error::ResponseResult;
use crate::mesh::Mesh;

/// Allocates family-specific load-history storage for fiber elements.
///
/// Called once during buffer allocation, and only when the mesh contains
/// at least one fiber element. The layout of that store belongs to the
/// fiber element implementation.
pub trait FiberStateAllocator {
    fn allocate_fiber_state(&mut self, fiber_elements: usize, mesh: &Mesh) -> ResponseResult<()>;
}

/// Allocator for runs without a fiber element implementation attached
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredFiberState;

impl FiberStateAllocator for DeferredFiberState {
    fn allocate_fiber_state(&mut self, fiber_elements: usize, _mesh: &Mesh) -> ResponseResult<()> {
        log::debug!("fiber state store requested for {fiber_elements} elements; no fiber model attached");
        Ok(())
    }
}
