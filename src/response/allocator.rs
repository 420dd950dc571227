//! Response buffer allocation
//!
//! Two passes: classify every element of the mesh by family, then size
//! the buffer from the counts and the integration scheme. Classification
//! fails on the first element whose attribute cannot be resolved, before
//! anything is allocated.

use serde::{Deserialize, Serialize};

use super::buffer::ResponseBuffer;
use super::fiber::FiberStateAllocator;
use crate::analysis::{IntegrationScheme, TensorBufferGuard};
use crate::elements::ElementFamily;
use crate::error::ResponseResult;
use crate::mesh::Mesh;

/// Number of elements of each family in a mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyCounts {
    pub frame_2d: usize,
    pub frame_3d: usize,
    pub shell_4n: usize,
    pub shell_8n: usize,
    pub fiber: usize,
    pub unclassified: usize,
}

impl FamilyCounts {
    fn add(&mut self, family: ElementFamily) {
        match family {
            ElementFamily::Frame2D => self.frame_2d += 1,
            ElementFamily::Frame3D => self.frame_3d += 1,
            ElementFamily::Shell4N => self.shell_4n += 1,
            ElementFamily::Shell8N => self.shell_8n += 1,
            ElementFamily::Fiber => self.fiber += 1,
            ElementFamily::Unclassified => self.unclassified += 1,
        }
    }

    /// Count for one family
    pub fn count(&self, family: ElementFamily) -> usize {
        match family {
            ElementFamily::Frame2D => self.frame_2d,
            ElementFamily::Frame3D => self.frame_3d,
            ElementFamily::Shell4N => self.shell_4n,
            ElementFamily::Shell8N => self.shell_8n,
            ElementFamily::Fiber => self.fiber,
            ElementFamily::Unclassified => self.unclassified,
        }
    }

    /// Shell elements of either node count
    pub fn shell(&self) -> usize {
        self.shell_4n + self.shell_8n
    }

    /// Elements whose family stores per-integration-point tensors
    pub fn tensor_elements(&self) -> usize {
        ElementFamily::ALL
            .into_iter()
        .filter(|f| f.policy().tensor_buffer)
        .map(|f| self.count(f))
        .sum()
    }

    /// Elements whose family keeps a fiber-section state store
    pub fn fiber_store_elements(&self) -> usize {
        ElementFamily::ALL
            .into_iter()
            .filter(|f| f.policy().fiber_store)
            .map(|f| self.count(f))
            .sum()
    }

    /// All elements
    pub fn total(&self) -> usize {
        self.frame_2d + self.frame_3d + self.shell() + self.fiber + self.unclassified
    }
}

/// Result of sizing response storage for a mesh
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Elements per family
    pub counts: FamilyCounts,
    /// Integration points per element, fixed for the run
    pub integration_points: usize,
    /// Shared tensor buffer, if the guard allowed it
    pub buffer: Option<ResponseBuffer>,
    /// Whether the fiber state store was requested
    pub fiber_store: bool,
}

/// Count the elements of each family.
///
/// Fails with [`ResponseError::AttributeNotFound`](crate::error::ResponseError::AttributeNotFound)
/// for the first element whose attribute is not in the mesh.
pub fn classify(mesh: &Mesh) -> ResponseResult<FamilyCounts> {
    let mut counts = FamilyCounts::default();
    for (index, _) in mesh.indexed_elements() {
        let attribute = mesh.element_attribute(index)?;
        counts.add(attribute.family());
    }
    Ok(counts)
}

/// Decide whether the tensor buffer is allocated under `guard`
pub fn tensor_buffer_required(counts: &FamilyCounts, guard: TensorBufferGuard) -> bool {
    match guard {
        TensorBufferGuard::TensorFamilies => counts.tensor_elements() > 0,
        TensorBufferGuard::FiberElements => counts.fiber > 0,
        TensorBufferGuard::Always => true,
    }
}

/// Size and allocate response storage for `mesh`.
///
/// The fiber allocator is invoked only when some element's family policy
/// asks for the fiber state store. Every
/// buffer slot is created at its final size.
pub fn allocate(
    mesh: &Mesh,
    scheme: IntegrationScheme,
    guard: TensorBufferGuard,
    fiber: &mut dyn FiberStateAllocator,
) -> ResponseResult<Allocation> {
    scheme.validate()?;
    let counts = classify(mesh)?;
    let integration_points = scheme.integration_points();

    let fiber_elements = counts.fiber_store_elements();
    let fiber_store = fiber_elements > 0;
    if fiber_store {
        fiber.allocate_fiber_state(fiber_elements, mesh)?;
    }

    let required = tensor_buffer_required(&counts, guard);
    if !required && counts.tensor_elements() > 0 {
        log::warn!(
            "{:?} guard skipped the tensor buffer: {} elements need it ({} shell, {} fiber)",
            guard,
            counts.tensor_elements(),
            counts.shell(),
            counts.fiber
        );
    }

    let buffer = required.then(|| {
        ResponseBuffer::new(
            mesh.element_count(),
            mesh.dof_per_node,
            mesh.nodes_per_element,
            integration_points,
        )
    });

    log::info!(
        "response storage: {} elements ({} frame, {} shell, {} fiber, {} other), {} integration points, tensor buffer {}",
        counts.total(),
        counts.frame_2d + counts.frame_3d,
        counts.shell(),
        counts.fiber,
        counts.unclassified,
        integration_points,
        if buffer.is_some() { "allocated" } else { "skipped" }
    );

    Ok(Allocation {
        counts,
        integration_points,
        buffer,
        fiber_store,
    })
}
