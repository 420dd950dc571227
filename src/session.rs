//! Analysis session - owns the response buffer and permanent element records

use crate::analysis::{AnalysisOptions, ConfigLookup, IntegrationScheme};
use crate::error::{ResponseError, ResponseResult};
use crate::mesh::Mesh;
use crate::response::{
    self, Allocation, CommitContext, DeferredFiberState, ElementEvaluation, FamilyCounts,
    FiberStateAllocator, ResponseBuffer,
};
use crate::results::{CommitSummary, ElementResponse};

/// Response state of one analysis run.
///
/// Created once per mesh; the integration point count fixed here is used
/// by every write and commit for the rest of the run.
#[derive(Debug)]
pub struct AnalysisSession {
    mesh: Mesh,
    options: AnalysisOptions,
    integration_points: usize,
    counts: FamilyCounts,
    fiber_store: bool,
    buffer: Option<ResponseBuffer>,
    records: Vec<ElementResponse>,
    committed_steps: usize,
}

impl AnalysisSession {
    /// Allocate response storage for `mesh`
    pub fn new(mesh: Mesh, options: AnalysisOptions) -> ResponseResult<Self> {
        Self::with_fiber_allocator(mesh, options, &mut DeferredFiberState)
    }

    /// Allocate response storage, handing fiber elements to `fiber`
    pub fn with_fiber_allocator(
        mesh: Mesh,
        options: AnalysisOptions,
        fiber: &mut dyn FiberStateAllocator,
    ) -> ResponseResult<Self> {
        let Allocation {
            counts,
            integration_points,
            buffer,
            fiber_store,
        } = response::allocate(&mesh, options.integration, options.buffer_guard, fiber)?;

        let records = (0..mesh.element_count())
            .map(|_| {
                ElementResponse::new(mesh.dof_per_node, mesh.nodes_per_element, integration_points)
            })
            .collect();

        Ok(Self {
            mesh,
            options,
            integration_points,
            counts,
            fiber_store,
            buffer,
            records,
            committed_steps: 0,
        })
    }

    /// Allocate with the integration scheme read from a configuration lookup
    pub fn from_lookup(
        mesh: Mesh,
        lookup: &dyn ConfigLookup,
        options: AnalysisOptions,
    ) -> ResponseResult<Self> {
        let options = options.with_integration(IntegrationScheme::from_lookup(lookup)?);
        Self::new(mesh, options)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Integration points per element for this run
    pub fn integration_points(&self) -> usize {
        self.integration_points
    }

    pub fn family_counts(&self) -> &FamilyCounts {
        &self.counts
    }

    /// Whether the fiber state store was requested at allocation
    pub fn fiber_store(&self) -> bool {
        self.fiber_store
    }

    /// The transient buffer, if it was allocated
    pub fn buffer(&self) -> Option<&ResponseBuffer> {
        self.buffer.as_ref()
    }

    /// Permanent records in element order
    pub fn responses(&self) -> &[ElementResponse] {
        &self.records
    }

    /// Permanent record of the element at a 1-based index
    pub fn response(&self, element: usize) -> ResponseResult<&ElementResponse> {
        element
            .checked_sub(1)
            .and_then(|i| self.records.get(i))
            .ok_or(ResponseError::ElementNotFound(element))
    }

    /// Number of commit passes run so far
    pub fn committed_steps(&self) -> usize {
        self.committed_steps
    }

    /// Zeroed evaluation for an element, sized for this run.
    ///
    /// The hardening curve is taken from the element's attribute.
    pub fn evaluation(&self, element: usize) -> ResponseResult<ElementEvaluation> {
        let attribute = self.mesh.element_attribute(element)?;
        let nodes = self.mesh.element(element)?.nodes.len();
        let nodes = if nodes == 0 { self.mesh.nodes_per_element } else { nodes };
        let mut eval = ElementEvaluation::new(
            element,
            attribute.family(),
            self.mesh.dof_per_node,
            nodes,
            self.integration_points,
        );
        eval.hardening.curve = attribute.hardening_curve.clone();
        Ok(eval)
    }

    /// Store one integration point of an element evaluation
    pub fn record_integration_point(
        &mut self,
        eval: &ElementEvaluation,
        point: usize,
    ) -> ResponseResult<()> {
        let buffer = self.buffer.as_mut().ok_or(ResponseError::BufferNotAllocated)?;
        response::write_integration_point(buffer, eval, point)
    }

    /// Store every integration point of an element evaluation
    pub fn record_evaluation(&mut self, eval: &ElementEvaluation) -> ResponseResult<()> {
        let buffer = self.buffer.as_mut().ok_or(ResponseError::BufferNotAllocated)?;
        response::write_element(buffer, eval)
    }

    /// Store a batch of evaluations; later entries win for repeated elements.
    ///
    /// Nothing is written unless every evaluation fits the buffer.
    pub fn record_evaluations(&mut self, evals: &[ElementEvaluation]) -> ResponseResult<()> {
        let buffer = self.buffer.as_mut().ok_or(ResponseError::BufferNotAllocated)?;
        if self.options.parallel {
            response::write_elements_par(buffer, evals)
        } else {
            response::write_elements(buffer, evals)
        }
    }

    /// Commit the buffered state of every element after a converged step.
    ///
    /// Without a buffer there is nothing to commit; the records are left
    /// untouched and an empty summary is returned.
    pub fn commit_step(&mut self) -> ResponseResult<CommitSummary> {
        let Some(buffer) = self.buffer.as_ref() else {
            log::warn!("commit requested but no response buffer was allocated");
            return Ok(CommitSummary::default());
        };

        let ctx = CommitContext::new(buffer, &self.options.units);
        let summary = if self.options.parallel {
            response::commit_all_par(&mut self.records, buffer, &ctx)?
        } else {
            response::commit_all(&mut self.records, buffer, &ctx)?
        };
        self.committed_steps += 1;

        if self.options.log {
            log::info!(
                "step {} committed: {} elastic, {} plastic, {} undefined",
                self.committed_steps,
                summary.elastic,
                summary.plastic,
                summary.undefined
            );
        } else {
            log::debug!("step {} committed: {:?}", self.committed_steps, summary);
        }
        Ok(summary)
    }

    /// Permanent records as pretty-printed JSON
    pub fn responses_json(&self) -> ResponseResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}
