//! Element response buffering and commit
//!
//! - [`allocator`] sizes the transient buffer once per run
//! - [`writer`] stores trial state per integration point during iterations
//! - [`committer`] merges the buffer into permanent records at convergence

pub mod allocator;
pub mod buffer;
pub mod committer;
pub mod fiber;
pub mod writer;

pub use allocator::{allocate, classify, Allocation, FamilyCounts};
pub use buffer::{BufferSlot, ResponseBuffer};
pub use committer::{commit_all, commit_all_par, commit_one, CommitContext};
pub use fiber::{DeferredFiberState, FiberStateAllocator};
pub use writer::{
    write_element, write_elements, write_elements_par, write_integration_point, ElementEvaluation,
};
