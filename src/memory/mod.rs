//! Static memory layout planning
//!
//! This module computes offsets for buffers that share one contiguous
//! address space, such as the shared memory or tensor memory of a single
//! kernel launch. Nothing here allocates: the planner only produces numbers
//! for a region the caller owns.
//!
//! # Pattern
//!
//! 1. Describe every buffer as a chunk (size, alignment, reuse flag)
//! 2. Lay chunks out in declaration order with a bump pointer
//! 3. Let chunks flagged for reuse overlap the start of the space, growing
//!    the shared span only when they are larger than what precedes them
//! 4. Look buffers up by role through a table recorded at assembly time

pub mod chunk;
pub mod plan;
pub mod pool;

pub use chunk::{round_up, ChunkDescriptor};
pub use plan::{LayoutPlan, PlanReport};
pub use pool::{ChunkReport, ChunkRole, LayoutReport, PoolBuilder, PoolLayout};
