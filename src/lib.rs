//! tilelayout - static buffer layouts for tiled GEMM kernels
//!
//! Plans where each SMEM and TMEM buffer of a kernel lives inside its
//! shared address space. Buffers are laid out in a fixed order with
//! per-buffer alignment; buffers that are only live after earlier ones are
//! done may overlap the start of the space to shrink the footprint.

#![allow(clippy::new_without_default)] // Builders mirror `new()` + `Default` explicitly

pub mod error;
pub mod kernel;
pub mod logging;
pub mod memory;

pub use error::{ErrorCategory, LayoutError, LayoutResult};
pub use kernel::{KernelConfig, KernelTraits, SmemChunk, TmemChunk};
pub use logging::{init_logging_default, init_with_config, LoggingConfig};
pub use memory::{ChunkDescriptor, LayoutPlan, PoolLayout};
