//! Kernel buffer layouts
//!
//! Turns a [`KernelConfig`] into the SMEM and TMEM layouts of a tiled GEMM
//! kernel. Each pool has a fixed role order so offsets stay addressable by
//! role across configurations, even when a buffer is empty.

pub mod config;
pub mod dtype;
pub mod traits;

pub use config::{AllReduceAlgo, KernelConfig, SplitK};
pub use dtype::{ceil_div, Dtype};
pub use traits::{KernelLayoutReport, KernelTraits, SmemChunk, TmemChunk};
