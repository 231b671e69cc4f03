//! Configuration for tiled GEMM kernel layouts
//!
//! This module defines [`KernelConfig`], the tile geometry, data types,
//! pipeline depths and feature flags that decide how large each SMEM and
//! TMEM buffer of a kernel is.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dtype::Dtype;
use crate::config_error;
use crate::error::{io_context, LayoutResult};

/// How split-K partial results are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitK {
    /// No split-K
    #[default]
    None,
    /// Partial tiles are reduced through global memory
    Gmem,
    /// Partial tiles are reduced through distributed shared memory in a CGA
    Dsmem,
}

impl SplitK {
    /// Check if the reduction stages partial tiles in distributed SMEM
    pub fn uses_dsmem(&self) -> bool {
        matches!(self, SplitK::Dsmem)
    }
}

/// All-reduce strategy fused into the epilogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllReduceAlgo {
    #[default]
    None,
    OneShot,
    TwoShot,
}

/// Kernel parameters that determine buffer sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Element type of the A and B operands
    pub dtype_elt: Dtype,

    /// Element type of the C output
    pub dtype_c: Dtype,

    /// Accumulator type
    pub dtype_acc: Dtype,

    /// CTA tile size in M
    pub tile_m: usize,

    /// CTA tile size in N
    pub tile_n: usize,

    /// CTA tile size in K
    pub tile_k: usize,

    /// Epilogue tile size in M
    pub epilogue_tile_m: usize,

    /// Epilogue tile size in N
    pub epilogue_tile_n: usize,

    /// Number of load pipeline stages
    pub num_stages: usize,

    /// Number of MMA accumulator stages
    pub num_stages_mma: usize,

    /// Number of K slices reduced across CTAs
    pub num_slices_for_split_k: usize,

    /// Number of K slices reduced within a CTA
    pub num_slices_for_slice_k: usize,

    /// Split-K reduction strategy
    pub split_k: SplitK,

    /// Store C through SMEM with TMA
    pub use_tma_store: bool,

    /// MMA output is transposed (rows map to N)
    pub transpose_mma_output: bool,

    /// Fused all-reduce strategy
    pub all_reduce_algo: AllReduceAlgo,

    /// DeepSeek FP8 block scaling (two epilogue outputs plus per-row max)
    pub use_deep_seek_fp8: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            dtype_elt: Dtype::E4m3,
            dtype_c: Dtype::Bfloat16,
            dtype_acc: Dtype::Fp32,
            tile_m: 128,
            tile_n: 8,
            tile_k: 128,
            epilogue_tile_m: 128,
            epilogue_tile_n: 8,
            num_stages: 3,
            num_stages_mma: 1,
            num_slices_for_split_k: 1,
            num_slices_for_slice_k: 1,
            split_k: SplitK::None,
            use_tma_store: true,
            transpose_mma_output: true,
            all_reduce_algo: AllReduceAlgo::None,
            use_deep_seek_fp8: true,
        }
    }
}

impl KernelConfig {
    /// Create a new kernel config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from JSON text
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> LayoutResult<Self> {
        let config: KernelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LayoutResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| io_context(e, &format!("reading kernel config {}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Check that the parameters can produce a layout
    pub fn validate(&self) -> LayoutResult<()> {
        let positive = [
            ("tile_m", self.tile_m),
            ("tile_n", self.tile_n),
            ("tile_k", self.tile_k),
            ("epilogue_tile_m", self.epilogue_tile_m),
            ("epilogue_tile_n", self.epilogue_tile_n),
            ("num_stages", self.num_stages),
            ("num_stages_mma", self.num_stages_mma),
            ("num_slices_for_split_k", self.num_slices_for_split_k),
            ("num_slices_for_slice_k", self.num_slices_for_slice_k),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(config_error!("{} must be > 0", name));
            }
        }

        Ok(())
    }

    /// Set the operand, output and accumulator types
    pub fn with_dtypes(mut self, elt: Dtype, c: Dtype, acc: Dtype) -> Self {
        self.dtype_elt = elt;
        self.dtype_c = c;
        self.dtype_acc = acc;
        self
    }

    /// Set the CTA tile
    pub fn with_tile(mut self, tile_m: usize, tile_n: usize, tile_k: usize) -> Self {
        self.tile_m = tile_m;
        self.tile_n = tile_n;
        self.tile_k = tile_k;
        self
    }

    /// Set the epilogue tile
    pub fn with_epilogue_tile(mut self, epilogue_tile_m: usize, epilogue_tile_n: usize) -> Self {
        self.epilogue_tile_m = epilogue_tile_m;
        self.epilogue_tile_n = epilogue_tile_n;
        self
    }

    /// Set load and MMA pipeline depths
    pub fn with_stages(mut self, num_stages: usize, num_stages_mma: usize) -> Self {
        self.num_stages = num_stages;
        self.num_stages_mma = num_stages_mma;
        self
    }

    /// Set split-K strategy and slice count
    pub fn with_split_k(mut self, split_k: SplitK, num_slices: usize) -> Self {
        self.split_k = split_k;
        self.num_slices_for_split_k = num_slices;
        self
    }

    /// Set the number of intra-CTA K slices
    pub fn with_slice_k(mut self, num_slices: usize) -> Self {
        self.num_slices_for_slice_k = num_slices;
        self
    }

    pub fn with_tma_store(mut self, use_tma_store: bool) -> Self {
        self.use_tma_store = use_tma_store;
        self
    }

    pub fn with_transpose_mma_output(mut self, transpose: bool) -> Self {
        self.transpose_mma_output = transpose;
        self
    }

    pub fn with_all_reduce_algo(mut self, algo: AllReduceAlgo) -> Self {
        self.all_reduce_algo = algo;
        self
    }

    pub fn with_deep_seek_fp8(mut self, enabled: bool) -> Self {
        self.use_deep_seek_fp8 = enabled;
        self
    }
}
