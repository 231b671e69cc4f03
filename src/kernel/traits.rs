//! SMEM and TMEM layouts of a tiled GEMM kernel
//!
//! SMEM (bytes, fixed chunk order):
//!
//! ```text
//! [LoadA   ] (1024B aligned)
//! [LoadB   ] (1024B aligned)
//! [ShuffleB] (1024B aligned) (slice-K only)
//! [GmemC0  ] (1024B aligned) (if needed)
//! [GmemC1  ] (1024B aligned) (DeepSeek FP8 only)
//! [RowMax  ] (16B aligned)   (DeepSeek FP8 only)
//! [SliceK  ] (16B aligned)   (slice-K only)
//! ```
//!
//! With split-K through DSMEM the GmemC0 tile overlaps the load buffers:
//!
//! ```text
//! [..LoadA..][..LoadB..][..ShuffleB..]
//! [..GmemC0..][..GmemC1..][..RowMax..][..SliceK..]
//! ```
//!
//! TMEM (32-bit columns): `[D][A][SfA][SfB]`.

use std::fmt;

use serde::Serialize;

use super::config::{AllReduceAlgo, KernelConfig};
use super::dtype::{ceil_div, Dtype};
use crate::error::{overflow_err, LayoutError, LayoutResult};
use crate::memory::{ChunkRole, LayoutReport, PoolBuilder, PoolLayout};

/// Alignment of TMA-accessed SMEM tiles
pub const SMEM_TILE_ALIGNMENT: usize = 1024;

/// Alignment of small SMEM scratch buffers
pub const SMEM_SCRATCH_ALIGNMENT: usize = 16;

/// Number of epilogue outputs with a GmemC staging buffer
pub const NUM_GMEM_C_OUTPUTS: usize = 2;

/// Roles in the SMEM pool, in chunk order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmemChunk {
    LoadA,
    LoadB,
    ShuffleB,
    GmemC0,
    GmemC1,
    RowMax,
    SliceK,
}

impl SmemChunk {
    /// GmemC staging buffer for epilogue output `res_idx`
    pub fn gmem_c(res_idx: usize) -> LayoutResult<Self> {
        match res_idx {
            0 => Ok(SmemChunk::GmemC0),
            1 => Ok(SmemChunk::GmemC1),
            _ => Err(LayoutError::IndexOutOfRange {
                index: res_idx,
                len: NUM_GMEM_C_OUTPUTS,
            }),
        }
    }
}

impl ChunkRole for SmemChunk {
    fn name(&self) -> &'static str {
        match self {
            SmemChunk::LoadA => "LoadA",
            SmemChunk::LoadB => "LoadB",
            SmemChunk::ShuffleB => "ShuffleB",
            SmemChunk::GmemC0 => "GmemC0",
            SmemChunk::GmemC1 => "GmemC1",
            SmemChunk::RowMax => "RowMax",
            SmemChunk::SliceK => "SliceK",
        }
    }
}

/// Roles in the TMEM pool, in chunk order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TmemChunk {
    /// Accumulators
    D,
    /// A operand staged in TMEM for slice-K
    A,
    /// Scaling factors of A
    SfA,
    /// Scaling factors of B
    SfB,
}

impl ChunkRole for TmemChunk {
    fn name(&self) -> &'static str {
        match self {
            TmemChunk::D => "D",
            TmemChunk::A => "A",
            TmemChunk::SfA => "SfA",
            TmemChunk::SfB => "SfB",
        }
    }
}

/// Planned SMEM and TMEM pools for one kernel configuration
///
/// Immutable after construction; every query takes `&self`, so one value
/// can be shared freely across threads.
///
/// # Example
///
/// ```rust,ignore
/// use tilelayout::kernel::{KernelConfig, KernelTraits, SmemChunk};
///
/// let traits = KernelTraits::new(&KernelConfig::default())?;
/// let smem_bytes = traits.smem_buffer_size();
/// let row_max = traits.smem_offset(SmemChunk::RowMax)?;
/// # Ok::<(), tilelayout::LayoutError>(())
/// ```
#[derive(Debug, Clone)]
pub struct KernelTraits {
    smem: PoolLayout<SmemChunk>,
    tmem: PoolLayout<TmemChunk>,
}

impl KernelTraits {
    /// Assemble both pools from a kernel configuration
    ///
    /// # Errors
    /// - `InvalidConfiguration` if `config` fails validation
    /// - `SizeOverflow` if a buffer size does not fit in `usize`
    pub fn new(config: &KernelConfig) -> LayoutResult<Self> {
        config.validate()?;

        let smem = build_smem_pool(config)?;
        let tmem = build_tmem_pool(config)?;

        tracing::debug!(
            "KernelTraits: smem {} bytes, tmem {} columns (tile {}x{}x{}, {} stages)",
            smem.total_size(),
            tmem.total_size(),
            config.tile_m,
            config.tile_n,
            config.tile_k,
            config.num_stages
        );

        Ok(Self { smem, tmem })
    }

    /// Total SMEM footprint in bytes
    pub fn smem_buffer_size(&self) -> usize {
        self.smem.total_size()
    }

    /// Total TMEM footprint in columns
    pub fn tmem_buffer_size(&self) -> usize {
        self.tmem.total_size()
    }

    /// Starting byte offset of an SMEM buffer
    pub fn smem_offset(&self, role: SmemChunk) -> LayoutResult<usize> {
        self.smem.offset_of(role)
    }

    /// Starting column of a TMEM buffer
    pub fn tmem_offset(&self, role: TmemChunk) -> LayoutResult<usize> {
        self.tmem.offset_of(role)
    }

    /// Start of the combined A/B load region
    pub fn smem_offset_load_ab(&self) -> LayoutResult<usize> {
        self.smem_offset(SmemChunk::LoadA)
    }

    /// Start of the GmemC staging buffer for epilogue output `res_idx`
    pub fn smem_offset_gmem_c(&self, res_idx: usize) -> LayoutResult<usize> {
        self.smem_offset(SmemChunk::gmem_c(res_idx)?)
    }

    pub fn smem(&self) -> &PoolLayout<SmemChunk> {
        &self.smem
    }

    pub fn tmem(&self) -> &PoolLayout<TmemChunk> {
        &self.tmem
    }

    /// Describe both pools
    pub fn report(&self) -> LayoutResult<KernelLayoutReport> {
        Ok(KernelLayoutReport {
            smem: self.smem.report()?,
            tmem: self.tmem.report()?,
        })
    }
}

/// Placement of every SMEM and TMEM buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelLayoutReport {
    pub smem: LayoutReport,
    pub tmem: LayoutReport,
}

impl fmt::Display for KernelLayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.smem, self.tmem)
    }
}

fn build_smem_pool(config: &KernelConfig) -> LayoutResult<PoolLayout<SmemChunk>> {
    let mut pool = PoolBuilder::new("smem");
    let slice_k = config.num_slices_for_slice_k;

    // LoadA starts the pool and is never reused.
    let load_a = num_bytes(
        "LoadA",
        config.dtype_elt,
        &[config.num_stages, config.tile_m, config.tile_k],
    )?;
    pool.add_chunk(SmemChunk::LoadA, load_a, SMEM_TILE_ALIGNMENT)?;

    let load_b = num_bytes(
        "LoadB",
        config.dtype_elt,
        &[config.num_stages, config.tile_n, config.tile_k],
    )?;
    pool.add_chunk(SmemChunk::LoadB, load_b, SMEM_TILE_ALIGNMENT)?;

    // Shuffled copy of B for slice-K.
    // TODO: shuffle in place once the smemB -> shuffle -> MMA dependency is tracked by the pipeline.
    let shuffle_b = if slice_k > 1 { load_b } else { 0 };
    pool.add_chunk(SmemChunk::ShuffleB, shuffle_b, SMEM_TILE_ALIGNMENT)?;

    for res_idx in 0..NUM_GMEM_C_OUTPUTS {
        let dtype_smem_c =
            if config.all_reduce_algo == AllReduceAlgo::TwoShot || config.num_slices_for_split_k > 1 {
                config.dtype_acc
            } else {
                config.dtype_c
            };
        let uses_smem_for_gmem_c = config.use_tma_store || config.split_k.uses_dsmem();

        // The leader CTA of a DSMEM split-K holds every K slice.
        let mut multiplier = if config.split_k.uses_dsmem() {
            config.num_slices_for_split_k
        } else {
            1
        };
        if slice_k > 1 {
            multiplier = multiplier
                .checked_mul(slice_k)
                .ok_or_else(|| overflow_err("GmemC multiplier"))?;
        }
        // The second epilogue output only exists for DeepSeek FP8.
        if res_idx != 0 && !config.use_deep_seek_fp8 {
            multiplier = 0;
        }

        let size = if uses_smem_for_gmem_c {
            num_bytes(
                "GmemC",
                dtype_smem_c,
                &[multiplier, config.epilogue_tile_m, config.epilogue_tile_n],
            )?
        } else {
            0
        };

        // GmemC0 may overwrite the load buffers once the mainloop is done.
        // Only valid without a persistent scheduler.
        let reuse = config.split_k.uses_dsmem() && res_idx == 0;
        pool.add_chunk_with_reuse(SmemChunk::gmem_c(res_idx)?, size, SMEM_TILE_ALIGNMENT, reuse)?;
    }

    let num_dq_sfs_c_per_cta = if config.transpose_mma_output {
        config.tile_m
    } else {
        config.tile_n
    };
    let row_max = if config.use_deep_seek_fp8 {
        num_bytes("RowMax", Dtype::Fp32, &[num_dq_sfs_c_per_cta])?
    } else {
        0
    };
    pool.add_chunk(SmemChunk::RowMax, row_max, SMEM_SCRATCH_ALIGNMENT)?;

    // Full tile before the slice-K reduction.
    let slice_k_tile = if slice_k > 1 {
        num_bytes(
            "SliceK",
            config.dtype_acc,
            &[slice_k, config.tile_m, slice_k, config.tile_n],
        )?
    } else {
        0
    };
    pool.add_chunk(SmemChunk::SliceK, slice_k_tile, SMEM_SCRATCH_ALIGNMENT)?;

    let smem = pool.build()?;

    let gmem_c0 = smem.chunk_of(SmemChunk::GmemC0)?;
    if gmem_c0.reuse_first_chunk() {
        let reserved = smem.plan().offset_before(smem.index_of(SmemChunk::GmemC0)?)?;
        let padded = gmem_c0.padded_size()?;
        if padded > reserved {
            tracing::warn!(
                "GmemC0 ({} bytes) outgrows the {} bytes of load buffers it reuses",
                padded,
                reserved
            );
        } else {
            tracing::debug!("GmemC0 reuses load buffers: {} bytes over {} reserved", padded, reserved);
        }
    }

    Ok(smem)
}

fn build_tmem_pool(config: &KernelConfig) -> LayoutResult<PoolLayout<TmemChunk>> {
    let mut pool = PoolBuilder::new("tmem");
    let slice_k = config.num_slices_for_slice_k;
    let column_bits = Dtype::UInt32.num_bits();

    let cols_d = product(
        "TMEM D",
        &[
            slice_k,
            config.tile_n,
            config.num_stages_mma,
            config.dtype_acc.num_bits(),
        ],
    )? / column_bits;
    pool.add_chunk(TmemChunk::D, cols_d, 2)?;

    let cols_a = if slice_k > 1 {
        let elts_per_column = slice_k * column_bits / config.dtype_elt.num_bits();
        product("TMEM A", &[config.num_stages, config.tile_k])? / elts_per_column
    } else {
        0
    };
    pool.add_chunk(TmemChunk::A, cols_a, 4)?;

    let use_block_scaling = config.dtype_elt.is_block_format();
    let sf_cols = |tile: usize| -> LayoutResult<usize> {
        if !use_block_scaling {
            return Ok(0);
        }
        product(
            "TMEM scaling factors",
            &[config.tile_k / 64, 2, ceil_div(tile, 64), config.num_stages],
        )
    };
    pool.add_chunk(TmemChunk::SfA, sf_cols(config.tile_m)?, 2)?;
    pool.add_chunk(TmemChunk::SfB, sf_cols(config.tile_n)?, 2)?;

    pool.build()
}

fn product(what: &str, factors: &[usize]) -> LayoutResult<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| overflow_err(what))
}

fn num_bytes(what: &str, dtype: Dtype, factors: &[usize]) -> LayoutResult<usize> {
    dtype
        .bytes_for(product(what, factors)?)
        .ok_or_else(|| overflow_err(what))
}
