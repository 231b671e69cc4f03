//! Chunk descriptors for static layouts
//!
//! A chunk is one region in a shared address space: a byte size, an
//! alignment, and whether it overlaps the start of the space instead of
//! being appended after the chunks before it.

use serde::{Deserialize, Serialize};

use crate::error::{overflow_err, LayoutError, LayoutResult};

/// Round `size` up to the next multiple of `alignment`
///
/// Alignment must be a non-zero power of two.
///
/// # Errors
/// - `InvalidAlignment` if `alignment` is not a power of two
/// - `SizeOverflow` if the rounded size does not fit in `usize`
pub fn round_up(size: usize, alignment: usize) -> LayoutResult<usize> {
    if !alignment.is_power_of_two() {
        return Err(LayoutError::InvalidAlignment { alignment });
    }
    let bumped = size
        .checked_add(alignment - 1)
        .ok_or_else(|| overflow_err(&format!("round_up({}, {})", size, alignment)))?;
    Ok(bumped & !(alignment - 1))
}

/// One region of a chunked layout
///
/// Zero-sized chunks are valid and mean "absent in this configuration". They
/// still occupy a slot so role indices stay fixed across configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChunk")]
pub struct ChunkDescriptor {
    size_bytes: usize,
    alignment: usize,
    reuse_first_chunk: bool,
}

impl ChunkDescriptor {
    /// Create a chunk appended after the chunks before it
    ///
    /// # Errors
    /// `InvalidAlignment` if `alignment` is not a power of two.
    pub fn new(size_bytes: usize, alignment: usize) -> LayoutResult<Self> {
        Self::with_reuse(size_bytes, alignment, false)
    }

    /// Create a chunk that starts at the offset of chunk 0
    pub fn reusing_first(size_bytes: usize, alignment: usize) -> LayoutResult<Self> {
        Self::with_reuse(size_bytes, alignment, true)
    }

    /// Create a chunk with an explicit reuse flag
    pub fn with_reuse(
        size_bytes: usize,
        alignment: usize,
        reuse_first_chunk: bool,
    ) -> LayoutResult<Self> {
        if !alignment.is_power_of_two() {
            return Err(LayoutError::InvalidAlignment { alignment });
        }
        Ok(Self {
            size_bytes,
            alignment,
            reuse_first_chunk,
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn reuse_first_chunk(&self) -> bool {
        self.reuse_first_chunk
    }

    /// Size rounded up to this chunk's alignment
    pub fn padded_size(&self) -> LayoutResult<usize> {
        round_up(self.size_bytes, self.alignment)
    }

    /// Check if the chunk holds no data in this configuration
    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }
}

/// Unvalidated wire form, converted through `ChunkDescriptor::with_reuse`
#[derive(Debug, Deserialize)]
struct RawChunk {
    size_bytes: usize,
    alignment: usize,
    #[serde(default)]
    reuse_first_chunk: bool,
}

impl TryFrom<RawChunk> for ChunkDescriptor {
    type Error = LayoutError;

    fn try_from(raw: RawChunk) -> Result<Self, Self::Error> {
        ChunkDescriptor::with_reuse(raw.size_bytes, raw.alignment, raw.reuse_first_chunk)
    }
}
