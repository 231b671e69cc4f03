//! Bump-pointer layout planning with first-chunk reuse
//!
//! Chunks are placed in declaration order. A chunk flagged with
//! `reuse_first_chunk` starts at chunk 0's offset instead; it only grows the
//! reserved span if its padded size exceeds everything counted before it.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{io_context, overflow_err, LayoutError, LayoutResult};

use super::chunk::{round_up, ChunkDescriptor};

/// Immutable layout over an ordered chunk sequence
///
/// Offsets are recomputed on every query from the stored sequence. The
/// total size is computed once in [`LayoutPlan::new`], which also surfaces
/// any arithmetic overflow before the plan can be queried.
///
/// # Example
///
/// ```rust,ignore
/// use tilelayout::memory::{ChunkDescriptor, LayoutPlan};
///
/// let plan = LayoutPlan::new(vec![
///     ChunkDescriptor::new(100, 16)?,
///     ChunkDescriptor::new(50, 16)?,
/// ])?;
///
/// assert_eq!(plan.chunk_offset(1)?, 112);
/// assert_eq!(plan.total_size(), 176);
/// # Ok::<(), tilelayout::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    chunks: Vec<ChunkDescriptor>,
    total_size: usize,
}

impl LayoutPlan {
    /// Build a plan from an ordered chunk sequence
    ///
    /// # Errors
    /// - `ReusedFirstChunk` if chunk 0 is flagged as reusing itself
    /// - `SizeOverflow` if the total footprint does not fit in `usize`
    pub fn new(chunks: Vec<ChunkDescriptor>) -> LayoutResult<Self> {
        if chunks.first().is_some_and(|c| c.reuse_first_chunk()) {
            return Err(LayoutError::ReusedFirstChunk);
        }

        let total_size = Self::footprint(&chunks)?;

        tracing::debug!(
            "LayoutPlan built: {} chunks, {} bytes total",
            chunks.len(),
            total_size
        );

        Ok(Self { chunks, total_size })
    }

    /// Footprint of the prefix `chunks[0..j)`
    ///
    /// This is where chunk `j` would start if it were not reused, before
    /// aligning to its own alignment. `j` may equal `len()`.
    ///
    /// Padding in front of each earlier chunk is included. This differs from
    /// a plain sum of padded sizes when alignment grows along the sequence:
    /// `[1/1, 16/16]` totals 32 here rather than 17, so the second chunk
    /// starts on its own 16-byte boundary.
    ///
    /// # Errors
    /// `IndexOutOfRange` if `j > len()`.
    pub fn offset_before(&self, j: usize) -> LayoutResult<usize> {
        if j > self.chunks.len() {
            return Err(LayoutError::IndexOutOfRange {
                index: j,
                len: self.chunks.len(),
            });
        }
        Self::footprint(&self.chunks[..j])
    }

    /// Starting offset of chunk `i`
    ///
    /// # Errors
    /// `IndexOutOfRange` if `i >= len()`.
    pub fn chunk_offset(&self, i: usize) -> LayoutResult<usize> {
        let chunk = self.chunk(i)?;

        // Reuse always means reuse-from-start: alias chunk 0.
        let target = if chunk.reuse_first_chunk() { 0 } else { i };
        let target_chunk = &self.chunks[target];

        let offset = round_up(self.offset_before(target)?, target_chunk.alignment())?;

        tracing::trace!(
            "chunk {} at offset {} (alignment={}, reused={})",
            i,
            offset,
            chunk.alignment(),
            chunk.reuse_first_chunk()
        );

        Ok(offset)
    }

    /// Parse a JSON array of chunk descriptors and plan it
    ///
    /// `reuse_first_chunk` may be omitted and defaults to `false`.
    ///
    /// # Errors
    /// - `ConfigParse` if the text is not a valid chunk list
    /// - anything [`LayoutPlan::new`] rejects
    pub fn from_json_str(json: &str) -> LayoutResult<Self> {
        let chunks: Vec<ChunkDescriptor> = serde_json::from_str(json)?;
        Self::new(chunks)
    }

    /// Load a JSON chunk list from a file and plan it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LayoutResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| io_context(e, &format!("reading chunk list {}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Starting offset of every chunk, in order
    pub fn offsets(&self) -> LayoutResult<Vec<usize>> {
        (0..self.chunks.len()).map(|i| self.chunk_offset(i)).collect()
    }

    /// Describe the plan for inspection output
    pub fn report(&self) -> LayoutResult<PlanReport> {
        Ok(PlanReport {
            total_size: self.total_size,
            offsets: self.offsets()?,
            chunks: self.chunks.clone(),
        })
    }

    /// Footprint of the whole sequence
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Get chunk `i`
    pub fn chunk(&self, i: usize) -> LayoutResult<&ChunkDescriptor> {
        self.chunks.get(i).ok_or(LayoutError::IndexOutOfRange {
            index: i,
            len: self.chunks.len(),
        })
    }

    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Accumulate the footprint of a chunk prefix
    ///
    /// A non-empty appended chunk starts at the running total rounded up to
    /// its own alignment, so padding in front of it is counted. Empty chunks
    /// contribute nothing, not even padding.
    ///
    /// A reused chunk stretches the running total when it is larger than
    /// what came before it and contributes nothing otherwise. Comparison is
    /// always against the total before that chunk, so among several reused
    /// chunks the largest wins regardless of position.
    fn footprint(chunks: &[ChunkDescriptor]) -> LayoutResult<usize> {
        let mut total = 0usize;
        for chunk in chunks {
            let padded = chunk.padded_size()?;
            if chunk.reuse_first_chunk() {
                if padded > total {
                    total = padded;
                }
            } else if padded > 0 {
                total = round_up(total, chunk.alignment())?
                    .checked_add(padded)
                    .ok_or_else(|| overflow_err("layout footprint"))?;
            }
        }
        Ok(total)
    }
}

/// Offsets and total of an unnamed chunk list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub total_size: usize,
    pub offsets: Vec<usize>,
    pub chunks: Vec<ChunkDescriptor>,
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "plan (total {})", self.total_size)?;
        for (i, (chunk, offset)) in self.chunks.iter().zip(&self.offsets).enumerate() {
            writeln!(
                f,
                "  [{}] offset {:>8}  size {:>8}  align {:>5}{}",
                i,
                offset,
                chunk.size_bytes(),
                chunk.alignment(),
                if chunk.reuse_first_chunk() { "  (reuses start)" } else { "" }
            )?;
        }
        Ok(())
    }
}
