//! Role-indexed buffer pools
//!
//! A pool pairs a [`LayoutPlan`] with a lookup table from symbolic roles to
//! fixed chunk indices. The table is recorded while the pool is assembled,
//! so callers ask for "the offset of the output buffer" instead of passing
//! magic indices around.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::error::{LayoutError, LayoutResult};

use super::chunk::ChunkDescriptor;
use super::plan::LayoutPlan;

/// Symbolic name of a chunk within a pool
pub trait ChunkRole: Copy + Eq + Hash + fmt::Debug {
    /// Stable name used in logs and reports
    fn name(&self) -> &'static str;
}

/// Assemble a pool chunk by chunk
///
/// Chunks are laid out in the order they are added; each role is assigned
/// the index of the chunk it was added with.
///
/// # Example
/// ```ignore
/// let mut builder = PoolBuilder::new("smem");
/// builder.add_chunk(SmemChunk::LoadA, 32768, 1024)?;
/// builder.add_reused_chunk(SmemChunk::GmemC0, 65536, 1024)?;
///
/// let pool = builder.build()?;
/// println!("Need {} bytes", pool.total_size());
/// ```
#[derive(Debug, Clone)]
pub struct PoolBuilder<R: ChunkRole> {
    name: &'static str,
    chunks: Vec<ChunkDescriptor>,
    roles: Vec<R>,
}

impl<R: ChunkRole> PoolBuilder<R> {
    /// Create an empty builder for the named pool
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            chunks: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Append a chunk after all previously added chunks
    ///
    /// # Errors
    /// `InvalidAlignment` if `alignment` is not a power of two.
    pub fn add_chunk(&mut self, role: R, size_bytes: usize, alignment: usize) -> LayoutResult<()> {
        self.push(role, ChunkDescriptor::new(size_bytes, alignment)?)
    }

    /// Add a chunk that overlaps the start of the pool
    pub fn add_reused_chunk(
        &mut self,
        role: R,
        size_bytes: usize,
        alignment: usize,
    ) -> LayoutResult<()> {
        self.push(role, ChunkDescriptor::reusing_first(size_bytes, alignment)?)
    }

    /// Add a chunk with a reuse flag decided by configuration
    pub fn add_chunk_with_reuse(
        &mut self,
        role: R,
        size_bytes: usize,
        alignment: usize,
        reuse_first_chunk: bool,
    ) -> LayoutResult<()> {
        self.push(
            role,
            ChunkDescriptor::with_reuse(size_bytes, alignment, reuse_first_chunk)?,
        )
    }

    /// Get the number of chunks added so far
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Plan the pool
    ///
    /// # Errors
    /// Anything [`LayoutPlan::new`] rejects.
    pub fn build(self) -> LayoutResult<PoolLayout<R>> {
        let role_index = self
            .roles
            .iter()
            .enumerate()
            .map(|(idx, role)| (*role, idx))
            .collect();
        let plan = LayoutPlan::new(self.chunks)?;

        tracing::debug!(
            "Pool '{}' planned: {} chunks, total {}",
            self.name,
            plan.len(),
            plan.total_size()
        );

        Ok(PoolLayout {
            name: self.name,
            plan,
            roles: self.roles,
            role_index,
        })
    }

    fn push(&mut self, role: R, chunk: ChunkDescriptor) -> LayoutResult<()> {
        if self.roles.contains(&role) {
            return Err(crate::config_error!(
                "role {} added twice to pool '{}'",
                role.name(),
                self.name
            ));
        }
        self.chunks.push(chunk);
        self.roles.push(role);
        Ok(())
    }
}

/// Planned pool with role lookups
#[derive(Debug, Clone)]
pub struct PoolLayout<R: ChunkRole> {
    name: &'static str,
    plan: LayoutPlan,
    roles: Vec<R>,
    role_index: HashMap<R, usize>,
}

impl<R: ChunkRole> PoolLayout<R> {
    /// Fixed chunk index assigned to `role`
    pub fn index_of(&self, role: R) -> LayoutResult<usize> {
        self.role_index
            .get(&role)
            .copied()
            .ok_or_else(|| LayoutError::UnassignedRole(role.name().to_string()))
    }

    /// Starting offset of the chunk holding `role`
    pub fn offset_of(&self, role: R) -> LayoutResult<usize> {
        self.plan.chunk_offset(self.index_of(role)?)
    }

    /// Descriptor of the chunk holding `role`
    pub fn chunk_of(&self, role: R) -> LayoutResult<&ChunkDescriptor> {
        self.plan.chunk(self.index_of(role)?)
    }

    pub fn total_size(&self) -> usize {
        self.plan.total_size()
    }

    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Roles in chunk order
    pub fn roles(&self) -> &[R] {
        &self.roles
    }

    /// Describe every chunk of the pool
    pub fn report(&self) -> LayoutResult<LayoutReport> {
        let chunks = self
            .roles
            .iter()
            .enumerate()
            .map(|(idx, role)| -> LayoutResult<ChunkReport> {
                let chunk = self.plan.chunk(idx)?;
                Ok(ChunkReport {
                    index: idx,
                    role: role.name(),
                    size: chunk.size_bytes(),
                    padded_size: chunk.padded_size()?,
                    alignment: chunk.alignment(),
                    reuse_first_chunk: chunk.reuse_first_chunk(),
                    offset: self.plan.chunk_offset(idx)?,
                })
            })
            .collect::<LayoutResult<Vec<_>>>()?;

        Ok(LayoutReport {
            pool: self.name,
            total_size: self.total_size(),
            chunks,
        })
    }
}

/// Placement of one chunk, for inspection output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub role: &'static str,
    pub size: usize,
    pub padded_size: usize,
    pub alignment: usize,
    pub reuse_first_chunk: bool,
    pub offset: usize,
}

impl ChunkReport {
    /// One past the last unit this chunk occupies
    pub fn end(&self) -> usize {
        self.offset + self.padded_size
    }
}

/// Placement of every chunk in a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub pool: &'static str,
    pub total_size: usize,
    pub chunks: Vec<ChunkReport>,
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (total {})", self.pool, self.total_size)?;
        for chunk in &self.chunks {
            writeln!(
                f,
                "  [{}] {:<10} offset {:>8}  size {:>8}  padded {:>8}  align {:>5}{}",
                chunk.index,
                chunk.role,
                chunk.offset,
                chunk.size,
                chunk.padded_size,
                chunk.alignment,
                if chunk.reuse_first_chunk { "  (reuses start)" } else { "" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestRole {
        Input,
        Scratch,
        Output,
        Missing,
    }

    impl ChunkRole for TestRole {
        fn name(&self) -> &'static str {
            match self {
                TestRole::Input => "input",
                TestRole::Scratch => "scratch",
                TestRole::Output => "output",
                TestRole::Missing => "missing",
            }
        }
    }

    fn test_pool() -> PoolLayout<TestRole> {
        let mut builder = PoolBuilder::new("test");
        builder.add_chunk(TestRole::Input, 100, 16).unwrap();
        builder.add_chunk(TestRole::Scratch, 50, 16).unwrap();
        builder.add_reused_chunk(TestRole::Output, 8, 1).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_role_lookup() {
        let pool = test_pool();
        assert_eq!(pool.index_of(TestRole::Scratch).unwrap(), 1);
        assert_eq!(pool.offset_of(TestRole::Input).unwrap(), 0);
        assert_eq!(pool.offset_of(TestRole::Scratch).unwrap(), 112);
        assert_eq!(pool.offset_of(TestRole::Output).unwrap(), 0);
        assert_eq!(pool.total_size(), 176);
        assert_eq!(
            pool.roles(),
            &[TestRole::Input, TestRole::Scratch, TestRole::Output]
        );
    }

    #[test]
    fn test_unassigned_role() {
        let pool = test_pool();
        let err = pool.offset_of(TestRole::Missing).unwrap_err();
        assert!(matches!(err, LayoutError::UnassignedRole(ref name) if name == "missing"));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let mut builder = PoolBuilder::new("dup");
        builder.add_chunk(TestRole::Input, 8, 8).unwrap();
        assert!(builder.add_chunk(TestRole::Input, 8, 8).is_err());
        assert_eq!(builder.chunk_count(), 1);
    }

    #[test]
    fn test_invalid_alignment_rejected_by_builder() {
        let mut builder: PoolBuilder<TestRole> = PoolBuilder::new("bad");
        let err = builder.add_chunk(TestRole::Input, 10, 3).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAlignment { alignment: 3 }));
    }

    #[test]
    fn test_reused_first_role_rejected() {
        let mut builder = PoolBuilder::new("reuse");
        builder.add_reused_chunk(TestRole::Output, 8, 8).unwrap();
        assert!(matches!(builder.build(), Err(LayoutError::ReusedFirstChunk)));
    }

    #[test]
    fn test_report() {
        let report = test_pool().report().unwrap();
        assert_eq!(report.pool, "test");
        assert_eq!(report.total_size, 176);
        assert_eq!(report.chunks.len(), 3);
        assert_eq!(report.chunks[1].role, "scratch");
        assert_eq!(report.chunks[1].offset, 112);
        assert_eq!(report.chunks[1].end(), 176);
        assert!(report.chunks[2].reuse_first_chunk);

        let text = report.to_string();
        assert!(text.starts_with("test (total 176)"));
        assert!(text.contains("reuses start"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["chunks"][0]["role"], "input");
        assert_eq!(json["total_size"], 176);
    }
}
