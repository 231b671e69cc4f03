//! Shared helpers for integration tests
//!
//! - Chunk and plan construction shorthands
//! - Layout invariant checks reused by scenario and property tests
//! - Temp file helpers for config loading tests

mod tempfile_helpers;

#[allow(unused_imports)]
pub use tempfile_helpers::*;

use tilelayout::memory::{ChunkDescriptor, LayoutPlan};

/// Appended chunk; panics on invalid alignment
#[allow(dead_code)]
pub fn chunk(size: usize, alignment: usize) -> ChunkDescriptor {
    ChunkDescriptor::new(size, alignment).expect("valid alignment")
}

/// Chunk reusing the start of the space; panics on invalid alignment
#[allow(dead_code)]
pub fn reused(size: usize, alignment: usize) -> ChunkDescriptor {
    ChunkDescriptor::reusing_first(size, alignment).expect("valid alignment")
}

/// Half-open range `[offset, offset + padded)` of every chunk
#[allow(dead_code)]
pub fn chunk_ranges(plan: &LayoutPlan) -> Vec<(usize, usize)> {
    (0..plan.len())
        .map(|i| {
            let offset = plan.chunk_offset(i).expect("index in range");
            let padded = plan.chunks()[i].padded_size().expect("no overflow");
            (offset, offset + padded)
        })
        .collect()
}

/// Assert that no two non-empty, non-reused chunks overlap
#[allow(dead_code)]
pub fn assert_no_overlap(plan: &LayoutPlan) {
    let ranges = chunk_ranges(plan);
    let appended: Vec<usize> = (0..plan.len())
        .filter(|&i| !plan.chunks()[i].reuse_first_chunk() && !plan.chunks()[i].is_empty())
        .collect();

    for (a, &i) in appended.iter().enumerate() {
        for &j in &appended[a + 1..] {
            let (si, ei) = ranges[i];
            let (sj, ej) = ranges[j];
            assert!(
                ei <= sj || ej <= si,
                "chunks {} [{}, {}) and {} [{}, {}) overlap",
                i,
                si,
                ei,
                j,
                sj,
                ej
            );
        }
    }
}
