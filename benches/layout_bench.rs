//! Layout Planning Benchmark Suite
//!
//! Benchmarks for the planner and kernel pool assembly:
//! - Offset queries on plans of increasing length (queries are O(n))
//! - Plans with reused chunks
//! - Full SMEM/TMEM assembly for representative kernel configurations
//!
//! Run with: `cargo bench --bench layout_bench`

use std::hint::black_box;
use std::time::{Duration, Instant};

use tilelayout::kernel::{KernelConfig, KernelTraits, SmemChunk, SplitK};
use tilelayout::memory::{ChunkDescriptor, LayoutPlan};

// ============================================================================
// Benchmark Harness
// ============================================================================

struct Benchmark {
    name: String,
    iterations: usize,
    warmup_iterations: usize,
}

impl Benchmark {
    fn new(name: &str, iterations: usize) -> Self {
        Benchmark {
            name: name.to_string(),
            iterations,
            warmup_iterations: iterations.min(10),
        }
    }

    fn run<F, R>(&self, mut f: F) -> BenchmarkResult
    where
        F: FnMut() -> R,
    {
        for _ in 0..self.warmup_iterations {
            black_box(f());
        }

        let mut durations = Vec::with_capacity(self.iterations);
        for _ in 0..self.iterations {
            let start = Instant::now();
            black_box(f());
            durations.push(start.elapsed());
        }

        BenchmarkResult {
            name: self.name.clone(),
            iterations: self.iterations,
            durations,
        }
    }
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    durations: Vec<Duration>,
}

impl BenchmarkResult {
    fn report(&self) {
        let total: Duration = self.durations.iter().sum();
        let avg = total / self.iterations as u32;

        let mut sorted = self.durations.clone();
        sorted.sort();

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let p50 = sorted[sorted.len() / 2];
        let p95 = sorted[(sorted.len() * 95) / 100];

        println!("\n=== {} ===", self.name);
        println!("Iterations: {}", self.iterations);
        println!("Average: {:?} ({:.3} us)", avg, avg.as_secs_f64() * 1e6);
        println!("Min:     {:?}", min);
        println!("Max:     {:?}", max);
        println!("P50:     {:?}", p50);
        println!("P95:     {:?}", p95);
    }
}

// ============================================================================
// Planner Benchmarks
// ============================================================================

fn make_chunks(count: usize, reuse_every: usize) -> Vec<ChunkDescriptor> {
    (0..count)
        .map(|i| {
            let size = 64 + (i * 37) % 4096;
            let alignment = 1usize << (i % 11);
            let reuse = i > 0 && reuse_every > 0 && i % reuse_every == 0;
            ChunkDescriptor::with_reuse(size, alignment, reuse).expect("power-of-two alignment")
        })
        .collect()
}

fn benchmark_plan_queries() {
    println!("\n--- Plan Offset Queries ---");

    for &count in &[8usize, 64, 512] {
        let plan = LayoutPlan::new(make_chunks(count, 0)).expect("plan");
        let last = count - 1;

        let bench = Benchmark::new(&format!("chunk_offset(last) over {} chunks", count), 1000);
        bench
            .run(|| plan.chunk_offset(black_box(last)).expect("offset"))
            .report();
    }
}

fn benchmark_plan_construction() {
    println!("\n--- Plan Construction ---");

    for &(count, reuse_every) in &[(64usize, 0usize), (64, 4), (512, 8)] {
        let chunks = make_chunks(count, reuse_every);
        let bench = Benchmark::new(
            &format!("LayoutPlan::new {} chunks (reuse every {})", count, reuse_every),
            1000,
        );
        bench
            .run(|| LayoutPlan::new(black_box(chunks.clone())).expect("plan"))
            .report();
    }
}

// ============================================================================
// Kernel Assembly Benchmarks
// ============================================================================

fn benchmark_kernel_assembly() {
    println!("\n--- Kernel Pool Assembly ---");

    let configs = [
        ("default", KernelConfig::default()),
        (
            "dsmem split-k x4",
            KernelConfig::default().with_split_k(SplitK::Dsmem, 4),
        ),
        (
            "slice-k x4, 128x128x256",
            KernelConfig::default()
                .with_tile(128, 128, 256)
                .with_epilogue_tile(128, 128)
                .with_slice_k(4),
        ),
    ];

    for (label, config) in &configs {
        let bench = Benchmark::new(&format!("KernelTraits::new ({})", label), 1000);
        bench
            .run(|| KernelTraits::new(black_box(config)).expect("layout"))
            .report();

        let traits = KernelTraits::new(config).expect("layout");
        println!(
            "  smem {} bytes, tmem {} columns",
            traits.smem_buffer_size(),
            traits.tmem_buffer_size()
        );

        let bench = Benchmark::new(&format!("smem_offset(SliceK) ({})", label), 1000);
        bench
            .run(|| traits.smem_offset(black_box(SmemChunk::SliceK)).expect("offset"))
            .report();
    }
}

fn main() {
    println!("====================================");
    println!("tilelayout Layout Benchmark Suite");
    println!("====================================");

    benchmark_plan_queries();
    benchmark_plan_construction();
    benchmark_kernel_assembly();

    println!("\n====================================");
    println!("Benchmark suite complete");
    println!("====================================");
}
