/// Instrumentation for the occlusion pipeline hot paths.
/// Counters are atomics so the demo and benches can read them without
/// threading state through the renderer.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe call counters for the render and probe paths.
pub struct FunctionCounters {
    // Occluder rasterization counters
    pub render_triangle_calls: AtomicU64,
    pub render_triangle_clipped: AtomicU64,
    pub render_triangle_culled: AtomicU64,
    pub occluder_pixels_written: AtomicU64,

    // Occludee probe counters
    pub probe_triangle_calls: AtomicU64,
    pub probe_pixels_tested: AtomicU64,
    pub probe_early_outs: AtomicU64,

    // Facade counters
    pub candidates_tested: AtomicU64,
    pub candidates_culled: AtomicU64,
    pub depth_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            render_triangle_calls: AtomicU64::new(0),
            render_triangle_clipped: AtomicU64::new(0),
            render_triangle_culled: AtomicU64::new(0),
            occluder_pixels_written: AtomicU64::new(0),
            probe_triangle_calls: AtomicU64::new(0),
            probe_pixels_tested: AtomicU64::new(0),
            probe_early_outs: AtomicU64::new(0),
            candidates_tested: AtomicU64::new(0),
            candidates_culled: AtomicU64::new(0),
            depth_clear_calls: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.render_triangle_calls.store(0, Ordering::Relaxed);
        self.render_triangle_clipped.store(0, Ordering::Relaxed);
        self.render_triangle_culled.store(0, Ordering::Relaxed);
        self.occluder_pixels_written.store(0, Ordering::Relaxed);
        self.probe_triangle_calls.store(0, Ordering::Relaxed);
        self.probe_pixels_tested.store(0, Ordering::Relaxed);
        self.probe_early_outs.store(0, Ordering::Relaxed);
        self.candidates_tested.store(0, Ordering::Relaxed);
        self.candidates_culled.store(0, Ordering::Relaxed);
        self.depth_clear_calls.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            render_triangle_calls: self.render_triangle_calls.load(Ordering::Relaxed),
            render_triangle_clipped: self.render_triangle_clipped.load(Ordering::Relaxed),
            render_triangle_culled: self.render_triangle_culled.load(Ordering::Relaxed),
            occluder_pixels_written: self.occluder_pixels_written.load(Ordering::Relaxed),
            probe_triangle_calls: self.probe_triangle_calls.load(Ordering::Relaxed),
            probe_pixels_tested: self.probe_pixels_tested.load(Ordering::Relaxed),
            probe_early_outs: self.probe_early_outs.load(Ordering::Relaxed),
            candidates_tested: self.candidates_tested.load(Ordering::Relaxed),
            candidates_culled: self.candidates_culled.load(Ordering::Relaxed),
            depth_clear_calls: self.depth_clear_calls.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, cheap to pass around and diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterSnapshot {
    pub render_triangle_calls: u64,
    pub render_triangle_clipped: u64,
    pub render_triangle_culled: u64,
    pub occluder_pixels_written: u64,
    pub probe_triangle_calls: u64,
    pub probe_pixels_tested: u64,
    pub probe_early_outs: u64,
    pub candidates_tested: u64,
    pub candidates_culled: u64,
    pub depth_clear_calls: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Occlusion Pipeline Counters ===");
        println!("\nOccluder Rasterization:");
        println!("  render_triangle calls:      {:12}", self.render_triangle_calls);
        println!("  triangles clipped away:     {:12}", self.render_triangle_clipped);
        println!("  triangles back-face culled: {:12}", self.render_triangle_culled);
        println!("  depth pixels written:       {:12}", self.occluder_pixels_written);

        println!("\nOccludee Probing:");
        println!("  probe_triangle calls:       {:12}", self.probe_triangle_calls);
        println!("  probe pixels tested:        {:12}", self.probe_pixels_tested);
        println!("  probe early-outs:           {:12}", self.probe_early_outs);
        if self.probe_triangle_calls > 0 {
            let early_rate =
                (self.probe_early_outs as f64 / self.probe_triangle_calls as f64) * 100.0;
            println!("  early-out rate:             {:11.2}%", early_rate);
        }

        println!("\nCulling:");
        println!("  candidates tested:          {:12}", self.candidates_tested);
        println!("  candidates culled:          {:12}", self.candidates_culled);

        println!("\nDepth Buffer:");
        println!("  clear calls:                {:12}", self.depth_clear_calls);

        println!();
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}
