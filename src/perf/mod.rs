/// Instrumentation for the occlusion pipeline: atomic call counters behind
/// the `profiling` feature.
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
