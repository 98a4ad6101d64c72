pub mod camera;
pub mod error;
pub mod perf;
/// Softcull - CPU occlusion culling through a depth-only software rasterizer.
/// Occluders write conservative maximum depth, candidates probe conservative
/// minimum depth, and the gap between the two biases keeps culling safe.
pub mod rendering;
pub mod scene;

pub use camera::Camera;
pub use error::{ConfigError, ShapeError};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use rendering::{DepthBuffer, OcclusionProbe, Rasterizer, Renderer};
pub use scene::{Bound, Candidate, CullMode, OccluderMesh};
