pub mod bounds;
pub mod clipper;
pub mod depth_buffer;
pub mod edge;
pub mod probe;
pub mod projector;
/// Depth-only software rasterization pipeline for occlusion culling.
pub mod rasterizer;
pub mod renderer;

pub use bounds::BoundProjector;
pub use clipper::Clipper;
pub use depth_buffer::DepthBuffer;
pub use probe::OcclusionProbe;
pub use projector::Projector;
pub use rasterizer::Rasterizer;
pub use renderer::Renderer;
