/// Renderer facade: owns the depth buffer and orchestrates the occlusion
/// pipeline. `render` rasterizes occluders into conservative max depth;
/// `cull` filters a candidate list against the finished buffer.
use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::count_call;
use crate::error::{ConfigError, ShapeError};
use crate::perf::FUNCTION_COUNTERS;
use crate::scene::{Candidate, CullMode, OccluderMesh};

use super::bounds::BoundProjector;
use super::clipper::{is_back_facing, Clipper};
use super::depth_buffer::DepthBuffer;
use super::probe::OcclusionProbe;
use super::projector::Projector;
use super::rasterizer::Rasterizer;

pub struct Renderer {
    width: usize,
    height: usize,
    view: Mat4,
    clipper: Clipper,
    projector: Projector,
    rasterizer: Rasterizer,
    probe: OcclusionProbe,
    bound_projector: BoundProjector,
    depth: DepthBuffer,
    // Per-occluder camera-space positions: each vertex is transformed once,
    // then indexed per triangle.
    camera_space: Vec<Vec3>,
}

impl Renderer {
    pub fn new(width: usize, height: usize, camera: &Camera) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroViewport { width, height });
        }
        if camera.near <= 0.0 {
            return Err(ConfigError::BadNearPlane);
        }
        Ok(Self {
            width,
            height,
            view: camera.view_matrix(),
            clipper: Clipper::new(camera.near),
            projector: Projector::new(camera.projection_matrix(), width, height),
            rasterizer: Rasterizer::new(width, height, camera.near),
            probe: OcclusionProbe::new(width, height, camera.near),
            bound_projector: BoundProjector::new(camera.near),
            depth: DepthBuffer::new(width, height),
            camera_space: Vec::new(),
        })
    }

    /// Refresh the matrix snapshot from a camera that moved since the last
    /// frame. Buffers and scratch space are kept.
    pub fn update_camera(&mut self, camera: &Camera) -> Result<(), ConfigError> {
        if camera.near <= 0.0 {
            return Err(ConfigError::BadNearPlane);
        }
        self.view = camera.view_matrix();
        self.clipper = Clipper::new(camera.near);
        self.projector = Projector::new(camera.projection_matrix(), self.width, self.height);
        self.rasterizer = Rasterizer::new(self.width, self.height, camera.near);
        self.probe = OcclusionProbe::new(self.width, self.height, camera.near);
        self.bound_projector = BoundProjector::new(camera.near);
        Ok(())
    }

    /// Rasterize the occluder set into a fresh depth buffer. The whole batch
    /// is validated before the first write, so a failing call leaves the
    /// previous frame untouched.
    pub fn render(&mut self, occluders: &[OccluderMesh]) -> Result<(), ShapeError> {
        for occluder in occluders {
            occluder.validate()?;
        }
        self.depth.clear();
        for occluder in occluders {
            self.render_occluder(occluder);
        }
        Ok(())
    }

    fn render_occluder(&mut self, occluder: &OccluderMesh) {
        let view_model = self.view * occluder.model;

        self.camera_space.clear();
        self.camera_space.extend(
            (0..occluder.vertex_count()).map(|i| view_model.transform_point3(occluder.position(i))),
        );

        for triangle in occluder.indices.chunks_exact(3) {
            let tri = [
                self.camera_space[triangle[0] as usize],
                self.camera_space[triangle[1] as usize],
                self.camera_space[triangle[2] as usize],
            ];
            if is_back_facing(&tri) {
                count_call!(FUNCTION_COUNTERS.render_triangle_culled);
                continue;
            }
            let (count, clipped) = self.clipper.clip(tri);
            if count == 0 {
                count_call!(FUNCTION_COUNTERS.render_triangle_clipped);
                continue;
            }
            for clipped_tri in clipped.iter().take(count) {
                let screen = self.projector.project_triangle(clipped_tri);
                self.rasterizer.draw(&screen, &mut self.depth);
            }
        }
    }

    /// Filter a candidate list down to the entries that may still be
    /// visible, preserving input order. A candidate survives when any of its
    /// probe triangles finds a pixel the depth buffer cannot account for.
    pub fn cull<'a>(&self, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        let mut visible = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            count_call!(FUNCTION_COUNTERS.candidates_tested);
            if self.is_candidate_visible(candidate) {
                visible.push(candidate);
            } else {
                count_call!(FUNCTION_COUNTERS.candidates_culled);
            }
        }
        visible
    }

    fn is_candidate_visible(&self, candidate: &Candidate) -> bool {
        if candidate.cull_mode == CullMode::Never {
            return true;
        }
        let Some(occludee) =
            self.bound_projector
                .project(&candidate.bound, &self.view, &candidate.model)
        else {
            // The volume touches the near plane; never cull it.
            return true;
        };

        for tri in occludee.as_slice() {
            if is_back_facing(tri) {
                continue;
            }
            let (count, clipped) = self.clipper.clip(*tri);
            for clipped_tri in clipped.iter().take(count) {
                let screen = self.projector.project_triangle(clipped_tri);
                if !self.probe.test(&screen, &self.depth) {
                    return true;
                }
            }
        }
        false
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major depth data (y * width + x), 1/w per cell.
    pub fn depth(&self) -> &[f32] {
        self.depth.data()
    }

    /// Grayscale ARGB view of the depth buffer.
    pub fn depth_to_color(&self) -> Vec<u32> {
        self.depth.to_color()
    }

    /// Flag pixels where this renderer has depth but an external image shows
    /// only its clear color.
    pub fn diff(&self, external: &[u32], clear_color: u32) -> Vec<u32> {
        self.depth.diff(external, clear_color)
    }
}
