/// Scene-side contracts consumed by the renderer: occluder geometry that gets
/// rasterized into the depth buffer, and candidates that get tested against it.
use glam::{Mat4, Vec3};

use crate::error::ShapeError;

/// Triangle mesh rendered into the depth buffer.
///
/// Positions are flat xyz triples; indices are a triangle list. Front faces
/// keep the winding convention of the rasterizer's camera-space face test:
/// a triangle (v1, v2, v3) is front-facing when
/// `cross(v3 - v1, v2 - v1) . v1 <= 0` with all points in camera space.
pub struct OccluderMesh {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    pub model: Mat4,
}

impl OccluderMesh {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>, model: Mat4) -> Self {
        Self {
            positions,
            indices,
            model,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the index buffer before the mesh is allowed near the depth buffer.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.indices.len() % 3 != 0 {
            return Err(ShapeError::IndexCountNotTriangles {
                index_count: self.indices.len(),
            });
        }
        let vertex_count = self.vertex_count();
        for &index in &self.indices {
            if index as usize >= vertex_count {
                return Err(ShapeError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Fetch a position by vertex index. Callers must have validated the mesh.
    #[inline]
    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }
}

/// Whether a candidate may ever be removed by the occlusion test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Normal,
    /// The candidate is always reported visible.
    Never,
}

/// Bounding volume of a candidate, in model space.
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    Aabb { center: Vec3, extents: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

/// A render-list entry the culler decides to keep or drop.
pub struct Candidate {
    pub model: Mat4,
    pub cull_mode: CullMode,
    pub bound: Bound,
}

impl Candidate {
    pub fn aabb(model: Mat4, center: Vec3, extents: Vec3) -> Self {
        Self {
            model,
            cull_mode: CullMode::Normal,
            bound: Bound::Aabb { center, extents },
        }
    }

    pub fn sphere(model: Mat4, center: Vec3, radius: f32) -> Self {
        Self {
            model,
            cull_mode: CullMode::Normal,
            bound: Bound::Sphere { center, radius },
        }
    }

    pub fn never_culled(mut self) -> Self {
        self.cull_mode = CullMode::Never;
        self
    }
}
