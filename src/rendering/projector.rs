/// Projection and viewport mapping for the occlusion pipeline.
///
/// Only x and y take the homogeneous divide; z is never divided because the
/// depth buffer stores 1/w, computed later from the kept w. The viewport
/// mapping uses width-1 / height-1 so NDC +1 lands exactly on the last
/// addressable pixel.
use glam::{Mat4, Vec3, Vec4};

/// A pipeline vertex after projection: pixel coordinates plus the
/// camera-space distance along the view axis (the homogeneous w).
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

pub struct Projector {
    projection: Mat4,
    half_clip_x: f32,
    half_clip_y: f32,
}

impl Projector {
    pub fn new(projection: Mat4, width: usize, height: usize) -> Self {
        Self {
            projection,
            half_clip_x: (width - 1) as f32 * 0.5,
            half_clip_y: (height - 1) as f32 * 0.5,
        }
    }

    #[inline]
    pub fn project(&self, v: Vec3) -> ScreenVertex {
        let clip = self.projection * Vec4::new(v.x, v.y, v.z, 1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        ScreenVertex {
            x: (ndc_x + 1.0) * self.half_clip_x,
            y: (ndc_y + 1.0) * self.half_clip_y,
            w: clip.w,
        }
    }

    #[inline]
    pub fn project_triangle(&self, tri: &[Vec3; 3]) -> [ScreenVertex; 3] {
        [
            self.project(tri[0]),
            self.project(tri[1]),
            self.project(tri[2]),
        ]
    }
}
