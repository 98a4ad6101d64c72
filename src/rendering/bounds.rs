/// Occludee geometry emission: turns a candidate's bounding volume into
/// camera-space triangles for the shared clip -> project -> probe pipeline.
use glam::{Mat4, Vec3};

use crate::scene::Bound;

/// Camera-space triangles covering a bound's silhouette. A box contributes
/// up to 12 (back faces are dropped later by the face test), a sphere 2.
pub struct OccludeeTriangles {
    triangles: [[Vec3; 3]; 12],
    count: usize,
}

impl OccludeeTriangles {
    #[inline]
    pub fn as_slice(&self) -> &[[Vec3; 3]] {
        &self.triangles[..self.count]
    }
}

// Corner index bits: 1 = +x, 2 = +y, 4 = +z. Each face winds so that it
// passes the camera-space front-face test when its plane faces the camera.
const BOX_TRIANGLES: [[usize; 3]; 12] = [
    [4, 7, 5],
    [4, 6, 7], // +z
    [1, 2, 0],
    [1, 3, 2], // -z
    [5, 3, 1],
    [5, 7, 3], // +x
    [0, 6, 4],
    [0, 2, 6], // -x
    [3, 6, 2],
    [3, 7, 6], // +y
    [0, 5, 1],
    [0, 4, 5], // -y
];

pub struct BoundProjector {
    near: f32,
}

impl BoundProjector {
    pub fn new(near: f32) -> Self {
        Self { near }
    }

    /// Emit the probe triangles for a bound. Returns None when the volume
    /// touches or crosses the near plane (or surrounds the camera); callers
    /// must treat None as "not occluded".
    pub fn project(&self, bound: &Bound, view: &Mat4, model: &Mat4) -> Option<OccludeeTriangles> {
        match *bound {
            Bound::Aabb { center, extents } => self.project_aabb(center, extents, view, model),
            Bound::Sphere { center, radius } => self.project_sphere(center, radius, view, model),
        }
    }

    fn project_aabb(
        &self,
        center: Vec3,
        extents: Vec3,
        view: &Mat4,
        model: &Mat4,
    ) -> Option<OccludeeTriangles> {
        let view_model = *view * *model;

        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let offset = Vec3::new(
                if i & 1 != 0 { extents.x } else { -extents.x },
                if i & 2 != 0 { extents.y } else { -extents.y },
                if i & 4 != 0 { extents.z } else { -extents.z },
            );
            *corner = view_model.transform_point3(center + offset);
            if corner.z > -self.near {
                return None;
            }
        }

        let mut out = OccludeeTriangles {
            triangles: [[Vec3::ZERO; 3]; 12],
            count: 12,
        };
        for (slot, indices) in out.triangles.iter_mut().zip(BOX_TRIANGLES.iter()) {
            *slot = [corners[indices[0]], corners[indices[1]], corners[indices[2]]];
        }
        Some(out)
    }

    fn project_sphere(
        &self,
        center: Vec3,
        radius: f32,
        view: &Mat4,
        model: &Mat4,
    ) -> Option<OccludeeTriangles> {
        let view_model = *view * *model;
        let center_cam = view_model.transform_point3(center);

        // The view transform is rigid; only the model matrix can scale.
        let scale = model
            .x_axis
            .truncate()
            .length()
            .max(model.y_axis.truncate().length())
            .max(model.z_axis.truncate().length());
        let r = radius * scale;

        // Nearest point of the sphere along the view axis.
        let near_z = center_cam.z + r;
        if near_z > -self.near {
            return None;
        }

        let dist = -center_cam.z;
        let tangent_sq = dist * dist - r * r;
        if tangent_sq <= 0.0 {
            // Camera inside the sphere.
            return None;
        }

        // Half extent of a camera-facing billboard at the nearest z that
        // bounds the projected silhouette from every view direction.
        let half = r * dist / tangent_sq.sqrt();

        let a = Vec3::new(center_cam.x - half, center_cam.y - half, near_z);
        let b = Vec3::new(center_cam.x + half, center_cam.y - half, near_z);
        let c = Vec3::new(center_cam.x + half, center_cam.y + half, near_z);
        let d = Vec3::new(center_cam.x - half, center_cam.y + half, near_z);

        let mut out = OccludeeTriangles {
            triangles: [[Vec3::ZERO; 3]; 12],
            count: 2,
        };
        out.triangles[0] = [a, c, b];
        out.triangles[1] = [a, d, c];
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::clipper::is_back_facing;

    #[test]
    fn box_in_front_emits_twelve_triangles() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Aabb {
            center: Vec3::new(0.0, 0.0, -5.0),
            extents: Vec3::splat(1.0),
        };
        let triangles = projector
            .project(&bound, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .expect("box is fully past the near plane");
        assert_eq!(triangles.as_slice().len(), 12);
    }

    #[test]
    fn exactly_one_box_face_pair_faces_a_head_on_camera() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Aabb {
            center: Vec3::new(0.0, 0.0, -5.0),
            extents: Vec3::splat(1.0),
        };
        let triangles = projector
            .project(&bound, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .unwrap();
        let front = triangles
            .as_slice()
            .iter()
            .filter(|tri| !is_back_facing(tri))
            .count();
        assert_eq!(front, 2, "only the +z face looks at the origin");
    }

    #[test]
    fn box_crossing_near_plane_is_not_projected() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Aabb {
            center: Vec3::new(0.0, 0.0, -1.5),
            extents: Vec3::splat(1.0),
        };
        assert!(projector
            .project(&bound, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .is_none());
    }

    #[test]
    fn sphere_emits_a_conservative_billboard() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Sphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        let triangles = projector
            .project(&bound, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .unwrap();
        let slice = triangles.as_slice();
        assert_eq!(slice.len(), 2);

        for tri in slice {
            assert!(!is_back_facing(tri), "billboard must face the camera");
            for v in tri {
                assert!((v.z - (-4.0)).abs() < 1e-6, "billboard sits at the nearest z");
            }
        }

        // Half extent beats the raw radius, covering the silhouette cone.
        let half = (slice[0][1].x - slice[0][0].x) * 0.5;
        assert!(half > 1.0);
        assert!(half < 1.1, "but stays a tight bound at this distance");
    }

    #[test]
    fn sphere_touching_near_plane_is_not_projected() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Sphere {
            center: Vec3::new(0.0, 0.0, -1.5),
            radius: 1.0,
        };
        assert!(projector
            .project(&bound, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .is_none());
    }

    #[test]
    fn model_scale_grows_the_sphere() {
        let projector = BoundProjector::new(1.0);
        let bound = Bound::Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let model = Mat4::from_scale(Vec3::splat(2.0)) * Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let scaled = projector
            .project(&bound, &Mat4::IDENTITY, &model)
            .expect("sphere still clear of the near plane");
        let slice = scaled.as_slice();
        let half = (slice[0][1].x - slice[0][0].x) * 0.5;
        assert!(half > 2.0, "model scale doubles the radius");
    }
}
