/// Near-plane clipping of camera-space triangles, plus the camera-space
/// front-face test that runs before it.
///
/// The camera looks down -Z, so a vertex is on the visible side of the near
/// plane when z <= -near. A triangle crossing the plane is split; every
/// output vertex satisfies z <= -near.
use glam::Vec3;

/// Face test used by both the occluder and occludee paths. The normal is
/// taken as e2 x e1 (note the order); a positive projection onto v1 marks
/// the triangle back-facing. All shipped geometry winds to match this sign.
#[inline]
pub fn is_back_facing(tri: &[Vec3; 3]) -> bool {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let normal = e2.cross(e1);
    normal.dot(tri[0]) > 0.0
}

pub struct Clipper {
    near: f32,
}

impl Clipper {
    pub fn new(near: f32) -> Self {
        Self { near }
    }

    /// Clip one triangle against the near plane. Returns the number of
    /// output triangles (0, 1 or 2) written into the fixed-size array.
    pub fn clip(&self, tri: [Vec3; 3]) -> (usize, [[Vec3; 3]; 2]) {
        let limit = -self.near;
        let inside = [tri[0].z <= limit, tri[1].z <= limit, tri[2].z <= limit];
        let inside_count = inside.iter().filter(|&&i| i).count();

        let mut out = [[Vec3::ZERO; 3]; 2];
        match inside_count {
            0 => (0, out),
            3 => {
                out[0] = tri;
                (1, out)
            }
            2 => {
                // One vertex behind the plane: the triangle becomes a quad,
                // split along the (in0, new1) diagonal to keep the winding.
                let k = inside.iter().position(|&i| !i).unwrap();
                let i0 = (k + 1) % 3;
                let i1 = (k + 2) % 3;
                let new0 = self.intersect(tri[k], tri[i0]);
                let new1 = self.intersect(tri[k], tri[i1]);
                out[0] = [new0, tri[i0], new1];
                out[1] = [new1, tri[i0], tri[i1]];
                (2, out)
            }
            _ => {
                // Two vertices behind the plane: both slide to their
                // near-plane intersections, the triangle count is unchanged.
                let k = inside.iter().position(|&i| i).unwrap();
                let o0 = (k + 1) % 3;
                let o1 = (k + 2) % 3;
                let mut clipped = tri;
                clipped[o0] = self.intersect(tri[o0], tri[k]);
                clipped[o1] = self.intersect(tri[o1], tri[k]);
                out[0] = clipped;
                (1, out)
            }
        }
    }

    /// Point where the edge from an outside origin to an inside target
    /// pierces the near plane.
    #[inline]
    fn intersect(&self, origin: Vec3, target: Vec3) -> Vec3 {
        let r = (origin.z + self.near) / (origin.z - target.z);
        origin + (target - origin) * r
    }
}
