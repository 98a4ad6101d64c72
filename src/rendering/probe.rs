/// Occludee scanline probe.
///
/// Same span structure as the occluder rasterizer with the biases flipped:
/// edges and spans round outward so the probed footprint grows, the depth
/// interpolant sits on the pixel edge holding the smaller depth, and the
/// buffer is only read. The first pixel whose probe depth exceeds the stored
/// depth proves the triangle visible.
use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;

use super::depth_buffer::DepthBuffer;
use super::edge::{Edge, EdgeData, Orientation};
use super::projector::ScreenVertex;

pub struct OcclusionProbe {
    clip_x: i32,
    clip_y: i32,
    depth_limit: f32,
}

impl OcclusionProbe {
    pub fn new(width: usize, height: usize, near: f32) -> Self {
        Self {
            clip_x: width as i32 - 1,
            clip_y: height as i32 - 1,
            depth_limit: 1.0 / near,
        }
    }

    /// Test one screen-space triangle against the depth buffer. Returns true
    /// when every probed pixel is covered at least as deep as the probe;
    /// pixels clipped off the viewport are never probed.
    pub fn test(&self, tri: &[ScreenVertex; 3], buffer: &DepthBuffer) -> bool {
        count_call!(FUNCTION_COUNTERS.probe_triangle_calls);

        let mut edges = [
            Edge::new(&tri[0], &tri[1]),
            Edge::new(&tri[1], &tri[2]),
            Edge::new(&tri[2], &tri[0]),
        ];
        for edge in &mut edges {
            edge.round_occludee();
            edge.invert_z();
        }

        let mut long_index = 0;
        for i in 1..3 {
            if edges[i].height() > edges[long_index].height() {
                long_index = i;
            }
        }
        let long = edges[long_index];

        // Vertical culling: nothing on screen, nothing to disprove.
        if long.y1 < 0.0 || long.y0 > self.clip_y as f32 {
            return true;
        }

        self.test_half(&long, &edges[(long_index + 1) % 3], buffer)
            && self.test_half(&long, &edges[(long_index + 2) % 3], buffer)
    }

    fn test_half(&self, long: &Edge, short: &Edge, buffer: &DepthBuffer) -> bool {
        let Some(mut data) = EdgeData::new(long, short, self.clip_y) else {
            return true;
        };
        let orientation = Orientation::of(&data, long, short);

        // Horizontal culling, mirrored from the occluder path.
        if orientation.long_is_right {
            if long.x0 < 0.0 && long.x1 < 0.0 {
                return true;
            }
        } else if long.x0 > self.clip_x as f32 && long.x1 > self.clip_x as f32 {
            return true;
        }

        let width = buffer.width;
        let depth = buffer.data();
        for y in data.start_line..=data.stop_line {
            if !self.test_span(&data, orientation, y, width, depth) {
                count_call!(FUNCTION_COUNTERS.probe_early_outs);
                return false;
            }
            data.step();
        }
        true
    }

    fn test_span(
        &self,
        data: &EdgeData,
        orientation: Orientation,
        y: i32,
        width: usize,
        depth: &[f32],
    ) -> bool {
        let (real_left, real_right, left_edge_z, right_edge_z) = if orientation.long_is_right {
            (data.short_x, data.long_x, data.short_z, data.long_z)
        } else {
            (data.long_x, data.short_x, data.long_z, data.short_z)
        };

        // Outward pixel rounding grows the probed footprint.
        let mut left_x = real_left.floor();
        let mut right_x = real_right.ceil();
        if right_x < left_x {
            return true;
        }

        let span = real_right - real_left;
        let z_inc = if span > f32::EPSILON {
            (right_edge_z - left_edge_z) / span
        } else {
            0.0
        };
        let mut left_z = left_edge_z + (left_x - real_left) * z_inc;
        let mut right_z = left_edge_z + (right_x - real_left) * z_inc;

        if left_x < 0.0 {
            left_z += -left_x * z_inc;
            left_x = 0.0;
        }
        let clip_x = self.clip_x as f32;
        if right_x > clip_x {
            right_z += (clip_x - right_x) * z_inc;
            right_x = clip_x;
        }
        if right_x < left_x {
            return true;
        }

        // Extrapolating across the grown footprint may undershoot zero.
        left_z = left_z.max(0.0);
        right_z = right_z.max(0.0);

        let pixels = (right_x - left_x) as i32;
        let mut depth_inc = if pixels > 0 {
            (right_z - left_z) / (right_x - left_x)
        } else {
            0.0
        };

        // Advance half a pixel onto the pixel edge holding the smaller
        // depth: the probe must not claim more depth than the volume has
        // anywhere in the pixel footprint.
        let mut cur = if pixels == 0 {
            left_z.min(right_z)
        } else if orientation.max_depth_on_right() {
            left_z - 0.5 * depth_inc
        } else {
            left_z + 0.5 * depth_inc
        };

        let end = cur + depth_inc * pixels as f32;
        let tolerance = self.depth_limit * 1.000_000_1;
        if cur > tolerance || end > tolerance {
            log::warn!(
                "probe depth [{}, {}] above 1/near {}, clamping",
                cur.min(end),
                cur.max(end),
                self.depth_limit
            );
            let clamped_cur = cur.min(self.depth_limit);
            let clamped_end = end.min(self.depth_limit);
            depth_inc = if pixels > 0 {
                (clamped_end - clamped_cur) / pixels as f32
            } else {
                0.0
            };
            cur = clamped_cur;
        }

        let mut index = y as usize * width + left_x as usize;
        for _ in 0..=pixels {
            count_call!(FUNCTION_COUNTERS.probe_pixels_tested);
            if cur > depth[index] {
                return false;
            }
            cur += depth_inc;
            index += 1;
        }
        true
    }
}
