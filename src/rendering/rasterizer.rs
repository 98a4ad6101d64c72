/// Occluder scanline rasterizer.
///
/// Writes the conservative maximum 1/w per covered pixel: the footprint
/// shrinks (edges and spans round inward) and the depth interpolant sits on
/// the pixel edge holding the larger depth. Every written pixel is fully
/// covered by the true geometry at a depth the geometry actually reaches.
use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;

use super::depth_buffer::DepthBuffer;
use super::edge::{Edge, EdgeData, Orientation};
use super::projector::ScreenVertex;

pub struct Rasterizer {
    clip_x: i32,
    clip_y: i32,
    /// 1/near: no valid w-buffer depth can exceed this.
    depth_limit: f32,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize, near: f32) -> Self {
        Self {
            clip_x: width as i32 - 1,
            clip_y: height as i32 - 1,
            depth_limit: 1.0 / near,
        }
    }

    /// Rasterize one screen-space triangle into the depth buffer.
    pub fn draw(&self, tri: &[ScreenVertex; 3], buffer: &mut DepthBuffer) {
        count_call!(FUNCTION_COUNTERS.render_triangle_calls);

        let mut edges = [
            Edge::new(&tri[0], &tri[1]),
            Edge::new(&tri[1], &tri[2]),
            Edge::new(&tri[2], &tri[0]),
        ];
        for edge in &mut edges {
            edge.round_occluder();
            edge.invert_z();
        }

        // The long edge spans the triangle's full height and bounds one side
        // of every span; the two short edges bound the other side in turn.
        let mut long_index = 0;
        for i in 1..3 {
            if edges[i].height() > edges[long_index].height() {
                long_index = i;
            }
        }
        let long = edges[long_index];

        // Vertical culling. A triangle shrunk to nothing is dropped too:
        // sub-pixel occluders cannot be trusted to cover any pixel.
        if long.y1 < 0.0 || long.y0 > self.clip_y as f32 || long.height() <= 0.0 {
            return;
        }

        self.draw_half(&long, &edges[(long_index + 1) % 3], buffer);
        self.draw_half(&long, &edges[(long_index + 2) % 3], buffer);
    }

    fn draw_half(&self, long: &Edge, short: &Edge, buffer: &mut DepthBuffer) {
        let Some(mut data) = EdgeData::new(long, short, self.clip_y) else {
            return;
        };
        let orientation = Orientation::of(&data, long, short);

        // Horizontal culling: the long edge bounds every span on its side,
        // so spans cannot reach back onto the screen past it.
        if orientation.long_is_right {
            if long.x0 < 0.0 && long.x1 < 0.0 {
                return;
            }
        } else if long.x0 > self.clip_x as f32 && long.x1 > self.clip_x as f32 {
            return;
        }

        let width = buffer.width;
        let depth = buffer.data_mut();
        for y in data.start_line..=data.stop_line {
            self.draw_span(&data, orientation, y, width, depth);
            data.step();
        }
    }

    fn draw_span(
        &self,
        data: &EdgeData,
        orientation: Orientation,
        y: i32,
        width: usize,
        depth: &mut [f32],
    ) {
        let (real_left, real_right, left_edge_z, right_edge_z) = if orientation.long_is_right {
            (data.short_x, data.long_x, data.short_z, data.long_z)
        } else {
            (data.long_x, data.short_x, data.long_z, data.short_z)
        };

        // Inward pixel rounding; spans narrower than a pixel vanish.
        let mut left_x = real_left.ceil();
        let mut right_x = real_right.floor();
        if right_x < left_x {
            return;
        }

        // Depth gradient along the scanline, reused to extrapolate the span
        // end depths onto their rounded integer columns.
        let span = real_right - real_left;
        let z_inc = if span > f32::EPSILON {
            (right_edge_z - left_edge_z) / span
        } else {
            0.0
        };
        let mut left_z = left_edge_z + (left_x - real_left) * z_inc;
        let mut right_z = left_edge_z + (right_x - real_left) * z_inc;

        // Horizontal clipping carries the boundary depth proportionally.
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
            return;
        }

        let pixels = (right_x - left_x) as i32;
        let mut depth_inc = if pixels > 0 {
            (right_z - left_z) / (right_x - left_x)
        } else {
            0.0
        };

        // Advance half a pixel onto the pixel edge holding the larger depth:
        // the stored value must bound the depth across the pixel footprint.
        let mut cur = if pixels == 0 {
            left_z.max(right_z)
        } else if orientation.max_depth_on_right() {
            left_z + 0.5 * depth_inc
        } else {
            left_z - 0.5 * depth_inc
        };

        // Depths past 1/near (or below zero) mean the extrapolation left the
        // valid range; recoverable, so clamp and keep rendering.
        let end = cur + depth_inc * pixels as f32;
        let tolerance = self.depth_limit * 1.000_000_1;
        if cur > tolerance || end > tolerance || cur < 0.0 || end < 0.0 {
            log::warn!(
                "span depth [{}, {}] outside [0, {}], clamping",
                cur.min(end),
                cur.max(end),
                self.depth_limit
            );
            let clamped_cur = cur.clamp(0.0, self.depth_limit);
            let clamped_end = end.clamp(0.0, self.depth_limit);
            depth_inc = if pixels > 0 {
                (clamped_end - clamped_cur) / pixels as f32
            } else {
                0.0
            };
            cur = clamped_cur;
        }

        let mut index = y as usize * width + left_x as usize;
        for _ in 0..=pixels {
            if cur > depth[index] {
                depth[index] = cur;
                count_call!(FUNCTION_COUNTERS.occluder_pixels_written);
            }
            cur += depth_inc;
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, w: f32) -> ScreenVertex {
        ScreenVertex { x, y, w }
    }

    fn coverage(buffer: &DepthBuffer) -> usize {
        buffer.data().iter().filter(|&&d| d > 0.0).count()
    }

    #[test]
    fn flat_triangle_writes_constant_depth() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        // Right triangle covering the lower-left half of the screen at w=2.
        let tri = [
            vertex(0.0, 0.0, 2.0),
            vertex(7.0, 7.0, 2.0),
            vertex(7.0, 0.0, 2.0),
        ];
        rasterizer.draw(&tri, &mut buffer);

        assert!(coverage(&buffer) > 0);
        for &d in buffer.data().iter().filter(|&&d| d > 0.0) {
            assert!((d - 0.5).abs() < 1e-5, "expected 1/w everywhere, got {}", d);
        }
    }

    #[test]
    fn writes_keep_the_maximum_depth() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        let near = [
            vertex(0.0, 0.0, 2.0),
            vertex(7.0, 7.0, 2.0),
            vertex(7.0, 0.0, 2.0),
        ];
        let far = [
            vertex(0.0, 0.0, 5.0),
            vertex(7.0, 7.0, 5.0),
            vertex(7.0, 0.0, 5.0),
        ];

        rasterizer.draw(&near, &mut buffer);
        rasterizer.draw(&far, &mut buffer);

        for &d in buffer.data().iter().filter(|&&d| d > 0.0) {
            assert!(
                (d - 0.5).abs() < 1e-5,
                "far write must not replace near depth"
            );
        }
    }

    #[test]
    fn footprint_shrinks_to_covered_pixels() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        // A triangle strictly inside one pixel cell leaves the buffer empty.
        let tri = [
            vertex(3.2, 3.2, 2.0),
            vertex(3.8, 3.8, 2.0),
            vertex(3.8, 3.2, 2.0),
        ];
        rasterizer.draw(&tri, &mut buffer);
        assert_eq!(coverage(&buffer), 0);
    }

    #[test]
    fn offscreen_triangles_are_culled() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        let above = [
            vertex(0.0, -9.0, 2.0),
            vertex(7.0, -2.0, 2.0),
            vertex(7.0, -9.0, 2.0),
        ];
        let left = [
            vertex(-9.0, 0.0, 2.0),
            vertex(-2.0, 7.0, 2.0),
            vertex(-2.0, 0.0, 2.0),
        ];
        rasterizer.draw(&above, &mut buffer);
        rasterizer.draw(&left, &mut buffer);
        assert_eq!(coverage(&buffer), 0);
    }

    #[test]
    fn partially_offscreen_span_is_clamped() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        // Wide triangle hanging off both horizontal screen edges.
        let tri = [
            vertex(-4.0, 0.0, 2.0),
            vertex(11.0, 7.0, 2.0),
            vertex(11.0, 0.0, 2.0),
        ];
        rasterizer.draw(&tri, &mut buffer);

        assert!(coverage(&buffer) > 0);
        for y in 0..8 {
            for x in 0..8 {
                let d = buffer.at(x, y);
                assert!(d == 0.0 || (d - 0.5).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn sloped_depth_stores_at_least_the_pixel_center_value() {
        let rasterizer = Rasterizer::new(8, 8, 1.0);
        let mut buffer = DepthBuffer::new(8, 8);

        // Depth rises left to right: w 4 -> 2, so 1/w 0.25 -> 0.5.
        let tri = [
            vertex(0.0, 0.0, 4.0),
            vertex(7.0, 7.0, 2.0),
            vertex(7.0, 0.0, 2.0),
        ];
        rasterizer.draw(&tri, &mut buffer);

        // The bottom row spans the full width; the stored value is biased
        // toward the deeper (right) pixel edge, never below the center.
        let z_left = 0.25;
        let z_inc = (0.5 - 0.25) / 7.0;
        for x in 0..8 {
            let written = buffer.at(x, 0);
            let center = z_left + z_inc * x as f32;
            assert!(
                written >= center - 1e-5,
                "pixel {} stored {} below its center depth {}",
                x,
                written,
                center
            );
        }
    }
}
