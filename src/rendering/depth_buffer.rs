/// Single-channel inverse-w depth buffer for occlusion culling.
///
/// Each cell holds the maximum 1/w written during the current frame; 0.0
/// means "nothing rendered here". Larger values are closer to the camera.
/// A zeroed sibling buffer is kept as the memcpy source for per-frame reset.
use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;

pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    depth: Vec<f32>,
    clear_buffer: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth: vec![0.0; size],
            clear_buffer: vec![0.0; size],
        }
    }

    /// Reset depth data for a new frame.
    #[inline]
    pub fn clear(&mut self) {
        count_call!(FUNCTION_COUNTERS.depth_clear_calls);
        self.depth.copy_from_slice(&self.clear_buffer);
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.depth
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.depth
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Grayscale view of the depth buffer, one ARGB pixel per cell.
    /// Depth maps linearly onto [0, 255]; 0 depth stays black.
    pub fn to_color(&self) -> Vec<u32> {
        self.depth
            .iter()
            .map(|&d| {
                let gray = (d * 255.0).clamp(0.0, 255.0) as u32;
                0xFF000000 | (gray << 16) | (gray << 8) | gray
            })
            .collect()
    }

    /// Highlight cells where this buffer has depth but an externally rendered
    /// image still shows its clear color. Matching cells pass through the
    /// external pixel; mismatches are flagged red.
    pub fn diff(&self, external: &[u32], clear_color: u32) -> Vec<u32> {
        self.depth
            .iter()
            .zip(external.iter())
            .map(|(&d, &pixel)| {
                if d > 0.0 && pixel == clear_color {
                    0xFFFF0000
                } else {
                    pixel
                }
            })
            .collect()
    }
}
