/// Edge bookkeeping for the scanline paths: y-sorted directed edges with
/// endpoint depths, per-pair interpolation state, and span orientation.
use super::projector::ScreenVertex;

/// Directed screen-space edge with endpoint depths, endpoints ordered so
/// y0 <= y1. z holds the camera-space w until `invert_z` turns it into the
/// w-buffer depth 1/w.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub x0: f32,
    pub y0: f32,
    pub z0: f32,
    pub x1: f32,
    pub y1: f32,
    pub z1: f32,
}

impl Edge {
    pub fn new(a: &ScreenVertex, b: &ScreenVertex) -> Self {
        if a.y <= b.y {
            Self {
                x0: a.x,
                y0: a.y,
                z0: a.w,
                x1: b.x,
                y1: b.y,
                z1: b.w,
            }
        } else {
            Self {
                x0: b.x,
                y0: b.y,
                z0: b.w,
                x1: a.x,
                y1: a.y,
                z1: a.w,
            }
        }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Snap endpoints inward. Shrinks the footprint; occluder side.
    pub fn round_occluder(&mut self) {
        self.x0 = self.x0.ceil();
        self.x1 = self.x1.floor();
        self.y0 = self.y0.ceil();
        self.y1 = self.y1.floor();
    }

    /// Snap endpoints outward. Grows the footprint; occludee side.
    pub fn round_occludee(&mut self) {
        self.x0 = self.x0.floor();
        self.x1 = self.x1.ceil();
        self.y0 = self.y0.floor();
        self.y1 = self.y1.ceil();
    }

    /// Convert endpoint w values into w-buffer depths (1/w). Interpolating
    /// the reciprocal linearly in screen space is what keeps the stored
    /// depth conservative.
    pub fn invert_z(&mut self) {
        self.z0 = 1.0 / self.z0;
        self.z1 = 1.0 / self.z1;
    }
}

/// Interpolation state for one (long edge, short edge) pair, stepped once
/// per scanline.
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    pub start_line: i32,
    pub stop_line: i32,
    pub long_x: f32,
    pub short_x: f32,
    pub long_z: f32,
    pub short_z: f32,
    pub long_x_inc: f32,
    pub short_x_inc: f32,
    pub long_z_inc: f32,
    pub short_z_inc: f32,
}

impl EdgeData {
    /// Build the pair state for the short edge's scanline range, clipped to
    /// [0, clip_y]. Returns None when the pair contributes no scanlines.
    pub fn new(long: &Edge, short: &Edge, clip_y: i32) -> Option<Self> {
        if short.y1 < 0.0 || short.y0 > clip_y as f32 {
            return None;
        }
        let start_line = short.y0.max(0.0) as i32;
        let stop_line = short.y1.min(clip_y as f32) as i32;
        if stop_line < start_line {
            return None;
        }

        let long_dy = long.height();
        let (long_x_inc, long_z_inc) = if long_dy > 0.0 {
            ((long.x1 - long.x0) / long_dy, (long.z1 - long.z0) / long_dy)
        } else {
            (0.0, 0.0)
        };
        let short_dy = short.height();
        let (short_x_inc, short_z_inc) = if short_dy > 0.0 {
            ((short.x1 - short.x0) / short_dy, (short.z1 - short.z0) / short_dy)
        } else {
            (0.0, 0.0)
        };

        // Seed interpolants at the first visible scanline so vertical
        // clipping keeps x and z consistent.
        let long_ahead = start_line as f32 - long.y0;
        let short_ahead = start_line as f32 - short.y0;

        Some(Self {
            start_line,
            stop_line,
            long_x: long.x0 + long_ahead * long_x_inc,
            short_x: short.x0 + short_ahead * short_x_inc,
            long_z: long.z0 + long_ahead * long_z_inc,
            short_z: short.z0 + short_ahead * short_z_inc,
            long_x_inc,
            short_x_inc,
            long_z_inc,
            short_z_inc,
        })
    }

    /// Advance all interpolants by one scanline.
    #[inline]
    pub fn step(&mut self) {
        self.long_x += self.long_x_inc;
        self.short_x += self.short_x_inc;
        self.long_z += self.long_z_inc;
        self.short_z += self.short_z_inc;
    }
}

/// Which side of the span the long edge bounds, and which side carries the
/// extreme depth.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    pub long_is_right: bool,
    pub leans_inward: bool,
}

impl Orientation {
    /// Decide orientation from the pair's first scanline. When both edges
    /// start at the same x they share a vertex and the slopes decide.
    pub fn of(data: &EdgeData, long: &Edge, short: &Edge) -> Self {
        let common_vertex = data.long_x == data.short_x;
        let long_is_right = if common_vertex {
            data.long_x_inc > data.short_x_inc
        } else {
            data.long_x > data.short_x
        };
        let leans_inward = if common_vertex {
            long.z1 < short.z1
        } else {
            long.z1 < short.z0
        };
        Self {
            long_is_right,
            leans_inward,
        }
    }

    /// True when the right pixel edge of a span pixel holds the maximum
    /// depth; the occludee path probes the opposite side.
    #[inline]
    pub fn max_depth_on_right(&self) -> bool {
        self.long_is_right == self.leans_inward
    }
}
