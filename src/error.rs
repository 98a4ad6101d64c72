use std::error::Error;
use std::fmt;

/// Construction-time configuration problems. The renderer refuses to build
/// rather than carry a degenerate viewport or near plane around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Viewport width or height is zero.
    ZeroViewport { width: usize, height: usize },
    /// Near plane distance must be strictly positive.
    BadNearPlane,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroViewport { width, height } => {
                write!(f, "viewport must be non-zero, got {}x{}", width, height)
            }
            ConfigError::BadNearPlane => write!(f, "near plane distance must be > 0"),
        }
    }
}

impl Error for ConfigError {}

/// Malformed occluder geometry, reported at submission time before any depth
/// writes happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    /// The index buffer does not describe whole triangles.
    IndexCountNotTriangles { index_count: usize },
    /// An index points past the end of the position buffer.
    IndexOutOfRange { index: u32, vertex_count: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::IndexCountNotTriangles { index_count } => {
                write!(f, "index count {} is not a multiple of 3", index_count)
            }
            ShapeError::IndexOutOfRange {
                index,
                vertex_count,
            } => {
                write!(
                    f,
                    "index {} out of range for {} vertices",
                    index, vertex_count
                )
            }
        }
    }
}

impl Error for ShapeError {}
