use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in pixel coordinates.
///
/// Coordinates are signed because annotation geometry may legally fall outside the canvas.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        PixelPoint { x, y }
    }

    /// Returns this point moved by the given offsets, saturating at the `i32` range.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        PixelPoint { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
