use crate::annotations::point::PixelPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bounding box in center form, as produced by the detector.
///
/// `(x, y)` is the center of the box and `(w, h)` its full width and height, all in pixels.
/// This project uses the standard convention of the left side of the image being x=0 and the
/// top of the image being y=0.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CenterBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// The top-left and bottom-right corners of a box. Both corners are inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoxCorners {
    pub top_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

impl CenterBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        CenterBox { x, y, w, h }
    }

    /// Converts to corner form using floor division of the half sizes.
    ///
    /// No clamping to the image bounds is done, the renderer clips. Corners saturate at the
    /// `i32` range.
    pub fn corners(&self) -> BoxCorners {
        let half_w = self.w.div_euclid(2);
        let half_h = self.h.div_euclid(2);
        BoxCorners {
            top_left: PixelPoint::new(
                self.x.saturating_sub(half_w),
                self.y.saturating_sub(half_h),
            ),
            bottom_right: PixelPoint::new(
                self.x.saturating_add(half_w),
                self.y.saturating_add(half_h),
            ),
        }
    }
}

impl BoxCorners {
    /// Width in pixels, counting both corners.
    pub fn width(&self) -> u32 {
        span(self.top_left.x, self.bottom_right.x)
    }

    /// Height in pixels, counting both corners.
    pub fn height(&self) -> u32 {
        span(self.top_left.y, self.bottom_right.y)
    }
}

fn span(start: i32, end: i32) -> u32 {
    (end as i64 - start as i64 + 1).clamp(1, u32::MAX as i64) as u32
}

impl fmt::Display for CenterBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CenterBox {{ x: {}, y: {}, w: {}, h: {} }}", self.x, self.y, self.w, self.h)
    }
}
