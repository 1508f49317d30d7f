use image::Rgb;
use serde::{Deserialize, Serialize};

/// An opaque RGB drawing color.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

/// A color in HSV space. All three components are fractions in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    /// A fully saturated, full value color of the given hue.
    pub fn pure(h: f64) -> Self {
        Hsv { h, s: 1.0, v: 1.0 }
    }
}

/// Converts HSV to RGB with the six-sector piecewise linear formula.
///
/// Hue wraps, so `h = 1.0` gives the same color as `h = 0.0`.
pub fn hsv_to_rgb(hsv: Hsv) -> Color {
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);
    let scaled_hue = hsv.h.rem_euclid(1.0) * 6.0;
    let sector = scaled_hue.floor();
    let f = scaled_hue - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as u8) % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Color::new(to_channel(r), to_channel(g), to_channel(b))
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
