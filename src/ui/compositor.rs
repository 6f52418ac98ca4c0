//! Shape coverage and premultiplied compositing.
//!
//! Every shape is described by a signed distance function evaluated in
//! widget-local coordinates (origin at the widget center, y-down). Coverage
//! is derived from the distance with a fixed half-pixel feather, and layers
//! are folded together with the premultiplied source-over operator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::surface::{PixelSurface, Texel};

/// Straight (non-premultiplied) color with channels in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_u32(0x000000);
    pub const WHITE: Rgb = Rgb::from_u32(0xFFFFFF);

    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn from_u32(hex: u32) -> Rgb {
        Rgb {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    fn to_u32(self) -> u32 {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (byte(self.r) << 16) | (byte(self.g) << 8) | byte(self.b)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #RRGGBB")]
pub struct ColorParseError(String);

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(value));
        }
        match u32::from_str_radix(digits, 16) {
            Ok(hex) => Ok(Rgb::from_u32(hex)),
            Err(_) => Err(ColorParseError(value)),
        }
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> String { color.to_string() }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_u32())
    }
}

/// A premultiplied accumulator: color channels are already scaled by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Premultiplied {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Premultiplied {
    pub const TRANSPARENT: Premultiplied = Premultiplied { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Source-over: `dst = src·a + dst·(1 − a)` on every channel, alpha included.
    pub fn over(&mut self, color: Rgb, alpha: f32) {
        let inv = 1.0 - alpha;
        self.r = color.r * alpha + self.r * inv;
        self.g = color.g * alpha + self.g * inv;
        self.b = color.b * alpha + self.b * inv;
        self.a = alpha + self.a * inv;
    }

    pub fn from_texel(texel: Texel) -> Premultiplied {
        let unit = |v: u8| f32::from(v) / 255.0;
        Premultiplied {
            r: unit(texel.r()),
            g: unit(texel.g()),
            b: unit(texel.b()),
            a: unit(texel.a()),
        }
    }

    pub fn to_texel(self) -> Texel {
        let byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Texel::from_argb(byte(self.a), byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Fill coverage for a signed distance, feathered over half a pixel.
pub fn fill_coverage(distance: f32) -> f32 { (-distance + 0.5).clamp(0.0, 1.0) }

/// Coverage of a ring of `half_thickness` centered on the shape's edge.
pub fn ring_coverage(distance: f32, half_thickness: f32) -> f32 {
    fill_coverage(distance.abs() - half_thickness)
}

/// Flat-top regular hexagon of circumradius-like `radius`.
pub fn sdf_hexagon(x: f32, y: f32, radius: f32) -> f32 {
    const K: f32 = 0.866_025_4; // sqrt(3)/2
    let ax = x.abs();
    let ay = y.abs();
    (ax * 0.5 + ay * K).max(ax) - radius
}

/// Square rotated 45 degrees.
pub fn sdf_diamond(x: f32, y: f32, radius: f32) -> f32 { x.abs() + y.abs() - radius }

/// Quadratic falloff between `inner` and `outer`, scaled by `peak · breath`.
pub fn radial_glow(distance: f32, inner: f32, outer: f32, peak: f32, breath: f32) -> f32 {
    let span = outer - inner;
    let t = if span > 0.0 {
        ((distance - inner) / span).clamp(0.0, 1.0)
    } else if distance < outer {
        0.0
    } else {
        1.0
    };
    (1.0 - t * t) * peak * breath
}

/// `0.65 + 0.35·sin(elapsed·speed)`; never resets while the widget lives.
pub fn breath(elapsed_secs: f32, speed: f32) -> f32 { 0.65 + 0.35 * (elapsed_secs * speed).sin() }

/// A rotated coordinate frame, precomputed once per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    cos: f32,
    sin: f32,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { cos: 1.0, sin: 0.0 };

    pub fn new(angle: f32) -> Rotation { Rotation { cos: angle.cos(), sin: angle.sin() } }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.cos - y * self.sin, x * self.sin + y * self.cos)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Hexagon { radius: f32 },
    HexagonRing { radius: f32, half_thickness: f32 },
    Diamond { radius: f32 },
    Glow { inner: f32, outer: f32, peak: f32 },
}

/// One paint layer: a shape in its own rotated frame with a color and an
/// intensity multiplier applied to the computed coverage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Layer {
    pub shape: Shape,
    pub color: Rgb,
    pub rotation: Rotation,
    pub intensity: f32,
}

impl Layer {
    pub fn new(shape: Shape, color: Rgb) -> Layer {
        Layer {
            shape,
            color,
            rotation: Rotation::IDENTITY,
            intensity: 1.0,
        }
    }

    pub fn rotated(mut self, rotation: Rotation) -> Layer {
        self.rotation = rotation;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Layer {
        self.intensity = intensity;
        self
    }

    pub fn alpha_at(&self, x: f32, y: f32) -> f32 {
        let (x, y) = self.rotation.apply(x, y);
        let coverage = match self.shape {
            Shape::Hexagon { radius } => fill_coverage(sdf_hexagon(x, y, radius)),
            Shape::HexagonRing { radius, half_thickness } => {
                ring_coverage(sdf_hexagon(x, y, radius), half_thickness)
            }
            Shape::Diamond { radius } => fill_coverage(sdf_diamond(x, y, radius)),
            // Glow carries its own intensity through `peak`; the breath factor
            // arrives through `intensity`.
            Shape::Glow { inner, outer, peak } => {
                radial_glow((x * x + y * y).sqrt(), inner, outer, peak, 1.0)
            }
        };
        coverage * self.intensity
    }
}

/// Folds `layers` in order at one sample point.
pub fn composite(layers: &[Layer], x: f32, y: f32) -> Premultiplied {
    let mut acc = Premultiplied::TRANSPARENT;
    for layer in layers {
        let alpha = layer.alpha_at(x, y);
        if alpha > 0.0 {
            acc.over(layer.color, alpha);
        }
    }
    acc
}

/// Rasterizes `layers` over the whole surface, sampling pixel centers.
/// Every texel is overwritten.
pub fn rasterize(surface: &mut PixelSurface, layers: &[Layer]) {
    let cx = surface.width() as f32 * 0.5;
    let cy = surface.height() as f32 * 0.5;
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            let px = x as f32 + 0.5 - cx;
            let py = y as f32 + 0.5 - cy;
            surface.put(x, y, composite(layers, px, py).to_texel());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexagon_distance_signs() {
        assert!(sdf_hexagon(0.0, 0.0, 12.0) < 0.0);
        assert_eq!(sdf_hexagon(12.0, 0.0, 12.0), 0.0);
        assert!(sdf_hexagon(0.0, 14.0, 12.0) > 0.0);
    }

    #[test]
    fn diamond_is_l1_ball() {
        assert_eq!(sdf_diamond(2.0, -2.0, 4.0), 0.0);
        assert_eq!(sdf_diamond(0.0, 0.0, 4.0), -4.0);
    }

    #[test]
    fn coverage_feathers_over_half_pixel() {
        assert_eq!(fill_coverage(-1.0), 1.0);
        assert_eq!(fill_coverage(0.0), 0.5);
        assert_eq!(fill_coverage(0.5), 0.0);
        assert_eq!(ring_coverage(0.0, 0.5), 1.0);
        assert_eq!(ring_coverage(2.0, 0.5), 0.0);
    }

    #[test]
    fn glow_falls_off_quadratically() {
        assert_eq!(radial_glow(5.0, 10.0, 20.0, 0.6, 1.0), 0.6);
        assert!((radial_glow(15.0, 10.0, 20.0, 1.0, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(radial_glow(25.0, 10.0, 20.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn source_over_keeps_channels_premultiplied() {
        let mut acc = Premultiplied::TRANSPARENT;
        acc.over(Rgb::from_u32(0x00D4FF), 0.6);
        acc.over(Rgb::from_u32(0x1A1A2E), 0.5);
        assert!(acc.r <= acc.a && acc.g <= acc.a && acc.b <= acc.a);
        let texel = acc.to_texel();
        assert!(texel.r() <= texel.a() && texel.g() <= texel.a() && texel.b() <= texel.a());
    }

    #[test]
    fn opaque_layer_replaces_destination() {
        let mut acc = Premultiplied::TRANSPARENT;
        acc.over(Rgb::WHITE, 0.3);
        acc.over(Rgb::BLACK, 1.0);
        assert_eq!(acc, Premultiplied { r: 0.0, g: 0.0, b: 0.0, a: 1.0 });
    }

    #[test]
    fn rotation_turns_counter_clockwise_in_y_down_space() {
        let (x, y) = Rotation::new(std::f32::consts::FRAC_PI_2).apply(1.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn breath_stays_in_band() {
        for i in 0..100 {
            let b = breath(i as f32 * 0.37, 1.8);
            assert!((0.3..=1.0).contains(&b));
        }
    }

    #[test]
    fn color_parses_and_prints_hex() {
        let color = Rgb::try_from("#008CB4".to_string()).unwrap();
        assert_eq!(color, Rgb::from_u32(0x008CB4));
        assert_eq!(color.to_string(), "#008CB4");
        assert!(Rgb::try_from("008CB".to_string()).is_err());
        assert!(Rgb::try_from("#+FFFFF".to_string()).is_err());
        assert!(Rgb::try_from("#-00001".to_string()).is_err());
    }
}
