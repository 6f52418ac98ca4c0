use crate::ui::compositor::{self, Layer, Rgb, Rotation, Shape};
use crate::ui::surface::PixelSurface;

/// Design size the radii below are expressed in.
const DESIGN_SIZE: f32 = 32.0;
const GLOW_INNER: f32 = 10.7;
const GLOW_OUTER: f32 = 15.3;
const GLOW_PEAK: f32 = 0.6;
const BODY_RADIUS: f32 = 12.0;
const RING_RADIUS: f32 = 10.0;
const RING_HALF_THICKNESS: f32 = 0.5;
const CORE_RADIUS: f32 = 4.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IndicatorStyle {
    pub accent: Rgb,
    pub body: Rgb,
}

/// The four layers of the badge, back to front: glow, hexagon body,
/// hexagon ring, and a counter-rotating diamond core.
pub fn layers(style: &IndicatorStyle, size: i32, angle: f32, breath: f32) -> [Layer; 4] {
    let scale = size as f32 / DESIGN_SIZE;
    let spin = Rotation::new(angle);
    let counter = Rotation::new(-angle);
    [
        Layer::new(
            Shape::Glow {
                inner: GLOW_INNER * scale,
                outer: GLOW_OUTER * scale,
                peak: GLOW_PEAK,
            },
            style.accent,
        )
        .with_intensity(breath),
        Layer::new(Shape::Hexagon { radius: BODY_RADIUS * scale }, style.body).rotated(spin),
        Layer::new(
            Shape::HexagonRing {
                radius: RING_RADIUS * scale,
                half_thickness: RING_HALF_THICKNESS * scale,
            },
            style.accent,
        )
        .rotated(spin)
        .with_intensity(breath),
        Layer::new(Shape::Diamond { radius: CORE_RADIUS * scale }, style.accent).rotated(counter),
    ]
}

pub fn paint(surface: &mut PixelSurface, style: &IndicatorStyle, angle: f32, breath: f32) {
    let size = surface.width().min(surface.height());
    compositor::rasterize(surface, &layers(style, size, angle, breath));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::geometry::Size;

    const STYLE: IndicatorStyle = IndicatorStyle {
        accent: Rgb::from_u32(0x00D4FF),
        body: Rgb::from_u32(0x1A1A2E),
    };

    #[test]
    fn corners_are_transparent_and_center_is_accent() {
        let mut surface = PixelSurface::new(Size::new(32, 32)).unwrap();
        paint(&mut surface, &STYLE, 0.0, 1.0);
        assert_eq!(surface.get(0, 0).unwrap().a(), 0);
        let center = surface.get(16, 16).unwrap();
        assert_eq!(center.a(), 255);
        assert!(center.b() > center.r());
    }

    #[test]
    fn same_inputs_paint_identical_frames() {
        let mut a = PixelSurface::new(Size::new(32, 32)).unwrap();
        let mut b = PixelSurface::new(Size::new(32, 32)).unwrap();
        paint(&mut a, &STYLE, 1.3, 0.8);
        paint(&mut b, &STYLE, 1.3, 0.8);
        assert_eq!(a.texels(), b.texels());
    }

    #[test]
    fn every_texel_stays_premultiplied() {
        let mut surface = PixelSurface::new(Size::new(32, 32)).unwrap();
        paint(&mut surface, &STYLE, 0.7, 0.65);
        for t in surface.texels() {
            assert!(t.r() <= t.a() && t.g() <= t.a() && t.b() <= t.a(), "{t:?}");
        }
    }
}
