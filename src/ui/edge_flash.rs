use crate::ui::compositor::{Premultiplied, Rgb};
use crate::ui::surface::PixelSurface;

/// Straight alpha of the glow at `distance` pixels from the nearest edge.
pub fn band_alpha(distance: i32, glow_width: i32) -> f32 {
    if glow_width <= 0 || distance >= glow_width {
        return 0.0;
    }
    let t = 1.0 - distance.max(0) as f32 / glow_width as f32;
    t * t * t
}

/// Paints a glow band hugging all four edges. The band is clamped to half
/// the surface so opposite edges never overlap past the middle.
pub fn paint(surface: &mut PixelSurface, color: Rgb, glow_width: i32) {
    let (w, h) = (surface.width(), surface.height());
    let band = glow_width.min(w / 2).min(h / 2).max(0);
    for y in 0..h {
        let dy = y.min(h - 1 - y);
        for x in 0..w {
            let d = x.min(w - 1 - x).min(dy);
            let mut acc = Premultiplied::TRANSPARENT;
            let alpha = band_alpha(d, band);
            if alpha > 0.0 {
                acc.over(color, alpha);
            }
            surface.put(x, y, acc.to_texel());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::geometry::Size;

    #[test]
    fn band_falls_off_cubically() {
        assert_eq!(band_alpha(0, 40), 1.0);
        assert!((band_alpha(20, 40) - 0.125).abs() < 1e-6);
        assert_eq!(band_alpha(40, 40), 0.0);
        assert_eq!(band_alpha(3, 0), 0.0);
    }

    #[test]
    fn edges_glow_and_middle_is_clear() {
        let mut surface = PixelSurface::new(Size::new(200, 100)).unwrap();
        paint(&mut surface, Rgb::from_u32(0x008CB4), 40);
        assert_eq!(surface.get(0, 50).unwrap().a(), 255);
        assert_eq!(surface.get(199, 99).unwrap().a(), 255);
        assert_eq!(surface.get(100, 50).unwrap().a(), 0);
        assert!(surface.get(10, 50).unwrap().a() > surface.get(30, 50).unwrap().a());
    }

    #[test]
    fn band_is_clamped_on_small_surfaces() {
        let mut surface = PixelSurface::new(Size::new(20, 20)).unwrap();
        paint(&mut surface, Rgb::WHITE, 40);
        // Clamped to a band of 10, so nothing reaches the center.
        assert!(surface.get(5, 10).unwrap().a() > 0);
        assert_eq!(surface.get(10, 10).unwrap().a(), 0);
    }
}
