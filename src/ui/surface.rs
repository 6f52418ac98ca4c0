//! Owned premultiplied pixel buffers.

use std::fmt;

use thiserror::Error;

use crate::sys::geometry::{Point, Rect, Size};
use crate::ui::compositor::{Premultiplied, Rgb};

/// A packed premultiplied texel: alpha in the high byte, then red, green,
/// blue. Color channels never exceed alpha.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Texel(u32);

impl Texel {
    pub const TRANSPARENT: Texel = Texel(0);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Texel {
        Texel(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// An opaque texel of `color`.
    pub fn opaque(color: Rgb) -> Texel {
        let mut acc = Premultiplied::TRANSPARENT;
        acc.over(color, 1.0);
        acc.to_texel()
    }

    pub const fn get(self) -> u32 { self.0 }

    pub const fn a(self) -> u8 { (self.0 >> 24) as u8 }

    pub const fn r(self) -> u8 { (self.0 >> 16) as u8 }

    pub const fn g(self) -> u8 { (self.0 >> 8) as u8 }

    pub const fn b(self) -> u8 { self.0 as u8 }
}

impl fmt::Debug for Texel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Texel({:#010X})", self.0) }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface geometry {width}x{height} is empty")]
    EmptyGeometry { width: i32, height: i32 },
    #[error("surface geometry {width}x{height} overflows the address space")]
    Overflow { width: i32, height: i32 },
    #[error("failed to allocate {width}x{height} surface")]
    Allocation { width: i32, height: i32 },
}

/// 8-bit coverage mask, row-major, as produced by a text rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphMask {
    pub size: Size,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return 0;
        }
        self.coverage
            .get((y * self.size.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// The pixel buffer backing one widget. The buffer always holds exactly
/// `width × height` texels; it is reallocated whenever the geometry changes.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: i32,
    height: i32,
    texels: Vec<Texel>,
}

impl fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelSurface {
    pub fn new(size: Size) -> Result<PixelSurface, SurfaceError> {
        let Size { width, height } = size;
        if size.is_empty() {
            return Err(SurfaceError::EmptyGeometry { width, height });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(SurfaceError::Overflow { width, height })?;
        let mut texels = Vec::new();
        texels
            .try_reserve_exact(len)
            .map_err(|_| SurfaceError::Allocation { width, height })?;
        texels.resize(len, Texel::TRANSPARENT);
        Ok(PixelSurface { width, height, texels })
    }

    pub fn width(&self) -> i32 { self.width }

    pub fn height(&self) -> i32 { self.height }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn bounds(&self) -> Rect { Rect::new(Point::ZERO, self.size()) }

    pub fn texels(&self) -> &[Texel] { &self.texels }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Texel> {
        self.index(x, y).map(|idx| self.texels[idx])
    }

    /// Writes one texel; out-of-bounds writes are dropped.
    pub fn put(&mut self, x: i32, y: i32, texel: Texel) {
        if let Some(idx) = self.index(x, y) {
            self.texels[idx] = texel;
        }
    }

    pub fn fill(&mut self, texel: Texel) { self.texels.fill(texel); }

    /// Blends `color` at `alpha` over one texel.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let mut acc = Premultiplied::from_texel(self.texels[idx]);
        acc.over(color, alpha);
        self.texels[idx] = acc.to_texel();
    }

    /// Blends a solid rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return;
        };
        for y in clip.top()..clip.bottom() {
            for x in clip.left()..clip.right() {
                self.blend(x, y, color, alpha);
            }
        }
    }

    /// Blends a one-pixel outline just inside `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        let Rect { origin, size } = rect;
        self.fill_rect(Rect::new(origin, Size::new(size.width, 1)), color, alpha);
        self.fill_rect(
            Rect::from_xywh(origin.x, rect.bottom() - 1, size.width, 1),
            color,
            alpha,
        );
        self.fill_rect(
            Rect::from_xywh(origin.x, origin.y + 1, 1, size.height - 2),
            color,
            alpha,
        );
        self.fill_rect(
            Rect::from_xywh(rect.right() - 1, origin.y + 1, 1, size.height - 2),
            color,
            alpha,
        );
    }

    /// Blends `color` through a coverage mask placed at `origin`.
    pub fn blend_mask(&mut self, origin: Point, mask: &GlyphMask, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        for my in 0..mask.size.height {
            for mx in 0..mask.size.width {
                let coverage = mask.coverage_at(mx, my);
                if coverage == 0 {
                    continue;
                }
                let a = f32::from(coverage) / 255.0 * alpha;
                self.blend(origin.x + mx, origin.y + my, color, a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_matches_geometry() {
        let surface = PixelSurface::new(Size::new(7, 3)).unwrap();
        assert_eq!(surface.texels().len(), 21);
        assert_eq!(surface.size(), Size::new(7, 3));
    }

    #[test]
    fn rejects_empty_geometry() {
        assert_eq!(
            PixelSurface::new(Size::new(0, 10)),
            Err(SurfaceError::EmptyGeometry { width: 0, height: 10 })
        );
        assert!(PixelSurface::new(Size::new(-3, 2)).is_err());
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut surface = PixelSurface::new(Size::new(2, 2)).unwrap();
        surface.put(5, 0, Texel::from_argb(255, 1, 2, 3));
        surface.blend(-1, 0, Rgb::WHITE, 1.0);
        assert_eq!(surface.get(5, 0), None);
        assert!(surface.texels().iter().all(|t| *t == Texel::TRANSPARENT));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut surface = PixelSurface::new(Size::new(4, 4)).unwrap();
        surface.fill_rect(Rect::from_xywh(2, 2, 10, 10), Rgb::WHITE, 1.0);
        assert_eq!(surface.get(1, 1), Some(Texel::TRANSPARENT));
        assert_eq!(surface.get(3, 3), Some(Texel::from_argb(255, 255, 255, 255)));
    }

    #[test]
    fn texel_packs_alpha_high() {
        let texel = Texel::from_argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(texel.get(), 0x8010_2030);
        assert_eq!(Texel::opaque(Rgb::from_u32(0x1A1A2E)), Texel::from_argb(255, 0x1A, 0x1A, 0x2E));
    }

    #[test]
    fn mask_blends_by_coverage() {
        let mut surface = PixelSurface::new(Size::new(3, 1)).unwrap();
        surface.fill(Texel::opaque(Rgb::BLACK));
        let mask = GlyphMask {
            size: Size::new(2, 1),
            coverage: vec![255, 0],
        };
        surface.blend_mask(Point::new(1, 0), &mask, Rgb::WHITE, 1.0);
        assert_eq!(surface.get(0, 0), Some(Texel::opaque(Rgb::BLACK)));
        assert_eq!(surface.get(1, 0), Some(Texel::opaque(Rgb::WHITE)));
        assert_eq!(surface.get(2, 0), Some(Texel::opaque(Rgb::BLACK)));
    }
}
