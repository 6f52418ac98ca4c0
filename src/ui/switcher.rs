use crate::sys::geometry::{Point, Rect};
use crate::ui::compositor::Rgb;
use crate::ui::surface::{GlyphMask, PixelSurface, Texel};

/// Eased reveal at or below which a chip is not drawn at all.
pub const REVEAL_SKIP: f32 = 0.001;
/// Eased reveal at or above which a chip is drawn fully opaque.
pub const REVEAL_FULL: f32 = 0.999;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanelStyle {
    pub background: Rgb,
    pub chip: Rgb,
    pub selected: Rgb,
    pub text: Rgb,
}

#[derive(Debug, Copy, Clone)]
pub struct ChipPaint<'a> {
    pub frame: Rect,
    pub glyphs: Option<&'a GlyphMask>,
    pub reveal: f32,
    pub selected: bool,
}

/// Paints the whole panel. The background overwrites every texel, so the
/// result depends only on the arguments.
pub fn paint_panel<'a>(
    surface: &mut PixelSurface,
    style: &PanelStyle,
    chips: impl IntoIterator<Item = ChipPaint<'a>>,
) {
    surface.fill(Texel::opaque(style.background));
    for chip in chips {
        if chip.reveal <= REVEAL_SKIP {
            continue;
        }
        let alpha = if chip.reveal >= REVEAL_FULL { 1.0 } else { chip.reveal };
        let fill = if chip.selected { style.selected } else { style.chip };
        surface.fill_rect(chip.frame, fill, alpha);
        if let Some(mask) = chip.glyphs {
            let origin = Point::new(
                chip.frame.left() + (chip.frame.size.width - mask.size.width) / 2,
                chip.frame.top() + (chip.frame.size.height - mask.size.height) / 2,
            );
            surface.blend_mask(origin, mask, style.text, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::geometry::Size;

    const STYLE: PanelStyle = PanelStyle {
        background: Rgb::from_u32(0x1A1A2E),
        chip: Rgb::from_u32(0x2A2A40),
        selected: Rgb::from_u32(0x008CB4),
        text: Rgb::WHITE,
    };

    fn chip(x: i32, reveal: f32, selected: bool) -> ChipPaint<'static> {
        ChipPaint {
            frame: Rect::from_xywh(x, 2, 6, 4),
            glyphs: None,
            reveal,
            selected,
        }
    }

    #[test]
    fn selected_chip_uses_highlight() {
        let mut surface = PixelSurface::new(Size::new(20, 8)).unwrap();
        paint_panel(&mut surface, &STYLE, [chip(1, 1.0, false), chip(9, 1.0, true)]);
        assert_eq!(surface.get(0, 0), Some(Texel::opaque(STYLE.background)));
        assert_eq!(surface.get(2, 3), Some(Texel::opaque(STYLE.chip)));
        assert_eq!(surface.get(10, 3), Some(Texel::opaque(STYLE.selected)));
    }

    #[test]
    fn unrevealed_chip_is_skipped() {
        let mut surface = PixelSurface::new(Size::new(20, 8)).unwrap();
        paint_panel(&mut surface, &STYLE, [chip(1, 0.0005, true)]);
        assert!(surface.texels().iter().all(|t| *t == Texel::opaque(STYLE.background)));
    }

    #[test]
    fn repaint_is_byte_identical() {
        let mut a = PixelSurface::new(Size::new(20, 8)).unwrap();
        let mut b = PixelSurface::new(Size::new(20, 8)).unwrap();
        b.fill(Texel::from_argb(255, 9, 9, 9));
        let chips = [chip(1, 1.0, true), chip(9, 1.0, false)];
        paint_panel(&mut a, &STYLE, chips);
        paint_panel(&mut b, &STYLE, chips);
        assert_eq!(a.texels(), b.texels());
    }
}
