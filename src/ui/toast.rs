use crate::sys::geometry::{Point, Size};
use crate::ui::compositor::Rgb;
use crate::ui::surface::{GlyphMask, PixelSurface, Texel};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ToastStyle {
    pub background: Rgb,
    pub text: Rgb,
    pub border: Rgb,
    pub padding_x: i32,
    pub padding_y: i32,
}

impl ToastStyle {
    pub fn box_size(&self, text: Size) -> Size {
        Size::new(text.width + 2 * self.padding_x, text.height + 2 * self.padding_y)
    }
}

pub fn paint(surface: &mut PixelSurface, style: &ToastStyle, glyphs: Option<&GlyphMask>) {
    surface.fill(Texel::opaque(style.background));
    surface.stroke_rect(surface.bounds(), style.border, 1.0);
    if let Some(mask) = glyphs {
        let origin = Point::new(
            (surface.width() - mask.size.width) / 2,
            (surface.height() - mask.size.height) / 2,
        );
        surface.blend_mask(origin, mask, style.text, 1.0);
    }
}
