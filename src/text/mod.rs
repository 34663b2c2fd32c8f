//! Bitmap fonts, text measurement and text drawing.

pub mod font;
pub mod layout;

use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::foundation::core::{Quadf, Rectf, Vec2f, ensure_finite};
use crate::foundation::error::{RasterError, RasterResult, track};
use crate::raster::span_start;
use crate::render::RenderContext;
use crate::render::context::draws;
use crate::shader::{GlyphFilter, GlyphShader, Shader};

pub use font::{FONT_MAGIC, FONT_VERSION, Font, FontRange, Glyph, GlyphDims, RangeKind};
pub use layout::{Align, count_newlines, line_width, lines, text_size};

use layout::{glyph_code, halign_offset, size_mul, valign_offset};

/// Largest integer scale drawn by copying glyph cells; larger text goes through the shader.
const MAX_BLIT_SCALE: f32 = 4096.0;

/// Size and alignment of a block of text.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextLayout {
    /// Line height in pixels.
    pub size: f32,
    #[serde(default)]
    pub halign: Align,
    #[serde(default)]
    pub valign: Align,
}

impl TextLayout {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            halign: Align::Begin,
            valign: Align::Begin,
        }
    }

    pub fn aligned(mut self, halign: Align, valign: Align) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }
}

impl RenderContext {
    /// Draw `text` anchored at `pos` and return its size.
    ///
    /// Glyphs at whole-number scales under a translation are copied straight from the font
    /// bitmap; anything else is drawn as shaded rectangles.
    pub fn draw_text(
        &mut self,
        buf: &mut PixelBuffer,
        font: &Font,
        color: Color,
        layout: TextLayout,
        pos: Vec2f,
        text: &str,
    ) -> RasterResult<Vec2f> {
        let result = self.text(buf, font, color, layout, pos, text);
        track(result)
    }

    fn text(
        &mut self,
        buf: &mut PixelBuffer,
        font: &Font,
        color: Color,
        layout: TextLayout,
        pos: Vec2f,
        text: &str,
    ) -> RasterResult<Vec2f> {
        ensure_finite(
            pos.x.is_finite() && pos.y.is_finite() && layout.size.is_finite(),
            "text position",
        )?;
        if layout.size <= 0.0 {
            return Err(RasterError::param(format!(
                "text size must be positive, got {}",
                layout.size
            )));
        }
        let mul = size_mul(font, layout.size);
        let line_height = f32::from(font.default_size) * mul;
        let visible = draws(buf, color);
        let top = pos.y + valign_offset(text, layout.size, layout.valign);

        let mut width = 0f32;
        let mut count = 0usize;
        for (i, line) in lines(text).enumerate() {
            let line_w = line_width(font, line) * mul;
            width = width.max(line_w);
            count += 1;
            if !visible {
                continue;
            }
            let mut pen_x = pos.x + halign_offset(line_w, layout.halign);
            let pen_y = top + i as f32 * line_height;
            for c in line.chars() {
                let code = glyph_code(c);
                let Some(glyph) = font.glyph(code) else {
                    continue;
                };
                if code != 0x20 && glyph.bitmap.width > 0 && glyph.bitmap.height > 0 {
                    let x = pen_x + glyph.draw_x as f32 * mul;
                    let y = pen_y + glyph.draw_y as f32 * mul;
                    self.draw_glyph(buf, font, color, &glyph, Vec2f::new(x, y), mul)?;
                }
                pen_x += glyph.advance as f32 * mul;
            }
        }
        Ok(Vec2f::new(width, count as f32 * line_height))
    }

    fn draw_glyph(
        &mut self,
        buf: &mut PixelBuffer,
        font: &Font,
        color: Color,
        glyph: &Glyph,
        pos: Vec2f,
        mul: f32,
    ) -> RasterResult<()> {
        let scale = mul.round();
        if buf.stack().is_translation()
            && (1.0..=MAX_BLIT_SCALE).contains(&scale)
            && (mul - scale).abs() < 1e-4
        {
            let [.., tx, ty] = buf.transform().as_coeffs();
            let x = span_start(pos.x + tx as f32);
            let y = span_start(pos.y + ty as f32);
            self.glyph(buf, glyph.bitmap.clone(), color, x, y, scale as u32);
            return Ok(());
        }

        let bitmap = &glyph.bitmap;
        let filter = if buf.is_palette() || (bitmap.bpp == 1 && !font.recommend_aa) {
            GlyphFilter::Cutout
        } else if font.recommend_aa {
            GlyphFilter::Bilinear
        } else {
            GlyphFilter::Nearest
        };
        let shader = Shader::new(GlyphShader::new(
            Arc::clone(&bitmap.bitmap),
            bitmap.offset,
            bitmap.width,
            bitmap.height,
            bitmap.bpp,
            filter,
        ))
        .with_alpha_promises(true, false);
        let (w, h) = (bitmap.width as f32, bitmap.height as f32);
        let uvs = Quadf::new(0.0, 0.0, w, 0.0, w, h, 0.0, h);
        let rect = Rectf::new(pos.x, pos.y, w * mul, h * mul);
        self.shade_rect(buf, color, &shader, rect, Some(uvs))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/render.rs"]
mod tests;
