use std::sync::Arc;

use crate::buffer::PixelStore;
use crate::color::{self, Color};
use crate::shader::{Promise, ShaderProgram};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphFilter {
    /// Each pixel is either the tint or left untouched.
    Cutout,
    Nearest,
    Bilinear,
}

/// Draws one glyph bitmap as coverage, with UVs in glyph pixels.
pub struct GlyphShader {
    bitmap: Arc<[u8]>,
    offset: usize,
    width: u32,
    height: u32,
    bpp: u8,
    row_stride: usize,
    filter: GlyphFilter,
}

impl GlyphShader {
    /// `offset` is where the glyph's rows start inside `bitmap`; rows are padded to bytes.
    pub fn new(
        bitmap: Arc<[u8]>,
        offset: usize,
        width: u32,
        height: u32,
        bpp: u8,
        filter: GlyphFilter,
    ) -> Self {
        let row_stride = (width as usize * bpp as usize).div_ceil(8);
        Self {
            bitmap,
            offset,
            width,
            height,
            bpp,
            row_stride,
            filter,
        }
    }

    /// Coverage 0..=255 at a glyph pixel, clamped to the glyph.
    pub fn sample(&self, x: i32, y: i32) -> u32 {
        if self.width == 0 || self.height == 0 || self.bpp == 0 {
            return 0;
        }
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        let bpp = self.bpp as usize;
        let bit = x * bpp;
        let byte = self
            .bitmap
            .get(self.offset + self.row_stride * y + bit / 8)
            .copied()
            .unwrap_or(0);
        let mask = (1u32 << bpp) - 1;
        let value = (u32::from(byte) >> (bit % 8)) & mask;
        value * 255 / mask
    }

    fn coverage(&self, u: f32, v: f32) -> u32 {
        match self.filter {
            GlyphFilter::Cutout | GlyphFilter::Nearest => {
                self.sample(u.floor() as i32, v.floor() as i32)
            }
            GlyphFilter::Bilinear => {
                let (fx, fy) = (u - 0.5, v - 0.5);
                let (x0, y0) = (fx.floor(), fy.floor());
                let wx = ((fx - x0) * 256.0) as u32;
                let wy = ((fy - y0) * 256.0) as u32;
                let (x0, y0) = (x0 as i32, y0 as i32);
                let top = (self.sample(x0, y0) * (256 - wx) + self.sample(x0 + 1, y0) * wx) >> 8;
                let bottom =
                    (self.sample(x0, y0 + 1) * (256 - wx) + self.sample(x0 + 1, y0 + 1) * wx) >> 8;
                (top * (256 - wy) + bottom * wy) >> 8
            }
        }
    }
}

impl ShaderProgram for GlyphShader {
    fn shade(&self, tint: Color, existing: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
        let cover = self.coverage(u, v);
        if self.filter == GlyphFilter::Cutout {
            return if cover >= 128 { tint } else { existing };
        }
        let a = color::lerp(cover as u8, 0, color::alpha(tint));
        color::merge(existing, (tint & 0x00ff_ffff) | (u32::from(a) << 24))
    }

    fn promise(&self, _target: &PixelStore, tint: Color) -> Promise {
        if self.filter == GlyphFilter::Cutout {
            Promise::CUTOUT
        } else if color::alpha(tint) == 0 {
            Promise::INVISIBLE
        } else {
            Promise::empty()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/glyph.rs"]
mod tests;
