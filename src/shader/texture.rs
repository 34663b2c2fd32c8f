use std::sync::Arc;

use crate::buffer::{PixelBuffer, PixelStore};
use crate::color::{self, Color};
use crate::shader::{Promise, ShaderProgram};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
}

/// Samples another buffer with UVs in `0..1`, tinted and blended over the destination.
///
/// Sample positions outside the texture clamp to its edge.
pub struct TextureShader {
    texture: Arc<PixelStore>,
    filter: TextureFilter,
    blend: bool,
}

impl TextureShader {
    pub fn new(texture: &PixelBuffer, filter: TextureFilter) -> Self {
        Self {
            texture: Arc::clone(texture.store()),
            filter,
            blend: true,
        }
    }

    /// Writes sampled texels as they are, alpha included, without looking at the destination.
    pub fn overwriting(texture: &PixelBuffer, filter: TextureFilter) -> Self {
        Self {
            blend: false,
            ..Self::new(texture, filter)
        }
    }

    fn texel(&self, x: i32, y: i32) -> Color {
        let x = x.clamp(0, self.texture.width() as i32 - 1) as u32;
        let y = y.clamp(0, self.texture.height() as i32 - 1) as u32;
        self.texture.get_color(self.texture.index_of(x, y))
    }

    fn nearest(&self, u: f32, v: f32) -> Color {
        let x = (u * self.texture.width() as f32).floor() as i32;
        let y = (v * self.texture.height() as f32).floor() as i32;
        self.texel(x, y)
    }

    fn bilinear(&self, u: f32, v: f32) -> Color {
        let fx = u * self.texture.width() as f32 - 0.5;
        let fy = v * self.texture.height() as f32 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let wx = ((fx - x0) * 256.0) as u32;
        let wy = ((fy - y0) * 256.0) as u32;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let channel = |shift: u32| {
            let at = |c: Color| (c >> shift) & 0xff;
            let top = (at(c00) * (256 - wx) + at(c10) * wx) >> 8;
            let bottom = (at(c01) * (256 - wx) + at(c11) * wx) >> 8;
            (top * (256 - wy) + bottom * wy) >> 8
        };
        let opaque = [c00, c10, c01, c11].iter().all(|&c| color::alpha(c) == 255);
        let a = if opaque { 255 } else { channel(24) };
        (a << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
    }
}

impl ShaderProgram for TextureShader {
    fn shade(&self, tint: Color, existing: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
        let mut c = match self.filter {
            TextureFilter::Nearest => self.nearest(u, v),
            TextureFilter::Bilinear => self.bilinear(u, v),
        };
        if tint != color::WHITE {
            c = color::tint(c, tint);
        }
        if !self.blend || color::alpha(c) == 255 {
            c
        } else {
            color::merge(existing, c)
        }
    }

    fn promise(&self, _target: &PixelStore, tint: Color) -> Promise {
        match color::alpha(tint) {
            0 => Promise::INVISIBLE,
            255 if !self.texture.format().has_alpha() => Promise::OPAQUE,
            _ if !self.blend => Promise::IGNORE_BASE,
            _ => Promise::empty(),
        }
    }

    fn texture(&self) -> Option<&Arc<PixelStore>> {
        // Only nearest sampling reproduces texels exactly.
        (self.filter == TextureFilter::Nearest).then_some(&self.texture)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/texture.rs"]
mod tests;
