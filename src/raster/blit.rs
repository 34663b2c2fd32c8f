use std::sync::Arc;

use crate::buffer::PixelStore;
use crate::color::{self, Color};
use crate::foundation::core::Recti;
use crate::raster::{DrawTarget, Rows};

/// A packed coverage bitmap, rows padded to whole bytes, lowest bits first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub bitmap: Arc<[u8]>,
    /// Byte offset of the first row inside `bitmap`.
    pub offset: usize,
    pub width: u32,
    pub height: u32,
    pub bpp: u8,
}

impl GlyphBitmap {
    pub fn row_stride(&self) -> usize {
        (self.width as usize * self.bpp as usize).div_ceil(8)
    }

    fn mask(&self) -> u32 {
        (1u32 << self.bpp) - 1
    }

    /// Raw coverage value at a glyph pixel.
    pub fn value(&self, x: u32, y: u32) -> u32 {
        let bit = x as usize * self.bpp as usize + y as usize * self.row_stride() * 8;
        let byte = self
            .bitmap
            .get(self.offset + bit / 8)
            .copied()
            .unwrap_or(0);
        (u32::from(byte) >> (bit % 8)) & self.mask()
    }
}

/// True when `src` values can be copied into `dst` byte for byte.
pub fn can_copy_raw(dst: &PixelStore, src: &PixelStore) -> bool {
    dst.format() == src.format()
        && dst.reversed() == src.reversed()
        && !dst.format().is_palette()
}

/// Area of `target` covered by a `w` x `h` image placed at `(x, y)`.
fn placement(target: &DrawTarget, x: i32, y: i32, w: u32, h: u32) -> Recti {
    let w = i32::try_from(w).unwrap_or(i32::MAX);
    let h = i32::try_from(h).unwrap_or(i32::MAX);
    Recti::new(x, y, w, h).intersect(target.clip)
}

/// Visit every destination pixel of a placed image as `(dst_index, src_index)`.
fn for_each_pixel(
    target: &DrawTarget,
    rows: Rows,
    src: &PixelStore,
    x: i32,
    y: i32,
    mut f: impl FnMut(usize, usize),
) {
    let area = placement(target, x, y, src.width(), src.height());
    if area.is_empty() {
        return;
    }
    for py in rows.iter(area.y, area.bottom()) {
        let dst = target.store.index_of(area.x as u32, py as u32);
        let from = src.index_of((area.x - x) as u32, (py - y) as u32);
        for k in 0..area.w as usize {
            f(dst + k, from + k);
        }
    }
}

fn copy_rows(target: &DrawTarget, rows: Rows, src: &PixelStore, x: i32, y: i32) {
    let area = placement(target, x, y, src.width(), src.height());
    if area.is_empty() {
        return;
    }
    for py in rows.iter(area.y, area.bottom()) {
        let dst = target.store.index_of(area.x as u32, py as u32);
        let from = src.index_of((area.x - x) as u32, (py - y) as u32);
        target.store.copy_values(dst, src, from, area.w as usize);
    }
}

/// Alpha-composite `top` with its top-left corner at `(x, y)`.
pub fn sprite(target: &DrawTarget, rows: Rows, top: &PixelStore, x: i32, y: i32) {
    let dst = &target.store;
    if dst.format().is_palette() {
        for_each_pixel(target, rows, top, x, y, |d, s| {
            let c = top.get_color(s);
            if color::alpha(c) != 0 {
                dst.set_index(color::closest_in_palette(dst.palette(), c) as u32, d);
            }
        });
        return;
    }
    for_each_pixel(target, rows, top, x, y, |d, s| {
        dst.merge_color(top.get_color(s), d);
    });
}

/// Overwrite with `top`, alpha included.
pub fn blit(target: &DrawTarget, rows: Rows, top: &PixelStore, x: i32, y: i32) {
    let dst = &target.store;
    if can_copy_raw(dst, top) {
        copy_rows(target, rows, top, x, y);
    } else if dst.format().is_palette() {
        if top.format() == dst.format() && top.palette() == dst.palette() {
            copy_rows(target, rows, top, x, y);
            return;
        }
        for_each_pixel(target, rows, top, x, y, |d, s| {
            let c = top.get_color(s);
            dst.set_index(color::closest_in_palette(dst.palette(), c) as u32, d);
        });
    } else {
        for_each_pixel(target, rows, top, x, y, |d, s| {
            dst.set_color(top.get_color(s), d);
        });
    }
}

/// Copy an image already in the target's native format and byte order.
pub fn blit_raw(target: &DrawTarget, rows: Rows, image: &PixelStore, x: i32, y: i32) {
    copy_rows(target, rows, image, x, y);
}

/// Draw `glyph` scaled up by `scale` in `color`.
///
/// One-bit glyphs in opaque colors, and all glyphs on palette targets, are written
/// directly; everything else blends by coverage.
pub fn blit_char(
    target: &DrawTarget,
    rows: Rows,
    glyph: &GlyphBitmap,
    color: Color,
    x: i32,
    y: i32,
    scale: u32,
) {
    let scale = scale.max(1);
    let w = glyph.width.saturating_mul(scale);
    let h = glyph.height.saturating_mul(scale);
    let area = placement(target, x, y, w, h);
    if area.is_empty() || glyph.bpp == 0 {
        return;
    }
    let dst = &target.store;
    let mask = glyph.mask();
    let palette = dst.format().is_palette();
    let direct = palette || (glyph.bpp == 1 && color::alpha(color) == 255);
    let native = dst.to_native(color);
    let alpha_mul = (0xff00 / mask) * u32::from(color::alpha(color)) / 255;

    for py in rows.iter(area.y, area.bottom()) {
        let gy = glyph_cell(py, y, scale);
        let row = dst.index_of(0, py as u32);
        for px in area.x..area.right() {
            let gx = glyph_cell(px, x, scale);
            let value = glyph.value(gx, gy);
            let i = row + px as usize;
            if direct {
                if value * 2 > mask {
                    dst.set_index(native, i);
                }
                continue;
            }
            let a = (value * alpha_mul) >> 8;
            if a != 0 {
                dst.merge_color((color & 0x00ff_ffff) | (a << 24), i);
            }
        }
    }
}

/// Glyph cell under destination coordinate `p` for a glyph placed at `origin`.
fn glyph_cell(p: i32, origin: i32, scale: u32) -> u32 {
    let offset = (i64::from(p) - i64::from(origin)) / i64::from(scale);
    u32::try_from(offset).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/blit.rs"]
mod tests;
