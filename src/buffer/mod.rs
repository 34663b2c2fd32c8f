//! Pixel buffers: storage, clip and dirty bookkeeping, and the per-buffer transform stack.

pub mod codec;
pub mod format;
pub mod store;

use std::sync::Arc;

pub use format::{FormatInfo, FormatKind, PixelFormat};
pub use store::PixelStore;

use crate::color::{self, Color};
use crate::foundation::core::{Affine, Recti};
use crate::foundation::error::{RasterError, RasterResult, track};
use crate::raster::DrawTarget;
use crate::transform::AffineStack;

/// A framebuffer-style image that draw calls render into.
///
/// Pixel memory is held in an [`Arc<PixelStore>`] so the async engine can hand it to its
/// workers; everything else (clip, dirty rect, transforms) stays with the owner.
#[derive(Debug)]
pub struct PixelBuffer {
    store: Arc<PixelStore>,
    clip: Recti,
    dirty_x0: i32,
    dirty_y0: i32,
    dirty_x1: i32,
    dirty_y1: i32,
    stack: AffineStack,
}

impl PixelBuffer {
    pub fn new(format: PixelFormat, width: u32, height: u32) -> RasterResult<Self> {
        track(PixelStore::new(format, width, height).map(Self::from_store))
    }

    pub fn with_palette(
        format: PixelFormat,
        width: u32,
        height: u32,
        palette: impl Into<Arc<[Color]>>,
    ) -> RasterResult<Self> {
        let mut buf = Self::new(format, width, height)?;
        buf.set_palette(palette)?;
        Ok(buf)
    }

    /// Copy an existing image in `format`'s native layout.
    pub fn from_bytes(
        format: PixelFormat,
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> RasterResult<Self> {
        track(PixelStore::from_bytes(format, width, height, bytes).map(Self::from_store))
    }

    pub fn from_store(store: PixelStore) -> Self {
        let mut buf = Self {
            clip: Recti::new(0, 0, store.width() as i32, store.height() as i32),
            store: Arc::new(store),
            dirty_x0: 0,
            dirty_y0: 0,
            dirty_x1: 0,
            dirty_y1: 0,
            stack: AffineStack::new(),
        };
        buf.mark_clean();
        buf
    }

    /// Convert an RGBA image into a new buffer of `format`.
    pub fn from_rgba_image(image: &image::RgbaImage, format: PixelFormat) -> RasterResult<Self> {
        if format.is_palette() {
            return track(Err(RasterError::unsupported(
                "importing into a palette format; use convert_to_palette",
            )));
        }
        let buf = Self::new(format, image.width(), image.height())?;
        for (x, y, px) in image.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            buf.store
                .set_color(color::argb(a, r, g, b), buf.store.index_of(x, y));
        }
        Ok(buf)
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.store.width(), self.store.height(), |x, y| {
            let c = self.store.get_color(self.store.index_of(x, y));
            image::Rgba([color::red(c), color::green(c), color::blue(c), color::alpha(c)])
        })
    }

    pub fn width(&self) -> u32 {
        self.store.width()
    }

    pub fn height(&self) -> u32 {
        self.store.height()
    }

    pub fn format(&self) -> PixelFormat {
        self.store.format()
    }

    pub fn is_palette(&self) -> bool {
        self.store.format().is_palette()
    }

    pub fn reversed(&self) -> bool {
        self.store.reversed()
    }

    pub fn palette(&self) -> &[Color] {
        self.store.palette()
    }

    pub fn store(&self) -> &Arc<PixelStore> {
        &self.store
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.store.to_bytes()
    }

    pub(crate) fn target(&self) -> DrawTarget {
        DrawTarget::new(Arc::clone(&self.store), self.clip)
    }

    pub(crate) fn bounds(&self) -> Recti {
        Recti::new(0, 0, self.width() as i32, self.height() as i32)
    }

    // Storage is shared with queued tasks until the engine is joined; copy-on-write keeps an
    // unjoined worker from observing a half-updated store.
    fn store_mut(&mut self) -> &mut PixelStore {
        Arc::make_mut(&mut self.store)
    }

    pub fn set_palette(&mut self, palette: impl Into<Arc<[Color]>>) -> RasterResult<()> {
        if !self.is_palette() {
            return track(Err(RasterError::unsupported(format!(
                "{} buffers have no palette",
                self.format()
            ))));
        }
        let palette = palette.into();
        self.store_mut().set_palette(Some(palette));
        track(Ok(()))
    }

    /// Switch between little-endian and byte-swapped storage of multi-byte pixels.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.store_mut().set_reversed(reversed);
    }

    /// Re-encode every pixel into `format`, reallocating storage.
    ///
    /// A palette target maps colors to the closest entry of the current palette, so it
    /// only works from another palette format; see [`PixelBuffer::convert_to_palette`].
    pub fn convert(&mut self, format: PixelFormat) -> RasterResult<()> {
        if format.is_palette() {
            let palette = self.store.palette();
            if palette.is_empty() {
                return track(Err(RasterError::unsupported(format!(
                    "converting {} to {format} needs a palette",
                    self.format()
                ))));
            }
            let palette: Arc<[Color]> = Arc::from(palette);
            return self.convert_to_palette(format, palette);
        }
        track(self.reencode(format, None))
    }

    pub fn convert_to_palette(
        &mut self,
        format: PixelFormat,
        palette: impl Into<Arc<[Color]>>,
    ) -> RasterResult<()> {
        if !format.is_palette() {
            return track(Err(RasterError::param(format!("{format} is not a palette format"))));
        }
        track(self.reencode(format, Some(palette.into())))
    }

    fn reencode(&mut self, format: PixelFormat, palette: Option<Arc<[Color]>>) -> RasterResult<()> {
        let mut out = PixelStore::new(format, self.width(), self.height())?;
        out.set_palette(palette);
        let src = &self.store;
        for i in 0..src.pixel_count() {
            let c = src.get_color(i);
            if format.is_palette() {
                out.set_index(color::closest_in_palette(out.palette(), c) as u32, i);
            } else {
                out.set_color(c, i);
            }
        }
        if src.reversed() {
            out.set_reversed(true);
        }
        self.store = Arc::new(out);
        self.mark_dirty2(0, 0, self.width() as i32, self.height() as i32);
        Ok(())
    }

    /// Restrict drawing to a rectangle, clamped to the buffer; negative sizes are flipped.
    pub fn clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let (mut x, mut y, mut w, mut h) = (x, y, w, h);
        if w < 0 {
            x += w;
            w = -w;
        }
        if h < 0 {
            y += h;
            h = -h;
        }
        self.clip = self.bounds().intersect(Recti::new(x, y, w, h));
    }

    pub fn noclip(&mut self) {
        self.clip = self.bounds();
    }

    pub fn get_clip(&self) -> Recti {
        self.clip
    }

    pub fn mark_clean(&mut self) {
        self.dirty_x0 = self.width() as i32;
        self.dirty_y0 = self.height() as i32;
        self.dirty_x1 = -1;
        self.dirty_y1 = -1;
    }

    /// Grow the dirty rectangle to include one pixel, clamped to the buffer.
    pub fn mark_dirty1(&mut self, x: i32, y: i32) {
        let x = x.clamp(0, self.width() as i32 - 1);
        let y = y.clamp(0, self.height() as i32 - 1);
        self.dirty_x0 = self.dirty_x0.min(x);
        self.dirty_y0 = self.dirty_y0.min(y);
        self.dirty_x1 = self.dirty_x1.max(x);
        self.dirty_y1 = self.dirty_y1.max(y);
    }

    /// Grow the dirty rectangle to include a `w` x `h` area, clamped to the buffer.
    pub fn mark_dirty2(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.mark_dirty1(x, y);
        self.mark_dirty1(x.saturating_add(w - 1), y.saturating_add(h - 1));
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_x0 <= self.dirty_x1
    }

    /// The dirty rectangle, or an empty rectangle when nothing changed since the last
    /// [`PixelBuffer::mark_clean`].
    pub fn get_dirty(&self) -> Recti {
        if !self.is_dirty() {
            return Recti::default();
        }
        Recti::new(
            self.dirty_x0,
            self.dirty_y0,
            self.dirty_x1 - self.dirty_x0 + 1,
            self.dirty_y1 - self.dirty_y0 + 1,
        )
    }

    fn locate(&self, x: i32, y: i32) -> RasterResult<usize> {
        if !self.bounds().contains(x, y) {
            return Err(RasterError::bounds(format!(
                "pixel ({x}, {y}) outside {}x{} buffer",
                self.width(),
                self.height()
            )));
        }
        Ok(self.store.index_of(x as u32, y as u32))
    }

    pub fn try_get_pixel(&self, x: i32, y: i32) -> RasterResult<Color> {
        track(self.locate(x, y).map(|i| self.store.get_color(i)))
    }

    /// Color at `(x, y)`, or 0 when out of bounds (see [`crate::last_error`]).
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.try_get_pixel(x, y).unwrap_or(0)
    }

    pub fn try_get_pixel_raw(&self, x: i32, y: i32) -> RasterResult<u32> {
        track(self.locate(x, y).map(|i| self.store.get_index(i)))
    }

    /// Native value at `(x, y)`, or 0 when out of bounds.
    pub fn get_pixel_raw(&self, x: i32, y: i32) -> u32 {
        self.try_get_pixel_raw(x, y).unwrap_or(0)
    }

    /// Overwrite one pixel. On palette buffers `color` is the index.
    pub fn set_pixel(&mut self, color: Color, x: i32, y: i32) -> RasterResult<()> {
        let i = track(self.locate(x, y))?;
        self.store.set_color(color, i);
        self.mark_dirty1(x, y);
        Ok(())
    }

    pub fn set_pixel_raw(&mut self, value: u32, x: i32, y: i32) -> RasterResult<()> {
        let i = track(self.locate(x, y))?;
        self.store.set_index(value, i);
        self.mark_dirty1(x, y);
        Ok(())
    }

    /// Blend one pixel over what is there.
    pub fn merge_pixel(&mut self, color: Color, x: i32, y: i32) -> RasterResult<()> {
        let i = track(self.locate(x, y))?;
        self.store.merge_color(color, i);
        self.mark_dirty1(x, y);
        Ok(())
    }

    /// Fill the whole buffer, ignoring the clip. On palette buffers `color` is the index.
    pub fn background(&mut self, color: Color) {
        let value = self.store.to_native(color);
        for i in 0..self.store.pixel_count() {
            self.store.set_index(value, i);
        }
        self.mark_dirty2(0, 0, self.width() as i32, self.height() as i32);
    }

    pub fn stack(&self) -> &AffineStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut AffineStack {
        &mut self.stack
    }

    pub fn transform(&self) -> Affine {
        self.stack.current()
    }

    pub fn apply_transform(&mut self, m: Affine) {
        self.stack.apply(m);
    }

    pub fn push_transform(&mut self) {
        self.stack.push();
    }

    pub fn pop_transform(&mut self) -> RasterResult<()> {
        track(self.stack.pop())
    }

    /// Reset the working transform; with `full` the saved stack is dropped too.
    pub fn reset_transform(&mut self, full: bool) {
        if full {
            self.stack.reset_all();
        } else {
            self.stack.reset_top();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/buffer.rs"]
mod tests;
