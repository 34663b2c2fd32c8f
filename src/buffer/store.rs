use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::buffer::codec;
use crate::buffer::format::PixelFormat;
use crate::color::{self, Color};
use crate::foundation::error::{RasterError, RasterResult};

/// Pixel memory shared between a buffer and the render workers drawing into it.
///
/// Bytes are atomics so two workers can write interleaved rows of the same buffer; sub-byte
/// formats update their bits with a compare-and-swap so neighbours in the same byte survive.
/// Ordering is relaxed throughout: callers synchronize through the engine's join.
pub struct PixelStore {
    width: u32,
    height: u32,
    format: PixelFormat,
    reversed: bool,
    palette: Option<Arc<[Color]>>,
    data: Box<[AtomicU8]>,
}

fn alloc_bytes(len: usize) -> RasterResult<Box<[AtomicU8]>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| RasterError::out_of_memory(format!("{len} bytes of pixel data: {e}")))?;
    data.extend((0..len).map(|_| AtomicU8::new(0)));
    Ok(data.into_boxed_slice())
}

impl PixelStore {
    pub fn new(format: PixelFormat, width: u32, height: u32) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::param(format!(
                "buffer size must be non-zero, got {width}x{height}"
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(RasterError::param(format!(
                "buffer size {width}x{height} is too large"
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            reversed: false,
            palette: None,
            data: alloc_bytes(format.storage_len(width, height))?,
        })
    }

    /// Wrap a copy of caller-provided bytes, which must hold at least a full image.
    pub fn from_bytes(
        format: PixelFormat,
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> RasterResult<Self> {
        let store = Self::new(format, width, height)?;
        if bytes.len() < store.data.len() {
            return Err(RasterError::param(format!(
                "{width}x{height} {format} needs {} bytes, got {}",
                store.data.len(),
                bytes.len()
            )));
        }
        for (cell, &b) in store.data.iter().zip(bytes) {
            cell.store(b, Ordering::Relaxed);
        }
        Ok(store)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// True when multi-byte values are stored big-endian instead of the native little-endian.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn palette(&self) -> &[Color] {
        self.palette.as_deref().unwrap_or(&[])
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub(crate) fn set_palette(&mut self, palette: Option<Arc<[Color]>>) {
        self.palette = palette;
    }

    /// Declare the stored bytes to already be in `reversed` order.
    pub(crate) fn assume_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Byte-swap every stored value so the store matches `reversed`.
    pub(crate) fn set_reversed(&mut self, reversed: bool) {
        if self.reversed == reversed {
            return;
        }
        let values: Vec<u32> = (0..self.pixel_count()).map(|i| self.get_index(i)).collect();
        self.reversed = reversed;
        for (i, v) in values.into_iter().enumerate() {
            self.set_index(v, i);
        }
    }

    /// Native value of the pixel at linear index `i`.
    #[inline]
    pub fn get_index(&self, i: usize) -> u32 {
        let bpp = self.format.bpp() as usize;
        let load = |at: usize| u32::from(self.data[at].load(Ordering::Relaxed));
        match bpp {
            1 | 2 | 4 => {
                let bit = i * bpp;
                (load(bit >> 3) >> (bit & 7)) & self.format.value_mask()
            }
            8 => load(i),
            _ => {
                let n = bpp / 8;
                let at = i * n;
                let mut v = 0u32;
                for k in 0..n {
                    v |= load(at + k) << (8 * k);
                }
                if self.reversed { swap_bytes(v, n) } else { v }
            }
        }
    }

    /// Store a native value at linear index `i`.
    #[inline]
    pub fn set_index(&self, value: u32, i: usize) {
        let bpp = self.format.bpp() as usize;
        match bpp {
            1 | 2 | 4 => {
                let bit = i * bpp;
                let shift = bit & 7;
                let mask = (self.format.value_mask() << shift) as u8;
                let bits = ((value << shift) as u8) & mask;
                let _ = self.data[bit >> 3].fetch_update(
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                    |old| Some((old & !mask) | bits),
                );
            }
            8 => self.data[i].store(value as u8, Ordering::Relaxed),
            _ => {
                let n = bpp / 8;
                let at = i * n;
                let v = if self.reversed {
                    swap_bytes(value, n)
                } else {
                    value
                };
                for k in 0..n {
                    self.data[at + k].store((v >> (8 * k)) as u8, Ordering::Relaxed);
                }
            }
        }
    }

    #[inline]
    pub fn to_native(&self, color: Color) -> u32 {
        codec::to_native(self.format, color)
    }

    #[inline]
    pub fn to_canonical(&self, value: u32) -> Color {
        codec::to_canonical(self.format, self.palette(), value)
    }

    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    #[inline]
    pub fn get_color(&self, i: usize) -> Color {
        self.to_canonical(self.get_index(i))
    }

    #[inline]
    pub fn set_color(&self, color: Color, i: usize) {
        self.set_index(self.to_native(color), i);
    }

    /// Blend `color` over the stored pixel. Palette stores take `color` as an index and
    /// overwrite.
    #[inline]
    pub fn merge_color(&self, color: Color, i: usize) {
        if self.format.is_palette() {
            self.set_index(color, i);
            return;
        }
        let base = self.get_color(i);
        self.set_color(color::merge(base, color), i);
    }

    /// Copy `count` raw values from `src` starting at `src_i` to this store at `dst_i`.
    ///
    /// Both stores must share format and byte order.
    pub(crate) fn copy_values(&self, dst_i: usize, src: &PixelStore, src_i: usize, count: usize) {
        let bpp = self.format.bpp() as usize;
        if bpp % 8 == 0 && self.reversed == src.reversed {
            let n = bpp / 8;
            let (d, s) = (dst_i * n, src_i * n);
            for k in 0..count * n {
                let b = src.data[s + k].load(Ordering::Relaxed);
                self.data[d + k].store(b, Ordering::Relaxed);
            }
        } else {
            for k in 0..count {
                self.set_index(src.get_index(src_i + k), dst_i + k);
            }
        }
    }

    /// Snapshot of the raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().map(|b| b.load(Ordering::Relaxed)).collect()
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

impl Clone for PixelStore {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            format: self.format,
            reversed: self.reversed,
            palette: self.palette.clone(),
            data: self
                .data
                .iter()
                .map(|b| AtomicU8::new(b.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

impl std::fmt::Debug for PixelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelStore")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("reversed", &self.reversed)
            .field("palette_len", &self.palette().len())
            .finish_non_exhaustive()
    }
}

#[inline]
fn swap_bytes(v: u32, n: usize) -> u32 {
    match n {
        2 => u32::from((v as u16).swap_bytes()),
        3 => ((v & 0xff) << 16) | (v & 0xff00) | ((v >> 16) & 0xff),
        _ => v.swap_bytes(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/store.rs"]
mod tests;
