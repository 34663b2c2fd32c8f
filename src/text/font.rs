//! Bitmap fonts and their binary file format.
//!
//! A font file is little-endian throughout:
//!
//! ```text
//! magic "pax_font_t\0", u16 version,
//! u64 variable glyph count, u64 bitmap size, u64 name length, u64 range count,
//! u16 default size, u8 antialias flag,
//! ranges: u8 type, u32 start, u32 end, then
//!   mono:     u8 width, u8 height, u8 bpp
//!   variable: u8 height, u8 bpp, per glyph { i8 draw_x, i8 draw_y, u8 draw_w, u8 draw_h,
//!             u8 measured_width, u64 bitmap index }
//! bitmap bytes, name bytes, NUL
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::foundation::error::{RasterError, RasterResult, track};
use crate::raster::GlyphBitmap;

pub const FONT_MAGIC: &[u8; 11] = b"pax_font_t\0";
pub const FONT_VERSION: u16 = 1;

const RANGE_MONO: u8 = 0;
const RANGE_VARIABLE: u8 = 1;

/// Placement of one variable-pitch glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlyphDims {
    pub draw_x: i8,
    pub draw_y: i8,
    pub draw_w: u8,
    pub draw_h: u8,
    /// Horizontal advance.
    pub measured_width: u8,
    /// Byte offset of the glyph inside its range's bitmap.
    pub index: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeKind {
    /// Every glyph has the same size and advance.
    Mono { width: u8, height: u8, bpp: u8 },
    /// One [`GlyphDims`] per codepoint in the range.
    Variable {
        height: u8,
        bpp: u8,
        dims: Vec<GlyphDims>,
    },
}

/// An inclusive codepoint range and where its glyphs live in the font bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontRange {
    pub start: u32,
    pub end: u32,
    pub kind: RangeKind,
    /// Byte offset of this range's bitmap inside [`Font::bitmap`].
    pub bitmap_offset: usize,
}

impl FontRange {
    pub fn contains(&self, c: u32) -> bool {
        (self.start..=self.end).contains(&c)
    }

    pub fn glyph_count(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    fn bpp(&self) -> u8 {
        match self.kind {
            RangeKind::Mono { bpp, .. } | RangeKind::Variable { bpp, .. } => bpp,
        }
    }

    /// Bytes of bitmap data the range's glyphs occupy.
    pub fn bitmap_len(&self) -> usize {
        match &self.kind {
            RangeKind::Mono { width, height, bpp } => {
                self.glyph_count() * usize::from(*height) * row_stride(*width, *bpp)
            }
            RangeKind::Variable { bpp, dims, .. } => dims
                .iter()
                .map(|d| {
                    (d.index as usize)
                        .saturating_add(row_stride(d.draw_w, *bpp) * usize::from(d.draw_h))
                })
                .max()
                .unwrap_or(0),
        }
    }
}

fn row_stride(width: u8, bpp: u8) -> usize {
    (usize::from(width) * usize::from(bpp)).div_ceil(8)
}

/// One glyph ready to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub bitmap: GlyphBitmap,
    /// Offset of the bitmap from the pen position.
    pub draw_x: i32,
    pub draw_y: i32,
    pub advance: u32,
    pub height: u32,
}

/// A bitmap font: codepoint ranges sharing one bitmap blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Font {
    pub name: String,
    /// Size in pixels the bitmaps were drawn for; also the line height.
    pub default_size: u16,
    pub recommend_aa: bool,
    ranges: Vec<FontRange>,
    bitmap: Arc<[u8]>,
}

impl Font {
    pub fn new(name: impl Into<String>, default_size: u16, recommend_aa: bool) -> Self {
        Self {
            name: name.into(),
            default_size,
            recommend_aa,
            ranges: Vec::new(),
            bitmap: Arc::from(Vec::new()),
        }
    }

    pub fn ranges(&self) -> &[FontRange] {
        &self.ranges
    }

    pub fn bitmap(&self) -> &Arc<[u8]> {
        &self.bitmap
    }

    /// Append a range of fixed-size glyphs; `bitmap` holds them back to back.
    pub fn push_mono(
        &mut self,
        start: u32,
        end: u32,
        size: (u8, u8),
        bpp: u8,
        bitmap: &[u8],
    ) -> RasterResult<()> {
        let (width, height) = size;
        self.push_range(start, end, RangeKind::Mono { width, height, bpp }, bitmap)
    }

    /// Append a range of variable-pitch glyphs, one entry of `dims` per codepoint.
    pub fn push_variable(
        &mut self,
        start: u32,
        end: u32,
        height: u8,
        bpp: u8,
        dims: Vec<GlyphDims>,
        bitmap: &[u8],
    ) -> RasterResult<()> {
        self.push_range(start, end, RangeKind::Variable { height, bpp, dims }, bitmap)
    }

    fn push_range(
        &mut self,
        start: u32,
        end: u32,
        kind: RangeKind,
        bitmap: &[u8],
    ) -> RasterResult<()> {
        let range = FontRange {
            start,
            end,
            kind,
            bitmap_offset: self.bitmap.len(),
        };
        check_range(&range).map_err(RasterError::param)?;
        if bitmap.len() != range.bitmap_len() {
            return Err(RasterError::param(format!(
                "range {start:#x}..={end:#x} needs {} bitmap bytes, got {}",
                range.bitmap_len(),
                bitmap.len()
            )));
        }
        let mut blob = self.bitmap.to_vec();
        blob.extend_from_slice(bitmap);
        self.bitmap = blob.into();
        self.ranges.push(range);
        Ok(())
    }

    /// First range containing `c`.
    pub fn range_for(&self, c: u32) -> Option<&FontRange> {
        self.ranges.iter().find(|r| r.contains(c))
    }

    /// Glyph for `c`, or `None` when no range has it.
    pub fn glyph(&self, c: u32) -> Option<Glyph> {
        let range = self.range_for(c)?;
        let n = (c - range.start) as usize;
        let glyph = match &range.kind {
            RangeKind::Mono { width, height, bpp } => {
                let size = usize::from(*height) * row_stride(*width, *bpp);
                Glyph {
                    bitmap: GlyphBitmap {
                        bitmap: Arc::clone(&self.bitmap),
                        offset: range.bitmap_offset + n * size,
                        width: u32::from(*width),
                        height: u32::from(*height),
                        bpp: *bpp,
                    },
                    draw_x: 0,
                    draw_y: 0,
                    advance: u32::from(*width),
                    height: u32::from(*height),
                }
            }
            RangeKind::Variable { height, bpp, dims } => {
                let d = dims.get(n)?;
                Glyph {
                    bitmap: GlyphBitmap {
                        bitmap: Arc::clone(&self.bitmap),
                        offset: range.bitmap_offset.saturating_add(d.index as usize),
                        width: u32::from(d.draw_w),
                        height: u32::from(d.draw_h),
                        bpp: *bpp,
                    },
                    draw_x: i32::from(d.draw_x),
                    draw_y: i32::from(d.draw_y),
                    advance: u32::from(d.measured_width),
                    height: u32::from(*height),
                }
            }
        };
        Some(glyph)
    }

    /// Parse a font file. Nothing is returned unless the whole stream is valid.
    pub fn read_from<R: Read>(reader: &mut R) -> RasterResult<Self> {
        let mut r = FontReader { inner: reader };

        let mut magic = [0u8; 11];
        r.bytes(&mut magic)?;
        if &magic != FONT_MAGIC {
            return Err(RasterError::corrupt("bad font magic"));
        }
        let version = r.u16()?;
        if version != FONT_VERSION {
            return Err(RasterError::unsupported(format!(
                "font version {version}, expected {FONT_VERSION}"
            )));
        }

        let n_bmpv = r.u64()?;
        let n_bitmap = r.u64()?;
        let n_name = r.u64()?;
        let n_ranges = r.u64()?;
        let default_size = r.u16()?;
        let recommend_aa = r.u8()? != 0;

        let mut ranges = Vec::new();
        let mut bitmap_offset = 0usize;
        let mut seen_bmpv = 0u64;
        for i in 0..n_ranges {
            let kind = r.u8()?;
            let start = r.u32()?;
            let end = r.u32()?;
            if end < start {
                return Err(RasterError::corrupt(format!(
                    "range {i} ends before it starts ({start:#x} > {end:#x})"
                )));
            }
            let kind = match kind {
                RANGE_MONO => RangeKind::Mono {
                    width: r.u8()?,
                    height: r.u8()?,
                    bpp: r.u8()?,
                },
                RANGE_VARIABLE => {
                    let height = r.u8()?;
                    let bpp = r.u8()?;
                    let count = u64::from(end - start) + 1;
                    seen_bmpv += count;
                    if seen_bmpv > n_bmpv {
                        return Err(RasterError::corrupt(format!(
                            "more than the declared {n_bmpv} variable glyphs"
                        )));
                    }
                    let mut dims = Vec::new();
                    for _ in 0..count {
                        dims.push(GlyphDims {
                            draw_x: r.u8()? as i8,
                            draw_y: r.u8()? as i8,
                            draw_w: r.u8()?,
                            draw_h: r.u8()?,
                            measured_width: r.u8()?,
                            index: r.u64()?,
                        });
                    }
                    RangeKind::Variable { height, bpp, dims }
                }
                other => {
                    return Err(RasterError::corrupt(format!(
                        "unknown type {other} in range {i}"
                    )));
                }
            };
            let range = FontRange {
                start,
                end,
                kind,
                bitmap_offset,
            };
            check_range(&range).map_err(RasterError::corrupt)?;
            bitmap_offset = bitmap_offset.saturating_add(range.bitmap_len());
            ranges.push(range);
        }
        if seen_bmpv != n_bmpv {
            return Err(RasterError::corrupt(format!(
                "declared {n_bmpv} variable glyphs, found {seen_bmpv}"
            )));
        }
        if bitmap_offset as u64 != n_bitmap {
            return Err(RasterError::corrupt(format!(
                "declared {n_bitmap} bitmap bytes, ranges need {bitmap_offset}"
            )));
        }

        let bitmap = r.blob(n_bitmap)?;
        let name = r.blob(n_name)?;
        if r.u8()? != 0 || name.contains(&0) {
            return Err(RasterError::corrupt("font name is not NUL terminated"));
        }
        let name = String::from_utf8(name)
            .map_err(|_| RasterError::corrupt("font name is not UTF-8"))?;

        Ok(Self {
            name,
            default_size,
            recommend_aa,
            ranges,
            bitmap: bitmap.into(),
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> RasterResult<()> {
        if self.name.as_bytes().contains(&0) {
            return Err(RasterError::param("font name contains NUL"));
        }
        let n_bmpv: u64 = self
            .ranges
            .iter()
            .filter(|r| matches!(r.kind, RangeKind::Variable { .. }))
            .map(|r| r.glyph_count() as u64)
            .sum();
        let bitmap_len: usize = self.ranges.iter().map(FontRange::bitmap_len).sum();

        let mut out = Vec::with_capacity(64 + bitmap_len + self.name.len());
        out.extend_from_slice(FONT_MAGIC);
        out.extend_from_slice(&FONT_VERSION.to_le_bytes());
        out.extend_from_slice(&n_bmpv.to_le_bytes());
        out.extend_from_slice(&(bitmap_len as u64).to_le_bytes());
        out.extend_from_slice(&(self.name.len() as u64).to_le_bytes());
        out.extend_from_slice(&(self.ranges.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.default_size.to_le_bytes());
        out.push(u8::from(self.recommend_aa));
        for range in &self.ranges {
            match &range.kind {
                RangeKind::Mono { width, height, bpp } => {
                    out.push(RANGE_MONO);
                    out.extend_from_slice(&range.start.to_le_bytes());
                    out.extend_from_slice(&range.end.to_le_bytes());
                    out.extend_from_slice(&[*width, *height, *bpp]);
                }
                RangeKind::Variable { height, bpp, dims } => {
                    out.push(RANGE_VARIABLE);
                    out.extend_from_slice(&range.start.to_le_bytes());
                    out.extend_from_slice(&range.end.to_le_bytes());
                    out.extend_from_slice(&[*height, *bpp]);
                    for d in dims {
                        out.extend_from_slice(&[
                            d.draw_x as u8,
                            d.draw_y as u8,
                            d.draw_w,
                            d.draw_h,
                            d.measured_width,
                        ]);
                        out.extend_from_slice(&d.index.to_le_bytes());
                    }
                }
            }
        }
        for range in &self.ranges {
            let start = range.bitmap_offset;
            let data = self
                .bitmap
                .get(start..start + range.bitmap_len())
                .ok_or_else(|| RasterError::param("range bitmap runs past the font bitmap"))?;
            out.extend_from_slice(data);
        }
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);

        writer.write_all(&out).map_err(io_error)
    }

    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let result = track(
            File::open(path)
                .map_err(io_error)
                .and_then(|file| Self::read_from(&mut BufReader::new(file))),
        );
        match &result {
            Ok(font) => debug!(name = %font.name, ranges = font.ranges.len(), "font loaded"),
            Err(err) => warn!(error = %err, "rejected font file"),
        }
        result
    }

    pub fn save(&self, path: impl AsRef<Path>) -> RasterResult<()> {
        let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
        self.write_to(&mut out)?;
        out.flush().map_err(io_error)
    }
}

fn check_range(range: &FontRange) -> Result<(), String> {
    if range.end < range.start {
        return Err(format!(
            "range {:#x}..={:#x} ends before it starts",
            range.start, range.end
        ));
    }
    if !matches!(range.bpp(), 1 | 2 | 4 | 8) {
        return Err(format!(
            "range {:#x}..={:#x} has unsupported depth {}",
            range.start,
            range.end,
            range.bpp()
        ));
    }
    if let RangeKind::Variable { dims, .. } = &range.kind
        && dims.len() != range.glyph_count()
    {
        return Err(format!(
            "range {:#x}..={:#x} has {} glyphs but {} dimension records",
            range.start,
            range.end,
            range.glyph_count(),
            dims.len()
        ));
    }
    Ok(())
}

fn io_error(err: io::Error) -> RasterError {
    RasterError::Other(anyhow::Error::new(err).context("font i/o"))
}

struct FontReader<'a, R> {
    inner: &'a mut R,
}

impl<R: Read> FontReader<'_, R> {
    fn bytes(&mut self, buf: &mut [u8]) -> RasterResult<()> {
        self.inner.read_exact(buf).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => RasterError::corrupt("font data is truncated"),
            _ => io_error(err),
        })
    }

    fn u8(&mut self) -> RasterResult<u8> {
        let mut b = [0u8; 1];
        self.bytes(&mut b)?;
        Ok(b[0])
    }

    fn u16(&mut self) -> RasterResult<u16> {
        let mut b = [0u8; 2];
        self.bytes(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn u32(&mut self) -> RasterResult<u32> {
        let mut b = [0u8; 4];
        self.bytes(&mut b)?;
        Ok(u32::from_le_bytes(b))
    }

    fn u64(&mut self) -> RasterResult<u64> {
        let mut b = [0u8; 8];
        self.bytes(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }

    /// `len` bytes, without trusting `len` for the allocation.
    fn blob(&mut self, len: u64) -> RasterResult<Vec<u8>> {
        let mut out = Vec::new();
        self.inner
            .by_ref()
            .take(len)
            .read_to_end(&mut out)
            .map_err(io_error)?;
        if out.len() as u64 != len {
            return Err(RasterError::corrupt("font data is truncated"));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
