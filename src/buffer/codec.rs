//! Conversion between canonical ARGB colors and each format's native values.
//!
//! Narrowing keeps the top bits of every channel. Widening replicates the stored bits downwards,
//! so `to_canonical(to_native(to_canonical(v)))` equals `to_canonical(v)` for every format.

use crate::buffer::format::PixelFormat;
use crate::color::Color;

const GREY2: [Color; 4] = [0xff00_0000, 0xff55_5555, 0xffaa_aaaa, 0xffff_ffff];

/// Encode `color` into `format`.
///
/// Palette formats work in index space: the low bits of `color` are the index.
#[inline]
pub fn to_native(format: PixelFormat, color: Color) -> u32 {
    let c = color;
    let sum_tops = |bits: u32| {
        let mask = (1u32 << bits) - 1;
        ((c >> (24 - bits)) & mask) + ((c >> (16 - bits)) & mask) + ((c >> (8 - bits)) & mask)
    };
    match format {
        PixelFormat::Pal1
        | PixelFormat::Pal2
        | PixelFormat::Pal4
        | PixelFormat::Pal8
        | PixelFormat::Pal16 => c & format.value_mask(),
        PixelFormat::Grey1 => {
            let sum = ((c >> 16) & 0xff) + ((c >> 8) & 0xff) + (c & 0xff);
            u32::from(sum > 384)
        }
        PixelFormat::Grey2 => sum_tops(2) / 3,
        PixelFormat::Grey4 => sum_tops(4) / 3,
        PixelFormat::Grey8 => sum_tops(8) / 3,
        PixelFormat::Rgb332 => ((c >> 16) & 0xe0) | ((c >> 11) & 0x1c) | ((c >> 6) & 0x03),
        PixelFormat::Rgb565 => ((c >> 8) & 0xf800) | ((c >> 5) & 0x07e0) | ((c >> 3) & 0x001f),
        PixelFormat::Argb1111 => {
            ((c >> 28) & 0x8) | ((c >> 21) & 0x4) | ((c >> 14) & 0x2) | ((c >> 7) & 0x1)
        }
        PixelFormat::Argb2222 => {
            ((c >> 24) & 0xc0) | ((c >> 18) & 0x30) | ((c >> 12) & 0x0c) | ((c >> 6) & 0x03)
        }
        PixelFormat::Argb4444 => {
            ((c >> 16) & 0xf000) | ((c >> 12) & 0x0f00) | ((c >> 8) & 0x00f0) | ((c >> 4) & 0x000f)
        }
        PixelFormat::Rgb888 => c & 0x00ff_ffff,
        PixelFormat::Argb8888 => c,
    }
}

/// Widen an `n`-bit channel value to 8 bits by bit replication.
#[inline]
fn widen(v: u32, bits: u32) -> u32 {
    match bits {
        1 => v * 0xff,
        2 => v * 0x55,
        3 => (v << 5) | (v << 2) | (v >> 1),
        4 => v * 0x11,
        5 => (v << 3) | (v >> 2),
        6 => (v << 2) | (v >> 4),
        _ => v,
    }
}

#[inline]
fn pack(a: u32, r: u32, g: u32, b: u32) -> Color {
    (a << 24) | (r << 16) | (g << 8) | b
}

/// Decode a native value of `format`.
///
/// Palette lookups past the end fall back to entry 0, and to transparent for an empty palette.
#[inline]
pub fn to_canonical(format: PixelFormat, palette: &[Color], value: u32) -> Color {
    let v = value & format.value_mask();
    match format {
        PixelFormat::Pal1
        | PixelFormat::Pal2
        | PixelFormat::Pal4
        | PixelFormat::Pal8
        | PixelFormat::Pal16 => palette
            .get(v as usize)
            .or_else(|| palette.first())
            .copied()
            .unwrap_or(0),
        PixelFormat::Grey1 => {
            if v & 1 != 0 {
                0xffff_ffff
            } else {
                0xff00_0000
            }
        }
        PixelFormat::Grey2 => GREY2[v as usize & 3],
        PixelFormat::Grey4 => 0xff00_0000 | (v * 0x0011_1111),
        PixelFormat::Grey8 => 0xff00_0000 | (v * 0x0001_0101),
        PixelFormat::Rgb332 => pack(
            0xff,
            widen((v >> 5) & 7, 3),
            widen((v >> 2) & 7, 3),
            widen(v & 3, 2),
        ),
        PixelFormat::Rgb565 => pack(
            0xff,
            widen((v >> 11) & 0x1f, 5),
            widen((v >> 5) & 0x3f, 6),
            widen(v & 0x1f, 5),
        ),
        PixelFormat::Argb1111 => pack(
            widen((v >> 3) & 1, 1),
            widen((v >> 2) & 1, 1),
            widen((v >> 1) & 1, 1),
            widen(v & 1, 1),
        ),
        PixelFormat::Argb2222 => pack(
            widen((v >> 6) & 3, 2),
            widen((v >> 4) & 3, 2),
            widen((v >> 2) & 3, 2),
            widen(v & 3, 2),
        ),
        PixelFormat::Argb4444 => pack(
            widen((v >> 12) & 0xf, 4),
            widen((v >> 8) & 0xf, 4),
            widen((v >> 4) & 0xf, 4),
            widen(v & 0xf, 4),
        ),
        PixelFormat::Rgb888 => 0xff00_0000 | v,
        PixelFormat::Argb8888 => v,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/codec.rs"]
mod tests;
