use super::*;
use crate::buffer::{PixelBuffer, PixelFormat};

fn image(format: PixelFormat, w: u32, h: u32, colors: &[Color]) -> PixelBuffer {
    let mut buf = PixelBuffer::new(format, w, h).unwrap();
    for (i, &c) in colors.iter().enumerate() {
        buf.set_pixel(c, i as i32 % w as i32, i as i32 / w as i32).unwrap();
    }
    buf
}

#[test]
fn glyph_values_respect_offset_and_stride() {
    let glyph = GlyphBitmap {
        bitmap: Arc::from(vec![0xaa_u8, 0b0000_0110, 0b0000_0001]),
        offset: 1,
        width: 3,
        height: 2,
        bpp: 1,
    };
    assert_eq!(glyph.row_stride(), 1);
    assert_eq!(glyph.value(0, 0), 0);
    assert_eq!(glyph.value(1, 0), 1);
    assert_eq!(glyph.value(2, 0), 1);
    assert_eq!(glyph.value(0, 1), 1);
    assert_eq!(glyph.value(1, 1), 0);
}

#[test]
fn blit_copies_and_clips() {
    let top = image(PixelFormat::Argb8888, 2, 2, &[1, 2, 3, 4]);
    let mut dst = PixelBuffer::new(PixelFormat::Argb8888, 4, 4).unwrap();
    dst.clip(0, 0, 4, 3);
    blit(&dst.target(), Rows::All, top.store(), 2, 2);
    assert_eq!(dst.get_pixel(2, 2), 1);
    assert_eq!(dst.get_pixel(3, 2), 2);
    assert_eq!(dst.get_pixel(2, 3), 0);

    blit(&dst.target(), Rows::All, top.store(), -1, -1);
    assert_eq!(dst.get_pixel(0, 0), 4);
}

#[test]
fn blit_converts_between_formats() {
    let top = image(PixelFormat::Argb8888, 2, 1, &[0xffff_0000, 0x8000_ff00]);
    let dst = PixelBuffer::new(PixelFormat::Rgb565, 2, 1).unwrap();
    blit(&dst.target(), Rows::All, top.store(), 0, 0);
    assert_eq!(dst.get_pixel_raw(0, 0), 0xf800);
    assert_eq!(dst.get_pixel_raw(1, 0), 0x07e0);
}

#[test]
fn blit_into_palette_picks_closest_entry() {
    let top = image(PixelFormat::Argb8888, 2, 1, &[0xfff0_1010, 0xff10_10f0]);
    let dst =
        PixelBuffer::with_palette(PixelFormat::Pal2, 2, 1, vec![0xffff_0000_u32, 0xff00_00ff])
            .unwrap();
    blit(&dst.target(), Rows::All, top.store(), 0, 0);
    assert_eq!(dst.get_pixel_raw(0, 0), 0);
    assert_eq!(dst.get_pixel_raw(1, 0), 1);
}

#[test]
fn sprite_blends_and_skips_transparent() {
    let top = image(PixelFormat::Argb8888, 2, 1, &[0x80ff_ffff, 0]);
    let mut dst = PixelBuffer::new(PixelFormat::Argb8888, 2, 1).unwrap();
    dst.background(0xff00_0000);
    sprite(&dst.target(), Rows::All, top.store(), 0, 0);
    let blended = dst.get_pixel(0, 0);
    assert!((0x7f..=0x81).contains(&color::red(blended)));
    assert_eq!(dst.get_pixel(1, 0), 0xff00_0000);
}

#[test]
fn blit_raw_copies_native_values() {
    let raw = PixelStore::from_bytes(PixelFormat::Grey4, 2, 2, &[0x21, 0x43]).unwrap();
    let dst = PixelBuffer::new(PixelFormat::Grey4, 3, 3).unwrap();
    blit_raw(&dst.target(), Rows::All, &raw, 1, 1);
    assert_eq!(dst.get_pixel_raw(1, 1), 1);
    assert_eq!(dst.get_pixel_raw(2, 1), 2);
    assert_eq!(dst.get_pixel_raw(1, 2), 3);
    assert_eq!(dst.get_pixel_raw(2, 2), 4);
    assert_eq!(dst.get_pixel_raw(0, 0), 0);
}

#[test]
fn blit_char_scales_one_bit_glyphs() {
    let glyph = GlyphBitmap {
        bitmap: Arc::from(vec![0b01_u8, 0b10]),
        offset: 0,
        width: 2,
        height: 2,
        bpp: 1,
    };
    let dst = PixelBuffer::new(PixelFormat::Argb8888, 4, 4).unwrap();
    blit_char(&dst.target(), Rows::All, &glyph, 0xffff_ffff, 0, 0, 2);
    for y in 0..4 {
        for x in 0..4 {
            let on = (x < 2) == (y < 2);
            assert_eq!(dst.get_pixel(x, y) != 0, on, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn blit_char_blends_by_coverage() {
    let glyph = GlyphBitmap {
        bitmap: Arc::from(vec![0b11_01_u8]),
        offset: 0,
        width: 2,
        height: 1,
        bpp: 2,
    };
    let mut dst = PixelBuffer::new(PixelFormat::Argb8888, 2, 1).unwrap();
    dst.background(0xff00_0000);
    blit_char(&dst.target(), Rows::Odd, &glyph, 0xffff_ffff, 0, 0, 1);
    assert_eq!(dst.get_pixel(0, 0), 0xff00_0000);
    blit_char(&dst.target(), Rows::Even, &glyph, 0xffff_ffff, 0, 0, 1);
    let faint = color::red(dst.get_pixel(0, 0));
    assert!((0x50..=0x56).contains(&faint), "{faint:#x}");
    assert_eq!(dst.get_pixel(1, 0), 0xffff_ffff);
}
