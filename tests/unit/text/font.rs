use super::*;
use crate::foundation::error::ErrorCode;

fn sample() -> Font {
    let mut font = Font::new("sample", 8, true);
    // Two 3x2 glyphs at one byte per row.
    font.push_mono(0x30, 0x31, (3, 2), 1, &[1, 2, 3, 4]).unwrap();
    let dims = vec![
        GlyphDims {
            draw_x: -1,
            draw_y: 2,
            draw_w: 2,
            draw_h: 1,
            measured_width: 3,
            index: 2,
        },
        GlyphDims {
            draw_x: 0,
            draw_y: 0,
            draw_w: 4,
            draw_h: 2,
            measured_width: 5,
            index: 0,
        },
    ];
    font.push_variable(0x61, 0x62, 9, 4, dims, &[10, 11, 12, 13]).unwrap();
    font
}

fn encoded(font: &Font) -> Vec<u8> {
    let mut out = Vec::new();
    font.write_to(&mut out).unwrap();
    out
}

#[test]
fn written_fonts_read_back_identically() {
    let font = sample();
    let bytes = encoded(&font);
    assert!(bytes.starts_with(FONT_MAGIC));
    assert_eq!(bytes.last(), Some(&0));
    let back = Font::read_from(&mut bytes.as_slice()).unwrap();
    assert_eq!(back, font);
}

#[test]
fn glyphs_point_into_their_range_bitmap() {
    let font = sample();
    assert_eq!(font.bitmap().len(), 8);

    let one = font.glyph(0x31).unwrap();
    assert_eq!(one.bitmap.offset, 2);
    assert_eq!((one.bitmap.width, one.bitmap.height), (3, 2));
    assert_eq!(one.advance, 3);

    let a = font.glyph(u32::from('a')).unwrap();
    assert_eq!(a.bitmap.offset, 4 + 2);
    assert_eq!((a.draw_x, a.draw_y), (-1, 2));
    assert_eq!(a.advance, 3);
    assert_eq!(a.height, 9);
    assert_eq!(a.bitmap.bpp, 4);

    assert!(font.glyph(0x32).is_none());
}

#[test]
fn mismatched_bitmaps_are_rejected() {
    let mut font = Font::new("x", 8, false);
    let err = font.push_mono(0x41, 0x42, (8, 8), 1, &[0; 15]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Param);
    let err = font.push_mono(0x41, 0x41, (8, 8), 3, &[0; 24]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Param);
    let err = font
        .push_variable(0x41, 0x42, 8, 1, vec![GlyphDims::default()], &[])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Param);
    assert!(font.ranges().is_empty());
}

#[test]
fn bad_magic_is_corrupt() {
    let mut bytes = encoded(&sample());
    bytes[0] = b'q';
    let err = Font::read_from(&mut bytes.as_slice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Corrupt);
}

#[test]
fn other_versions_are_unsupported() {
    let mut bytes = encoded(&sample());
    bytes[11..13].copy_from_slice(&2u16.to_le_bytes());
    let err = Font::read_from(&mut bytes.as_slice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unsupported);
}

#[test]
fn every_truncation_is_corrupt() {
    let bytes = encoded(&sample());
    for len in 0..bytes.len() {
        let err = Font::read_from(&mut &bytes[..len]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Corrupt, "truncated to {len} bytes");
    }
}

#[test]
fn inconsistent_counts_are_corrupt() {
    let bytes = encoded(&sample());

    let mut more_glyphs = bytes.clone();
    more_glyphs[13..21].copy_from_slice(&3u64.to_le_bytes());
    let err = Font::read_from(&mut more_glyphs.as_slice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Corrupt);

    let mut huge_bitmap = bytes.clone();
    huge_bitmap[21..29].copy_from_slice(&u64::MAX.to_le_bytes());
    let err = Font::read_from(&mut huge_bitmap.as_slice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Corrupt);

    let mut bad_type = bytes;
    bad_type[48] = 7;
    let err = Font::read_from(&mut bad_type.as_slice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Corrupt);
}

#[test]
fn names_with_nul_cannot_be_written() {
    let font = Font::new("a\0b", 8, false);
    let err = font.write_to(&mut Vec::new()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Param);
}
