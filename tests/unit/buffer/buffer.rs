use super::*;
use crate::foundation::error::{ErrorCode, last_error};

#[test]
fn new_buffer_is_clean_and_unclipped() {
    let buf = PixelBuffer::new(PixelFormat::Argb8888, 8, 4).unwrap();
    assert!(!buf.is_dirty());
    assert_eq!(buf.get_dirty(), Recti::default());
    assert_eq!(buf.get_clip(), Recti::new(0, 0, 8, 4));
    assert_eq!(buf.to_bytes().len(), 8 * 4 * 4);
}

#[test]
fn clip_is_clamped_and_flipped() {
    let mut buf = PixelBuffer::new(PixelFormat::Rgb565, 10, 10).unwrap();
    buf.clip(8, 8, 5, 5);
    assert_eq!(buf.get_clip(), Recti::new(8, 8, 2, 2));
    buf.clip(5, 5, -3, -2);
    assert_eq!(buf.get_clip(), Recti::new(2, 3, 3, 2));
    buf.clip(20, 20, 2, 2);
    assert!(buf.get_clip().is_empty());
    buf.noclip();
    assert_eq!(buf.get_clip(), Recti::new(0, 0, 10, 10));
}

#[test]
fn dirty_rect_accumulates_and_resets() {
    let mut buf = PixelBuffer::new(PixelFormat::Grey8, 16, 16).unwrap();
    buf.mark_dirty1(3, 4);
    buf.mark_dirty2(5, 1, 2, 2);
    assert_eq!(buf.get_dirty(), Recti::new(3, 1, 4, 4));
    buf.mark_dirty1(-5, 100);
    assert_eq!(buf.get_dirty(), Recti::new(0, 1, 7, 15));
    buf.mark_clean();
    assert!(!buf.is_dirty());
}

#[test]
fn out_of_bounds_pixels_report_and_return_zero() {
    let mut buf = PixelBuffer::new(PixelFormat::Argb8888, 2, 2).unwrap();
    buf.set_pixel(0xff12_3456, 1, 1).unwrap();
    assert_eq!(buf.get_pixel(1, 1), 0xff12_3456);
    assert_eq!(last_error(), ErrorCode::Ok);

    assert_eq!(buf.get_pixel(2, 0), 0);
    assert_eq!(last_error(), ErrorCode::Bounds);
    assert!(matches!(
        buf.set_pixel(1, -1, 0),
        Err(RasterError::OutOfBounds(_))
    ));
    assert_eq!(buf.get_dirty(), Recti::new(1, 1, 1, 1));
}

#[test]
fn background_fills_everything_and_marks_dirty() {
    let mut buf = PixelBuffer::new(PixelFormat::Rgb565, 3, 3).unwrap();
    buf.clip(0, 0, 1, 1);
    buf.background(0xffff_ffff);
    assert_eq!(buf.get_pixel(2, 2), 0xffff_ffff);
    assert_eq!(buf.get_dirty(), Recti::new(0, 0, 3, 3));
}

#[test]
fn palette_buffers_store_indices() {
    let mut buf =
        PixelBuffer::with_palette(PixelFormat::Pal2, 4, 1, vec![0xff00_0000_u32, 0xffff_0000])
            .unwrap();
    buf.set_pixel(1, 2, 0).unwrap();
    assert_eq!(buf.get_pixel_raw(2, 0), 1);
    assert_eq!(buf.get_pixel(2, 0), 0xffff_0000);
    assert_eq!(buf.get_pixel(0, 0), 0xff00_0000);

    let mut plain = PixelBuffer::new(PixelFormat::Argb8888, 1, 1).unwrap();
    assert!(matches!(
        plain.set_palette(vec![0_u32]),
        Err(RasterError::Unsupported(_))
    ));
}

#[test]
fn convert_reencodes_pixels() {
    let mut buf = PixelBuffer::new(PixelFormat::Argb8888, 2, 1).unwrap();
    buf.set_pixel(0xffff_0000, 0, 0).unwrap();
    buf.set_pixel(0xff00_00ff, 1, 0).unwrap();
    buf.convert(PixelFormat::Rgb565).unwrap();
    assert_eq!(buf.format(), PixelFormat::Rgb565);
    assert_eq!(buf.get_pixel(0, 0), 0xffff_0000);
    assert_eq!(buf.get_pixel(1, 0), 0xff00_00ff);

    assert!(buf.convert(PixelFormat::Pal4).is_err());
    buf.convert_to_palette(PixelFormat::Pal4, vec![0xff00_00f0_u32, 0xfff0_0000])
        .unwrap();
    assert_eq!(buf.get_pixel_raw(0, 0), 1);
    assert_eq!(buf.get_pixel_raw(1, 0), 0);
}

#[test]
fn reversed_buffers_read_the_same_colors() {
    let mut buf = PixelBuffer::new(PixelFormat::Argb4444, 2, 1).unwrap();
    buf.set_pixel(0xff11_2233, 0, 0).unwrap();
    let before = buf.get_pixel(0, 0);
    buf.set_reversed(true);
    assert!(buf.reversed());
    assert_eq!(buf.get_pixel(0, 0), before);
    assert_eq!(buf.to_bytes()[0], 0xf1);
}

#[test]
fn rgba_image_round_trip() {
    let mut buf = PixelBuffer::new(PixelFormat::Argb8888, 2, 2).unwrap();
    buf.set_pixel(0x80ff_0000, 1, 0).unwrap();
    let img = buf.to_rgba_image();
    assert_eq!(img.get_pixel(1, 0).0, [0xff, 0, 0, 0x80]);
    let back = PixelBuffer::from_rgba_image(&img, PixelFormat::Argb8888).unwrap();
    assert_eq!(back.get_pixel(1, 0), 0x80ff_0000);
}

#[test]
fn transform_stack_underflow_is_reported() {
    let mut buf = PixelBuffer::new(PixelFormat::Grey1, 8, 8).unwrap();
    assert!(buf.pop_transform().is_err());
    assert_eq!(last_error(), ErrorCode::Underflow);
    buf.push_transform();
    buf.pop_transform().unwrap();
}
