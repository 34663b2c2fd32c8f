use super::*;
use crate::buffer::PixelFormat;
use crate::color;
use crate::foundation::error::{ErrorCode, last_error};
use crate::shader::Shader;
use crate::transform;

const RED: Color = 0xffff_0000;

fn white(w: u32, h: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(PixelFormat::Argb8888, w, h).unwrap();
    buf.background(color::WHITE);
    buf.mark_clean();
    buf
}

fn count(buf: &PixelBuffer, color: Color) -> usize {
    let mut n = 0;
    for y in 0..buf.height() as i32 {
        for x in 0..buf.width() as i32 {
            n += usize::from(buf.get_pixel(x, y) == color);
        }
    }
    n
}

#[test]
fn angles_wrap_into_one_turn() {
    assert_eq!(Arcf::new(0.0, 0.0, 1.0, 1.0, 0.5).span(), (0.5, 1.0));
    assert_eq!(Arcf::new(0.0, 0.0, 1.0, 0.0, 10.0).span(), (0.0, TAU));
    let (a0, a1) = Arcf::new(0.0, 0.0, 1.0, TAU + 1.0, TAU + 2.0).span();
    assert!((a0 - 1.0).abs() < 1e-5 && (a1 - 2.0).abs() < 1e-5);
}

#[test]
fn larger_arcs_get_more_segments() {
    assert_eq!(arc_divisions(5.0, 0.0, PI), 8);
    assert_eq!(arc_divisions(10.0, 0.0, PI), 16);
    assert_eq!(arc_divisions(40.0, 0.0, PI), 24);
    assert_eq!(arc_divisions(40.0, 0.0, 0.01), 1);
}

#[test]
fn circle_fills_its_disc() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(21, 21);
    ctx.draw_circle(&mut buf, RED, Vec2f::new(10.0, 10.25), 8.0).unwrap();
    assert_eq!(buf.get_pixel(10, 10), RED);
    assert_eq!(buf.get_pixel(10, 4), RED);
    assert_eq!(buf.get_pixel(16, 10), RED);
    assert_eq!(buf.get_pixel(0, 0), color::WHITE);
    assert_eq!(buf.get_pixel(10, 20), color::WHITE);
    let area = count(&buf, RED) as f32;
    assert!((area - PI * 64.0).abs() < 20.0, "covered {area} pixels");
}

#[test]
fn quarter_arc_opens_upwards_and_right() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(20, 20);
    ctx.draw_arc(&mut buf, RED, Arcf::new(10.0, 10.0, 8.0, 0.0, PI * 0.5))
        .unwrap();
    assert_eq!(buf.get_pixel(12, 6), RED);
    assert_eq!(buf.get_pixel(6, 6), color::WHITE);
    assert_eq!(buf.get_pixel(13, 13), color::WHITE);
    assert_eq!(buf.get_pixel(6, 13), color::WHITE);
}

#[test]
fn circles_follow_the_transform() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(20, 20);
    buf.apply_transform(transform::scale(2.0, 2.0));
    ctx.draw_circle(&mut buf, RED, Vec2f::new(5.0, 5.0), 2.0).unwrap();
    assert_eq!(buf.get_pixel(11, 10), RED);
    assert_eq!(buf.get_pixel(8, 10), RED);
    assert_eq!(buf.get_pixel(15, 10), color::WHITE);

    let mut raw = white(20, 20);
    raw.apply_transform(transform::scale(2.0, 2.0));
    ctx.simple_circle(&mut raw, RED, Vec2f::new(5.0, 5.0), 2.0).unwrap();
    assert_eq!(raw.get_pixel(6, 5), RED);
    assert_eq!(raw.get_pixel(10, 10), color::WHITE);
}

#[test]
fn shaded_circle_uses_the_shader() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(16, 16);
    let shader = Shader::from_fn(|tint, _, _, _, _, _| tint);
    ctx.shade_circle(&mut buf, RED, &shader, Vec2f::new(8.0, 8.0), 5.0)
        .unwrap();
    assert_eq!(buf.get_pixel(9, 8), RED);
    assert_eq!(buf.get_pixel(0, 0), color::WHITE);
}

#[test]
fn rect_outline_leaves_the_inside_alone() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(8, 8);
    ctx.outline_rect(&mut buf, RED, Rectf::new(1.0, 1.0, 4.0, 3.0)).unwrap();
    assert_eq!(buf.get_pixel(1, 1), RED);
    assert_eq!(buf.get_pixel(3, 1), RED);
    assert_eq!(buf.get_pixel(1, 3), RED);
    assert_eq!(buf.get_pixel(3, 4), RED);
    assert_eq!(buf.get_pixel(2, 2), color::WHITE);
    assert_eq!(buf.get_pixel(7, 7), color::WHITE);
}

#[test]
fn triangle_outline_touches_each_corner() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(10, 10);
    ctx.outline_tri(&mut buf, RED, Trif::new(1.0, 1.0, 8.0, 1.0, 1.0, 8.0))
        .unwrap();
    assert_eq!(buf.get_pixel(1, 1), RED);
    assert_eq!(buf.get_pixel(5, 1), RED);
    assert_eq!(buf.get_pixel(1, 5), RED);
    assert_eq!(buf.get_pixel(3, 3), color::WHITE);
}

#[test]
fn thick_line_covers_its_width() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(8, 8);
    ctx.draw_thick_line(&mut buf, RED, Linef::new(1.0, 4.0, 7.0, 4.0), 2.0)
        .unwrap();
    assert_eq!(buf.get_pixel(3, 3), RED);
    assert_eq!(buf.get_pixel(3, 4), RED);
    assert_eq!(buf.get_pixel(3, 2), color::WHITE);
    assert_eq!(buf.get_pixel(3, 5), color::WHITE);
    assert_eq!(buf.get_pixel(0, 4), color::WHITE);

    let mut untouched = white(4, 4);
    ctx.draw_thick_line(&mut untouched, RED, Linef::new(1.0, 1.0, 1.0, 1.0), 2.0)
        .unwrap();
    assert!(!untouched.is_dirty());
}

#[test]
fn round_rect_cuts_its_corners() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(10, 10);
    ctx.draw_round_rect(&mut buf, RED, Rectf::new(0.0, 0.0, 10.0, 10.0), 3.0)
        .unwrap();
    assert_eq!(buf.get_pixel(0, 0), color::WHITE);
    assert_eq!(buf.get_pixel(9, 9), color::WHITE);
    assert_eq!(buf.get_pixel(1, 2), RED);
    assert_eq!(buf.get_pixel(5, 5), RED);
    assert_eq!(buf.get_pixel(0, 5), RED);
    assert_eq!(buf.get_pixel(5, 0), RED);
}

#[test]
fn round_rect_without_radius_is_a_rect() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(6, 6);
    ctx.draw_round_rect(&mut buf, RED, Rectf::new(1.0, 1.0, 3.0, 2.0), 0.0)
        .unwrap();
    assert_eq!(count(&buf, RED), 6);
}

#[test]
fn round_rect_outline_skips_the_corners() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(12, 12);
    ctx.outline_round_rect(&mut buf, RED, Rectf::new(1.0, 1.0, 10.0, 10.0), 3.0)
        .unwrap();
    assert_eq!(buf.get_pixel(6, 1), RED);
    assert_eq!(buf.get_pixel(1, 6), RED);
    assert_eq!(buf.get_pixel(2, 2), color::WHITE);
    assert_eq!(buf.get_pixel(6, 6), color::WHITE);
}

#[test]
fn non_finite_shapes_are_rejected() {
    let mut ctx = RenderContext::sync();
    let mut buf = white(4, 4);
    let err = ctx
        .draw_arc(&mut buf, RED, Arcf::new(1.0, 1.0, f32::NAN, 0.0, 1.0))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Infinite);
    assert_eq!(last_error(), ErrorCode::Infinite);
    assert!(ctx
        .draw_round_rect(&mut buf, RED, Rectf::new(0.0, 0.0, 2.0, 2.0), f32::INFINITY)
        .is_err());
    assert!(!buf.is_dirty());
}

#[test]
fn shaded_circle_asks_for_the_promise_once() {
    use crate::buffer::PixelStore;
    use crate::shader::{Promise, ShaderProgram};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(Arc<AtomicUsize>);

    impl ShaderProgram for Counted {
        fn shade(&self, tint: Color, _: Color, _: i32, _: i32, _: f32, _: f32) -> Color {
            tint
        }

        fn promise(&self, _target: &PixelStore, _tint: Color) -> Promise {
            self.0.fetch_add(1, Ordering::SeqCst);
            Promise::empty()
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let shader = Shader::new(Counted(Arc::clone(&calls)));
    let mut ctx = RenderContext::sync();
    let mut buf = white(16, 16);
    ctx.shade_circle(&mut buf, RED, &shader, Vec2f::new(8.0, 8.0), 5.0)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(buf.get_pixel(9, 8), RED);
}
