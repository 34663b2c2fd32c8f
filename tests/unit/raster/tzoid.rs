use super::*;
use crate::buffer::{PixelBuffer, PixelFormat};
use crate::raster::rect::unshaded_rect;
use crate::foundation::core::Rectf;
use crate::shader::Shader;

const RED: Color = 0xffff_0000;

fn buffer(w: u32, h: u32) -> PixelBuffer {
    PixelBuffer::new(PixelFormat::Argb8888, w, h).unwrap()
}

fn lit(buf: &PixelBuffer) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    for y in 0..buf.height() as i32 {
        for x in 0..buf.width() as i32 {
            if buf.get_pixel(x, y) != 0 {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn right_triangle_covers_pixel_centers_only() {
    let buf = buffer(4, 4);
    unshaded_tri(&buf.target(), Rows::All, RED, Trif::new(0.0, 0.0, 4.0, 0.0, 0.0, 4.0));
    assert_eq!(
        lit(&buf),
        vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (0, 2)]
    );
}

#[test]
fn flat_triangle_draws_nothing() {
    let buf = buffer(4, 4);
    unshaded_tri(&buf.target(), Rows::All, RED, Trif::new(0.0, 2.0, 4.0, 2.0, 1.0, 2.0));
    assert!(lit(&buf).is_empty());
}

#[test]
fn square_quad_matches_rect_without_overlap() {
    let quad_buf = buffer(5, 5);
    let q = Quadf::new(1.0, 1.0, 3.0, 1.0, 3.0, 3.0, 1.0, 3.0);
    // Half alpha would show a double-blended pixel if the two halves overlapped.
    unshaded_quad(&quad_buf.target(), Rows::All, 0x80ff_ffff, q);

    let rect_buf = buffer(5, 5);
    unshaded_rect(&rect_buf.target(), Rows::All, 0x80ff_ffff, Rectf::new(1.0, 1.0, 2.0, 2.0));
    assert_eq!(quad_buf.to_bytes(), rect_buf.to_bytes());
    assert_eq!(lit(&quad_buf), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
}

#[test]
fn even_and_odd_passes_rebuild_the_whole() {
    let tri = Trif::new(1.3, 0.2, 15.7, 5.1, 4.4, 12.9);
    let whole = buffer(17, 13);
    unshaded_tri(&whole.target(), Rows::All, 0x80ff_8000, tri);

    let split = buffer(17, 13);
    unshaded_tri(&split.target(), Rows::Even, 0x80ff_8000, tri);
    let even_only = split.to_bytes();
    unshaded_tri(&split.target(), Rows::Odd, 0x80ff_8000, tri);
    assert_eq!(split.to_bytes(), whole.to_bytes());

    let row_bytes = 17 * 4;
    for (y, row) in even_only.chunks(row_bytes).enumerate() {
        if y % 2 == 1 {
            assert!(row.iter().all(|&b| b == 0), "odd row {y} drawn by even pass");
        } else {
            assert_eq!(row, &whole.to_bytes()[y * row_bytes..(y + 1) * row_bytes]);
        }
    }
}

#[test]
fn clip_confines_triangles() {
    let mut buf = buffer(8, 8);
    buf.clip(2, 2, 3, 3);
    unshaded_tri(&buf.target(), Rows::All, RED, Trif::new(-5.0, -5.0, 20.0, -5.0, -5.0, 20.0));
    let pixels = lit(&buf);
    assert_eq!(pixels.len(), 9);
    assert!(pixels.iter().all(|&(x, y)| (2..5).contains(&x) && (2..5).contains(&y)));
}

#[test]
fn shaded_triangle_interpolates_uvs() {
    let buf = buffer(8, 8);
    let shader = Shader::from_fn(|_, _, _, _, u, v| {
        crate::color::argb(255, (u * 255.0) as u8, (v * 255.0) as u8, 0)
    });
    let target = buf.target();
    let shading = Shading::plan(&shader, &target.store, 0xffff_ffff).unwrap();
    shaded_tri(
        &target,
        Rows::All,
        &shading,
        Trif::new(0.0, 0.0, 8.0, 0.0, 0.0, 8.0),
        Trif::DEFAULT_UVS,
    );
    let c = buf.get_pixel(0, 0);
    assert_eq!(crate::color::red(c), (0.0625 * 255.0) as u8);
    assert_eq!(crate::color::green(c), (0.0625 * 255.0) as u8);
    let far = buf.get_pixel(6, 0);
    assert!(crate::color::red(far) > 190);
    assert_eq!(buf.get_pixel(7, 7), 0);
}

#[test]
fn off_buffer_triangles_draw_nothing_in_any_pass() {
    let buf = buffer(8, 8);
    let far = [
        Trif::new(0.0, 3.0e9, 5.0, 4.0e9, 1.0, 5.0e9),
        Trif::new(0.0, -5.0e9, 5.0, -4.0e9, 1.0, -3.0e9),
    ];
    for tri in far {
        for rows in [Rows::All, Rows::Even, Rows::Odd] {
            unshaded_tri(&buf.target(), rows, RED, tri);
        }
    }
    assert!(lit(&buf).is_empty());
}
