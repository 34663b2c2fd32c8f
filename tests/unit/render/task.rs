use super::*;
use crate::buffer::{PixelBuffer, PixelFormat};

fn buffer() -> PixelBuffer {
    PixelBuffer::new(PixelFormat::Argb8888, 4, 4).unwrap()
}

#[test]
fn parity_runs_split_a_rect() {
    let buf = buffer();
    let task = DrawTask::Rect {
        target: buf.target(),
        color: 0xff00_00ff,
        rect: Rectf::new(0.0, 0.0, 4.0, 4.0),
    };
    task.run(Rows::Odd);
    assert_eq!(buf.get_pixel(0, 0), 0);
    assert_eq!(buf.get_pixel(0, 1), 0xff00_00ff);
    task.run(Rows::Even);
    assert_eq!(buf.get_pixel(0, 0), 0xff00_00ff);
    assert_eq!(task.name(), "rect");
}

#[test]
fn invisible_shading_plans_nothing() {
    let buf = buffer();
    let shader = Shader::from_fn(|tint, _, _, _, _, _| tint).with_alpha_promises(true, false);
    assert!(ShadeJob::plan(&shader, &buf.target(), 0x00ff_ffff).is_none());
    assert!(ShadeJob::plan(&shader, &buf.target(), 0xffff_ffff).is_some());
}

#[test]
fn shaded_task_uses_its_tint() {
    let buf = buffer();
    let shader = Shader::from_fn(|tint, _, _, _, _, _| tint);
    let target = buf.target();
    let job = ShadeJob::plan(&shader, &target, 0xff12_3456).unwrap();
    let task = DrawTask::ShadedTri {
        target,
        job,
        tri: Trif::new(0.0, 0.0, 4.0, 0.0, 0.0, 4.0),
        uvs: Trif::DEFAULT_UVS,
    };
    task.run(Rows::All);
    assert_eq!(buf.get_pixel(0, 0), 0xff12_3456);
    assert_eq!(buf.get_pixel(3, 3), 0);
}

#[test]
fn far_below_triangle_runs_in_both_passes() {
    let buf = PixelBuffer::new(PixelFormat::Argb8888, 8, 8).unwrap();
    let task = DrawTask::Tri {
        target: buf.target(),
        color: 0xffff_0000,
        tri: Trif::new(0.0, 3.0e9, 5.0, 4.0e9, 1.0, 5.0e9),
    };
    task.run(Rows::Odd);
    task.run(Rows::Even);
    assert!(buf.to_bytes().iter().all(|&b| b == 0));
}
