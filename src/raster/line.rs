use crate::color::Color;
use crate::foundation::core::{Linef, Recti};
use crate::raster::{DrawTarget, Paint, Rows, ShadedPaint, lerpf, with_fill};
use crate::shader::Shading;

const FIX_ONE: f32 = 65536.0;

/// Clip the parametric segment to `clip`; returns the surviving `t` range.
fn clip_segment(line: Linef, clip: Recti) -> Option<(f64, f64)> {
    let (x0, y0) = (f64::from(line.x0), f64::from(line.y0));
    let dx = f64::from(line.x1) - x0;
    let dy = f64::from(line.y1) - y0;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let edges = [
        (-dx, x0 - f64::from(clip.x)),
        (dx, f64::from(clip.right()) - x0),
        (-dy, y0 - f64::from(clip.y)),
        (dy, f64::from(clip.bottom()) - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Plot `floor` of each step along the line, endpoints included.
///
/// Steps are laid out over the whole segment and the clip only picks which of them are
/// plotted, so a clipped line lights exactly the unclipped pixels inside the clip.
fn line_body<P: Paint>(
    target: &DrawTarget,
    rows: Rows,
    paint: &P,
    line: Linef,
    uvs: Option<Linef>,
) {
    let (mut line, mut uvs) = (line, uvs);
    if line.y1 < line.y0 {
        line = Linef::new(line.x1, line.y1, line.x0, line.y0);
        uvs = uvs.map(|uv| Linef::new(uv.x1, uv.y1, uv.x0, uv.y0));
    }
    let clip = target.clip;
    if clip.is_empty() {
        return;
    }
    let Some((t0, t1)) = clip_segment(line, clip) else {
        return;
    };

    let (dx, dy) = (line.x1 - line.x0, line.y1 - line.y0);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
    // 16.16 fixed point; horizontal and vertical lines just have a zero delta.
    let fx = (line.x0 * FIX_ONE).floor() as i64;
    let fy = (line.y0 * FIX_ONE).floor() as i64;
    let (fdx, fdy) = (i128::from((dx * FIX_ONE) as i64), i128::from((dy * FIX_ONE) as i64));
    // One step of slack each side covers samples that round onto the clip edge.
    let first = ((t0 * steps as f64).floor() as i64 - 1).max(0);
    let last = ((t1 * steps as f64).ceil() as i64 + 1).min(steps);
    let width = target.store.width() as usize;
    let total = i128::from(steps);

    for i in first..=last {
        let x = ((i128::from(fx) + fdx * i128::from(i) / total) >> 16) as i32;
        let y = ((i128::from(fy) + fdy * i128::from(i) / total) >> 16) as i32;
        if !rows.contains(y) || !clip.contains(x, y) {
            continue;
        }
        let (u, v) = match (P::USES_UV, uvs) {
            (true, Some(uv)) => {
                let f = i as f32 / steps as f32;
                (lerpf(uv.x0, uv.x1, f), lerpf(uv.y0, uv.y1, f))
            }
            _ => (0.0, 0.0),
        };
        paint.paint(&target.store, y as usize * width + x as usize, x, y, u, v);
    }
}

pub fn unshaded_line(target: &DrawTarget, rows: Rows, color: Color, line: Linef) {
    with_fill!(&target.store, color, |paint| line_body(target, rows, paint, line, None));
}

pub fn shaded_line(
    target: &DrawTarget,
    rows: Rows,
    shading: &Shading<'_>,
    line: Linef,
    uvs: Linef,
) {
    let paint = ShadedPaint::new(shading, &target.store);
    let uvs = (!shading.plan.ignore_uvs).then_some(uvs);
    line_body(target, rows, &paint, line, uvs);
}

#[cfg(test)]
#[path = "../../tests/unit/raster/line.rs"]
mod tests;
