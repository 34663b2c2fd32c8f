//! Triangles and quads, both reduced to trapezoids with horizontal top and bottom edges.

use crate::color::Color;
use crate::foundation::core::{Quadf, Trif};
use crate::raster::{DrawTarget, Paint, Rows, ShadedPaint, lerpf, span_start, with_fill};
use crate::shader::Shading;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Vertex {
    x: f32,
    y: f32,
    u: f32,
    v: f32,
}

impl Vertex {
    fn lerp(self, to: Vertex, t: f32) -> Vertex {
        Vertex {
            x: lerpf(self.x, to.x, t),
            y: lerpf(self.y, to.y, t),
            u: lerpf(self.u, to.u, t),
            v: lerpf(self.v, to.v, t),
        }
    }
}

fn vertices3(tri: Trif, uvs: Option<Trif>) -> [Vertex; 3] {
    let uv = uvs.unwrap_or_default().points();
    let p = tri.points();
    std::array::from_fn(|i| Vertex {
        x: p[i].x,
        y: p[i].y,
        u: uv[i].x,
        v: uv[i].y,
    })
}

fn vertices4(quad: Quadf, uvs: Option<Quadf>) -> [Vertex; 4] {
    let uv = uvs.unwrap_or_default().points();
    let p = quad.points();
    std::array::from_fn(|i| Vertex {
        x: p[i].x,
        y: p[i].y,
        u: uv[i].x,
        v: uv[i].y,
    })
}

/// Fill between the edges `top[0]..bottom[0]` and `top[1]..bottom[1]`.
///
/// Rows come from `top[0].y` and `bottom[0].y`; the second vertex of each pair contributes
/// only x and UV.
fn trapezoid<P: Paint>(
    target: &DrawTarget,
    rows: Rows,
    paint: &P,
    top: [Vertex; 2],
    bottom: [Vertex; 2],
    uv: bool,
) {
    let (y0, y1) = (top[0].y, bottom[0].y);
    if y1 <= y0 {
        return;
    }
    let clip = target.clip;
    let iy0 = span_start(y0).max(clip.y);
    let iy1 = span_start(y1).min(clip.bottom());
    if iy0 >= iy1 {
        return;
    }
    let width = target.store.width() as usize;
    let height = y1 - y0;

    for y in rows.iter(iy0, iy1) {
        let f = (y as f32 + 0.5 - y0) / height;
        let mut a = top[0].lerp(bottom[0], f);
        let mut b = top[1].lerp(bottom[1], f);
        if a.x > b.x {
            std::mem::swap(&mut a, &mut b);
        }
        let ix0 = span_start(a.x).max(clip.x);
        let ix1 = span_start(b.x).min(clip.right());
        if ix0 >= ix1 {
            continue;
        }
        let span = b.x - a.x;
        let row = y as usize * width;
        for x in ix0..ix1 {
            let (u, v) = if P::USES_UV && uv {
                let s = (x as f32 + 0.5 - a.x) / span;
                (lerpf(a.u, b.u, s), lerpf(a.v, b.v, s))
            } else {
                (0.0, 0.0)
            };
            paint.paint(&target.store, row + x as usize, x, y, u, v);
        }
    }
}

fn triangle<P: Paint>(target: &DrawTarget, rows: Rows, paint: &P, mut p: [Vertex; 3], uv: bool) {
    p.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [p0, p1, p2] = p;
    if p2.y <= p0.y {
        return;
    }
    // Point on the long edge level with the middle vertex.
    let split = p0.lerp(p2, (p1.y - p0.y) / (p2.y - p0.y));
    trapezoid(target, rows, paint, [p0, p0], [p1, split], uv);
    trapezoid(target, rows, paint, [p1, split], [p2, p2], uv);
}

fn quad<P: Paint>(target: &DrawTarget, rows: Rows, paint: &P, p: [Vertex; 4], uv: bool) {
    let dist = |a: Vertex, b: Vertex| (a.x - b.x).powi(2) + (a.y - b.y).powi(2);
    if dist(p[0], p[2]) <= dist(p[1], p[3]) {
        triangle(target, rows, paint, [p[0], p[1], p[2]], uv);
        triangle(target, rows, paint, [p[0], p[2], p[3]], uv);
    } else {
        triangle(target, rows, paint, [p[0], p[1], p[3]], uv);
        triangle(target, rows, paint, [p[1], p[2], p[3]], uv);
    }
}

pub fn unshaded_tri(target: &DrawTarget, rows: Rows, color: Color, tri: Trif) {
    let p = vertices3(tri, None);
    with_fill!(&target.store, color, |paint| triangle(target, rows, paint, p, false));
}

pub fn shaded_tri(target: &DrawTarget, rows: Rows, shading: &Shading<'_>, tri: Trif, uvs: Trif) {
    let paint = ShadedPaint::new(shading, &target.store);
    let uv = !shading.plan.ignore_uvs;
    triangle(target, rows, &paint, vertices3(tri, Some(uvs)), uv);
}

pub fn unshaded_quad(target: &DrawTarget, rows: Rows, color: Color, q: Quadf) {
    let p = vertices4(q, None);
    with_fill!(&target.store, color, |paint| quad(target, rows, paint, p, false));
}

pub fn shaded_quad(target: &DrawTarget, rows: Rows, shading: &Shading<'_>, q: Quadf, uvs: Quadf) {
    let paint = ShadedPaint::new(shading, &target.store);
    let uv = !shading.plan.ignore_uvs;
    quad(target, rows, &paint, vertices4(q, Some(uvs)), uv);
}

#[cfg(test)]
#[path = "../../tests/unit/raster/tzoid.rs"]
mod tests;
