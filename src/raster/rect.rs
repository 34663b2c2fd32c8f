use crate::color::{self, Color};
use crate::foundation::core::{Quadf, Rectf, Recti};
use crate::raster::{
    DrawTarget, Paint, Rows, ShadedPaint, UvMode, can_copy_raw, lerpf, span_start, with_fill,
};
use crate::shader::Shading;

/// Pixels covered by a normalized rectangle, before clipping.
pub(crate) fn covered(rect: Rectf) -> Recti {
    let x0 = span_start(rect.x);
    let y0 = span_start(rect.y);
    let x1 = span_start(rect.x + rect.w);
    let y1 = span_start(rect.y + rect.h);
    Recti::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
}

/// Flip negative extents, mirroring the corner UVs with them.
fn normalize(rect: Rectf, uvs: Quadf) -> (Rectf, Quadf) {
    let mut uv = uvs.points();
    if rect.w < 0.0 {
        uv.swap(0, 1);
        uv.swap(2, 3);
    }
    if rect.h < 0.0 {
        uv.swap(0, 3);
        uv.swap(1, 2);
    }
    (rect.normalized(), Quadf::from_points(uv))
}

fn uv_mode(uvs: Quadf) -> UvMode {
    if uvs.y0 == uvs.y1 && uvs.y2 == uvs.y3 && uvs.x0 == uvs.x3 && uvs.x1 == uvs.x2 {
        UvMode::Restricted
    } else {
        UvMode::Generic
    }
}

fn rect_body<P: Paint>(
    target: &DrawTarget,
    rows: Rows,
    paint: &P,
    rect: Rectf,
    uvs: Quadf,
    mode: UvMode,
) {
    let area = covered(rect).intersect(target.clip);
    if area.is_empty() {
        return;
    }
    let width = target.store.width() as usize;
    let [uv0, uv1, uv2, uv3] = uvs.points();

    for y in rows.iter(area.y, area.bottom()) {
        let t = (y as f32 + 0.5 - rect.y) / rect.h;
        let row = y as usize * width;
        for x in area.x..area.right() {
            let (u, v) = if P::USES_UV {
                let s = (x as f32 + 0.5 - rect.x) / rect.w;
                match mode {
                    UvMode::Ignore => (0.0, 0.0),
                    UvMode::Restricted => (lerpf(uv0.x, uv2.x, s), lerpf(uv0.y, uv2.y, t)),
                    UvMode::Generic => {
                        let top = (lerpf(uv0.x, uv1.x, s), lerpf(uv0.y, uv1.y, s));
                        let bottom = (lerpf(uv3.x, uv2.x, s), lerpf(uv3.y, uv2.y, s));
                        (lerpf(top.0, bottom.0, t), lerpf(top.1, bottom.1, t))
                    }
                }
            } else {
                (0.0, 0.0)
            };
            paint.paint(&target.store, row + x as usize, x, y, u, v);
        }
    }
}

pub fn unshaded_rect(target: &DrawTarget, rows: Rows, color: Color, rect: Rectf) {
    let rect = rect.normalized();
    with_fill!(&target.store, color, |paint| rect_body(
        target,
        rows,
        paint,
        rect,
        Quadf::default(),
        UvMode::Ignore
    ));
}

pub fn shaded_rect(
    target: &DrawTarget,
    rows: Rows,
    shading: &Shading<'_>,
    rect: Rectf,
    uvs: Quadf,
) {
    if copy_texture(target, rows, shading, rect, uvs) {
        return;
    }
    shaded_rect_generic(target, rows, shading, rect, uvs);
}

/// The per-pixel path, never taking the texture copy shortcut.
pub(crate) fn shaded_rect_generic(
    target: &DrawTarget,
    rows: Rows,
    shading: &Shading<'_>,
    rect: Rectf,
    uvs: Quadf,
) {
    let (rect, uvs) = normalize(rect, uvs);
    let mode = if shading.plan.ignore_uvs {
        UvMode::Ignore
    } else {
        uv_mode(uvs)
    };
    let paint = ShadedPaint::new(shading, &target.store);
    rect_body(target, rows, &paint, rect, uvs, mode);
}

/// Copy texture rows straight into the target when the shaded result is known to equal
/// them; returns whether it did.
fn copy_texture(
    target: &DrawTarget,
    rows: Rows,
    shading: &Shading<'_>,
    rect: Rectf,
    uvs: Quadf,
) -> bool {
    let Some(texture) = shading.shader.texture_store() else {
        return false;
    };
    let aligned = [rect.x, rect.y, rect.w, rect.h]
        .iter()
        .all(|v| v.fract() == 0.0);
    if shading.tint != color::WHITE
        || uvs != Quadf::DEFAULT_UVS
        || !aligned
        || rect.w != texture.width() as f32
        || rect.h != texture.height() as f32
        || !can_copy_raw(&target.store, texture)
        || (texture.format().has_alpha() && !shading.shader.alpha_promise_255)
    {
        return false;
    }

    let (x0, y0) = (rect.x as i32, rect.y as i32);
    let area = Recti::new(x0, y0, rect.w as i32, rect.h as i32).intersect(target.clip);
    if area.is_empty() {
        return true;
    }
    let count = area.w as usize;
    for y in rows.iter(area.y, area.bottom()) {
        let dst = target.store.index_of(area.x as u32, y as u32);
        let src = texture.index_of((area.x - x0) as u32, (y - y0) as u32);
        target.store.copy_values(dst, texture, src, count);
    }
    true
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rect.rs"]
mod tests;
