//! Shapes assembled from the core primitives: arcs and circles as triangle fans, outlines as
//! lines, thick lines as quads and rounded rectangles as arcs plus rectangles.
//!
//! Every `draw_*`/`shade_*`/`outline_*` method works in user space and goes through the
//! transform; the `simple_*` forms take device coordinates.

use std::f32::consts::{PI, TAU};

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::foundation::core::{Linef, Quadf, Rectf, Trif, Vec2f, ensure_finite};
use crate::foundation::error::{RasterResult, track};
use crate::render::context::map_tri;
use crate::render::{RenderContext, ShadeJob};
use crate::shader::Shader;

/// A circular arc around `(x, y)`, angles in radians, counter-clockwise on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Arcf {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub a0: f32,
    pub a1: f32,
}

impl Arcf {
    pub const fn new(x: f32, y: f32, r: f32, a0: f32, a1: f32) -> Self {
        Self { x, y, r, a0, a1 }
    }

    pub const fn circle(x: f32, y: f32, r: f32) -> Self {
        Self::new(x, y, r, 0.0, TAU)
    }

    pub fn is_finite(self) -> bool {
        [self.x, self.y, self.r, self.a0, self.a1]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Angles wrapped so `a0` lies within one turn and `a0 <= a1 <= a0 + TAU`.
    fn span(self) -> (f32, f32) {
        let start = self.a0 % TAU;
        let (mut a0, mut a1) = (start, self.a1 + (start - self.a0));
        if a1 < a0 {
            std::mem::swap(&mut a0, &mut a1);
        }
        if a1 - a0 > TAU {
            (0.0, TAU)
        } else {
            (a0, a1)
        }
    }

    /// Points along the arc; y is flipped so positive angles turn upwards on screen.
    fn points(self, divisions: usize) -> Vec<Vec2f> {
        let (a0, a1) = self.span();
        let step = (a1 - a0) / divisions as f32;
        (0..=divisions)
            .map(|i| {
                let unit = unit_at(a0 + step * i as f32);
                Vec2f::new(self.x + unit.x * self.r, self.y + unit.y * self.r)
            })
            .collect()
    }
}

fn unit_at(angle: f32) -> Vec2f {
    Vec2f::new(angle.cos(), -angle.sin())
}

/// Segments for an arc whose radius appears as `radius` pixels on screen.
fn arc_divisions(radius: f32, a0: f32, a1: f32) -> usize {
    let per_half_turn = if radius > 30.0 {
        24.0
    } else if radius > 7.0 {
        16.0
    } else {
        8.0
    };
    (((a1 - a0) / PI * per_half_turn) as usize).max(1)
}

/// Texture coordinate of a unit-circle point inside the UV quad.
fn quad_lerp(uvs: Quadf, unit: Vec2f) -> Vec2f {
    let u = unit.x * 0.5 + 0.5;
    let v = unit.y * 0.5 + 0.5;
    let top = Vec2f::new(uvs.x0 + (uvs.x1 - uvs.x0) * u, uvs.y0 + (uvs.y1 - uvs.y0) * u);
    let bottom = Vec2f::new(uvs.x3 + (uvs.x2 - uvs.x3) * u, uvs.y3 + (uvs.y2 - uvs.y3) * u);
    Vec2f::new(top.x + (bottom.x - top.x) * v, top.y + (bottom.y - top.y) * v)
}

/// Whether coordinates still need the buffer's transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Space {
    User,
    Device,
}

impl RenderContext {
    // Arcs and circles.

    pub fn draw_arc(&mut self, buf: &mut PixelBuffer, color: Color, arc: Arcf) -> RasterResult<()> {
        track(self.arc(buf, color, arc, Space::User))
    }

    pub fn simple_arc(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        arc: Arcf,
    ) -> RasterResult<()> {
        track(self.arc(buf, color, arc, Space::Device))
    }

    pub fn draw_circle(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        center: Vec2f,
        r: f32,
    ) -> RasterResult<()> {
        self.draw_arc(buf, color, Arcf::circle(center.x, center.y, r))
    }

    pub fn simple_circle(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        center: Vec2f,
        r: f32,
    ) -> RasterResult<()> {
        self.simple_arc(buf, color, Arcf::circle(center.x, center.y, r))
    }

    /// Shaded arc; the UV quad maps onto the arc's bounding square.
    pub fn shade_arc(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        arc: Arcf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        track(self.shaded_arc(buf, color, shader, arc, uvs))
    }

    pub fn shade_circle(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        center: Vec2f,
        r: f32,
    ) -> RasterResult<()> {
        self.shade_arc(buf, color, shader, Arcf::circle(center.x, center.y, r), None)
    }

    pub fn outline_arc(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        arc: Arcf,
    ) -> RasterResult<()> {
        track(self.arc_outline(buf, color, arc))
    }

    pub fn outline_circle(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        center: Vec2f,
        r: f32,
    ) -> RasterResult<()> {
        self.outline_arc(buf, color, Arcf::circle(center.x, center.y, r))
    }

    fn divisions(&self, buf: &PixelBuffer, arc: Arcf, space: Space) -> usize {
        let (a0, a1) = arc.span();
        let scale = match space {
            Space::User => {
                let [a, b, c, d, _, _] = buf.transform().as_coeffs();
                (a.hypot(b) * c.hypot(d)) as f32
            }
            Space::Device => 1.0,
        };
        arc_divisions(arc.r.abs() * scale, a0, a1)
    }

    fn arc(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        arc: Arcf,
        space: Space,
    ) -> RasterResult<()> {
        ensure_finite(arc.is_finite(), "arc")?;
        let center = Vec2f::new(arc.x, arc.y);
        let points = arc.points(self.divisions(buf, arc, space));
        for pair in points.windows(2) {
            let tri = Trif::from_points([center, pair[0], pair[1]]);
            match space {
                Space::User => self.draw_tri(buf, color, tri)?,
                Space::Device => self.simple_tri(buf, color, tri)?,
            }
        }
        Ok(())
    }

    fn shaded_arc(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        arc: Arcf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        let uvs = uvs.unwrap_or(Quadf::DEFAULT_UVS);
        ensure_finite(arc.is_finite() && uvs.is_finite(), "arc")?;
        // One plan serves every segment.
        let Some(job) = ShadeJob::plan(shader, &buf.target(), color) else {
            return Ok(());
        };
        let center = Vec2f::new(arc.x, arc.y);
        let center_uv = Vec2f::new(
            (uvs.x0 + uvs.x1 + uvs.x2 + uvs.x3) * 0.25,
            (uvs.y0 + uvs.y1 + uvs.y2 + uvs.y3) * 0.25,
        );
        let divisions = self.divisions(buf, arc, Space::User);
        let (a0, a1) = arc.span();
        let step = (a1 - a0) / divisions as f32;
        for i in 0..divisions {
            let from = unit_at(a0 + step * i as f32);
            let to = unit_at(a0 + step * (i + 1) as f32);
            let on_arc = |u: Vec2f| Vec2f::new(arc.x + u.x * arc.r, arc.y + u.y * arc.r);
            let tri = Trif::from_points([center, on_arc(from), on_arc(to)]);
            let tri_uvs = Trif::from_points([center_uv, quad_lerp(uvs, from), quad_lerp(uvs, to)]);
            let tri = map_tri(buf, tri);
            ensure_finite(tri.is_finite() && tri_uvs.is_finite(), "arc")?;
            self.planned_tri(buf, job.clone(), tri, tri_uvs);
        }
        Ok(())
    }

    fn arc_outline(&mut self, buf: &mut PixelBuffer, color: Color, arc: Arcf) -> RasterResult<()> {
        ensure_finite(arc.is_finite(), "arc")?;
        let points = arc.points(self.divisions(buf, arc, Space::User));
        for pair in points.windows(2) {
            let line = Linef::new(pair[0].x, pair[0].y, pair[1].x, pair[1].y);
            self.draw_line(buf, color, line)?;
        }
        Ok(())
    }

    // Outlines.

    pub fn outline_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
    ) -> RasterResult<()> {
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
        track(ensure_finite(rect.is_finite(), "rect").and_then(|()| {
            self.polyline(buf, color, &[
                Vec2f::new(x0, y0),
                Vec2f::new(x1, y0),
                Vec2f::new(x1, y1),
                Vec2f::new(x0, y1),
            ])
        }))
    }

    pub fn outline_tri(&mut self, buf: &mut PixelBuffer, color: Color, tri: Trif) -> RasterResult<()> {
        track(
            ensure_finite(tri.is_finite(), "triangle")
                .and_then(|()| self.polyline(buf, color, &tri.points())),
        )
    }

    pub fn outline_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        quad: Quadf,
    ) -> RasterResult<()> {
        track(
            ensure_finite(quad.is_finite(), "quad")
                .and_then(|()| self.polyline(buf, color, &quad.points())),
        )
    }

    /// Closed outline through `points`.
    fn polyline(&mut self, buf: &mut PixelBuffer, color: Color, points: &[Vec2f]) -> RasterResult<()> {
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.draw_line(buf, color, Linef::new(a.x, a.y, b.x, b.y))?;
        }
        Ok(())
    }

    // Thick lines.

    /// Line drawn as a quad `thickness` pixels wide, centered on the line.
    pub fn draw_thick_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        line: Linef,
        thickness: f32,
    ) -> RasterResult<()> {
        track(self.thick_line(buf, color, line, thickness))
    }

    fn thick_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        line: Linef,
        thickness: f32,
    ) -> RasterResult<()> {
        ensure_finite(line.is_finite() && thickness.is_finite(), "line")?;
        let (dx, dy) = (line.x1 - line.x0, line.y1 - line.y0);
        let len = dx.hypot(dy);
        if len == 0.0 {
            return Ok(());
        }
        let half = thickness * 0.5 / len;
        let (tx, ty) = (-dy * half, dx * half);
        let quad = Quadf::new(
            line.x0 + tx,
            line.y0 + ty,
            line.x1 + tx,
            line.y1 + ty,
            line.x1 - tx,
            line.y1 - ty,
            line.x0 - tx,
            line.y0 - ty,
        );
        self.draw_quad(buf, color, quad)
    }

    // Rounded rectangles.

    pub fn draw_round_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
        radius: f32,
    ) -> RasterResult<()> {
        track(self.round_rect(buf, color, rect, radius))
    }

    pub fn outline_round_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
        radius: f32,
    ) -> RasterResult<()> {
        track(self.round_rect_outline(buf, color, rect, radius))
    }

    fn round_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
        radius: f32,
    ) -> RasterResult<()> {
        ensure_finite(rect.is_finite() && radius.is_finite(), "rounded rect")?;
        if radius <= 0.0 {
            return self.draw_rect(buf, color, rect);
        }
        if rect.w == rect.h && radius >= rect.w {
            let half = rect.w * 0.5;
            return self.draw_arc(buf, color, Arcf::circle(rect.x + half, rect.y + half, half));
        }
        let Rectf { x, y, w, h } = rect.normalized();
        let r = radius.min(w * 0.5).min(h * 0.5);
        for arc in corner_arcs(Rectf::new(x, y, w, h), r) {
            self.draw_arc(buf, color, arc)?;
        }
        if w > 2.0 * r {
            self.draw_rect(buf, color, Rectf::new(x + r, y, w - 2.0 * r, r))?;
            self.draw_rect(buf, color, Rectf::new(x + r, y + h - r, w - 2.0 * r, r))?;
        }
        if h > 2.0 * r {
            self.draw_rect(buf, color, Rectf::new(x, y + r, w, h - 2.0 * r))?;
        }
        Ok(())
    }

    fn round_rect_outline(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
        radius: f32,
    ) -> RasterResult<()> {
        ensure_finite(rect.is_finite() && radius.is_finite(), "rounded rect")?;
        if radius <= 0.0 {
            return self.outline_rect(buf, color, rect);
        }
        if rect.w == rect.h && radius >= rect.w {
            let half = rect.w * 0.5;
            return self.outline_arc(buf, color, Arcf::circle(rect.x + half, rect.y + half, half));
        }
        let Rectf { x, y, w, h } = rect.normalized();
        let r = radius.min(w * 0.5).min(h * 0.5);
        for arc in corner_arcs(Rectf::new(x, y, w, h), r) {
            self.arc_outline(buf, color, arc)?;
        }
        let edges = [
            Linef::new(x + r, y, x + w - r, y),
            Linef::new(x + r, y + h, x + w - r, y + h),
            Linef::new(x, y + r, x, y + h - r),
            Linef::new(x + w, y + r, x + w, y + h - r),
        ];
        for edge in edges {
            self.draw_line(buf, color, edge)?;
        }
        Ok(())
    }
}

/// Quarter arcs for the corners of a normalized rect, clockwise from the top-left.
fn corner_arcs(rect: Rectf, r: f32) -> [Arcf; 4] {
    let Rectf { x, y, w, h } = rect;
    [
        Arcf::new(x + r, y + r, r, PI * 0.5, PI),
        Arcf::new(x + w - r, y + r, r, 0.0, PI * 0.5),
        Arcf::new(x + w - r, y + h - r, r, -PI * 0.5, 0.0),
        Arcf::new(x + r, y + h - r, r, PI, PI * 1.5),
    ]
}

#[cfg(test)]
#[path = "../tests/unit/shapes.rs"]
mod tests;
