use std::sync::Arc;

use crate::buffer::PixelStore;
use crate::color::Color;
use crate::foundation::core::{Linef, Quadf, Rectf, Trif};
use crate::raster::{self, DrawTarget, GlyphBitmap, Rows};
use crate::shader::{ShadePlan, Shader, Shading, plan_shade};

/// A shader, its tint and the plan decided for it when the draw was submitted.
#[derive(Clone, Debug)]
pub struct ShadeJob {
    shader: Shader,
    tint: Color,
    plan: ShadePlan,
}

impl ShadeJob {
    /// `None` when the draw would leave every pixel unchanged.
    pub fn plan(shader: &Shader, target: &DrawTarget, tint: Color) -> Option<Self> {
        plan_shade(shader, &target.store, tint).map(|plan| Self {
            shader: shader.clone(),
            tint,
            plan,
        })
    }

    fn shading(&self) -> Shading<'_> {
        Shading::with_plan(&self.shader, self.tint, self.plan)
    }
}

/// One primitive with everything it needs to be drawn later, on any thread.
#[derive(Clone, Debug)]
pub enum DrawTask {
    Line {
        target: DrawTarget,
        color: Color,
        line: Linef,
    },
    ShadedLine {
        target: DrawTarget,
        job: ShadeJob,
        line: Linef,
        uvs: Linef,
    },
    Rect {
        target: DrawTarget,
        color: Color,
        rect: Rectf,
    },
    ShadedRect {
        target: DrawTarget,
        job: ShadeJob,
        rect: Rectf,
        uvs: Quadf,
    },
    Quad {
        target: DrawTarget,
        color: Color,
        quad: Quadf,
    },
    ShadedQuad {
        target: DrawTarget,
        job: ShadeJob,
        quad: Quadf,
        uvs: Quadf,
    },
    Tri {
        target: DrawTarget,
        color: Color,
        tri: Trif,
    },
    ShadedTri {
        target: DrawTarget,
        job: ShadeJob,
        tri: Trif,
        uvs: Trif,
    },
    Sprite {
        target: DrawTarget,
        top: Arc<PixelStore>,
        x: i32,
        y: i32,
    },
    Blit {
        target: DrawTarget,
        top: Arc<PixelStore>,
        x: i32,
        y: i32,
    },
    BlitRaw {
        target: DrawTarget,
        image: Arc<PixelStore>,
        x: i32,
        y: i32,
    },
    BlitChar {
        target: DrawTarget,
        glyph: GlyphBitmap,
        color: Color,
        x: i32,
        y: i32,
        scale: u32,
    },
}

impl DrawTask {
    pub fn name(&self) -> &'static str {
        match self {
            DrawTask::Line { .. } => "line",
            DrawTask::ShadedLine { .. } => "shaded_line",
            DrawTask::Rect { .. } => "rect",
            DrawTask::ShadedRect { .. } => "shaded_rect",
            DrawTask::Quad { .. } => "quad",
            DrawTask::ShadedQuad { .. } => "shaded_quad",
            DrawTask::Tri { .. } => "tri",
            DrawTask::ShadedTri { .. } => "shaded_tri",
            DrawTask::Sprite { .. } => "sprite",
            DrawTask::Blit { .. } => "blit",
            DrawTask::BlitRaw { .. } => "blit_raw",
            DrawTask::BlitChar { .. } => "blit_char",
        }
    }

    /// Draw the rows selected by `rows`.
    pub fn run(&self, rows: Rows) {
        match self {
            DrawTask::Line {
                target,
                color,
                line,
            } => raster::line::unshaded_line(target, rows, *color, *line),
            DrawTask::ShadedLine {
                target,
                job,
                line,
                uvs,
            } => raster::line::shaded_line(target, rows, &job.shading(), *line, *uvs),
            DrawTask::Rect {
                target,
                color,
                rect,
            } => raster::rect::unshaded_rect(target, rows, *color, *rect),
            DrawTask::ShadedRect {
                target,
                job,
                rect,
                uvs,
            } => raster::rect::shaded_rect(target, rows, &job.shading(), *rect, *uvs),
            DrawTask::Quad {
                target,
                color,
                quad,
            } => raster::tzoid::unshaded_quad(target, rows, *color, *quad),
            DrawTask::ShadedQuad {
                target,
                job,
                quad,
                uvs,
            } => raster::tzoid::shaded_quad(target, rows, &job.shading(), *quad, *uvs),
            DrawTask::Tri { target, color, tri } => {
                raster::tzoid::unshaded_tri(target, rows, *color, *tri)
            }
            DrawTask::ShadedTri {
                target,
                job,
                tri,
                uvs,
            } => raster::tzoid::shaded_tri(target, rows, &job.shading(), *tri, *uvs),
            DrawTask::Sprite { target, top, x, y } => {
                raster::blit::sprite(target, rows, top, *x, *y)
            }
            DrawTask::Blit { target, top, x, y } => raster::blit::blit(target, rows, top, *x, *y),
            DrawTask::BlitRaw {
                target,
                image,
                x,
                y,
            } => raster::blit::blit_raw(target, rows, image, *x, *y),
            DrawTask::BlitChar {
                target,
                glyph,
                color,
                x,
                y,
                scale,
            } => raster::blit::blit_char(target, rows, glyph, *color, *x, *y, *scale),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/task.rs"]
mod tests;
