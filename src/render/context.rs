//! The draw API: transforms shapes, records dirty areas and hands primitives to the engine.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::{PixelBuffer, PixelStore};
use crate::color::{self, Color};
use crate::foundation::core::{Linef, Quadf, Rectf, Recti, Trif, Vec2f, ensure_finite};
use crate::foundation::error::{RasterResult, track};
use crate::raster::rect::covered;
use crate::raster::{GlyphBitmap, span_start};
use crate::render::{EngineKind, EngineOpts, RenderEngine, ShadeJob, SyncEngine, create_engine};
use crate::shader::Shader;

/// Owns the active engine and routes every draw call through it.
///
/// Engines may draw in the background: call [`RenderContext::join`] before reading pixels,
/// writing them directly or changing a buffer's format.
pub struct RenderContext {
    engine: Box<dyn RenderEngine>,
    implicit_dirty: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::sync()
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("engine", &self.engine.name())
            .field("implicit_dirty", &self.implicit_dirty)
            .finish()
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.engine.deinit();
    }
}

impl RenderContext {
    pub fn sync() -> Self {
        Self {
            engine: Box::new(SyncEngine::new()),
            implicit_dirty: true,
        }
    }

    /// Initialize `engine` and make it the active one.
    pub fn new(mut engine: Box<dyn RenderEngine>) -> RasterResult<Self> {
        track(engine.init())?;
        let implicit_dirty = engine.implicit_dirty();
        Ok(Self {
            engine,
            implicit_dirty,
        })
    }

    pub fn with_kind(kind: EngineKind, opts: &EngineOpts) -> RasterResult<Self> {
        Self::new(create_engine(kind, opts))
    }

    /// Finish and deinitialize the active engine, then install `engine`.
    ///
    /// When `engine` fails to initialize the previous engine is brought back up and stays
    /// active.
    pub fn set_engine(&mut self, mut engine: Box<dyn RenderEngine>) -> RasterResult<()> {
        self.engine.deinit();
        if let Err(err) = engine.init() {
            if let Err(again) = self.engine.init() {
                warn!(
                    engine = self.engine.name(),
                    error = %again,
                    "could not restart render engine"
                );
            }
            return track(Err(err));
        }
        debug!(from = self.engine.name(), to = engine.name(), "render engine swapped");
        self.implicit_dirty = engine.implicit_dirty();
        // The old engine was deinitialized above; dropping it only frees it.
        self.engine = engine;
        track(Ok(()))
    }

    pub fn engine(&self) -> &dyn RenderEngine {
        self.engine.as_ref()
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn implicit_dirty(&self) -> bool {
        self.implicit_dirty
    }

    /// Wait for every queued draw to land.
    pub fn join(&mut self) {
        self.engine.join();
    }

    /// Fill the whole buffer, ignoring the clip rectangle.
    pub fn background(&mut self, buf: &mut PixelBuffer, color: Color) {
        self.engine.join();
        buf.background(color);
    }

    // Dirty bookkeeping.

    fn dirty_points(&self, buf: &mut PixelBuffer, points: &[Vec2f]) {
        let clip = buf.get_clip();
        if !self.implicit_dirty || clip.is_empty() {
            return;
        }
        for p in points {
            let x = (p.x.floor() as i32).clamp(clip.x, clip.right() - 1);
            let y = (p.y.floor() as i32).clamp(clip.y, clip.bottom() - 1);
            buf.mark_dirty1(x, y);
        }
    }

    fn dirty_area(&self, buf: &mut PixelBuffer, area: Recti) {
        if !self.implicit_dirty {
            return;
        }
        let area = area.intersect(buf.get_clip());
        buf.mark_dirty2(area.x, area.y, area.w, area.h);
    }

    // Lines.

    /// Line from `(x0, y0)` to `(x1, y1)`, bypassing the transform.
    pub fn simple_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        line: Linef,
    ) -> RasterResult<()> {
        track(self.line(buf, color, line))
    }

    pub fn draw_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        line: Linef,
    ) -> RasterResult<()> {
        track(ensure_finite(line.is_finite(), "line").and_then(|()| {
            let line = map_line(buf, line);
            self.line(buf, color, line)
        }))
    }

    /// Shaded line; `uvs` default to [`Linef::DEFAULT_UVS`].
    pub fn shade_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        line: Linef,
        uvs: Option<Linef>,
    ) -> RasterResult<()> {
        track(ensure_finite(line.is_finite(), "line").and_then(|()| {
            let line = map_line(buf, line);
            self.shaded_line(buf, color, shader, line, uvs)
        }))
    }

    pub fn simple_shade_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        line: Linef,
        uvs: Option<Linef>,
    ) -> RasterResult<()> {
        track(self.shaded_line(buf, color, shader, line, uvs))
    }

    fn line(&mut self, buf: &mut PixelBuffer, color: Color, line: Linef) -> RasterResult<()> {
        ensure_finite(line.is_finite(), "line")?;
        if !draws(buf, color) {
            return Ok(());
        }
        self.dirty_points(buf, &line_points(line));
        self.engine.unshaded_line(buf.target(), color, line);
        Ok(())
    }

    fn shaded_line(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        line: Linef,
        uvs: Option<Linef>,
    ) -> RasterResult<()> {
        let uvs = uvs.unwrap_or(Linef::DEFAULT_UVS);
        ensure_finite(line.is_finite() && uvs.is_finite(), "line")?;
        let target = buf.target();
        let Some(job) = ShadeJob::plan(shader, &target, color) else {
            return Ok(());
        };
        self.dirty_points(buf, &line_points(line));
        self.engine.shaded_line(target, job, line, uvs);
        Ok(())
    }

    // Rectangles.

    pub fn simple_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
    ) -> RasterResult<()> {
        track(self.rect(buf, color, rect))
    }

    /// Rectangle under the current transform; rotated or skewed rectangles become quads.
    pub fn draw_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        rect: Rectf,
    ) -> RasterResult<()> {
        track(ensure_finite(rect.is_finite(), "rect").and_then(|()| {
            match map_rect(buf, rect) {
                Mapped::Rect(rect) => self.rect(buf, color, rect),
                Mapped::Quad(quad) => self.quad(buf, color, quad),
            }
        }))
    }

    /// Shaded rectangle; `uvs` default to [`Quadf::DEFAULT_UVS`].
    pub fn shade_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        rect: Rectf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        track(ensure_finite(rect.is_finite(), "rect").and_then(|()| {
            match map_rect(buf, rect) {
                Mapped::Rect(rect) => self.shaded_rect(buf, color, shader, rect, uvs),
                Mapped::Quad(quad) => self.shaded_quad(buf, color, shader, quad, uvs),
            }
        }))
    }

    pub fn simple_shade_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        rect: Rectf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        track(self.shaded_rect(buf, color, shader, rect, uvs))
    }

    fn rect(&mut self, buf: &mut PixelBuffer, color: Color, rect: Rectf) -> RasterResult<()> {
        ensure_finite(rect.is_finite(), "rect")?;
        if !draws(buf, color) {
            return Ok(());
        }
        self.dirty_area(buf, covered(rect.normalized()));
        self.engine.unshaded_rect(buf.target(), color, rect);
        Ok(())
    }

    fn shaded_rect(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        rect: Rectf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        let uvs = uvs.unwrap_or(Quadf::DEFAULT_UVS);
        ensure_finite(rect.is_finite() && uvs.is_finite(), "rect")?;
        let target = buf.target();
        let Some(job) = ShadeJob::plan(shader, &target, color) else {
            return Ok(());
        };
        self.dirty_area(buf, covered(rect.normalized()));
        self.engine.shaded_rect(target, job, rect, uvs);
        Ok(())
    }

    // Triangles.

    pub fn simple_tri(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        tri: Trif,
    ) -> RasterResult<()> {
        track(self.tri(buf, color, tri))
    }

    pub fn draw_tri(&mut self, buf: &mut PixelBuffer, color: Color, tri: Trif) -> RasterResult<()> {
        track(ensure_finite(tri.is_finite(), "triangle").and_then(|()| {
            let tri = map_tri(buf, tri);
            self.tri(buf, color, tri)
        }))
    }

    /// Shaded triangle; `uvs` default to [`Trif::DEFAULT_UVS`].
    pub fn shade_tri(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        tri: Trif,
        uvs: Option<Trif>,
    ) -> RasterResult<()> {
        track(ensure_finite(tri.is_finite(), "triangle").and_then(|()| {
            let tri = map_tri(buf, tri);
            self.shaded_tri(buf, color, shader, tri, uvs)
        }))
    }

    pub fn simple_shade_tri(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        tri: Trif,
        uvs: Option<Trif>,
    ) -> RasterResult<()> {
        track(self.shaded_tri(buf, color, shader, tri, uvs))
    }

    pub(crate) fn tri(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        tri: Trif,
    ) -> RasterResult<()> {
        ensure_finite(tri.is_finite(), "triangle")?;
        if !draws(buf, color) {
            return Ok(());
        }
        self.dirty_points(buf, &tri.points());
        self.engine.unshaded_tri(buf.target(), color, tri);
        Ok(())
    }

    fn shaded_tri(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        tri: Trif,
        uvs: Option<Trif>,
    ) -> RasterResult<()> {
        let uvs = uvs.unwrap_or(Trif::DEFAULT_UVS);
        ensure_finite(tri.is_finite() && uvs.is_finite(), "triangle")?;
        let Some(job) = ShadeJob::plan(shader, &buf.target(), color) else {
            return Ok(());
        };
        self.planned_tri(buf, job, tri, uvs);
        Ok(())
    }

    /// Device-space triangle whose shader plan is already made.
    pub(crate) fn planned_tri(
        &mut self,
        buf: &mut PixelBuffer,
        job: ShadeJob,
        tri: Trif,
        uvs: Trif,
    ) {
        self.dirty_points(buf, &tri.points());
        self.engine.shaded_tri(buf.target(), job, tri, uvs);
    }

    // Quads.

    pub fn simple_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        quad: Quadf,
    ) -> RasterResult<()> {
        track(self.quad(buf, color, quad))
    }

    pub fn draw_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        quad: Quadf,
    ) -> RasterResult<()> {
        track(ensure_finite(quad.is_finite(), "quad").and_then(|()| {
            let quad = map_quad(buf, quad);
            self.quad(buf, color, quad)
        }))
    }

    /// Shaded quad; `uvs` default to [`Quadf::DEFAULT_UVS`].
    pub fn shade_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        quad: Quadf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        track(ensure_finite(quad.is_finite(), "quad").and_then(|()| {
            let quad = map_quad(buf, quad);
            self.shaded_quad(buf, color, shader, quad, uvs)
        }))
    }

    pub fn simple_shade_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        quad: Quadf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        track(self.shaded_quad(buf, color, shader, quad, uvs))
    }

    pub(crate) fn quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        quad: Quadf,
    ) -> RasterResult<()> {
        ensure_finite(quad.is_finite(), "quad")?;
        if !draws(buf, color) {
            return Ok(());
        }
        self.dirty_points(buf, &quad.points());
        self.engine.unshaded_quad(buf.target(), color, quad);
        Ok(())
    }

    pub(crate) fn shaded_quad(
        &mut self,
        buf: &mut PixelBuffer,
        color: Color,
        shader: &Shader,
        quad: Quadf,
        uvs: Option<Quadf>,
    ) -> RasterResult<()> {
        let uvs = uvs.unwrap_or(Quadf::DEFAULT_UVS);
        ensure_finite(quad.is_finite() && uvs.is_finite(), "quad")?;
        let target = buf.target();
        let Some(job) = ShadeJob::plan(shader, &target, color) else {
            return Ok(());
        };
        self.dirty_points(buf, &quad.points());
        self.engine.shaded_quad(target, job, quad, uvs);
        Ok(())
    }

    // Images.

    /// Alpha-composite `top` with its top-left corner at `(x, y)`.
    ///
    /// Under a rotating or scaling transform the image is drawn as a textured quad.
    pub fn draw_sprite(
        &mut self,
        buf: &mut PixelBuffer,
        top: &PixelBuffer,
        x: f32,
        y: f32,
    ) -> RasterResult<()> {
        track(self.image(buf, top, x, y, false))
    }

    /// Overwrite the area under `top` with its pixels, converting as needed.
    pub fn blit(
        &mut self,
        buf: &mut PixelBuffer,
        top: &PixelBuffer,
        x: f32,
        y: f32,
    ) -> RasterResult<()> {
        track(self.image(buf, top, x, y, true))
    }

    fn image(
        &mut self,
        buf: &mut PixelBuffer,
        top: &PixelBuffer,
        x: f32,
        y: f32,
        overwrite: bool,
    ) -> RasterResult<()> {
        ensure_finite(x.is_finite() && y.is_finite(), "image position")?;
        let rect = Rectf::new(x, y, top.width() as f32, top.height() as f32);
        if !buf.stack().is_translation() {
            let shader = if overwrite {
                Shader::texture_overwrite(top)
            } else {
                Shader::texture(top)
            };
            let quad = map_quad(buf, rect_quad(rect));
            return self.shaded_quad(buf, color::WHITE, &shader, quad, None);
        }
        let origin = buf.stack().apply_to(Vec2f::new(x, y));
        ensure_finite(origin.x.is_finite() && origin.y.is_finite(), "image position")?;
        let (x, y) = (span_start(origin.x), span_start(origin.y));
        self.dirty_area(buf, Recti::new(x, y, top.width() as i32, top.height() as i32));
        let store = Arc::clone(top.store());
        if overwrite {
            self.engine.blit(buf.target(), store, x, y);
        } else {
            self.engine.sprite(buf.target(), store, x, y);
        }
        Ok(())
    }

    /// Copy an unmanaged image, stored in this buffer's format and byte order, to `(x, y)`.
    ///
    /// Only the translation part of the transform applies.
    pub fn blit_raw(
        &mut self,
        buf: &mut PixelBuffer,
        bytes: &[u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
    ) -> RasterResult<()> {
        track(self.raw(buf, bytes, width, height, x, y))
    }

    fn raw(
        &mut self,
        buf: &mut PixelBuffer,
        bytes: &[u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
    ) -> RasterResult<()> {
        ensure_finite(x.is_finite() && y.is_finite(), "image position")?;
        let mut image = PixelStore::from_bytes(buf.format(), width, height, bytes)?;
        image.assume_reversed(buf.reversed());
        let [.., tx, ty] = buf.transform().as_coeffs();
        let (x, y) = (span_start(x + tx as f32), span_start(y + ty as f32));
        self.dirty_area(buf, Recti::new(x, y, width as i32, height as i32));
        self.engine.blit_raw(buf.target(), Arc::new(image), x, y);
        Ok(())
    }

    /// Draw one glyph bitmap scaled by an integer factor, untransformed.
    pub(crate) fn glyph(
        &mut self,
        buf: &mut PixelBuffer,
        glyph: GlyphBitmap,
        color: Color,
        x: i32,
        y: i32,
        scale: u32,
    ) {
        if !draws(buf, color) {
            return;
        }
        let scale = scale.max(1);
        let w = i32::try_from(glyph.width.saturating_mul(scale)).unwrap_or(i32::MAX);
        let h = i32::try_from(glyph.height.saturating_mul(scale)).unwrap_or(i32::MAX);
        self.dirty_area(buf, Recti::new(x, y, w, h));
        self.engine.blit_char(buf.target(), glyph, color, x, y, scale);
    }
}

/// Whether an unshaded draw of `color` can change `buf` at all.
pub(crate) fn draws(buf: &PixelBuffer, color: Color) -> bool {
    if buf.is_palette() {
        (color as usize) < buf.palette().len()
    } else {
        color::alpha(color) != 0
    }
}

fn line_points(line: Linef) -> [Vec2f; 2] {
    [Vec2f::new(line.x0, line.y0), Vec2f::new(line.x1, line.y1)]
}

fn map_line(buf: &PixelBuffer, line: Linef) -> Linef {
    let [a, b] = line_points(line).map(|p| buf.stack().apply_to(p));
    Linef::new(a.x, a.y, b.x, b.y)
}

pub(crate) fn map_tri(buf: &PixelBuffer, tri: Trif) -> Trif {
    Trif::from_points(tri.points().map(|p| buf.stack().apply_to(p)))
}

fn map_quad(buf: &PixelBuffer, quad: Quadf) -> Quadf {
    Quadf::from_points(quad.points().map(|p| buf.stack().apply_to(p)))
}

pub(crate) fn rect_quad(rect: Rectf) -> Quadf {
    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
    Quadf::new(x0, y0, x1, y0, x1, y1, x0, y1)
}

enum Mapped {
    Rect(Rectf),
    Quad(Quadf),
}

fn map_rect(buf: &PixelBuffer, rect: Rectf) -> Mapped {
    let stack = buf.stack();
    if stack.is_identity() {
        return Mapped::Rect(rect);
    }
    if stack.is_translation() {
        let origin = stack.apply_to(Vec2f::new(rect.x, rect.y));
        return Mapped::Rect(Rectf::new(origin.x, origin.y, rect.w, rect.h));
    }
    Mapped::Quad(map_quad(buf, rect_quad(rect)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
