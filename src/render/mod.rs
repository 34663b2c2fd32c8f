//! Render engines and the dispatch context that feeds them.

pub mod context;
pub mod sync;
pub mod task;
pub mod worker;

use std::sync::Arc;

use crate::buffer::PixelStore;
use crate::color::Color;
use crate::foundation::core::{Linef, Quadf, Rectf, Trif};
use crate::foundation::error::RasterResult;
use crate::raster::{DrawTarget, GlyphBitmap};

pub use context::RenderContext;
pub use sync::SyncEngine;
pub use task::{DrawTask, ShadeJob};
pub use worker::{AsyncEngine, AsyncEngineOpts};

/// Executes primitives that dispatch has already transformed, validated and dirty-marked.
///
/// An engine only has to say how it runs a [`DrawTask`]; the primitive methods package their
/// arguments into tasks. Engines may defer work, so anything that reads pixels back must call
/// [`RenderEngine::join`] first.
pub trait RenderEngine: Send {
    fn name(&self) -> &'static str;

    /// Whether dispatch should track dirty rectangles for this engine.
    fn implicit_dirty(&self) -> bool {
        true
    }

    fn init(&mut self) -> RasterResult<()> {
        Ok(())
    }

    /// Finish outstanding work and release resources; the engine may be initialized again.
    fn deinit(&mut self) {}

    fn submit(&mut self, task: DrawTask);

    /// Block until every submitted primitive has been drawn.
    fn join(&mut self);

    fn unshaded_line(&mut self, target: DrawTarget, color: Color, line: Linef) {
        self.submit(DrawTask::Line {
            target,
            color,
            line,
        });
    }

    fn shaded_line(&mut self, target: DrawTarget, job: ShadeJob, line: Linef, uvs: Linef) {
        self.submit(DrawTask::ShadedLine {
            target,
            job,
            line,
            uvs,
        });
    }

    fn unshaded_rect(&mut self, target: DrawTarget, color: Color, rect: Rectf) {
        self.submit(DrawTask::Rect {
            target,
            color,
            rect,
        });
    }

    fn shaded_rect(&mut self, target: DrawTarget, job: ShadeJob, rect: Rectf, uvs: Quadf) {
        self.submit(DrawTask::ShadedRect {
            target,
            job,
            rect,
            uvs,
        });
    }

    fn unshaded_quad(&mut self, target: DrawTarget, color: Color, quad: Quadf) {
        self.submit(DrawTask::Quad {
            target,
            color,
            quad,
        });
    }

    fn shaded_quad(&mut self, target: DrawTarget, job: ShadeJob, quad: Quadf, uvs: Quadf) {
        self.submit(DrawTask::ShadedQuad {
            target,
            job,
            quad,
            uvs,
        });
    }

    fn unshaded_tri(&mut self, target: DrawTarget, color: Color, tri: Trif) {
        self.submit(DrawTask::Tri { target, color, tri });
    }

    fn shaded_tri(&mut self, target: DrawTarget, job: ShadeJob, tri: Trif, uvs: Trif) {
        self.submit(DrawTask::ShadedTri {
            target,
            job,
            tri,
            uvs,
        });
    }

    fn sprite(&mut self, target: DrawTarget, top: Arc<PixelStore>, x: i32, y: i32) {
        self.submit(DrawTask::Sprite { target, top, x, y });
    }

    fn blit(&mut self, target: DrawTarget, top: Arc<PixelStore>, x: i32, y: i32) {
        self.submit(DrawTask::Blit { target, top, x, y });
    }

    fn blit_raw(&mut self, target: DrawTarget, image: Arc<PixelStore>, x: i32, y: i32) {
        self.submit(DrawTask::BlitRaw {
            target,
            image,
            x,
            y,
        });
    }

    fn blit_char(
        &mut self,
        target: DrawTarget,
        glyph: GlyphBitmap,
        color: Color,
        x: i32,
        y: i32,
        scale: u32,
    ) {
        self.submit(DrawTask::BlitChar {
            target,
            glyph,
            color,
            x,
            y,
            scale,
        });
    }
}

/// Built-in engines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Draw on the calling thread.
    #[default]
    Sync,
    /// Draw on background workers.
    Async,
}

/// Settings shared by the built-in engines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineOpts {
    pub async_engine: AsyncEngineOpts,
}

impl EngineOpts {
    pub fn from_env() -> Self {
        Self {
            async_engine: AsyncEngineOpts::from_env(),
        }
    }
}

/// Create a built-in engine; it is initialized when installed in a [`RenderContext`].
pub fn create_engine(kind: EngineKind, opts: &EngineOpts) -> Box<dyn RenderEngine> {
    match kind {
        EngineKind::Sync => Box::new(SyncEngine::new()),
        EngineKind::Async => Box::new(AsyncEngine::new(opts.async_engine.clone())),
    }
}
