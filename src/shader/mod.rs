//! Per-pixel coloring: the [`ShaderProgram`] contract, [`Promise`] hints and the write plan a
//! draw call settles on before touching any pixel.

pub mod glyph;
pub mod texture;

use std::sync::Arc;

use bitflags::bitflags;

use crate::buffer::{PixelBuffer, PixelStore};
use crate::color::{self, Color};

pub use glyph::{GlyphFilter, GlyphShader};
pub use texture::{TextureFilter, TextureShader};

bitflags! {
    /// Hints a shader gives about a whole draw call, asked for once per call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Promise: u8 {
        /// Every output pixel is fully opaque.
        const OPAQUE = 1 << 0;
        /// Every output pixel is fully transparent.
        const INVISIBLE = 1 << 1;
        /// Every output pixel is either opaque or left as it was.
        const CUTOUT = Self::OPAQUE.bits() | Self::INVISIBLE.bits();
        /// The UV arguments are not used.
        const IGNORE_UVS = 1 << 2;
        /// The existing pixel is not used.
        const IGNORE_BASE = 1 << 3;
    }
}

/// A per-pixel color function.
///
/// `existing` is the destination color, or its raw index on palette buffers, or 0 when the
/// plan decided the destination need not be read. The returned color is written as is, so
/// blending with `existing` is the program's job.
pub trait ShaderProgram: Send + Sync {
    fn shade(&self, tint: Color, existing: Color, x: i32, y: i32, u: f32, v: f32) -> Color;

    fn promise(&self, _target: &PixelStore, _tint: Color) -> Promise {
        Promise::empty()
    }

    /// The texture this program samples 1:1, if any; enables raw row copies.
    fn texture(&self) -> Option<&Arc<PixelStore>> {
        None
    }
}

struct FnProgram<F>(F);

impl<F> ShaderProgram for FnProgram<F>
where
    F: Fn(Color, Color, i32, i32, f32, f32) -> Color + Send + Sync,
{
    fn shade(&self, tint: Color, existing: Color, x: i32, y: i32, u: f32, v: f32) -> Color {
        (self.0)(tint, existing, x, y, u, v)
    }
}

/// A shareable shader value: the program plus its static alpha promises.
#[derive(Clone)]
pub struct Shader {
    program: Arc<dyn ShaderProgram>,
    /// A tint with alpha 0 draws nothing.
    pub alpha_promise_0: bool,
    /// A tint with alpha 255 draws only opaque pixels.
    pub alpha_promise_255: bool,
}

impl Shader {
    pub fn new(program: impl ShaderProgram + 'static) -> Self {
        Self::from_arc(Arc::new(program))
    }

    pub fn from_arc(program: Arc<dyn ShaderProgram>) -> Self {
        Self {
            program,
            alpha_promise_0: false,
            alpha_promise_255: false,
        }
    }

    /// Wrap a closure `(tint, existing, x, y, u, v) -> color`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Color, Color, i32, i32, f32, f32) -> Color + Send + Sync + 'static,
    {
        Self::new(FnProgram(f))
    }

    pub fn with_alpha_promises(mut self, zero: bool, full: bool) -> Self {
        self.alpha_promise_0 = zero;
        self.alpha_promise_255 = full;
        self
    }

    /// Nearest-neighbour texture.
    pub fn texture(texture: &PixelBuffer) -> Self {
        Self::new(TextureShader::new(texture, TextureFilter::Nearest))
            .with_alpha_promises(true, false)
    }

    /// Bilinear texture.
    pub fn texture_aa(texture: &PixelBuffer) -> Self {
        Self::new(TextureShader::new(texture, TextureFilter::Bilinear))
            .with_alpha_promises(true, false)
    }

    /// Texture whose pixels are all opaque, so an opaque tint never needs the destination.
    pub fn texture_opaque(texture: &PixelBuffer, filter: TextureFilter) -> Self {
        Self::new(TextureShader::new(texture, filter)).with_alpha_promises(true, true)
    }

    /// Texture written over the destination unblended, as `blit` does.
    pub fn texture_overwrite(texture: &PixelBuffer) -> Self {
        Self::new(TextureShader::overwriting(texture, TextureFilter::Nearest))
            .with_alpha_promises(true, false)
    }

    pub fn program(&self) -> &dyn ShaderProgram {
        self.program.as_ref()
    }

    pub fn texture_store(&self) -> Option<&Arc<PixelStore>> {
        self.program.texture()
    }

    pub fn promise(&self, target: &PixelStore, tint: Color) -> Promise {
        self.program.promise(target, tint)
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("alpha_promise_0", &self.alpha_promise_0)
            .field("alpha_promise_255", &self.alpha_promise_255)
            .field("textured", &self.program.texture().is_some())
            .finish_non_exhaustive()
    }
}

/// How an unshaded draw writes its pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FillPlan {
    /// Store this native value.
    Raw(u32),
    /// Read, blend this color over, write back.
    Blend(Color),
}

/// Decide how an unshaded draw of `color` writes into `target`; `None` draws nothing.
pub(crate) fn plan_fill(target: &PixelStore, color: Color) -> Option<FillPlan> {
    if target.format().is_palette() {
        return ((color as usize) < target.palette().len()).then_some(FillPlan::Raw(color));
    }
    match color::alpha(color) {
        0 => None,
        255 => Some(FillPlan::Raw(target.to_native(color))),
        _ => Some(FillPlan::Blend(color)),
    }
}

/// How a shaded draw calls its program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ShadePlan {
    pub read_base: bool,
    pub ignore_uvs: bool,
}

/// Ask the shader's promise once and decide how the draw proceeds; `None` draws nothing.
pub(crate) fn plan_shade(
    shader: &Shader,
    target: &PixelStore,
    tint: Color,
) -> Option<ShadePlan> {
    let promise = shader.promise(target, tint);
    let visibility = promise & Promise::CUTOUT;
    if visibility == Promise::INVISIBLE {
        return None;
    }
    let a = color::alpha(tint);
    if a == 0 && shader.alpha_promise_0 {
        return None;
    }
    let read_base = !(promise.contains(Promise::IGNORE_BASE)
        || visibility == Promise::OPAQUE
        || (a == 255 && shader.alpha_promise_255));
    Some(ShadePlan {
        read_base,
        ignore_uvs: promise.contains(Promise::IGNORE_UVS),
    })
}

/// A shader bound to one draw call's tint, with the write plan already decided.
///
/// Planning asks the shader's promise; doing it once up front keeps that to one call per draw
/// no matter how many workers rasterize it.
#[derive(Clone, Copy, Debug)]
pub struct Shading<'a> {
    pub shader: &'a Shader,
    pub tint: Color,
    pub(crate) plan: ShadePlan,
}

impl<'a> Shading<'a> {
    /// `None` when the draw would leave every pixel unchanged.
    pub fn plan(shader: &'a Shader, target: &PixelStore, tint: Color) -> Option<Self> {
        plan_shade(shader, target, tint).map(|plan| Self::with_plan(shader, tint, plan))
    }

    pub(crate) fn with_plan(shader: &'a Shader, tint: Color, plan: ShadePlan) -> Self {
        Self { shader, tint, plan }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/plan.rs"]
mod tests;
