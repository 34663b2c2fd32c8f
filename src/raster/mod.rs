//! Scan conversion of the core primitives.
//!
//! Every primitive has one generic body, instantiated per [`Paint`] strategy, and takes a
//! [`Rows`] selector so two workers can split a draw by scanline parity. Spans include the
//! pixels whose centers lie in `[start, end)`; per-row values are computed from the absolute
//! row index, so a parity pass writes exactly the rows an undivided pass would.

pub mod blit;
pub mod line;
pub mod rect;
pub mod tzoid;

use std::sync::Arc;

use crate::buffer::PixelStore;
use crate::color::Color;
use crate::foundation::core::Recti;
use crate::shader::{ShaderProgram, Shading};

pub use blit::{GlyphBitmap, can_copy_raw};

/// Pixel storage plus the clip rectangle a draw is confined to.
#[derive(Clone, Debug)]
pub struct DrawTarget {
    pub store: Arc<PixelStore>,
    pub clip: Recti,
}

impl DrawTarget {
    pub fn new(store: Arc<PixelStore>, clip: Recti) -> Self {
        Self { store, clip }
    }
}

/// Which scanlines a pass draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rows {
    #[default]
    All,
    Even,
    Odd,
}

impl Rows {
    #[inline]
    pub fn contains(self, y: i32) -> bool {
        match self {
            Rows::All => true,
            Rows::Even => y & 1 == 0,
            Rows::Odd => y & 1 != 0,
        }
    }

    /// First row at or after `y` that this pass draws.
    #[inline]
    pub fn first_from(self, y: i32) -> i32 {
        if self.contains(y) { y } else { y.saturating_add(1) }
    }

    #[inline]
    pub fn step(self) -> usize {
        match self {
            Rows::All => 1,
            Rows::Even | Rows::Odd => 2,
        }
    }

    /// Rows in `[y0, y1)` drawn by this pass.
    #[inline]
    pub fn iter(self, y0: i32, y1: i32) -> impl Iterator<Item = i32> {
        (self.first_from(y0)..y1).step_by(self.step())
    }
}

/// How UVs are interpolated across a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UvMode {
    Ignore,
    /// `u` depends only on x and `v` only on y.
    Restricted,
    /// Bilinear over the four corners.
    Generic,
}

/// A per-pixel write strategy.
pub(crate) trait Paint {
    const USES_UV: bool;

    fn paint(&self, store: &PixelStore, i: usize, x: i32, y: i32, u: f32, v: f32);
}

pub(crate) struct RawPaint(pub u32);

impl Paint for RawPaint {
    const USES_UV: bool = false;

    #[inline]
    fn paint(&self, store: &PixelStore, i: usize, _x: i32, _y: i32, _u: f32, _v: f32) {
        store.set_index(self.0, i);
    }
}

pub(crate) struct BlendPaint(pub Color);

impl Paint for BlendPaint {
    const USES_UV: bool = false;

    #[inline]
    fn paint(&self, store: &PixelStore, i: usize, _x: i32, _y: i32, _u: f32, _v: f32) {
        store.merge_color(self.0, i);
    }
}

pub(crate) struct ShadedPaint<'a> {
    program: &'a dyn ShaderProgram,
    tint: Color,
    read_base: bool,
    palette: bool,
}

impl<'a> ShadedPaint<'a> {
    pub(crate) fn new(shading: &Shading<'a>, store: &PixelStore) -> Self {
        Self {
            program: shading.shader.program(),
            tint: shading.tint,
            read_base: shading.plan.read_base,
            palette: store.format().is_palette(),
        }
    }
}

impl Paint for ShadedPaint<'_> {
    const USES_UV: bool = true;

    #[inline]
    fn paint(&self, store: &PixelStore, i: usize, x: i32, y: i32, u: f32, v: f32) {
        let existing = match (self.read_base, self.palette) {
            (false, _) => 0,
            (true, true) => store.get_index(i),
            (true, false) => store.get_color(i),
        };
        store.set_color(self.program.shade(self.tint, existing, x, y, u, v), i);
    }
}

/// Run `$body` with `$paint` bound to the unshaded strategy for `$color`, if any.
macro_rules! with_fill {
    ($store:expr, $color:expr, |$paint:ident| $body:expr) => {
        match $crate::shader::plan_fill($store, $color) {
            None => {}
            Some($crate::shader::FillPlan::Raw(value)) => {
                let $paint = &$crate::raster::RawPaint(value);
                $body
            }
            Some($crate::shader::FillPlan::Blend(color)) => {
                let $paint = &$crate::raster::BlendPaint(color);
                $body
            }
        }
    };
}
pub(crate) use with_fill;

/// First pixel whose center is at or after `v`.
#[inline]
pub(crate) fn span_start(v: f32) -> i32 {
    (v - 0.5).ceil() as i32
}

#[inline]
pub(crate) fn lerpf(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rows.rs"]
mod tests;
