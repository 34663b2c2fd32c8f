use crate::foundation::error::{RasterError, RasterResult};

pub use kurbo::{Affine, Point};

/// Point in buffer or user space.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer point, used for blit offsets and glyph origins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle; `w`/`h` may be negative until normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rectf {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rectf {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Flip negative extents so that `w` and `h` are non-negative.
    pub fn normalized(self) -> Self {
        let mut r = self;
        if r.w < 0.0 {
            r.x += r.w;
            r.w = -r.w;
        }
        if r.h < 0.0 {
            r.y += r.h;
            r.h = -r.h;
        }
        r
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// Integer rectangle in buffer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Recti {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Recti {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Overlap of two rectangles; empty rectangles come back with zero size.
    pub fn intersect(self, other: Recti) -> Recti {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Recti::new(x0, y0, 0, 0);
        }
        Recti::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Linef {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Linef {
    /// Texture coordinates used when a shaded line has none.
    pub const DEFAULT_UVS: Linef = Linef::new(0.0, 0.0, 1.0, 0.0);

    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn is_finite(self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trif {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Trif {
    /// Texture coordinates used when a shaded triangle has none.
    pub const DEFAULT_UVS: Trif = Trif::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);

    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        }
    }

    pub fn points(self) -> [Vec2f; 3] {
        [
            Vec2f::new(self.x0, self.y0),
            Vec2f::new(self.x1, self.y1),
            Vec2f::new(self.x2, self.y2),
        ]
    }

    pub fn from_points(p: [Vec2f; 3]) -> Self {
        Self::new(p[0].x, p[0].y, p[1].x, p[1].y, p[2].x, p[2].y)
    }

    pub fn is_finite(self) -> bool {
        self.points()
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

/// Four corners, clockwise from the top-left for rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quadf {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub x3: f32,
    pub y3: f32,
}

impl Quadf {
    /// Texture coordinates used when a shaded quad or rect has none.
    pub const DEFAULT_UVS: Quadf = Quadf::new(0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0);

    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        }
    }

    pub fn points(self) -> [Vec2f; 4] {
        [
            Vec2f::new(self.x0, self.y0),
            Vec2f::new(self.x1, self.y1),
            Vec2f::new(self.x2, self.y2),
            Vec2f::new(self.x3, self.y3),
        ]
    }

    pub fn from_points(p: [Vec2f; 4]) -> Self {
        Self::new(
            p[0].x, p[0].y, p[1].x, p[1].y, p[2].x, p[2].y, p[3].x, p[3].y,
        )
    }

    pub fn is_finite(self) -> bool {
        self.points()
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

pub(crate) fn ensure_finite(ok: bool, what: &str) -> RasterResult<()> {
    if ok {
        Ok(())
    } else {
        Err(RasterError::non_finite(format!("{what} has NaN or infinite coordinates")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
