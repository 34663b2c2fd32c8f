use smallvec::SmallVec;

use crate::foundation::core::{Affine, Vec2f};
use crate::foundation::error::{RasterError, RasterResult};

/// Per-buffer stack of 2D transforms applied to the transform-aware draw calls.
///
/// The working matrix lives in `top`; `push` saves a copy of it and `pop` restores the last
/// saved copy.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineStack {
    top: Affine,
    saved: SmallVec<[Affine; 4]>,
}

impl Default for AffineStack {
    fn default() -> Self {
        Self::new()
    }
}

impl AffineStack {
    pub fn new() -> Self {
        Self {
            top: Affine::IDENTITY,
            saved: SmallVec::new(),
        }
    }

    pub fn current(&self) -> Affine {
        self.top
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Post-multiply the working matrix: `m` applies to coordinates before the existing matrix.
    pub fn apply(&mut self, m: Affine) {
        self.top = self.top * m;
    }

    pub fn push(&mut self) {
        self.saved.push(self.top);
    }

    pub fn pop(&mut self) -> RasterResult<()> {
        match self.saved.pop() {
            Some(m) => {
                self.top = m;
                Ok(())
            }
            None => Err(RasterError::StackUnderflow),
        }
    }

    /// Reset the working matrix to identity, keeping saved entries.
    pub fn reset_top(&mut self) {
        self.top = Affine::IDENTITY;
    }

    /// Drop every saved entry and reset the working matrix.
    pub fn reset_all(&mut self) {
        self.saved.clear();
        self.top = Affine::IDENTITY;
    }

    pub fn is_identity(&self) -> bool {
        self.top == Affine::IDENTITY
    }

    /// True when the matrix has no rotation, scale or skew, only a translation.
    pub fn is_translation(&self) -> bool {
        let [a, b, c, d, _, _] = self.top.as_coeffs();
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }

    pub fn apply_to(&self, p: Vec2f) -> Vec2f {
        let out = self.top * kurbo::Point::new(f64::from(p.x), f64::from(p.y));
        Vec2f::new(out.x as f32, out.y as f32)
    }
}

/// `(x, y)` translation.
pub fn translate(x: f32, y: f32) -> Affine {
    Affine::translate((f64::from(x), f64::from(y)))
}

pub fn scale(x: f32, y: f32) -> Affine {
    Affine::scale_non_uniform(f64::from(x), f64::from(y))
}

/// Rotation by `angle` radians; with y pointing down this turns clockwise on screen.
pub fn rotate(angle: f32) -> Affine {
    Affine::rotate(f64::from(angle))
}

pub fn shear(x: f32, y: f32) -> Affine {
    Affine::skew(f64::from(x), f64::from(y))
}

#[cfg(test)]
#[path = "../tests/unit/transform.rs"]
mod tests;
