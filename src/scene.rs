//! JSON draw scripts: a canvas description plus a list of draw and state operations.
//!
//! ```json
//! { "width": 64, "height": 64, "format": "argb8888",
//!   "fonts": { "body": "fonts/body.bin" },
//!   "ops": [ { "op": "background", "color": "#202020" },
//!            { "op": "circle", "x": 32, "y": 32, "r": 20, "color": "#ff0000" } ] }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::buffer::{PixelBuffer, PixelFormat};
use crate::color::Color;
use crate::foundation::core::{Linef, Quadf, Rectf, Trif, Vec2f};
use crate::foundation::error::{RasterError, RasterResult, track};
use crate::render::RenderContext;
use crate::shapes::Arcf;
use crate::text::{Font, TextLayout};
use crate::transform;

/// A color written as an ARGB number or as `#rrggbb` / `#aarrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr", into = "ColorRepr")]
pub struct SceneColor(pub Color);

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Number(u32),
    Hex(String),
}

impl TryFrom<ColorRepr> for SceneColor {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Number(c) => Ok(Self(c)),
            ColorRepr::Hex(s) => parse_hex_color(&s).map(Self),
        }
    }
}

impl From<SceneColor> for ColorRepr {
    fn from(c: SceneColor) -> Self {
        ColorRepr::Hex(format!("#{:08x}", c.0))
    }
}

fn parse_hex_color(s: &str) -> Result<Color, String> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    let value = u32::from_str_radix(digits, 16).map_err(|_| format!("bad color '{s}'"))?;
    match digits.len() {
        6 => Ok(0xff00_0000 | value),
        8 => Ok(value),
        _ => Err(format!("color '{s}' needs 6 or 8 hex digits")),
    }
}

/// One scene operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Background {
        color: SceneColor,
    },
    Rect {
        #[serde(flatten)]
        rect: Rectf,
        color: SceneColor,
    },
    OutlineRect {
        #[serde(flatten)]
        rect: Rectf,
        color: SceneColor,
    },
    RoundRect {
        #[serde(flatten)]
        rect: Rectf,
        radius: f32,
        color: SceneColor,
    },
    Line {
        #[serde(flatten)]
        line: Linef,
        color: SceneColor,
        /// Drawn as a quad when set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thickness: Option<f32>,
    },
    Tri {
        #[serde(flatten)]
        tri: Trif,
        color: SceneColor,
    },
    Quad {
        #[serde(flatten)]
        quad: Quadf,
        color: SceneColor,
    },
    Circle {
        x: f32,
        y: f32,
        r: f32,
        color: SceneColor,
        #[serde(default)]
        outline: bool,
    },
    Arc {
        #[serde(flatten)]
        arc: Arcf,
        color: SceneColor,
        #[serde(default)]
        outline: bool,
    },
    Text {
        font: String,
        text: String,
        x: f32,
        y: f32,
        #[serde(flatten)]
        layout: TextLayout,
        color: SceneColor,
    },
    Push,
    Pop,
    Translate {
        x: f32,
        y: f32,
    },
    Scale {
        x: f32,
        y: f32,
    },
    /// Radians.
    Rotate {
        angle: f32,
    },
    ResetTransform,
    Clip {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    NoClip,
}

/// A canvas and the operations drawn onto it, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_format")]
    pub format: PixelFormat,
    /// Required for palette formats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<SceneColor>,
    /// Font name to font file, relative to the scene file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fonts: BTreeMap<String, PathBuf>,
    pub ops: Vec<Op>,
}

fn default_format() -> PixelFormat {
    PixelFormat::Argb8888
}

impl Scene {
    pub fn from_json(json: &str) -> RasterResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| RasterError::Other(anyhow::Error::new(err).context("parse scene JSON")))
    }

    pub fn validate(&self) -> RasterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::param(format!(
                "scene size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.format.is_palette() && self.palette.is_empty() {
            return Err(RasterError::param(format!(
                "format {:?} needs a palette",
                self.format
            )));
        }
        for op in &self.ops {
            if let Op::Text { font, .. } = op
                && !self.fonts.contains_key(font)
            {
                return Err(RasterError::param(format!("unknown font '{font}'")));
            }
        }
        Ok(())
    }

    /// Load every font the scene names, resolving paths against `base_dir`.
    pub fn load_fonts(&self, base_dir: &Path) -> RasterResult<BTreeMap<String, Font>> {
        self.fonts
            .iter()
            .map(|(name, path)| Ok((name.clone(), Font::load(base_dir.join(path))?)))
            .collect()
    }

    /// Draw the scene into a new buffer; every queued draw has landed when this returns.
    pub fn render(
        &self,
        ctx: &mut RenderContext,
        fonts: &BTreeMap<String, Font>,
    ) -> RasterResult<PixelBuffer> {
        track(self.render_ops(ctx, fonts))
    }

    fn render_ops(
        &self,
        ctx: &mut RenderContext,
        fonts: &BTreeMap<String, Font>,
    ) -> RasterResult<PixelBuffer> {
        self.validate()?;
        let mut buf = if self.format.is_palette() {
            let palette: Vec<Color> = self.palette.iter().map(|c| c.0).collect();
            PixelBuffer::with_palette(self.format, self.width, self.height, palette)?
        } else {
            PixelBuffer::new(self.format, self.width, self.height)?
        };
        let result = self
            .ops
            .iter()
            .try_for_each(|op| apply(ctx, &mut buf, fonts, op));
        ctx.join();
        result.map(|()| buf)
    }
}

fn apply(
    ctx: &mut RenderContext,
    buf: &mut PixelBuffer,
    fonts: &BTreeMap<String, Font>,
    op: &Op,
) -> RasterResult<()> {
    match op {
        Op::Background { color } => ctx.background(buf, color.0),
        Op::Rect { rect, color } => ctx.draw_rect(buf, color.0, *rect)?,
        Op::OutlineRect { rect, color } => ctx.outline_rect(buf, color.0, *rect)?,
        Op::RoundRect {
            rect,
            radius,
            color,
        } => ctx.draw_round_rect(buf, color.0, *rect, *radius)?,
        Op::Line {
            line,
            color,
            thickness: None,
        } => ctx.draw_line(buf, color.0, *line)?,
        Op::Line {
            line,
            color,
            thickness: Some(t),
        } => ctx.draw_thick_line(buf, color.0, *line, *t)?,
        Op::Tri { tri, color } => ctx.draw_tri(buf, color.0, *tri)?,
        Op::Quad { quad, color } => ctx.draw_quad(buf, color.0, *quad)?,
        Op::Circle {
            x,
            y,
            r,
            color,
            outline,
        } => {
            let center = Vec2f::new(*x, *y);
            if *outline {
                ctx.outline_circle(buf, color.0, center, *r)?
            } else {
                ctx.draw_circle(buf, color.0, center, *r)?
            }
        }
        Op::Arc {
            arc,
            color,
            outline,
        } => {
            if *outline {
                ctx.outline_arc(buf, color.0, *arc)?
            } else {
                ctx.draw_arc(buf, color.0, *arc)?
            }
        }
        Op::Text {
            font,
            text,
            x,
            y,
            layout,
            color,
        } => {
            let font = fonts
                .get(font)
                .ok_or_else(|| RasterError::param(format!("font '{font}' is not loaded")))?;
            ctx.draw_text(buf, font, color.0, *layout, Vec2f::new(*x, *y), text)?;
        }
        Op::Push => buf.push_transform(),
        Op::Pop => buf.pop_transform()?,
        Op::Translate { x, y } => buf.apply_transform(transform::translate(*x, *y)),
        Op::Scale { x, y } => buf.apply_transform(transform::scale(*x, *y)),
        Op::Rotate { angle } => buf.apply_transform(transform::rotate(*angle)),
        Op::ResetTransform => buf.reset_transform(false),
        Op::Clip { x, y, w, h } => buf.clip(*x, *y, *w, *h),
        Op::NoClip => buf.noclip(),
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/scene.rs"]
mod tests;
