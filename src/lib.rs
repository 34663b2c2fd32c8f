#![forbid(unsafe_code)]

pub mod buffer;
pub mod color;
pub mod foundation;
pub mod raster;
pub mod render;
pub mod scene;
pub mod shader;
pub mod shapes;
pub mod text;
pub mod transform;

pub use buffer::{PixelBuffer, PixelFormat, PixelStore};
pub use color::Color;
pub use foundation::core::{Affine, Linef, Quadf, Rectf, Recti, Trif, Vec2f, Vec2i};
pub use foundation::error::{ErrorCode, RasterError, RasterResult, last_error};
pub use raster::Rows;
pub use render::{
    AsyncEngine, AsyncEngineOpts, DrawTask, EngineKind, EngineOpts, RenderContext, RenderEngine,
    SyncEngine, create_engine,
};
pub use scene::{Op, Scene, SceneColor};
pub use shader::{Promise, Shader, ShaderProgram, TextureFilter};
pub use shapes::Arcf;
pub use text::{Align, Font, FontRange, Glyph, GlyphDims, RangeKind, TextLayout, text_size};
pub use transform::AffineStack;
