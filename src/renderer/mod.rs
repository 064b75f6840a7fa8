//! Software rendering
//!
//! Draw commands from the render list are resolved to images through the
//! sprite atlas and composited onto an in-memory canvas.

pub mod atlas;
pub mod canvas;

pub use atlas::SpriteAtlas;
pub use canvas::Canvas;
