//! Rendering module
//!
//! The game is drawn from a list of draw commands built each frame from the
//! simulation state. On the web the list is painted onto a 2D canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod commands;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use commands::{Color, DrawCommand, Sprite, build_frame, colors};
