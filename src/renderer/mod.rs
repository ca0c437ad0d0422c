//! Canvas rendering module
//!
//! `scene` turns a snapshot into draw commands; `canvas` paints them with
//! the browser's 2D context.

pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{DrawCmd, build};
