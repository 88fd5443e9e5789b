//! Paint model shared between the ambient layer and renderers.
//!
//! Colors are linear premultiplied alpha. Mesh materials (wireframe vs solid)
//! live in `scene`, next to the draw commands that use them.

pub mod color;

pub use color::Color;
