//! Coordinate types shared across the engine and the ambient layer.
//!
//! Screen space is logical pixels (DPI-aware), origin top-left, +X right, +Y down.
//! World space (meshes, cameras) uses `glam` types directly.

mod viewport;

pub use viewport::Viewport;
