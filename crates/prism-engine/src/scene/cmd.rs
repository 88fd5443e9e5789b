use glam::Mat4;

use crate::paint::Color;

/// Handle of a mesh template registered with a renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// How a mesh template is rasterized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MeshStyle {
    /// Edges only, as a line list.
    Wireframe,
    /// Filled triangles with simple directional shading.
    Solid,
}

/// One mesh instance to draw this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshCmd {
    pub mesh: MeshHandle,
    /// Object-to-world transform.
    pub model: Mat4,
    /// Premultiplied color; alpha carries the instance opacity.
    pub color: Color,
    pub style: MeshStyle,
}
