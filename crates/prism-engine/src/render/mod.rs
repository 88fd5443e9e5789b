//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer owns its GPU resources (pipelines, buffers) and creates them
//! lazily on first use, so constructing one never touches the device.

mod ctx;
mod mesh;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::MeshRenderer;
