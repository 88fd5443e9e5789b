//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - hold renderer-agnostic mesh templates (`Mesh`)
//! - record per-frame mesh draws with the camera they are seen from
//! - provide deterministic back-to-front ordering for translucent geometry

mod cmd;
mod key;
mod list;
mod mesh;

pub use cmd::{MeshCmd, MeshHandle, MeshStyle};
pub use key::SortKey;
pub use list::{DrawItem, DrawList};
pub use mesh::Mesh;
