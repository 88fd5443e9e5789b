//! Ambient geometry layer.
//!
//! A fixed population of translucent wireframe and solid polyhedra drifting,
//! rotating and pulsing behind the page, with a pointer-driven camera
//! parallax. The simulation (`AmbientScene`) is independent of any graphics
//! backend; the `Animator` binds it to a [`Host`] and a [`RenderSurface`].

mod animator;
mod camera;
mod config;
mod error;
mod geometry;
mod gpu_surface;
mod host;
mod material;
mod scene;
mod shape;
mod surface;

pub use animator::Animator;
pub use camera::{Camera, CameraConfig};
pub use config::{AnimatorConfig, POPULATION_RANGE};
pub use error::{AmbientError, Result, SurfaceError};
pub use geometry::{GeometryKind, GeometrySpec, default_geometry_table};
pub use gpu_surface::GpuSurface;
pub use host::{Host, ListenerId, Signal};
pub use material::{Material, default_materials, default_palette};
pub use scene::AmbientScene;
pub use shape::Shape;
pub use surface::{Frame, FrameOutcome, NullSurface, RenderSurface, ShapeDraw, TemplateId};
