//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Windows, wires them to the GPU layer, and
//! paces redraws through the frame scheduler.

mod runtime;
mod scheduler;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use scheduler::{FrameScheduler, FrameTicket};
