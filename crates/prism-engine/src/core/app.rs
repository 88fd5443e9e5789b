use winit::window::WindowId;

use crate::coords::Viewport;
use crate::input::InputEvent;
use crate::window::RuntimeCtx;

use super::ctx::{FrameCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime only redraws a window while it holds an outstanding frame
/// ticket (`RuntimeCtx::request_frame`). An app that never requests frames
/// receives `on_frame` only for platform-initiated redraws.
pub trait App {
    /// Called once a window exists. `gpu_available` is false when no GPU
    /// context could be created for it; the window still runs and delivers
    /// events, it just cannot be drawn into.
    fn on_window_created(
        &mut self,
        window: &WindowCtx<'_>,
        gpu_available: bool,
        runtime: &mut RuntimeCtx,
    ) {
        let _ = (window, gpu_available, runtime);
    }

    /// Called for every translated input event. Events are observed, never consumed.
    fn on_input(
        &mut self,
        window_id: WindowId,
        event: &InputEvent,
        runtime: &mut RuntimeCtx,
    ) -> AppControl {
        let _ = (window_id, event, runtime);
        AppControl::Continue
    }

    /// Called after the window's surface has been resized. `viewport` is in logical pixels.
    fn on_resize(&mut self, window_id: WindowId, viewport: Viewport, runtime: &mut RuntimeCtx) {
        let _ = (window_id, viewport, runtime);
    }

    /// Called once per redraw of a window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called right before a window and its GPU context are destroyed.
    fn on_window_destroyed(&mut self, window_id: WindowId, runtime: &mut RuntimeCtx) {
        let _ = (window_id, runtime);
    }
}
