use std::collections::BTreeMap;

use prism_ambient::{GpuSurface, Host, ListenerId, Signal, SurfaceError};
use prism_engine::coords::Viewport;
use prism_engine::window::{FrameTicket, RuntimeCtx};
use winit::window::WindowId;

/// Live animator subscriptions, kept by the shell across callbacks.
#[derive(Debug, Default)]
pub struct Subscriptions {
    next: u64,
    live: BTreeMap<ListenerId, Signal>,
}

impl Subscriptions {
    /// Whether any listener for `signal` is registered.
    pub fn wants(&self, signal: Signal) -> bool {
        self.live.values().any(|s| *s == signal)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn add(&mut self, signal: Signal) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.live.insert(id, signal);
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.live.remove(&id).is_some()
    }
}

/// Host view handed to the animator for the duration of one shell callback.
pub struct ShellHost<'a> {
    pub runtime: &'a mut RuntimeCtx,
    pub window: WindowId,
    pub gpu_available: bool,
    pub subscriptions: &'a mut Subscriptions,
}

impl Host for ShellHost<'_> {
    type Surface = GpuSurface;

    fn acquire_surface(&mut self, viewport: Viewport) -> Result<GpuSurface, SurfaceError> {
        if !self.gpu_available {
            return Err(SurfaceError::Unavailable("window has no GPU context".into()));
        }
        if !viewport.is_valid() {
            return Err(SurfaceError::Unavailable(format!(
                "degenerate viewport {}x{}",
                viewport.width, viewport.height
            )));
        }
        Ok(GpuSurface::new(viewport))
    }

    fn subscribe(&mut self, signal: Signal) -> ListenerId {
        self.subscriptions.add(signal)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.subscriptions.remove(id)
    }

    fn request_frame(&mut self) -> FrameTicket {
        self.runtime.request_frame(self.window)
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) -> bool {
        self.runtime.cancel_frame(ticket)
    }
}
