use prism_engine::coords::Viewport;
use prism_engine::window::FrameTicket;

use crate::error::SurfaceError;
use crate::surface::RenderSurface;

/// Host signals the animator listens to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Signal {
    PointerMove,
    Resize,
}

/// Registration handle returned by [`Host::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Environment the animator is mounted into.
///
/// The host owns the viewport, the event sources and frame scheduling. A
/// subscription only records interest: the host keeps delivering every event
/// to the rest of the application and forwards matching ones to the animator
/// (`Animator::pointer_moved`, `Animator::resize`) while the listener is live.
pub trait Host {
    type Surface: RenderSurface;

    fn acquire_surface(&mut self, viewport: Viewport) -> Result<Self::Surface, SurfaceError>;

    fn subscribe(&mut self, signal: Signal) -> ListenerId;

    /// Returns `false` if `id` was not subscribed.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;

    /// Schedules one animator tick.
    fn request_frame(&mut self) -> FrameTicket;

    /// Returns `false` if the ticket already fired or was cancelled.
    fn cancel_frame(&mut self, ticket: FrameTicket) -> bool;
}
