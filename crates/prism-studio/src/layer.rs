use prism_ambient::{Animator, AnimatorConfig, FrameOutcome, Host, RenderSurface};
use prism_engine::coords::Viewport;
use prism_engine::core::AppControl;
use prism_engine::device::SurfaceErrorAction;
use prism_engine::input::{Key, KeyState};

/// Shell-side lifecycle of the ambient layer, independent of the window
/// runtime so every decision can be driven by any [`Host`].
pub struct Layer<S: RenderSurface> {
    animator: Animator<S>,
    viewport: Viewport,
}

impl<S: RenderSurface> Layer<S> {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            animator: Animator::new(config),
            viewport: Viewport::default(),
        }
    }

    pub fn animator(&self) -> &Animator<S> {
        &self.animator
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.animator.surface_mut()
    }

    /// Mounts (or remounts) at the last valid viewport.
    pub fn mount<H: Host<Surface = S>>(&mut self, host: &mut H) {
        if let Err(e) = self.animator.mount(host, self.viewport) {
            log::error!("ambient layer not mounted: {e}");
        }
    }

    pub fn unmount<H: Host<Surface = S>>(&mut self, host: &mut H) {
        self.animator.unmount(host);
    }

    /// Ticks the animator for a frame the layer asked for. Platform redraws
    /// (`requested == false`) repaint the last frame and leave the simulation
    /// where it is.
    pub fn frame<H: Host<Surface = S>>(&mut self, host: &mut H, requested: bool, now: f64) -> Option<FrameOutcome> {
        if !requested {
            return None;
        }
        self.animator.tick(host, now)
    }

    /// Reacts to the window's present result. A fatal surface error removes
    /// the layer; the window keeps running.
    pub fn presented<H: Host<Surface = S>>(&mut self, host: &mut H, result: Result<(), SurfaceErrorAction>) {
        if let Err(SurfaceErrorAction::Fatal) = result {
            if self.animator.is_mounted() {
                log::warn!("surface is unusable, removing ambient layer");
            }
            self.animator.unmount(host);
        }
    }

    /// `Escape` quits, `R` remounts with a fresh population.
    pub fn key<H: Host<Surface = S>>(&mut self, host: &mut H, key: Key, state: KeyState, repeat: bool) -> AppControl {
        match (key, state, repeat) {
            (Key::Escape, KeyState::Pressed, _) => AppControl::Exit,
            (Key::R, KeyState::Pressed, false) => {
                log::info!("remounting ambient layer");
                self.mount(host);
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    /// Records the viewport for later mounts and, when `forward` is set,
    /// passes it on to the animator.
    pub fn resize(&mut self, viewport: Viewport, forward: bool) {
        if viewport.is_valid() {
            self.viewport = viewport;
        }
        if forward {
            self.animator.resize(viewport);
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.animator.pointer_moved(x, y);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use prism_ambient::{ListenerId, NullSurface, Signal, SurfaceError};
    use prism_engine::window::{FrameScheduler, FrameTicket};

    #[derive(Default)]
    struct RecordingHost {
        frames: FrameScheduler<()>,
        listeners: BTreeMap<ListenerId, Signal>,
        next_listener: u64,
        cancels: usize,
    }

    impl Host for RecordingHost {
        type Surface = NullSurface;

        fn acquire_surface(&mut self, viewport: Viewport) -> Result<NullSurface, SurfaceError> {
            Ok(NullSurface::new(viewport))
        }

        fn subscribe(&mut self, signal: Signal) -> ListenerId {
            self.next_listener += 1;
            let id = ListenerId(self.next_listener);
            self.listeners.insert(id, signal);
            id
        }

        fn unsubscribe(&mut self, id: ListenerId) -> bool {
            self.listeners.remove(&id).is_some()
        }

        fn request_frame(&mut self) -> FrameTicket {
            self.frames.request(())
        }

        fn cancel_frame(&mut self, ticket: FrameTicket) -> bool {
            self.cancels += 1;
            self.frames.cancel(ticket)
        }
    }

    fn mounted() -> (Layer<NullSurface>, RecordingHost) {
        let mut host = RecordingHost::default();
        let mut layer = Layer::new(AnimatorConfig::default().with_seed(5));
        layer.resize(Viewport::new(1280.0, 720.0), false);
        layer.mount(&mut host);
        assert!(layer.animator().is_mounted());
        (layer, host)
    }

    fn frames_drawn(layer: &mut Layer<NullSurface>) -> usize {
        layer.surface_mut().map_or(0, |s| s.frames_drawn)
    }

    #[test]
    fn platform_redraw_does_not_tick() {
        let (mut layer, mut host) = mounted();
        let before = layer.animator().scene().map(|s| s.shapes().to_vec());

        assert_eq!(layer.frame(&mut host, false, 3.0), None);
        assert_eq!(frames_drawn(&mut layer), 0);
        assert_eq!(layer.animator().scene().map(|s| s.shapes().to_vec()), before);
        assert_eq!(host.frames.pending_count(), 1);

        assert_eq!(host.frames.take_due(()), 1);
        assert_eq!(layer.frame(&mut host, true, 3.0), Some(FrameOutcome::Drawn));
        assert_eq!(frames_drawn(&mut layer), 1);
    }

    #[test]
    fn fatal_surface_error_unmounts() {
        let (mut layer, mut host) = mounted();

        layer.presented(&mut host, Err(SurfaceErrorAction::SkipFrame));
        assert!(layer.animator().is_mounted());

        layer.presented(&mut host, Err(SurfaceErrorAction::Fatal));
        assert!(!layer.animator().is_mounted());
        assert!(host.listeners.is_empty());
        assert_eq!(host.frames.pending_count(), 0);

        // Late frames after removal are inert.
        assert_eq!(layer.frame(&mut host, true, 1.0), None);
        layer.presented(&mut host, Err(SurfaceErrorAction::Fatal));
        assert_eq!(host.cancels, 1);
    }

    #[test]
    fn remount_key_keeps_one_set_of_listeners() {
        let (mut layer, mut host) = mounted();

        for _ in 0..3 {
            let control = layer.key(&mut host, Key::R, KeyState::Pressed, false);
            assert_eq!(control, AppControl::Continue);
        }
        assert!(layer.animator().is_mounted());
        assert_eq!(host.listeners.len(), 2);
        assert_eq!(host.frames.pending_count(), 1);
        assert_eq!(host.cancels, 3);
    }

    #[test]
    fn repeated_or_released_r_does_nothing() {
        let (mut layer, mut host) = mounted();
        layer.key(&mut host, Key::R, KeyState::Pressed, true);
        layer.key(&mut host, Key::R, KeyState::Released, false);
        assert_eq!(host.cancels, 0);
    }

    #[test]
    fn escape_exits() {
        let (mut layer, mut host) = mounted();
        assert_eq!(layer.key(&mut host, Key::Escape, KeyState::Pressed, false), AppControl::Exit);
    }

    #[test]
    fn degenerate_resize_keeps_mount_viewport() {
        let (mut layer, mut host) = mounted();
        layer.resize(Viewport::new(0.0, 0.0), true);
        layer.mount(&mut host);
        let surface = layer.surface_mut().map(|s| s.viewport);
        assert_eq!(surface, Some(Viewport::new(1280.0, 720.0)));
    }
}
