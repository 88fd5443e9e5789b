use prism_ambient::{AnimatorConfig, GpuSurface, Signal};
use prism_engine::coords::Viewport;
use prism_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use prism_engine::input::InputEvent;
use prism_engine::paint::Color;
use prism_engine::window::RuntimeCtx;
use winit::window::WindowId;

use crate::host::{ShellHost, Subscriptions};
use crate::layer::Layer;

/// Page shell: mounts the ambient layer at the window root and forwards
/// window events to it.
pub struct Shell {
    layer: Layer<GpuSurface>,
    subscriptions: Subscriptions,
    window: Option<ShellWindow>,
}

#[derive(Debug, Copy, Clone)]
struct ShellWindow {
    id: WindowId,
    gpu_available: bool,
}

impl Shell {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            layer: Layer::new(config),
            subscriptions: Subscriptions::default(),
            window: None,
        }
    }

    fn host<'a>(
        window: ShellWindow,
        runtime: &'a mut RuntimeCtx,
        subscriptions: &'a mut Subscriptions,
    ) -> ShellHost<'a> {
        ShellHost {
            runtime,
            window: window.id,
            gpu_available: window.gpu_available,
            subscriptions,
        }
    }

    fn ours(&self, id: WindowId) -> Option<ShellWindow> {
        self.window.filter(|w| w.id == id)
    }
}

impl App for Shell {
    fn on_window_created(&mut self, window: &WindowCtx<'_>, gpu_available: bool, runtime: &mut RuntimeCtx) {
        if self.window.is_some() {
            log::debug!("ignoring additional window {:?}", window.id);
            return;
        }
        let shell_window = ShellWindow { id: window.id, gpu_available };
        self.window = Some(shell_window);
        self.layer.resize(window.viewport(), false);

        let mut host = Self::host(shell_window, runtime, &mut self.subscriptions);
        self.layer.mount(&mut host);
    }

    fn on_input(&mut self, window_id: WindowId, event: &InputEvent, runtime: &mut RuntimeCtx) -> AppControl {
        let Some(window) = self.ours(window_id) else {
            return AppControl::Continue;
        };

        match event {
            InputEvent::PointerMoved(p) => {
                if self.subscriptions.wants(Signal::PointerMove) {
                    self.layer.pointer_moved(p.x, p.y);
                }
                AppControl::Continue
            }
            InputEvent::Key { key, state, repeat } => {
                let mut host = Self::host(window, runtime, &mut self.subscriptions);
                self.layer.key(&mut host, *key, *state, *repeat)
            }
            _ => AppControl::Continue,
        }
    }

    fn on_resize(&mut self, window_id: WindowId, viewport: Viewport, _runtime: &mut RuntimeCtx) {
        if self.ours(window_id).is_some() {
            self.layer.resize(viewport, self.subscriptions.wants(Signal::Resize));
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(window) = self.ours(ctx.window.id) else {
            return AppControl::Continue;
        };

        let requested = ctx.was_requested();
        let now = ctx.time.elapsed as f64;
        let mut host = Self::host(window, &mut *ctx.runtime, &mut self.subscriptions);
        self.layer.frame(&mut host, requested, now);

        let Some(surface) = self.layer.surface_mut() else {
            return AppControl::Continue;
        };
        let result = ctx.render(Color::transparent(), |rctx, target| surface.render(rctx, target));

        let mut host = Self::host(window, &mut *ctx.runtime, &mut self.subscriptions);
        self.layer.presented(&mut host, result);
        AppControl::Continue
    }

    fn on_window_destroyed(&mut self, window_id: WindowId, runtime: &mut RuntimeCtx) {
        let Some(window) = self.ours(window_id) else { return };
        let mut host = Self::host(window, runtime, &mut self.subscriptions);
        self.layer.unmount(&mut host);
        self.window = None;
        debug_assert!(self.subscriptions.is_empty());
    }
}
