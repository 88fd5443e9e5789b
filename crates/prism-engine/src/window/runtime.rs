use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::collections::HashMap;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};
use crate::time::{FrameClock, FrameTime};

use super::scheduler::{FrameScheduler, FrameTicket};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Ask the compositor for a per-pixel transparent window.
    pub transparent: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            transparent: true,
        }
    }
}

/// Runtime context passed to the application.
///
/// Window commands are buffered and applied after the current callback
/// returns. Frame requests take effect immediately: a pending ticket makes the
/// runtime redraw its window on the next loop iteration.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
    frames: FrameScheduler,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.commands.push(Command::CreateWindow(config));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    /// Requests one redraw of `window`.
    pub fn request_frame(&mut self, window: WindowId) -> FrameTicket {
        self.frames.request(window)
    }

    /// Revokes a frame request. Returns `false` if it already fired or was cancelled.
    pub fn cancel_frame(&mut self, ticket: FrameTicket) -> bool {
        self.frames.cancel(ticket)
    }

    pub fn frame_pending(&self, ticket: FrameTicket) -> bool {
        self.frames.is_pending(ticket)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.pending_count()
    }
}

enum Command {
    CreateWindow(RuntimeConfig),
    CloseWindow(WindowId),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Option<Gpu<'this>>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    windows: HashMap<WindowId, WindowEntry>,
    runtime: RuntimeCtx,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            windows: HashMap::new(),
            runtime: RuntimeCtx::default(),
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Tears every window down (notifying the app first) and leaves the loop.
    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            self.destroy_window_entry(id);
        }
        event_loop.exit();
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop, config: RuntimeConfig) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size)
            .with_transparent(config.transparent);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| match pollster::block_on(Gpu::new(w, gpu_init)) {
                Ok(gpu) => Some(gpu),
                Err(e) => {
                    log::error!("GPU initialization failed, window will not be drawn: {e:#}");
                    None
                }
            },
        }
        .build();

        let gpu_available = entry.with_gpu(|gpu| gpu.is_some());

        let (app, runtime) = (&mut self.app, &mut self.runtime);
        entry.with_window(|window| {
            app.on_window_created(&WindowCtx { id, window }, gpu_available, runtime);
        });

        self.windows.insert(id, entry);
        Ok(())
    }

    fn destroy_window_entry(&mut self, id: WindowId) {
        if self.windows.contains_key(&id) {
            self.app.on_window_destroyed(id, &mut self.runtime);
        }
        self.runtime.frames.forget(id);
        self.windows.remove(&id);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop) {
        let commands = std::mem::take(&mut self.runtime.commands);
        for cmd in commands {
            match cmd {
                Command::CreateWindow(cfg) => {
                    if let Err(e) = self.open_window(event_loop, cfg) {
                        log::error!("failed to create window: {e:#}");
                    }
                }
                Command::CloseWindow(id) => self.destroy_window_entry(id),
                Command::Exit => self.request_exit(),
            }
        }

        if self.windows.is_empty() {
            self.request_exit();
        }
    }

    fn resize_window(&mut self, id: WindowId, new_size: PhysicalSize<u32>) {
        let Some(entry) = self.windows.get_mut(&id) else { return };

        entry.with_gpu_mut(|gpu| {
            if let Some(gpu) = gpu {
                gpu.resize(new_size);
            }
        });

        let viewport = entry.with_window(|w| {
            let logical: LogicalSize<f64> = new_size.to_logical(w.scale_factor());
            Viewport::new(logical.width as f32, logical.height as f32)
        });

        self.app.on_resize(id, viewport, &mut self.runtime);
    }

    fn redraw(&mut self, id: WindowId) {
        let (app, windows, runtime) = (&mut self.app, &mut self.windows, &mut self.runtime);
        let Some(entry) = windows.get_mut(&id) else { return };

        let serviced = runtime.frames.take_due(id);
        let mut control = AppControl::Continue;

        entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();

            // Scope to ensure `ctx` is dropped before mutating frame state.
            {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id,
                        window: fields.window,
                    },
                    gpu: fields.gpu.as_mut(),
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time: ft,
                    serviced,
                    runtime,
                };

                control = app.on_frame(&mut ctx);
            }

            // Clear per-frame deltas after the frame is consumed.
            fields.input_frame.clear();
        });

        if control == AppControl::Exit {
            self.request_exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        if let Err(e) = self.open_window(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit();
        }

        self.apply_commands(event_loop);
        if self.exit_requested {
            self.finish(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.finish(event_loop);
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Only windows with an outstanding frame ticket are redrawn.
        for (id, entry) in &self.windows {
            if self.runtime.frames.has_pending(*id) {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            self.finish(event_loop);
            return;
        }

        let (app, windows, runtime) = (&mut self.app, &mut self.windows, &mut self.runtime);
        let Some(entry) = windows.get_mut(&window_id) else {
            return;
        };

        let mut control = AppControl::Continue;
        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_state.apply_event(fields.input_frame, ev.clone());
                control = app.on_input(window_id, &ev, runtime);
            }
        });

        if control == AppControl::Exit {
            self.request_exit();
        }

        // Runtime-managed window lifecycle / resize / redraw handling.
        match &event {
            WindowEvent::CloseRequested => self.destroy_window_entry(window_id),

            WindowEvent::Resized(new_size) => self.resize_window(window_id, *new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.windows.get(&window_id) {
                    let size = entry.with_window(|w| w.inner_size());
                    self.resize_window(window_id, size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(window_id),

            _ => {}
        }

        self.apply_commands(event_loop);
        if self.exit_requested {
            self.finish(event_loop);
        }
    }
}
