use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys  = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    /// Returns the logical window size as a `Viewport`.
    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.logical_size();
        Viewport::new(w, h)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:       WindowCtx<'a>,
    /// `None` when GPU initialization failed for this window.
    pub gpu:          Option<&'a mut Gpu<'w>>,
    pub input:        &'a InputState,
    pub input_frame:  &'a InputFrame,
    pub time:         FrameTime,
    /// Frame tickets that fired for this redraw. Zero for platform-initiated redraws.
    pub serviced:     usize,
    pub runtime:      &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Whether this redraw services at least one requested frame.
    #[inline]
    pub fn was_requested(&self) -> bool {
        self.serviced > 0
    }

    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    ///
    /// Without a GPU, or while the window has no area, nothing is drawn and
    /// `SkipFrame` is returned. Surface errors are mapped to a [`SurfaceErrorAction`]
    /// so callers can stop drawing after a fatal error without stopping the app.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> Result<(), SurfaceErrorAction>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.window.viewport();

        let Some(gpu) = self.gpu.as_deref_mut() else {
            return Err(SurfaceErrorAction::SkipFrame);
        };
        if !gpu.is_drawable() || !viewport.is_valid() {
            return Err(SurfaceErrorAction::SkipFrame);
        }

        let mut frame = match gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("failed to acquire frame: {err}");
                return Err(gpu.handle_surface_error(err));
            }
        };

        // Clear pass; dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
        }

        let rctx = RenderCtx {
            device: gpu.device(),
            queue: gpu.queue(),
            surface_format: gpu.surface_format(),
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        gpu.submit(frame);

        Ok(())
    }
}
