use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Per-window GPU state: device, queue and the configured swapchain.
///
/// Dropping it releases the swapchain and the device; the window is untouched.
pub struct Gpu<'w> {
    // Instance and adapter must outlive the surface and device.
    _instance: wgpu::Instance,
    _adapter: wgpu::Adapter,

    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Binds a low-power device to `window` and configures its surface.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let (adapter, device, queue) = open_device(&instance, &surface, &init).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, &init.alpha_modes);
        log::debug!("surface format {format:?}, alpha mode {alpha_mode:?}");

        let config = surface_config(format, alpha_mode, size, &init);
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            _adapter: adapter,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// `false` while the window is minimized.
    pub fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}

async fn open_device(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    init: &GpuInit,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    // Background layers should not spin up a discrete GPU on laptops.
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("prism-engine device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    Ok((adapter, device, queue))
}

fn surface_config(
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    size: PhysicalSize<u32>,
    init: &GpuInit,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: init.present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: init.desired_maximum_frame_latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_config_follows_init() {
        let init = GpuInit::default();
        let config = surface_config(
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::CompositeAlphaMode::PreMultiplied,
            PhysicalSize::new(1280, 720),
            &init,
        );
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::PreMultiplied);
        assert_eq!(config.desired_maximum_frame_latency, 2);
    }

    #[test]
    fn surface_config_never_has_zero_extent() {
        let config = surface_config(
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::CompositeAlphaMode::Opaque,
            PhysicalSize::new(0, 0),
            &GpuInit::default(),
        );
        assert_eq!((config.width, config.height), (1, 1));
    }
}
