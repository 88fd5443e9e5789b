/// Device handles a renderer needs while recording one frame.
///
/// Only valid inside `FrameCtx::render`; renderers must not keep it.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format of the swapchain texture; pipelines are keyed on it.
    pub surface_format: wgpu::TextureFormat,
}

/// Encoder and color view of the frame being recorded.
///
/// The view is already cleared; renderers load and blend over it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
