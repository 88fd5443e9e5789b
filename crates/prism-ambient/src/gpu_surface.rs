use prism_engine::coords::Viewport;
use prism_engine::render::{MeshRenderer, RenderCtx, RenderTarget};
use prism_engine::scene::{DrawList, Mesh, MeshCmd, MeshHandle};

use crate::error::SurfaceError;
use crate::surface::{Frame, RenderSurface, TemplateId};

/// Render surface backed by the engine's wgpu mesh renderer.
///
/// `draw` only records the frame; pixels are produced when the window's frame
/// is rendered and [`GpuSurface::render`] is called with the live device.
#[derive(Default)]
pub struct GpuSurface {
    renderer: MeshRenderer,
    list: DrawList,
    viewport: Viewport,
    released: bool,
}

impl GpuSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Number of recorded draws waiting for `render`.
    pub fn recorded(&self) -> usize {
        self.list.len()
    }

    pub fn template_count(&self) -> usize {
        self.renderer.template_count()
    }

    /// Encodes the last recorded frame into `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.released {
            return;
        }
        self.renderer.render(ctx, target, &mut self.list);
    }
}

impl RenderSurface for GpuSurface {
    fn upload_template(&mut self, mesh: &Mesh) -> Result<TemplateId, SurfaceError> {
        if self.released {
            return Err(SurfaceError::Lost);
        }
        if !mesh.is_valid() || mesh.positions.is_empty() {
            return Err(SurfaceError::InvalidTemplate(format!(
                "{} vertices, {} triangles",
                mesh.vertex_count(),
                mesh.triangles.len()
            )));
        }
        let handle = self.renderer.register(mesh.clone());
        Ok(TemplateId(handle.0))
    }

    fn release_template(&mut self, id: TemplateId) {
        self.renderer.release(MeshHandle(id.0));
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Lost);
        }

        self.list.begin(frame.view_proj, frame.eye);
        for draw in &frame.draws {
            self.list.push(MeshCmd {
                mesh: MeshHandle(draw.template.0),
                model: draw.model,
                color: draw.color,
                style: draw.style,
            });
        }
        Ok(())
    }

    fn release(&mut self) {
        self.renderer.release_all();
        self.list.begin(glam::Mat4::IDENTITY, glam::Vec3::ZERO);
        self.released = true;
    }
}
