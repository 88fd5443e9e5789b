use glam::{Mat4, Vec3};
use prism_engine::coords::Viewport;
use prism_engine::paint::Color;
use prism_engine::scene::{Mesh, MeshStyle};

use crate::error::SurfaceError;

/// Handle of a template uploaded to a [`RenderSurface`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u32);

/// One shape draw within a [`Frame`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeDraw {
    pub template: TemplateId,
    pub model: Mat4,
    /// Premultiplied; alpha is the rendered opacity.
    pub color: Color,
    pub style: MeshStyle,
}

/// Everything a surface needs to draw one animator frame.
///
/// The animator owns one `Frame` and rewrites it in place every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub view_proj: Mat4,
    pub eye: Vec3,
    pub draws: Vec<ShapeDraw>,
}

impl Frame {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            draws: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.view_proj = Mat4::IDENTITY;
        self.eye = Vec3::ZERO;
        self.draws.clear();
    }
}

/// What happened to a submitted frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Drawn,
    /// The surface failed; the frame was dropped and the next one still scheduled.
    Skipped,
}

impl FrameOutcome {
    pub fn from_draw(result: &Result<(), SurfaceError>) -> Self {
        match result {
            Ok(()) => Self::Drawn,
            Err(_) => Self::Skipped,
        }
    }
}

/// Opaque drawing target sized to the viewport.
///
/// The animator exclusively owns its surface between mount and teardown.
pub trait RenderSurface {
    /// Uploads a static mesh template. Called once per distinct geometry on mount.
    fn upload_template(&mut self, mesh: &Mesh) -> Result<TemplateId, SurfaceError>;

    fn release_template(&mut self, id: TemplateId);

    /// Resizes the output. Only called with valid viewports.
    fn resize(&mut self, viewport: Viewport);

    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError>;

    /// Releases every remaining resource. The surface is not used afterwards.
    fn release(&mut self);
}

/// Surface that draws nothing and records what it was asked to do.
///
/// Used headless and in tests.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub viewport: Viewport,
    pub uploads: usize,
    pub live_templates: Vec<TemplateId>,
    pub frames_drawn: usize,
    pub last_frame: Option<Frame>,
    pub released: bool,
    /// When set, every `draw` fails with this error.
    pub fail_draw: Option<SurfaceError>,
    next_id: u32,
}

impl NullSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport, ..Self::default() }
    }
}

impl RenderSurface for NullSurface {
    fn upload_template(&mut self, mesh: &Mesh) -> Result<TemplateId, SurfaceError> {
        if !mesh.is_valid() {
            return Err(SurfaceError::InvalidTemplate("out-of-range index or non-finite vertex".into()));
        }
        let id = TemplateId(self.next_id);
        self.next_id += 1;
        self.uploads += 1;
        self.live_templates.push(id);
        Ok(id)
    }

    fn release_template(&mut self, id: TemplateId) {
        self.live_templates.retain(|t| *t != id);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        if let Some(err) = &self.fail_draw {
            return Err(err.clone());
        }
        if let Some(draw) = frame.draws.iter().find(|d| !self.live_templates.contains(&d.template)) {
            return Err(SurfaceError::UnknownTemplate(draw.template.0));
        }
        self.frames_drawn += 1;
        match &mut self.last_frame {
            Some(last) => last.clone_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
        Ok(())
    }

    fn release(&mut self) {
        self.live_templates.clear();
        self.released = true;
    }
}
