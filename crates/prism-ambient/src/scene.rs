use glam::Vec2;
use prism_engine::coords::Viewport;
use rand::Rng;

use crate::camera::Camera;
use crate::config::AnimatorConfig;
use crate::shape::Shape;
use crate::surface::{Frame, ShapeDraw, TemplateId};

/// Simulation state of one mount: the shape population, the camera and the
/// last known pointer. Knows nothing about surfaces or hosts.
#[derive(Debug, Clone)]
pub struct AmbientScene {
    config: AnimatorConfig,
    shapes: Vec<Shape>,
    camera: Camera,
    /// Normalized pointer, `[-1, 1]` on both axes.
    pointer: Vec2,
    viewport: Viewport,
    non_finite_reported: bool,
}

impl AmbientScene {
    /// Spawns `config.population` shapes. `templates[i]` is the template for
    /// `config.geometry[i]`.
    pub fn spawn<R: Rng>(
        config: &AnimatorConfig,
        viewport: Viewport,
        templates: &[TemplateId],
        rng: &mut R,
    ) -> Self {
        debug_assert_eq!(templates.len(), config.geometry.len());
        let shapes = (0..config.population)
            .map(|i| Shape::spawn(i, config, templates[i % templates.len()], rng))
            .collect();
        Self::from_shapes(config.clone(), viewport, shapes)
    }

    pub fn from_shapes(config: AnimatorConfig, viewport: Viewport, shapes: Vec<Shape>) -> Self {
        let camera = Camera::new(config.camera, viewport);
        Self {
            config,
            shapes,
            camera,
            pointer: Vec2::ZERO,
            viewport,
            non_finite_reported: false,
        }
    }

    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Mutable access to shape state. The population itself cannot change.
    #[inline]
    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Advances every shape and the camera by one tick. `elapsed` is seconds
    /// since the first tick of this mount.
    pub fn step(&mut self, elapsed: f32) {
        let mut reset = 0;
        for shape in &mut self.shapes {
            if !shape.advance(elapsed, &self.config) {
                reset += 1;
            }
        }
        if reset > 0 && !self.non_finite_reported {
            self.non_finite_reported = true;
            log::warn!("reset {reset} shape(s) with non-finite position to the origin");
        }

        self.camera
            .follow(self.pointer, self.config.parallax, self.config.smoothing);
    }

    /// Stores a pointer position given in logical pixels of the current
    /// viewport. Ignored while the viewport is degenerate.
    pub fn set_pointer(&mut self, x: f32, y: f32) -> bool {
        match self.viewport.normalize(x, y) {
            Some((nx, ny)) => {
                self.pointer = Vec2::new(nx, ny);
                true
            }
            None => false,
        }
    }

    /// Applies a viewport resize to the camera only. Degenerate viewports are
    /// ignored and `false` is returned.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
        true
    }

    /// Rewrites `frame` with the current camera and one draw per shape.
    pub fn write_frame(&self, frame: &mut Frame) {
        frame.clear();
        frame.view_proj = self.camera.view_proj();
        frame.eye = self.camera.position();

        let layer = self.config.layer_opacity;
        frame.draws.extend(self.shapes.iter().map(|shape| {
            let base = self.config.palette[shape.color_index % self.config.palette.len()];
            ShapeDraw {
                template: shape.template,
                model: shape.model(),
                color: base.with_alpha(shape.opacity * layer),
                style: shape.style,
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scene(population: usize, seed: u64) -> AmbientScene {
        let config = AnimatorConfig::default().with_population(population);
        let templates: Vec<TemplateId> = (0..config.geometry.len() as u32).map(TemplateId).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        AmbientScene::spawn(&config, Viewport::new(1280.0, 720.0), &templates, &mut rng)
    }

    #[test]
    fn positions_stay_bounded() {
        let mut s = scene(12, 11);
        // Exaggerated velocities so shapes cross the boundary many times.
        for shape in s.shapes_mut() {
            shape.velocity = shape.velocity.signum() * 0.75;
        }
        let limit = s.config().boundary / s.config().damping;
        for frame in 0..5000 {
            s.step(frame as f32 / 60.0);
            for shape in s.shapes() {
                assert!(shape.position.abs().max_element() <= limit, "{:?}", shape.position);
            }
        }
    }

    #[test]
    fn scale_stays_positive() {
        let mut s = scene(15, 2);
        for frame in 0..2000 {
            // Large elapsed values sweep the whole sine period.
            s.step(frame as f32 * 10.0);
            for shape in s.shapes() {
                assert!(shape.scale > 0.0);
                assert!(shape.scale >= shape.base_scale * 0.9 - 1e-6);
                assert!(shape.scale <= shape.base_scale * 1.1 + 1e-6);
            }
        }
    }

    #[test]
    fn population_is_invariant() {
        let mut s = scene(10, 5);
        let templates: Vec<_> = s.shapes().iter().map(|sh| sh.template).collect();
        for frame in 0..1000 {
            s.step(frame as f32 / 60.0);
        }
        assert_eq!(s.shapes().len(), 10);
        let after: Vec<_> = s.shapes().iter().map(|sh| sh.template).collect();
        assert_eq!(templates, after);
    }

    #[test]
    fn resize_leaves_shapes_untouched() {
        let mut s = scene(12, 9);
        for frame in 0..10 {
            s.step(frame as f32 / 60.0);
        }
        let shapes = s.shapes().to_vec();
        let projection = s.camera().projection();

        assert!(s.resize(Viewport::new(640.0, 960.0)));

        assert_eq!(s.shapes(), &shapes[..]);
        assert_ne!(s.camera().projection(), projection);
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let mut s = scene(12, 9);
        let projection = s.camera().projection();
        assert!(!s.resize(Viewport::new(0.0, 0.0)));
        assert_eq!(s.camera().projection(), projection);
        assert_eq!(s.viewport(), Viewport::new(1280.0, 720.0));
    }

    #[test]
    fn pointer_parallax_converges() {
        let mut s = scene(12, 4);
        assert!(s.set_pointer(1280.0, 0.0));
        assert_eq!(s.pointer(), Vec2::new(1.0, 1.0));

        let mut prev = s.camera().position();
        for frame in 0..3000 {
            s.step(frame as f32 / 60.0);
            let p = s.camera().position();
            assert!(p.x >= prev.x && p.x <= 0.2 + 1e-6);
            assert!(p.y >= prev.y && p.y <= 0.2 + 1e-6);
            prev = p;
        }
        assert!((prev.truncate() - Vec2::splat(0.2)).length() < 1e-4);
    }

    #[test]
    fn non_finite_guard_keeps_frame_finite() {
        let mut s = scene(8, 1);
        s.shapes_mut()[0].position = Vec3::new(f32::INFINITY, 0.0, 0.0);
        s.shapes_mut()[0].velocity = Vec3::new(f32::NAN, 0.0, 0.0);
        s.step(0.5);
        assert_eq!(s.shapes()[0].position, Vec3::ZERO);

        let mut frame = Frame::default();
        s.write_frame(&mut frame);
        assert!(frame.draws.iter().all(|d| d.model.is_finite() && d.color.is_finite()));
    }

    #[test]
    fn frame_has_one_draw_per_shape() {
        let mut s = scene(12, 8);
        s.step(0.0);
        let mut frame = Frame::with_capacity(12);
        s.write_frame(&mut frame);
        s.write_frame(&mut frame);

        assert_eq!(frame.draws.len(), 12);
        assert_eq!(frame.eye, s.camera().position());
        for (draw, shape) in frame.draws.iter().zip(s.shapes()) {
            assert_eq!(draw.template, shape.template);
            assert_eq!(draw.style, shape.style);
            assert!((draw.color.a - shape.opacity * 0.7).abs() < 1e-6);
        }
    }
}
