use glam::{Mat4, Vec2, Vec3};
use prism_engine::coords::Viewport;

use crate::error::{AmbientError, Result};

/// Projection parameters and the resting distance of the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial position is `(0, 0, distance)`.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            distance: 8.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        let ok = self.fov_y_degrees > 0.0
            && self.fov_y_degrees < 180.0
            && self.near > 0.0
            && self.far > self.near
            && self.far.is_finite()
            && self.distance.is_finite()
            && self.distance > 0.0;
        if ok {
            Ok(())
        } else {
            Err(AmbientError::InvalidConfig(format!("degenerate camera: {self:?}")))
        }
    }
}

/// Perspective camera that always looks at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    position: Vec3,
    aspect: f32,
}

impl Camera {
    /// Creates a camera at rest. A degenerate viewport falls back to a square aspect.
    pub fn new(config: CameraConfig, viewport: Viewport) -> Self {
        Self {
            config,
            position: Vec3::new(0.0, 0.0, config.distance),
            aspect: viewport.aspect().unwrap_or(1.0),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Updates the aspect ratio. Degenerate viewports are ignored; returns
    /// whether the projection changed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        match viewport.aspect() {
            Some(aspect) if aspect != self.aspect => {
                self.aspect = aspect;
                true
            }
            _ => false,
        }
    }

    /// Moves the camera one smoothing step toward `pointer * parallax` in the xy plane.
    pub fn follow(&mut self, pointer: Vec2, parallax: f32, smoothing: f32) {
        let target = pointer * parallax;
        let xy = self.position.truncate();
        let xy = xy + (target - xy) * smoothing;
        self.position.x = xy.x;
        self.position.y = xy.y;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_y_degrees.to_radians(),
            self.aspect,
            self.config.near,
            self.config.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraConfig::default(), Viewport::new(1600.0, 900.0))
    }

    #[test]
    fn starts_on_z_axis() {
        let cam = camera();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 8.0));
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = camera();
        let before = cam.projection();
        assert!(!cam.set_viewport(Viewport::new(0.0, 900.0)));
        assert!(!cam.set_viewport(Viewport::new(1600.0, 0.0)));
        assert_eq!(cam.projection(), before);
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn resize_changes_projection_only() {
        let mut cam = camera();
        let pos = cam.position();
        let proj = cam.projection();
        assert!(cam.set_viewport(Viewport::new(800.0, 800.0)));
        assert_eq!(cam.position(), pos);
        assert_ne!(cam.projection(), proj);
    }

    #[test]
    fn follow_converges_without_overshoot() {
        let mut cam = camera();
        let mut last = cam.position();
        for _ in 0..2000 {
            cam.follow(Vec2::ONE, 0.2, 0.02);
            let p = cam.position();
            assert!(p.x >= last.x && p.y >= last.y);
            assert!(p.x <= 0.2 + 1e-6 && p.y <= 0.2 + 1e-6);
            assert_eq!(p.z, 8.0);
            last = p;
        }
        assert!((last.x - 0.2).abs() < 1e-4);
        assert!((last.y - 0.2).abs() < 1e-4);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = camera();
        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
