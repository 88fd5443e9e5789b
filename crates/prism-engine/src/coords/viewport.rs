/// Viewport size in logical pixels.
///
/// Cameras derive their aspect ratio from it; pointer positions are normalized against it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Returns `None` for degenerate (minimized, zero-sized) viewports.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        self.is_valid().then(|| self.width / self.height)
    }

    /// Maps a logical pixel position to normalized device coordinates.
    ///
    /// `x` maps left..right to `-1..1`, `y` maps top..bottom to `1..-1`.
    /// Results are clamped so positions outside the window never exceed the unit square.
    pub fn normalize(self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.is_valid() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let nx = (x / self.width) * 2.0 - 1.0;
        let ny = -(y / self.height) * 2.0 + 1.0;
        Some((nx.clamp(-1.0, 1.0), ny.clamp(-1.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_valid_viewport() {
        assert_eq!(Viewport::new(1600.0, 800.0).aspect(), Some(2.0));
    }

    #[test]
    fn aspect_of_zero_height_is_none() {
        assert_eq!(Viewport::new(1280.0, 0.0).aspect(), None);
    }

    #[test]
    fn normalize_corners_and_center() {
        let vp = Viewport::new(200.0, 100.0);
        assert_eq!(vp.normalize(0.0, 0.0), Some((-1.0, 1.0)));
        assert_eq!(vp.normalize(200.0, 100.0), Some((1.0, -1.0)));
        assert_eq!(vp.normalize(100.0, 50.0), Some((0.0, 0.0)));
    }

    #[test]
    fn normalize_clamps_outside_positions() {
        let vp = Viewport::new(100.0, 100.0);
        assert_eq!(vp.normalize(-50.0, 300.0), Some((-1.0, -1.0)));
    }

    #[test]
    fn normalize_rejects_degenerate_viewport() {
        assert_eq!(Viewport::new(0.0, 0.0).normalize(1.0, 1.0), None);
    }
}
