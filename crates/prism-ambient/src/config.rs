use prism_engine::paint::Color;

use crate::camera::CameraConfig;
use crate::error::{AmbientError, Result};
use crate::geometry::{GeometrySpec, default_geometry_table};
use crate::material::{Material, default_materials, default_palette};

/// Allowed shape population per mount.
pub const POPULATION_RANGE: std::ops::RangeInclusive<usize> = 8..=15;

/// Animator configuration.
///
/// Per-frame quantities (`velocity_range`, `rotation_speed_range`) are in
/// units per tick. `pulse_speed` is in radians per second of elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorConfig {
    pub population: usize,
    /// Seed for the shape generator. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Radius of the sphere initial positions are sampled on.
    pub sphere_radius: f32,
    /// Per-axis magnitude past which a position is reflected.
    pub boundary: f32,
    /// Factor applied to a reflected position; must be in `(0, 1)`.
    pub damping: f32,

    /// Half-width of the symmetric per-axis velocity range.
    pub velocity_range: f32,
    /// Half-width of the symmetric per-axis rotation speed range.
    pub rotation_speed_range: f32,

    pub pulse_speed: (f32, f32),
    pub pulse_amplitude: f32,
    pub base_scale: (f32, f32),
    pub opacity_amplitude: f32,
    /// Opacity of the whole layer, multiplied into every shape.
    pub layer_opacity: f32,

    pub parallax: f32,
    pub smoothing: f32,
    pub camera: CameraConfig,

    pub palette: Vec<Color>,
    pub geometry: Vec<GeometrySpec>,
    pub materials: Vec<Material>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            population: 12,
            seed: None,
            sphere_radius: 15.0,
            boundary: 20.0,
            damping: 0.9,
            velocity_range: 0.0005,
            rotation_speed_range: 0.0005,
            pulse_speed: (0.001, 0.003),
            pulse_amplitude: 0.1,
            base_scale: (0.8, 1.2),
            opacity_amplitude: 0.25,
            layer_opacity: 0.7,
            parallax: 0.2,
            smoothing: 0.02,
            camera: CameraConfig::default(),
            palette: default_palette(),
            geometry: default_geometry_table(),
            materials: default_materials(),
        }
    }
}

impl AnimatorConfig {
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects configurations that would break the simulation invariants.
    pub fn validate(&self) -> Result<()> {
        fn invalid<T>(msg: String) -> Result<T> {
            Err(AmbientError::InvalidConfig(msg))
        }

        if !POPULATION_RANGE.contains(&self.population) {
            return invalid(format!(
                "population {} outside {}..={}",
                self.population,
                POPULATION_RANGE.start(),
                POPULATION_RANGE.end()
            ));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return invalid(format!("damping {} must be in (0, 1)", self.damping));
        }
        if !(self.boundary.is_finite() && self.boundary > 0.0) {
            return invalid(format!("boundary {} must be positive", self.boundary));
        }
        if !(self.sphere_radius.is_finite() && self.sphere_radius >= 0.0) {
            return invalid(format!("sphere radius {} must be non-negative", self.sphere_radius));
        }
        for (name, v) in [
            ("velocity range", self.velocity_range),
            ("rotation speed range", self.rotation_speed_range),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return invalid(format!("{name} {v} must be non-negative"));
            }
        }

        let (lo, hi) = self.pulse_speed;
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return invalid(format!("pulse speed range {lo}..{hi} must be positive and ordered"));
        }
        if !(self.pulse_amplitude >= 0.0 && self.pulse_amplitude < 1.0) {
            return invalid(format!("pulse amplitude {} must be in [0, 1)", self.pulse_amplitude));
        }
        let (lo, hi) = self.base_scale;
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return invalid(format!("base scale range {lo}..{hi} must be positive and ordered"));
        }
        if !(self.opacity_amplitude >= 0.0 && self.opacity_amplitude <= 1.0) {
            return invalid(format!("opacity amplitude {} must be in [0, 1]", self.opacity_amplitude));
        }
        if !(self.layer_opacity >= 0.0 && self.layer_opacity <= 1.0) {
            return invalid(format!("layer opacity {} must be in [0, 1]", self.layer_opacity));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return invalid(format!("smoothing {} must be in (0, 1]", self.smoothing));
        }
        if !self.parallax.is_finite() {
            return invalid("parallax must be finite".to_string());
        }

        self.camera.validate()?;

        if self.palette.is_empty() {
            return invalid("palette is empty".to_string());
        }
        if self.geometry.is_empty() {
            return invalid("geometry table is empty".to_string());
        }
        if let Some(spec) = self.geometry.iter().find(|s| !s.is_valid()) {
            return invalid(format!("geometry {:?} has non-positive size", spec.kind));
        }
        if self.materials.is_empty() {
            return invalid("material table is empty".to_string());
        }
        for m in &self.materials {
            if m.color_index >= self.palette.len() {
                return invalid(format!(
                    "material color index {} outside palette of {}",
                    m.color_index,
                    self.palette.len()
                ));
            }
            if !(m.opacity >= 0.0 && m.opacity <= 1.0) {
                return invalid(format!("material opacity {} must be in [0, 1]", m.opacity));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(AnimatorConfig::default().validate().is_ok());
    }

    #[test]
    fn population_bounds() {
        for population in [8, 12, 15] {
            assert!(AnimatorConfig::default().with_population(population).validate().is_ok());
        }
        for population in [0, 7, 16] {
            let err = AnimatorConfig::default()
                .with_population(population)
                .validate()
                .unwrap_err();
            assert!(matches!(err, AmbientError::InvalidConfig(_)));
        }
    }

    #[test]
    fn damping_must_shrink() {
        for damping in [1.0, 1.5, 0.0, f32::NAN] {
            let cfg = AnimatorConfig { damping, ..AnimatorConfig::default() };
            assert!(cfg.validate().is_err(), "damping {damping} accepted");
        }
    }

    #[test]
    fn material_must_reference_palette() {
        let mut cfg = AnimatorConfig::default();
        cfg.materials.push(Material::solid(99, 0.1));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn degenerate_camera_rejected() {
        let mut cfg = AnimatorConfig::default();
        cfg.camera.near = 0.0;
        assert!(cfg.validate().is_err());
    }
}
