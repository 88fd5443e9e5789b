use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3};
use prism_engine::scene::MeshStyle;
use rand::Rng;

use crate::config::AnimatorConfig;
use crate::geometry::GeometrySpec;
use crate::surface::TemplateId;

/// One animated ambient mesh instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: GeometrySpec,
    pub template: TemplateId,
    pub style: MeshStyle,
    pub color_index: usize,

    pub position: Vec3,
    /// Euler angles, applied in XYZ order.
    pub rotation: Vec3,
    pub velocity: Vec3,
    pub rotation_speed: Vec3,

    pub pulse_phase: f32,
    pub pulse_speed: f32,
    pub base_scale: f32,
    pub base_opacity: f32,

    pub scale: f32,
    pub opacity: f32,
}

impl Shape {
    /// Spawns the `index`-th shape of a population. Geometry and material are
    /// picked round-robin from the config tables; motion parameters are random.
    ///
    /// `template` must be the template uploaded for `config.geometry[index % len]`.
    pub fn spawn<R: Rng>(
        index: usize,
        config: &AnimatorConfig,
        template: TemplateId,
        rng: &mut R,
    ) -> Self {
        let geometry = config.geometry[index % config.geometry.len()];
        let material = config.materials[index % config.materials.len()];

        let theta = rng.gen_range(0.0..TAU);
        let phi = rng.gen_range(-1.0f32..=1.0).acos();
        let position = Vec3::new(
            phi.sin() * theta.cos(),
            phi.sin() * theta.sin(),
            phi.cos(),
        ) * config.sphere_radius;

        let rotation = Vec3::new(
            rng.gen_range(0.0..=PI),
            rng.gen_range(0.0..=PI),
            rng.gen_range(0.0..=PI),
        );
        let velocity = symmetric(rng, config.velocity_range);
        let rotation_speed = symmetric(rng, config.rotation_speed_range);

        let pulse_phase = rng.gen_range(0.0..TAU);
        let pulse_speed = lerp(config.pulse_speed, rng.gen_range(0.0..=1.0));
        let base_scale = lerp(config.base_scale, rng.gen_range(0.0..=1.0));

        Self {
            geometry,
            template,
            style: material.style,
            color_index: material.color_index,
            position,
            rotation,
            velocity,
            rotation_speed,
            pulse_phase,
            pulse_speed,
            base_scale,
            base_opacity: material.opacity,
            scale: base_scale,
            opacity: material.opacity,
        }
    }

    /// Advances one tick at `elapsed` seconds.
    ///
    /// Returns `false` when the position had gone non-finite and was reset to
    /// the origin.
    pub fn advance(&mut self, elapsed: f32, config: &AnimatorConfig) -> bool {
        self.position += self.velocity;
        self.rotation += self.rotation_speed;

        let wave = (elapsed * self.pulse_speed + self.pulse_phase).sin();
        self.scale = self.base_scale * (1.0 + config.pulse_amplitude * wave);
        self.opacity = self.base_opacity * (1.0 + config.opacity_amplitude * wave);

        for axis in 0..3 {
            if self.position[axis].abs() > config.boundary {
                self.position[axis] = -self.position[axis] * config.damping;
            }
        }

        if self.position.is_finite() && self.velocity.is_finite() {
            return true;
        }
        self.position = Vec3::ZERO;
        if !self.velocity.is_finite() {
            self.velocity = Vec3::ZERO;
        }
        false
    }

    /// Object-to-world transform.
    pub fn model(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

fn symmetric<R: Rng>(rng: &mut R, half_width: f32) -> Vec3 {
    let mut axis = || rng.gen_range(-1.0f32..=1.0) * half_width;
    Vec3::new(axis(), axis(), axis())
}

fn lerp((lo, hi): (f32, f32), t: f32) -> f32 {
    lo + (hi - lo) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spawn_all(config: &AnimatorConfig, seed: u64) -> Vec<Shape> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..config.population)
            .map(|i| Shape::spawn(i, config, TemplateId(i as u32), &mut rng))
            .collect()
    }

    #[test]
    fn spawned_parameters_in_range() {
        let config = AnimatorConfig::default();
        for shape in spawn_all(&config, 7) {
            assert!((shape.position.length() - 15.0).abs() < 1e-3);
            assert!(shape.rotation.cmpge(Vec3::ZERO).all() && shape.rotation.cmple(Vec3::splat(PI)).all());
            assert!(shape.velocity.abs().max_element() <= 0.0005);
            assert!(shape.rotation_speed.abs().max_element() <= 0.0005);
            assert!((0.001..=0.003).contains(&shape.pulse_speed));
            assert!((0.0..=TAU).contains(&shape.pulse_phase));
            assert!((0.8..=1.2).contains(&shape.base_scale));
        }
    }

    #[test]
    fn zero_motion_ranges_spawn_static_shapes() {
        let config = AnimatorConfig {
            velocity_range: 0.0,
            rotation_speed_range: 0.0,
            pulse_speed: (0.002, 0.002),
            ..AnimatorConfig::default()
        };
        for shape in spawn_all(&config, 11) {
            assert_eq!(shape.velocity, Vec3::ZERO);
            assert_eq!(shape.rotation_speed, Vec3::ZERO);
            assert_eq!(shape.pulse_speed, 0.002);
            assert!(shape.position.is_finite());
        }
    }

    #[test]
    fn tables_cycle_round_robin() {
        let config = AnimatorConfig::default();
        let shapes = spawn_all(&config, 1);
        assert_eq!(shapes[0].geometry, shapes[8].geometry);
        assert_eq!(shapes[0].style, MeshStyle::Wireframe);
        assert_eq!(shapes[1].style, MeshStyle::Solid);
        assert_eq!(shapes[4].color_index, shapes[0].color_index);
        assert_eq!(shapes[3].base_opacity, 0.06);
    }

    #[test]
    fn same_seed_same_population() {
        let config = AnimatorConfig::default();
        assert_eq!(spawn_all(&config, 42), spawn_all(&config, 42));
        assert_ne!(spawn_all(&config, 42), spawn_all(&config, 43));
    }

    #[test]
    fn reflection_flips_and_damps() {
        let config = AnimatorConfig::default();
        let mut shape = spawn_all(&config, 3).remove(0);
        shape.position = Vec3::new(config.boundary + 0.01, 0.0, 0.0);
        shape.velocity = Vec3::new(0.0004, 0.0, 0.0);

        let before = shape.position.x;
        assert!(shape.advance(0.0, &config));
        assert!(shape.position.x < 0.0);
        assert!(shape.position.x.abs() < before.abs());
    }

    #[test]
    fn non_finite_position_resets_to_origin() {
        let config = AnimatorConfig::default();
        let mut shape = spawn_all(&config, 3).remove(0);
        shape.velocity = Vec3::new(f32::NAN, 0.0, 0.0);

        assert!(!shape.advance(1.0, &config));
        assert_eq!(shape.position, Vec3::ZERO);
        assert_eq!(shape.velocity, Vec3::ZERO);
        assert!(shape.advance(2.0, &config));
    }

    #[test]
    fn model_places_shape_at_position() {
        let config = AnimatorConfig::default();
        let shape = spawn_all(&config, 5).remove(0);
        let origin = shape.model().transform_point3(Vec3::ZERO);
        assert!((origin - shape.position).length() < 1e-4);
    }
}
