use prism_engine::paint::Color;
use prism_engine::scene::MeshStyle;

/// Material a shape is drawn with: rasterization style, palette entry and base opacity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub style: MeshStyle,
    pub color_index: usize,
    pub opacity: f32,
}

impl Material {
    pub const fn wireframe(color_index: usize, opacity: f32) -> Self {
        Self { style: MeshStyle::Wireframe, color_index, opacity }
    }

    pub const fn solid(color_index: usize, opacity: f32) -> Self {
        Self { style: MeshStyle::Solid, color_index, opacity }
    }
}

/// Purple, indigo, blue, cyan, emerald.
pub fn default_palette() -> Vec<Color> {
    [0x8b5cf6, 0x6366f1, 0x3b82f6, 0x06b6d4, 0x10b981]
        .into_iter()
        .map(Color::from_hex)
        .collect()
}

/// Alternates wireframe and solid styles over the first four palette entries.
pub fn default_materials() -> Vec<Material> {
    vec![
        Material::wireframe(0, 0.15),
        Material::solid(1, 0.08),
        Material::wireframe(2, 0.12),
        Material::solid(3, 0.06),
    ]
}
