//! Static mesh templates for the ambient shapes.
//!
//! Platonic solids are built from a unit base polyhedron, optionally subdivided
//! (`detail`), projected onto a sphere and scaled to the requested radius. The
//! dodecahedron is built as the dual of the icosahedron so its wireframe shows
//! pentagon outlines rather than the triangulation.

use std::collections::{BTreeSet, HashMap};
use std::f32::consts::TAU;

use glam::Vec3;
use prism_engine::scene::Mesh;

/// Geometry families a shape can be drawn with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Icosahedron,
    Octahedron,
    Tetrahedron,
    Dodecahedron,
    Torus,
    Cone,
    Sphere,
}

/// One entry of the geometry table: kind, size and subdivision level.
///
/// `detail` only affects the platonic solids.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeometrySpec {
    pub kind: GeometryKind,
    pub size: f32,
    pub detail: u32,
}

impl GeometrySpec {
    pub const fn new(kind: GeometryKind, size: f32) -> Self {
        Self { kind, size, detail: 0 }
    }

    pub const fn with_detail(mut self, detail: u32) -> Self {
        self.detail = detail;
        self
    }

    /// Identity used to share one template between shapes with equal specs.
    pub fn key(&self) -> (GeometryKind, u32, u32) {
        (self.kind, self.size.to_bits(), self.detail)
    }

    pub fn is_valid(&self) -> bool {
        self.size.is_finite() && self.size > 0.0
    }

    /// Builds the template mesh, centered on the origin.
    pub fn build(&self) -> Mesh {
        let r = self.size;
        match self.kind {
            GeometryKind::Icosahedron => polyhedron(&icosahedron_base(), r, self.detail),
            GeometryKind::Octahedron => polyhedron(&octahedron_base(), r, self.detail),
            GeometryKind::Tetrahedron => polyhedron(&tetrahedron_base(), r, self.detail),
            GeometryKind::Dodecahedron => dodecahedron(r, self.detail),
            GeometryKind::Torus => torus(r, r * 0.3, 12, 24),
            GeometryKind::Cone => cone(r, r * 1.5, 8),
            GeometryKind::Sphere => uv_sphere(r, 16, 12),
        }
    }
}

/// The shape table cycled round-robin on mount.
pub fn default_geometry_table() -> Vec<GeometrySpec> {
    use GeometryKind::*;
    vec![
        GeometrySpec::new(Icosahedron, 1.2),
        GeometrySpec::new(Octahedron, 1.0),
        GeometrySpec::new(Tetrahedron, 0.8),
        GeometrySpec::new(Dodecahedron, 1.1),
        GeometrySpec::new(Torus, 0.7),
        GeometrySpec::new(Cone, 0.6),
        GeometrySpec::new(Icosahedron, 0.9).with_detail(1),
        GeometrySpec::new(Octahedron, 1.3),
    ]
}

struct Base {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

fn icosahedron_base() -> Base {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions = vec![
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let triangles = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    Base { positions, triangles }
}

fn octahedron_base() -> Base {
    let positions = vec![
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let triangles = vec![
        [0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
        [1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
    ];
    Base { positions, triangles }
}

fn tetrahedron_base() -> Base {
    let positions = vec![
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ];
    let triangles = vec![[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];
    Base { positions, triangles }
}

/// Subdivides every face into `(detail + 1)^2` triangles, merges shared
/// vertices and projects everything onto the unit sphere.
fn subdivided(base: &Base, detail: u32) -> Base {
    let n = detail + 1;
    let mut positions: Vec<Vec3> = Vec::new();
    // Points are keyed by their integer barycentric weights over base vertices,
    // so points on a shared edge resolve to the same index from both faces.
    let mut lookup: HashMap<Vec<(u32, u32)>, u32> = HashMap::new();
    let mut triangles = Vec::with_capacity(base.triangles.len() * (n * n) as usize);

    let mut vertex = |weights: [(u32, u32); 3]| -> u32 {
        let mut key: Vec<(u32, u32)> = weights.into_iter().filter(|&(_, w)| w > 0).collect();
        key.sort_unstable();
        *lookup.entry(key).or_insert_with(|| {
            let p = weights.iter().fold(Vec3::ZERO, |acc, &(v, w)| {
                acc + base.positions[v as usize] * (w as f32 / n as f32)
            });
            positions.push(p.normalize());
            (positions.len() - 1) as u32
        })
    };

    for &[a, b, c] in &base.triangles {
        // grid[i][j] = a * (n - i - j) / n + b * i / n + c * j / n
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let row = (0..=n - i)
                .map(|j| vertex([(a, n - i - j), (b, i), (c, j)]))
                .collect();
            grid.push(row);
        }

        for i in 0..n as usize {
            let span = n as usize - i;
            for j in 0..span {
                triangles.push([grid[i][j], grid[i + 1][j], grid[i][j + 1]]);
                if j + 1 < span {
                    triangles.push([grid[i + 1][j], grid[i + 1][j + 1], grid[i][j + 1]]);
                }
            }
        }
    }

    Base { positions, triangles }
}

fn polyhedron(base: &Base, radius: f32, detail: u32) -> Mesh {
    let unit = subdivided(base, detail);
    let positions = unit.positions.into_iter().map(|p| p * radius).collect();
    Mesh::from_triangles(positions, unit.triangles)
}

/// Dual of the (optionally subdivided) icosahedron: one vertex per icosahedron
/// face, one pentagon per original vertex. Subdivided inputs also produce
/// hexagons around the new vertices, which are handled the same way.
fn dodecahedron(radius: f32, detail: u32) -> Mesh {
    let ico = subdivided(&icosahedron_base(), detail);

    let positions: Vec<Vec3> = ico
        .triangles
        .iter()
        .map(|&[a, b, c]| {
            let centroid =
                ico.positions[a as usize] + ico.positions[b as usize] + ico.positions[c as usize];
            centroid.normalize() * radius
        })
        .collect();

    let mut faces_around: Vec<Vec<u32>> = vec![Vec::new(); ico.positions.len()];
    for (face, tri) in ico.triangles.iter().enumerate() {
        for &v in tri {
            faces_around[v as usize].push(face as u32);
        }
    }

    let mut triangles = Vec::new();
    let mut edges = BTreeSet::new();

    for (v, ring) in faces_around.iter_mut().enumerate() {
        let normal = ico.positions[v];
        let u = normal.any_orthonormal_vector();
        let w = normal.cross(u);
        ring.sort_by(|&p, &q| {
            let angle = |i: u32| {
                let d = positions[i as usize];
                d.dot(w).atan2(d.dot(u))
            };
            angle(p).total_cmp(&angle(q))
        });

        for k in 1..ring.len().saturating_sub(1) {
            triangles.push([ring[0], ring[k], ring[k + 1]]);
        }
        for k in 0..ring.len() {
            let (a, b) = (ring[k], ring[(k + 1) % ring.len()]);
            edges.insert([a.min(b), a.max(b)]);
        }
    }

    Mesh::with_edges(positions, triangles, edges.into_iter().collect())
}

fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let mut positions = Vec::with_capacity((radial_segments * tubular_segments) as usize);
    for j in 0..radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let ring = radius + tube * v.cos();
            positions.push(Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
        }
    }

    let idx = |j: u32, i: u32| (j % radial_segments) * tubular_segments + (i % tubular_segments);
    let mut triangles = Vec::with_capacity(positions.len() * 2);
    for j in 0..radial_segments {
        for i in 0..tubular_segments {
            let a = idx(j, i);
            let b = idx(j + 1, i);
            let c = idx(j + 1, i + 1);
            let d = idx(j, i + 1);
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }

    Mesh::from_triangles(positions, triangles)
}

/// Closed cone standing on the y axis, centered on its mid-height.
fn cone(radius: f32, height: f32, segments: u32) -> Mesh {
    let half = height / 2.0;
    let mut positions = Vec::with_capacity(segments as usize + 2);
    positions.push(Vec3::new(0.0, half, 0.0));
    for i in 0..segments {
        let theta = i as f32 / segments as f32 * TAU;
        positions.push(Vec3::new(radius * theta.sin(), -half, radius * theta.cos()));
    }
    positions.push(Vec3::new(0.0, -half, 0.0));

    let apex = 0;
    let center = segments + 1;
    let ring = |i: u32| 1 + i % segments;

    let mut triangles = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        triangles.push([apex, ring(i), ring(i + 1)]);
        triangles.push([center, ring(i + 1), ring(i)]);
    }

    Mesh::from_triangles(positions, triangles)
}

fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let mut positions = vec![Vec3::new(0.0, radius, 0.0)];
    for y in 1..height_segments {
        let phi = y as f32 / height_segments as f32 * std::f32::consts::PI;
        for x in 0..width_segments {
            let theta = x as f32 / width_segments as f32 * TAU;
            positions.push(Vec3::new(
                -radius * theta.cos() * phi.sin(),
                radius * phi.cos(),
                radius * theta.sin() * phi.sin(),
            ));
        }
    }
    positions.push(Vec3::new(0.0, -radius, 0.0));

    let top = 0;
    let bottom = (positions.len() - 1) as u32;
    let rings = height_segments - 1;
    let at = |ring: u32, x: u32| 1 + ring * width_segments + x % width_segments;

    let mut triangles = Vec::new();
    for x in 0..width_segments {
        triangles.push([top, at(0, x + 1), at(0, x)]);
        triangles.push([bottom, at(rings - 1, x), at(rings - 1, x + 1)]);
    }
    for ring in 0..rings - 1 {
        for x in 0..width_segments {
            let a = at(ring, x);
            let b = at(ring + 1, x);
            let c = at(ring + 1, x + 1);
            let d = at(ring, x + 1);
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }

    Mesh::from_triangles(positions, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on_radius(mesh: &Mesh, r: f32) -> bool {
        mesh.positions.iter().all(|p| (p.length() - r).abs() < 1e-4)
    }

    #[test]
    fn tetrahedron_counts() {
        let m = GeometrySpec::new(GeometryKind::Tetrahedron, 0.8).build();
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.edges.len(), 6);
        assert_eq!(m.triangles.len(), 4);
        assert!(all_on_radius(&m, 0.8));
    }

    #[test]
    fn octahedron_counts() {
        let m = GeometrySpec::new(GeometryKind::Octahedron, 1.3).build();
        assert_eq!(m.vertex_count(), 6);
        assert_eq!(m.edges.len(), 12);
        assert_eq!(m.triangles.len(), 8);
        assert!(all_on_radius(&m, 1.3));
    }

    #[test]
    fn icosahedron_counts() {
        let m = GeometrySpec::new(GeometryKind::Icosahedron, 1.2).build();
        assert_eq!(m.vertex_count(), 12);
        assert_eq!(m.edges.len(), 30);
        assert_eq!(m.triangles.len(), 20);
        assert!(all_on_radius(&m, 1.2));
    }

    #[test]
    fn subdivided_icosahedron_shares_vertices() {
        let m = GeometrySpec::new(GeometryKind::Icosahedron, 0.9)
            .with_detail(1)
            .build();
        assert_eq!(m.triangles.len(), 80);
        assert_eq!(m.vertex_count(), 42);
        assert_eq!(m.edges.len(), 120);
        assert!(all_on_radius(&m, 0.9));
    }

    #[test]
    fn dodecahedron_has_pentagon_outlines() {
        let m = GeometrySpec::new(GeometryKind::Dodecahedron, 1.1).build();
        assert_eq!(m.vertex_count(), 20);
        assert_eq!(m.edges.len(), 30);
        assert_eq!(m.triangles.len(), 36);
        assert!(all_on_radius(&m, 1.1));
        assert!(m.is_valid());

        // Every vertex of a dodecahedron joins exactly three pentagon edges.
        let mut degree = vec![0; m.vertex_count()];
        for [a, b] in &m.edges {
            degree[*a as usize] += 1;
            degree[*b as usize] += 1;
        }
        assert!(degree.iter().all(|&d| d == 3));
    }

    #[test]
    fn torus_cone_and_sphere_are_well_formed() {
        let torus = GeometrySpec::new(GeometryKind::Torus, 0.7).build();
        assert_eq!(torus.vertex_count(), 12 * 24);
        assert_eq!(torus.triangles.len(), 2 * 12 * 24);
        assert!((torus.bounding_radius() - 0.7 * 1.3).abs() < 1e-4);

        let cone = GeometrySpec::new(GeometryKind::Cone, 0.6).build();
        assert_eq!(cone.vertex_count(), 10);
        assert_eq!(cone.triangles.len(), 16);
        assert_eq!(cone.edges.len(), 24);

        let sphere = GeometrySpec::new(GeometryKind::Sphere, 1.0).build();
        assert!(all_on_radius(&sphere, 1.0));

        for m in [&torus, &cone, &sphere] {
            assert!(m.is_valid());
        }
    }

    #[test]
    fn table_keys_distinguish_size_and_detail() {
        let table = default_geometry_table();
        assert_eq!(table.len(), 8);
        let keys: BTreeSet<_> = table.iter().map(GeometrySpec::key).collect();
        assert_eq!(keys.len(), 8);
        assert!(table.iter().all(GeometrySpec::is_valid));
    }
}
