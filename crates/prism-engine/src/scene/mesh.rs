use std::collections::BTreeSet;

use glam::Vec3;

/// CPU-side mesh template: positions plus triangle and edge topology.
///
/// Templates are built once and uploaded to a renderer; instances reference
/// them through a `MeshHandle` and supply their own transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Triangle list used by the solid style.
    pub triangles: Vec<[u32; 3]>,
    /// Line list used by the wireframe style.
    pub edges: Vec<[u32; 2]>,
}

impl Mesh {
    /// Builds a mesh whose wireframe shows every triangle edge.
    pub fn from_triangles(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let edges = edges_of(&triangles);
        Self { positions, triangles, edges }
    }

    /// Builds a mesh with an explicit wireframe (e.g. polygon outlines without
    /// the triangulation diagonals).
    pub fn with_edges(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>, edges: Vec<[u32; 2]>) -> Self {
        Self { positions, triangles, edges }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Largest distance from the origin to any vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    /// Scales every vertex in place.
    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.positions {
            *p *= factor;
        }
    }

    /// Triangle indices flattened for upload.
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Edge indices flattened for upload.
    pub fn edge_indices(&self) -> Vec<u32> {
        self.edges.iter().flatten().copied().collect()
    }

    /// True when every index is in range and every position is finite.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len() as u32;
        self.positions.iter().all(|p| p.is_finite())
            && self.triangles.iter().flatten().all(|&i| i < n)
            && self.edges.iter().flatten().all(|&i| i < n)
    }
}

/// Unique undirected edges of a triangle list, in a deterministic order.
fn edges_of(triangles: &[[u32; 3]]) -> Vec<[u32; 2]> {
    let mut set = BTreeSet::new();
    for &[a, b, c] in triangles {
        for (i, j) in [(a, b), (b, c), (c, a)] {
            if i != j {
                set.insert([i.min(j), i.max(j)]);
            }
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::from_triangles(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn shared_edges_are_deduplicated() {
        // Four outline edges plus the shared diagonal.
        assert_eq!(quad().edges.len(), 5);
    }

    #[test]
    fn flattened_indices_preserve_order() {
        let m = quad();
        assert_eq!(m.triangle_indices(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(m.edge_indices().len(), 10);
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let mut m = quad();
        assert!(m.is_valid());
        m.edges.push([0, 9]);
        assert!(!m.is_valid());
    }

    #[test]
    fn scale_changes_bounding_radius() {
        let mut m = quad();
        let r = m.bounding_radius();
        m.scale(2.0);
        assert!((m.bounding_radius() - 2.0 * r).abs() < 1e-6);
    }
}
