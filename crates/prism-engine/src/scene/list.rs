use glam::{Mat4, Vec3};

use super::{MeshCmd, SortKey};

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: MeshCmd,
}

/// Recorded draw stream for a frame, with the camera it is viewed from.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame
///   allocation once warmed
#[derive(Debug)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,

    view_proj: Mat4,
    eye: Vec3,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_order: 0,
            sorted_indices: Vec::new(),
            sorted_dirty: false,
            view_proj: Mat4::IDENTITY,
            eye: Vec3::ZERO,
        }
    }
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            sorted_indices: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Starts a new frame seen through `view_proj` from `eye`.
    ///
    /// Clears recorded items but keeps allocated capacity.
    pub fn begin(&mut self, view_proj: Mat4, eye: Vec3) {
        self.items.clear();
        self.sorted_indices.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.view_proj = view_proj;
        self.eye = eye;
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Records a mesh draw. Depth is measured from the eye to the model origin.
    pub fn push(&mut self, cmd: MeshCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        let depth = self.eye.distance(cmd.model.w_axis.truncate());
        self.items.push(DrawItem {
            key: SortKey::new(depth, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items back-to-front without cloning draw commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // Keys are unique: insertion order breaks depth ties.
        self.sorted_indices
            .sort_unstable_by(|&a, &b| self.items[a].key.cmp(&self.items[b].key));

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::scene::{MeshHandle, MeshStyle};

    fn cmd_at(mesh: u32, z: f32) -> MeshCmd {
        MeshCmd {
            mesh: MeshHandle(mesh),
            model: Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
            color: Color::from_hex(0xffffff),
            style: MeshStyle::Solid,
        }
    }

    #[test]
    fn paint_order_is_back_to_front() {
        let mut list = DrawList::new();
        list.begin(Mat4::IDENTITY, Vec3::new(0.0, 0.0, 8.0));
        list.push(cmd_at(0, 5.0));
        list.push(cmd_at(1, -10.0));
        list.push(cmd_at(2, 0.0));

        let order: Vec<u32> = list.iter_in_paint_order().map(|i| i.cmd.mesh.0).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn begin_clears_items_and_keeps_camera() {
        let mut list = DrawList::with_capacity(4);
        list.begin(Mat4::IDENTITY, Vec3::ZERO);
        list.push(cmd_at(0, 1.0));
        let eye = Vec3::new(1.0, 2.0, 3.0);
        list.begin(Mat4::IDENTITY, eye);
        assert!(list.is_empty());
        assert_eq!(list.eye(), eye);
        assert_eq!(list.iter_in_paint_order().count(), 0);
    }
}
