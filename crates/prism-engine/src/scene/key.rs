use core::cmp::Ordering;

/// Paint-order key for translucent draw items.
///
/// Ordering rules:
/// 1) `depth`: descending (farther items are painted first)
/// 2) `order`: ascending (insertion order for equal depth)
#[derive(Debug, Copy, Clone)]
pub struct SortKey {
    /// Distance from the eye to the item's origin.
    pub depth: f32,
    /// Insertion index, ensuring stable ordering.
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(depth: f32, order: u32) -> Self {
        Self { depth, order }
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match other.depth.total_cmp(&self.depth) {
            Ordering::Equal => self.order.cmp(&other.order),
            o => o,
        }
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}
