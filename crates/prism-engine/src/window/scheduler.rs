use winit::window::WindowId;

/// Handle of one requested frame.
///
/// Tickets are unique for the lifetime of a scheduler and are never reused,
/// so cancelling a stale ticket can never revoke someone else's request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FrameTicket(u64);

impl FrameTicket {
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// One-shot frame requests per target (window).
///
/// A request stays pending until its target is serviced (`take_due`) or the
/// ticket is cancelled. Servicing fires every pending ticket of that target at
/// once, so several requests made before a redraw produce a single frame.
#[derive(Debug)]
pub struct FrameScheduler<K = WindowId> {
    next: u64,
    pending: Vec<(FrameTicket, K)>,
}

impl<K> Default for FrameScheduler<K> {
    fn default() -> Self {
        Self {
            next: 1,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> FrameScheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests one frame for `target`.
    pub fn request(&mut self, target: K) -> FrameTicket {
        let ticket = FrameTicket(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending.push((ticket, target));
        ticket
    }

    /// Revokes a pending request. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, ticket: FrameTicket) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(t, _)| *t != ticket);
        self.pending.len() != before
    }

    pub fn is_pending(&self, ticket: FrameTicket) -> bool {
        self.pending.iter().any(|(t, _)| *t == ticket)
    }

    /// Whether `target` has at least one outstanding request.
    pub fn has_pending(&self, target: K) -> bool {
        self.pending.iter().any(|(_, k)| *k == target)
    }

    /// Fires every pending request of `target` and returns how many fired.
    pub fn take_due(&mut self, target: K) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(_, k)| *k != target);
        before - self.pending.len()
    }

    /// Drops all requests of a target that no longer exists.
    pub fn forget(&mut self, target: K) {
        self.take_due(target);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
