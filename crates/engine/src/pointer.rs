//! Multi-pointer input tracking with per-frame velocity.
//!
//! Raw pointer/touch events arrive in surface-normalized coordinates and are
//! folded into a stable, indexed list of [`PointerState`] values. A synthetic
//! default pointer guarantees that `snapshot()[0]` always exists, so the
//! uniform composer never has to special-case "no pointer yet".

use std::slice;

/// One tracked input contact (mouse cursor or touch point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Stable identifier assigned at first contact, retired on release.
    pub id: u64,
    /// Position normalized to `[0, 1]` relative to the render surface.
    pub x: f32,
    pub y: f32,
    /// Signed displacement since the previous move, in normalized units.
    pub delta_x: f32,
    pub delta_y: f32,
}

impl PointerState {
    fn at(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            delta_x: 0.0,
            delta_y: 0.0,
        }
    }
}

/// Tracks every live pointer plus a synthetic default.
///
/// Unknown ids on move/end are handled permissively: input devices may
/// deliver out-of-order or duplicate events, so a move for an unseen id is
/// normalized into an implicit start and an end for an unseen id is ignored.
#[derive(Debug)]
pub struct PointerTracker {
    pointers: Vec<PointerState>,
    fallback: PointerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            pointers: Vec::new(),
            fallback: PointerState::at(u64::MAX, 0.0, 0.0),
        }
    }

    /// Inserts or resets the pointer for `id`: position set, velocity zeroed.
    pub fn pointer_start(&mut self, id: u64, x: f32, y: f32) {
        match self.pointers.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = PointerState::at(id, x, y),
            None => self.pointers.push(PointerState::at(id, x, y)),
        }
    }

    /// Updates position and records the displacement since the last update.
    ///
    /// An unknown id is an implicit start with zero velocity.
    pub fn pointer_move(&mut self, id: u64, x: f32, y: f32) {
        match self.pointers.iter_mut().find(|p| p.id == id) {
            Some(pointer) => {
                pointer.delta_x = x - pointer.x;
                pointer.delta_y = y - pointer.y;
                pointer.x = x;
                pointer.y = y;
            }
            None => self.pointer_start(id, x, y),
        }
    }

    /// Retires the pointer for `id`. The synthetic default is never removed.
    pub fn pointer_end(&mut self, id: u64) {
        self.pointers.retain(|p| p.id != id);
    }

    /// Read-only view of every live pointer in insertion order.
    ///
    /// Index 0 is guaranteed to exist: the first real pointer, or the
    /// synthetic default when no contact is active.
    pub fn snapshot(&self) -> &[PointerState] {
        if self.pointers.is_empty() {
            slice::from_ref(&self.fallback)
        } else {
            &self.pointers
        }
    }

    /// Copy of the primary pointer (`snapshot()[0]`).
    pub fn primary(&self) -> PointerState {
        self.snapshot()[0]
    }

    /// Zeroes every pointer's velocity.
    ///
    /// Called once per frame after the composer has consumed the snapshot, so
    /// a frame with no intervening move reports zero velocity instead of
    /// replaying the previous displacement.
    pub fn settle(&mut self) {
        for pointer in &mut self.pointers {
            pointer.delta_x = 0.0;
            pointer.delta_y = 0.0;
        }
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_always_has_a_primary() {
        let tracker = PointerTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!((snapshot[0].x, snapshot[0].y), (0.0, 0.0));
        assert_eq!((snapshot[0].delta_x, snapshot[0].delta_y), (0.0, 0.0));
    }

    #[test]
    fn move_after_start_reports_displacement() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_start(1, 0.2, 0.3);
        tracker.pointer_move(1, 0.5, 0.3);
        let primary = tracker.primary();
        assert!((primary.delta_x - 0.3).abs() < 1e-6);
        assert_eq!(primary.delta_y, 0.0);
        assert!((primary.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unknown_move_is_an_implicit_start() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_move(7, 0.4, 0.6);
        let primary = tracker.primary();
        assert_eq!(primary.id, 7);
        assert_eq!((primary.delta_x, primary.delta_y), (0.0, 0.0));
    }

    #[test]
    fn end_retires_pointer_and_fallback_remains() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_start(1, 0.9, 0.9);
        tracker.pointer_end(1);
        tracker.pointer_end(42); // unknown ids are ignored
        let primary = tracker.primary();
        assert_eq!((primary.x, primary.y), (0.0, 0.0));
    }

    #[test]
    fn multi_touch_keeps_insertion_order() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_start(2, 0.1, 0.1);
        tracker.pointer_start(5, 0.2, 0.2);
        tracker.pointer_start(3, 0.3, 0.3);
        let ids: Vec<u64> = tracker.snapshot().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 5, 3]);
        tracker.pointer_end(5);
        let ids: Vec<u64> = tracker.snapshot().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn settle_zeroes_velocity_until_next_move() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_start(1, 0.0, 0.0);
        tracker.pointer_move(1, 0.5, 0.5);
        tracker.settle();
        let primary = tracker.primary();
        assert_eq!((primary.delta_x, primary.delta_y), (0.0, 0.0));
        tracker.pointer_move(1, 0.6, 0.5);
        assert!((tracker.primary().delta_x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn restart_resets_velocity() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_start(1, 0.0, 0.0);
        tracker.pointer_move(1, 0.5, 0.5);
        tracker.pointer_start(1, 0.8, 0.8);
        let primary = tracker.primary();
        assert_eq!((primary.delta_x, primary.delta_y), (0.0, 0.0));
        assert_eq!((primary.x, primary.y), (0.8, 0.8));
    }
}
