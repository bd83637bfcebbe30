//! Per-gesture point tracking
//!
//! A gesture owns one [`PointStore`]: a table of the input points it is
//! currently observing, keyed by `(device, sequence)`. Each entry has two
//! halves kept index-aligned:
//!
//! - an internal [`TrackedPoint`] with the bookkeeping the coordinator needs
//!   (button counter, claim flag, the identifying tuple), and
//! - a public [`GesturePoint`] exposed to subclasses, carrying the coordinate
//!   buckets they compute gestures from.
//!
//! The public half is dropped as soon as the gesture reaches a terminal
//! state; the internal half survives until each sequence delivers its
//! terminal event, so the host's bookkeeping stays balanced.

use smallvec::SmallVec;
use strata_types::{DeviceId, EventKind, InputEvent, Offset, SequenceId};

/// Inline capacity of the point tables. Nearly all gestures track one or two
/// points.
const INLINE_POINTS: usize = 2;

/// The subclass-facing view of one tracked point.
///
/// Coordinate buckets are filled from events as they arrive: `begin_coords`
/// on press/touch-begin, `move_coords` on motion/touch-update, `end_coords`
/// on release/touch-end. `latest_coords` always mirrors the newest position
/// and `last_coords` the one before it, so subclasses can compute deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct GesturePoint {
    /// Monotonically increasing per-gesture point number.
    pub index: u64,
    /// Position of the begin event.
    pub begin_coords: Offset,
    /// Position before the newest one.
    pub last_coords: Offset,
    /// The newest position.
    pub latest_coords: Offset,
    /// Position of the newest move event.
    pub move_coords: Offset,
    /// Position of the end event.
    pub end_coords: Offset,
    /// Timestamp of the newest dispatched event, in milliseconds.
    pub event_time_ms: u64,
    /// The newest dispatched event.
    pub latest_event: InputEvent,
}

impl GesturePoint {
    fn new(index: u64, event: &InputEvent) -> Self {
        Self {
            index,
            begin_coords: event.position,
            last_coords: event.position,
            latest_coords: event.position,
            move_coords: event.position,
            end_coords: event.position,
            event_time_ms: event.time_ms,
            latest_event: event.clone(),
        }
    }
}

/// Internal bookkeeping for one tracked point.
#[derive(Debug, Clone)]
pub(crate) struct TrackedPoint {
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub sequence: Option<SequenceId>,
    pub latest_event: InputEvent,
    /// Pressed-button count for pointer points; the point ends when it
    /// returns to zero.
    pub n_buttons_pressed: u32,
    /// Whether the begin event has been dispatched yet.
    pub begun: bool,
    /// Whether the sequence has been claimed with the host.
    pub claimed: bool,
    pub index: u64,
}

/// The per-gesture table of active input points.
#[derive(Debug, Default)]
pub(crate) struct PointStore {
    internal: SmallVec<[TrackedPoint; INLINE_POINTS]>,
    public: SmallVec<[GesturePoint; INLINE_POINTS]>,
    next_index: u64,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.internal.len()
    }

    /// Number of points still visible to the subclass.
    #[inline]
    pub fn public_len(&self) -> usize {
        self.public.len()
    }

    /// The source device shared by all current points, if any.
    pub fn source_device(&self) -> Option<DeviceId> {
        self.internal.first().map(|p| p.source_device)
    }

    /// Index of the point identified by `(device, sequence)`.
    pub fn find(&self, key: (DeviceId, Option<SequenceId>)) -> Option<usize> {
        self.internal
            .iter()
            .position(|p| (p.device, p.sequence) == key)
    }

    /// Registers a new point from its begin event. Returns the point number.
    pub fn register(&mut self, event: &InputEvent) -> u64 {
        debug_assert!(self.find(event.point_key()).is_none());
        debug_assert_eq!(self.internal.len(), self.public.len());

        let index = self.next_index;
        self.next_index += 1;

        self.internal.push(TrackedPoint {
            device: event.device,
            source_device: event.source_device,
            sequence: event.sequence,
            latest_event: event.clone(),
            n_buttons_pressed: u32::from(event.kind == EventKind::ButtonPress),
            begun: false,
            claimed: false,
            index,
        });
        self.public.push(GesturePoint::new(index, event));
        index
    }

    /// Marks the point as begun and fills its begin bucket.
    pub fn begin_point(&mut self, idx: usize, event: &InputEvent) -> GesturePoint {
        self.internal[idx].begun = true;
        if let Some(point) = self.public_mut(idx) {
            point.begin_coords = event.position;
        }
        self.touch_point(idx, event)
    }

    /// Applies a move event to the point's buckets.
    pub fn move_point(&mut self, idx: usize, event: &InputEvent) -> GesturePoint {
        if let Some(point) = self.public_mut(idx) {
            point.move_coords = event.position;
        }
        self.touch_point(idx, event)
    }

    /// Applies an end event to the point's buckets. The entry itself is
    /// removed separately, after the subclass has seen the point.
    pub fn end_point(&mut self, idx: usize, event: &InputEvent) -> GesturePoint {
        if let Some(point) = self.public_mut(idx) {
            point.end_coords = event.position;
        }
        self.touch_point(idx, event)
    }

    /// Refreshes `last`/`latest` coordinates and the latest event, returning
    /// a snapshot of the public point.
    fn touch_point(&mut self, idx: usize, event: &InputEvent) -> GesturePoint {
        self.internal[idx].latest_event = event.clone();
        let fallback = GesturePoint::new(self.internal[idx].index, event);
        match self.public_mut(idx) {
            Some(point) => {
                point.last_coords = point.latest_coords;
                point.latest_coords = event.position;
                point.event_time_ms = event.time_ms;
                point.latest_event = event.clone();
                point.clone()
            }
            // Terminal states drop the public view first; hand out a
            // one-shot snapshot so callers still have coordinates.
            None => fallback,
        }
    }

    /// Increments the pressed-button counter, returning the new count.
    pub fn note_button_press(&mut self, idx: usize) -> u32 {
        let point = &mut self.internal[idx];
        point.n_buttons_pressed += 1;
        point.n_buttons_pressed
    }

    /// Decrements the pressed-button counter, returning the remaining count.
    pub fn note_button_release(&mut self, idx: usize) -> u32 {
        let point = &mut self.internal[idx];
        point.n_buttons_pressed = point.n_buttons_pressed.saturating_sub(1);
        point.n_buttons_pressed
    }

    #[inline]
    pub fn is_claimed(&self, idx: usize) -> bool {
        self.internal[idx].claimed
    }

    #[inline]
    pub fn is_begun(&self, idx: usize) -> bool {
        self.internal[idx].begun
    }

    /// The public half of the point at internal index `idx`, if it is still
    /// visible.
    pub fn public_at(&self, idx: usize) -> Option<GesturePoint> {
        let index = self.internal[idx].index;
        self.public.iter().find(|p| p.index == index).cloned()
    }

    /// Marks every unclaimed sequence as claimed and returns their keys.
    pub fn claim_all(&mut self) -> SmallVec<[(DeviceId, Option<SequenceId>); INLINE_POINTS]> {
        let mut claimed = SmallVec::new();
        for point in &mut self.internal {
            if !point.claimed {
                point.claimed = true;
                claimed.push((point.device, point.sequence));
            }
        }
        claimed
    }

    /// Removes the point at `idx` from both halves of the store.
    pub fn remove(&mut self, idx: usize) {
        let index = self.internal[idx].index;
        self.internal.remove(idx);
        if let Some(pos) = self.public.iter().position(|p| p.index == index) {
            self.public.remove(pos);
        }
    }

    /// A clone of the public view.
    pub fn public_points(&self) -> SmallVec<[GesturePoint; INLINE_POINTS]> {
        self.public.clone()
    }

    fn public_mut(&mut self, idx: usize) -> Option<&mut GesturePoint> {
        let index = self.internal[idx].index;
        self.public.iter_mut().find(|p| p.index == index)
    }

    /// Drops the public view only (entry to a terminal state).
    pub fn clear_public(&mut self) {
        self.public.clear();
    }

    /// Drops everything (entry to WAITING).
    pub fn clear_all(&mut self) {
        self.internal.clear();
        self.public.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::SequenceId;

    fn press(device: i32, x: f32, y: f32) -> InputEvent {
        InputEvent::button_press(DeviceId::new(device), Offset::new(x, y))
    }

    #[test]
    fn test_register_assigns_monotone_indices() {
        let mut store = PointStore::new();
        let a = store.register(&press(0, 1.0, 1.0));
        store.remove(0);
        let b = store.register(&press(0, 2.0, 2.0));
        assert!(b > a);
    }

    #[test]
    fn test_find_by_key() {
        let mut store = PointStore::new();
        let seq = SequenceId::new(5);
        store.register(&InputEvent::touch_begin(
            DeviceId::new(1),
            seq,
            Offset::ZERO,
        ));

        assert!(store.find((DeviceId::new(1), Some(seq))).is_some());
        assert!(store.find((DeviceId::new(1), None)).is_none());
        assert!(store.find((DeviceId::new(2), Some(seq))).is_none());
    }

    #[test]
    fn test_coordinate_buckets() {
        let mut store = PointStore::new();
        store.register(&press(0, 10.0, 10.0));
        store.begin_point(0, &press(0, 10.0, 10.0));

        let moved = store.move_point(
            0,
            &InputEvent::motion(DeviceId::new(0), Offset::new(14.0, 10.0)).with_time(5),
        );
        assert_eq!(moved.begin_coords, Offset::new(10.0, 10.0));
        assert_eq!(moved.move_coords, Offset::new(14.0, 10.0));
        assert_eq!(moved.latest_coords, Offset::new(14.0, 10.0));
        assert_eq!(moved.last_coords, Offset::new(10.0, 10.0));
        assert_eq!(moved.event_time_ms, 5);

        let moved = store.move_point(
            0,
            &InputEvent::motion(DeviceId::new(0), Offset::new(20.0, 10.0)).with_time(9),
        );
        assert_eq!(moved.last_coords, Offset::new(14.0, 10.0));

        let ended = store.end_point(
            0,
            &InputEvent::button_release(DeviceId::new(0), Offset::new(21.0, 10.0)),
        );
        assert_eq!(ended.end_coords, Offset::new(21.0, 10.0));
    }

    #[test]
    fn test_button_counter() {
        let mut store = PointStore::new();
        store.register(&press(0, 0.0, 0.0));
        assert_eq!(store.note_button_press(0), 2);
        assert_eq!(store.note_button_release(0), 1);
        assert_eq!(store.note_button_release(0), 0);
        assert_eq!(store.note_button_release(0), 0);
    }

    #[test]
    fn test_claim_all_claims_once() {
        let mut store = PointStore::new();
        store.register(&press(0, 0.0, 0.0));
        assert_eq!(store.claim_all().len(), 1);
        assert!(store.is_claimed(0));
        assert!(store.claim_all().is_empty());
    }

    #[test]
    fn test_clear_public_keeps_internal() {
        let mut store = PointStore::new();
        store.register(&press(0, 0.0, 0.0));
        store.clear_public();
        assert_eq!(store.public_len(), 0);
        assert_eq!(store.len(), 1);

        // buckets keep working through the one-shot snapshot
        let snapshot = store.end_point(
            0,
            &InputEvent::button_release(DeviceId::new(0), Offset::new(1.0, 1.0)),
        );
        assert_eq!(snapshot.end_coords, Offset::new(1.0, 1.0));
    }
}
