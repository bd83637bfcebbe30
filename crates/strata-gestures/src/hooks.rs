//! Subclass hooks
//!
//! Concrete recognizers customize the gesture base by implementing
//! [`GestureHooks`]. Every method has a default, so a recognizer only
//! overrides what it needs. The base holds the hooks behind a weak
//! reference; a dropped recognizer simply stops being consulted.
//!
//! The relationship hooks come in granting/overriding pairs:
//!
//! - [`should_influence`](GestureHooks::should_influence) /
//!   [`should_be_influenced_by`](GestureHooks::should_be_influenced_by)
//!   negotiate whether one side's recognition cancels the other when a pair
//!   first shares a point.
//! - [`should_start_while`](GestureHooks::should_start_while) /
//!   [`other_gesture_may_start`](GestureHooks::other_gesture_may_start)
//!   decide whether a gesture may start while an unrelated one is already
//!   recognizing.

use strata_types::InputEvent;

use crate::gesture::Gesture;
use crate::points::GesturePoint;
use crate::state::GestureState;

/// Optional callbacks a recognizer implements on top of the gesture base.
pub trait GestureHooks: Send + Sync {
    /// One or more points started.
    fn points_began(&self, _gesture: &Gesture, _points: &[GesturePoint]) {}

    /// One or more points moved.
    fn points_moved(&self, _gesture: &Gesture, _points: &[GesturePoint]) {}

    /// One or more points ended normally. The points are still visible
    /// during the call and removed afterwards.
    fn points_ended(&self, _gesture: &Gesture, _points: &[GesturePoint]) {}

    /// One or more points were cancelled by the host.
    fn points_cancelled(&self, _gesture: &Gesture, _points: &[GesturePoint]) {}

    /// An enter/leave event was delivered for a tracked point. Coordinate
    /// buckets are not updated for crossing events.
    fn crossing_event(&self, _gesture: &Gesture, _point: &GesturePoint, _event: &InputEvent) {}

    /// The gesture moved between states.
    fn state_changed(&self, _gesture: &Gesture, _old: GestureState, _new: GestureState) {}

    /// Vote on entering POSSIBLE or RECOGNIZING. Runs before the registered
    /// [`on_may_recognize`](Gesture::on_may_recognize) predicates.
    fn may_recognize(&self, _gesture: &Gesture) -> bool {
        true
    }

    /// Negotiates the forward cancellation flag when this gesture first
    /// shares a point with `_other`: set `*_cancels_other = false` to let
    /// `_other` survive this gesture recognizing. The flag arrives `true`.
    fn should_influence(&self, _gesture: &Gesture, _other: &Gesture, _cancels_other: &mut bool) {}

    /// The mirror of [`should_influence`](Self::should_influence), consulted
    /// on the gesture being influenced.
    fn should_be_influenced_by(
        &self,
        _gesture: &Gesture,
        _other: &Gesture,
        _cancelled_by_other: &mut bool,
    ) {
    }

    /// While this gesture is recognizing, may the unrelated `_other` start?
    /// Granting here can still be overridden by `_other`'s
    /// [`other_gesture_may_start`](Self::other_gesture_may_start).
    fn should_start_while(&self, _gesture: &Gesture, _other: &Gesture) -> bool {
        false
    }

    /// Final say on whether this gesture may start while the unrelated
    /// `_other` is recognizing. `proposed` carries `_other`'s grant.
    fn other_gesture_may_start(&self, _gesture: &Gesture, _other: &Gesture, proposed: bool) -> bool {
        proposed
    }
}
