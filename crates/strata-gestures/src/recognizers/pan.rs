//! Pan gesture recognizer
//!
//! Accumulates movement deltas and moves POSSIBLE → RECOGNIZING once the
//! total displacement crosses the begin threshold, optionally constrained
//! to one axis. While panning, every move reports a delta; on release the
//! recognizer derives a terminal velocity from the last 150 ms of movement
//! (see [`DeltaHistory`]).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_types::Offset;

use crate::coordinator::GestureCoordinator;
use crate::gesture::Gesture;
use crate::hooks::GestureHooks;
use crate::points::GesturePoint;
use crate::settings::{PanAxis, RecognizerSettings};
use crate::state::GestureState;
use crate::velocity::{DeltaHistory, Velocity};

/// Details of a pan movement.
#[derive(Debug, Clone, PartialEq)]
pub struct PanUpdateDetails {
    /// Current position.
    pub position: Offset,
    /// Movement since the previous event.
    pub delta: Offset,
    /// Accumulated movement since the press.
    pub total: Offset,
}

/// Details of a finished pan.
#[derive(Debug, Clone, PartialEq)]
pub struct PanEndDetails {
    /// Position of the release.
    pub position: Offset,
    /// Velocity over the recent movement window.
    pub velocity: Velocity,
}

/// Callback for the start of a pan.
pub type PanBeginCallback = Arc<dyn Fn(Offset) + Send + Sync>;
/// Callback for pan movement.
pub type PanUpdateCallback = Arc<dyn Fn(PanUpdateDetails) + Send + Sync>;
/// Callback for the end of a pan.
pub type PanEndCallback = Arc<dyn Fn(PanEndDetails) + Send + Sync>;
/// Callback for a cancelled pan.
pub type PanCancelCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct PanCallbacks {
    on_pan_begin: Option<PanBeginCallback>,
    on_pan_update: Option<PanUpdateCallback>,
    on_pan_end: Option<PanEndCallback>,
    on_cancel: Option<PanCancelCallback>,
}

#[derive(Default)]
struct PanState {
    total: Offset,
    last_position: Offset,
    history: DeltaHistory,
}

/// Recognizes pans (drags) with terminal velocity.
///
/// # Example
///
/// ```rust,ignore
/// let recognizer = PanGestureRecognizer::new(&coordinator)
///     .with_on_pan_update(|details| scroll_by(details.delta))
///     .with_on_pan_end(|details| fling(details.velocity));
/// ```
pub struct PanGestureRecognizer {
    gesture: Gesture,
    settings: Mutex<RecognizerSettings>,
    callbacks: Mutex<PanCallbacks>,
    pan_state: Mutex<PanState>,
}

impl PanGestureRecognizer {
    /// Creates a pan recognizer on `coordinator`.
    pub fn new(coordinator: &GestureCoordinator) -> Arc<Self> {
        Arc::new_cyclic(|weak: &std::sync::Weak<Self>| {
            let gesture = Gesture::new(coordinator);
            gesture.set_label("pan");
            let hooks: std::sync::Weak<dyn GestureHooks> = weak.clone();
            gesture.set_hooks(hooks);
            Self {
                gesture,
                settings: Mutex::new(RecognizerSettings::default()),
                callbacks: Mutex::new(PanCallbacks::default()),
                pan_state: Mutex::new(PanState::default()),
            }
        })
    }

    /// The underlying gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Replace the recognizer settings.
    pub fn with_settings(self: Arc<Self>, settings: RecognizerSettings) -> Arc<Self> {
        *self.settings.lock() = settings;
        self
    }

    /// Set the pan-begin callback.
    pub fn with_on_pan_begin(self: Arc<Self>, callback: impl Fn(Offset) + Send + Sync + 'static) -> Arc<Self> {
        self.callbacks.lock().on_pan_begin = Some(Arc::new(callback));
        self
    }

    /// Set the pan-update callback.
    pub fn with_on_pan_update(
        self: Arc<Self>,
        callback: impl Fn(PanUpdateDetails) + Send + Sync + 'static,
    ) -> Arc<Self> {
        self.callbacks.lock().on_pan_update = Some(Arc::new(callback));
        self
    }

    /// Set the pan-end callback.
    pub fn with_on_pan_end(
        self: Arc<Self>,
        callback: impl Fn(PanEndDetails) + Send + Sync + 'static,
    ) -> Arc<Self> {
        self.callbacks.lock().on_pan_end = Some(Arc::new(callback));
        self
    }

    /// Set the cancel callback.
    pub fn with_on_cancel(self: Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        self.callbacks.lock().on_cancel = Some(Arc::new(callback));
        self
    }

    fn constrained_displacement(total: Offset, axis: PanAxis) -> f32 {
        match axis {
            PanAxis::Free => total.distance(),
            PanAxis::Horizontal => total.dx.abs(),
            PanAxis::Vertical => total.dy.abs(),
        }
    }
}

impl GestureHooks for PanGestureRecognizer {
    fn points_began(&self, gesture: &Gesture, points: &[GesturePoint]) {
        if gesture.point_count() > self.settings.lock().max_n_points() as usize {
            gesture.set_state(GestureState::Cancelled);
            return;
        }
        if let Some(point) = points.first() {
            self.pan_state.lock().last_position = point.begin_coords;
        }
    }

    fn points_moved(&self, gesture: &Gesture, points: &[GesturePoint]) {
        let Some(point) = points.first() else { return };
        let delta = point.latest_coords - point.last_coords;

        let total = {
            let mut state = self.pan_state.lock();
            state.total += delta;
            state.last_position = point.latest_coords;
            state.history.push(point.event_time_ms, delta);
            state.total
        };

        match gesture.state() {
            GestureState::Possible => {
                let (axis, min_points) = {
                    let settings = self.settings.lock();
                    (settings.pan_axis(), settings.min_n_points() as usize)
                };
                if gesture.point_count() < min_points {
                    return;
                }
                let displacement = Self::constrained_displacement(total, axis);
                if self.settings.lock().exceeds_begin_threshold(displacement) {
                    gesture.set_state(GestureState::Recognizing);
                }
            }
            GestureState::Recognizing => {
                let details = PanUpdateDetails {
                    position: point.latest_coords,
                    delta,
                    total,
                };
                if let Some(on_pan_update) = self.callbacks.lock().on_pan_update.clone() {
                    on_pan_update(details);
                }
            }
            _ => {}
        }
    }

    fn points_ended(&self, gesture: &Gesture, points: &[GesturePoint]) {
        match gesture.state() {
            GestureState::Recognizing if gesture.point_count() <= 1 => {
                let details = {
                    let state = self.pan_state.lock();
                    PanEndDetails {
                        position: points.first().map_or(state.last_position, |p| p.end_coords),
                        velocity: state.history.velocity(),
                    }
                };
                if let Some(on_pan_end) = self.callbacks.lock().on_pan_end.clone() {
                    on_pan_end(details);
                }
                gesture.set_state(GestureState::Completed);
            }
            GestureState::Possible => gesture.set_state(GestureState::Cancelled),
            _ => {}
        }
    }

    fn points_cancelled(&self, gesture: &Gesture, _points: &[GesturePoint]) {
        gesture.set_state(GestureState::Cancelled);
    }

    fn state_changed(&self, _gesture: &Gesture, _old: GestureState, new: GestureState) {
        match new {
            GestureState::Recognizing => {
                let position = self.pan_state.lock().last_position;
                if let Some(on_pan_begin) = self.callbacks.lock().on_pan_begin.clone() {
                    on_pan_begin(position);
                }
            }
            GestureState::Cancelled => {
                if let Some(on_cancel) = self.callbacks.lock().on_cancel.clone() {
                    on_cancel();
                }
            }
            GestureState::Waiting => {
                let mut state = self.pan_state.lock();
                state.total = Offset::ZERO;
                state.history.reset();
            }
            _ => {}
        }
    }
}

impl fmt::Debug for PanGestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanGestureRecognizer")
            .field("gesture", &self.gesture)
            .field("total", &self.pan_state.lock().total)
            .finish()
    }
}
