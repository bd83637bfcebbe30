//! Long-press gesture recognizer
//!
//! Completes once a single point has been held for
//! [`long_press_duration`](crate::settings::RecognizerSettings::with_long_press_duration)
//! without travelling beyond the cancellation threshold. Releasing early or
//! drifting away cancels.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use strata_types::Offset;

use crate::coordinator::GestureCoordinator;
use crate::gesture::Gesture;
use crate::hooks::GestureHooks;
use crate::points::GesturePoint;
use crate::settings::RecognizerSettings;
use crate::state::GestureState;
use crate::timer::{TimerHandle, TimerService};

/// Details of a completed long-press.
#[derive(Debug, Clone, PartialEq)]
pub struct LongPressDetails {
    /// Position of the press.
    pub position: Offset,
}

/// Callback for completed long-presses.
pub type LongPressCallback = Arc<dyn Fn(LongPressDetails) + Send + Sync>;
/// Callback for cancelled long-presses.
pub type LongPressCancelCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct LongPressCallbacks {
    on_long_press: Option<LongPressCallback>,
    on_cancel: Option<LongPressCancelCallback>,
}

#[derive(Default)]
struct PressState {
    press_position: Offset,
    deadline: Option<TimerHandle>,
}

/// Recognizes press-and-hold.
///
/// # Example
///
/// ```rust,ignore
/// let recognizer = LongPressGestureRecognizer::new(&coordinator, &timers)
///     .with_on_long_press(|details| {
///         println!("held at {}", details.position);
///     });
/// ```
pub struct LongPressGestureRecognizer {
    gesture: Gesture,
    timers: TimerService,
    weak_self: Weak<Self>,
    settings: Mutex<RecognizerSettings>,
    callbacks: Mutex<LongPressCallbacks>,
    press_state: Mutex<PressState>,
}

impl LongPressGestureRecognizer {
    /// Creates a long-press recognizer on `coordinator`, scheduling its
    /// deadline on `timers`.
    pub fn new(coordinator: &GestureCoordinator, timers: &TimerService) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let gesture = Gesture::new(coordinator);
            gesture.set_label("long-press");
            let hooks: Weak<dyn GestureHooks> = weak.clone();
            gesture.set_hooks(hooks);
            Self {
                gesture,
                timers: timers.clone(),
                weak_self: weak.clone(),
                settings: Mutex::new(RecognizerSettings::default()),
                callbacks: Mutex::new(LongPressCallbacks::default()),
                press_state: Mutex::new(PressState::default()),
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

    /// Set the long-press callback.
    pub fn with_on_long_press(
        self: Arc<Self>,
        callback: impl Fn(LongPressDetails) + Send + Sync + 'static,
    ) -> Arc<Self> {
        self.callbacks.lock().on_long_press = Some(Arc::new(callback));
        self
    }

    /// Set the cancel callback.
    pub fn with_on_cancel(self: Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        self.callbacks.lock().on_cancel = Some(Arc::new(callback));
        self
    }

    fn cancel_deadline(&self) {
        if let Some(deadline) = self.press_state.lock().deadline.take() {
            deadline.cancel();
        }
    }

    /// The hold duration elapsed with the point still down.
    fn on_deadline(&self) {
        if self.gesture.state() == GestureState::Possible {
            self.gesture.set_state(GestureState::Completed);
        }
    }
}

impl GestureHooks for LongPressGestureRecognizer {
    fn points_began(&self, gesture: &Gesture, points: &[GesturePoint]) {
        if gesture.point_count() > self.settings.lock().max_n_points() as usize {
            gesture.set_state(GestureState::Cancelled);
            return;
        }
        let Some(point) = points.first() else { return };
        let duration = self.settings.lock().long_press_duration();
        let weak = self.weak_self.clone();
        let handle = self.timers.schedule(duration, move || {
            if let Some(recognizer) = weak.upgrade() {
                recognizer.on_deadline();
            }
        });

        let mut state = self.press_state.lock();
        state.press_position = point.begin_coords;
        state.deadline = Some(handle);
    }

    fn points_moved(&self, gesture: &Gesture, points: &[GesturePoint]) {
        let Some(point) = points.first() else { return };
        let travelled = point.begin_coords.distance_to(point.latest_coords);
        if self.settings.lock().exceeds_cancel_threshold(travelled) {
            gesture.set_state(GestureState::Cancelled);
        }
    }

    fn points_ended(&self, gesture: &Gesture, _points: &[GesturePoint]) {
        // released before the deadline
        if gesture.state() == GestureState::Possible {
            gesture.set_state(GestureState::Cancelled);
        }
    }

    fn points_cancelled(&self, gesture: &Gesture, _points: &[GesturePoint]) {
        gesture.set_state(GestureState::Cancelled);
    }

    fn state_changed(&self, _gesture: &Gesture, _old: GestureState, new: GestureState) {
        match new {
            GestureState::Completed => {
                let details = LongPressDetails {
                    position: self.press_state.lock().press_position,
                };
                if let Some(on_long_press) = self.callbacks.lock().on_long_press.clone() {
                    on_long_press(details);
                }
            }
            GestureState::Cancelled => {
                self.cancel_deadline();
                if let Some(on_cancel) = self.callbacks.lock().on_cancel.clone() {
                    on_cancel();
                }
            }
            GestureState::Waiting => self.cancel_deadline(),
            _ => {}
        }
    }
}

impl fmt::Debug for LongPressGestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongPressGestureRecognizer")
            .field("gesture", &self.gesture)
            .field("deadline_pending", &self.press_state.lock().deadline.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestStage;
    use std::time::Duration;
    use strata_types::{DeviceId, InputEvent};

    fn press(x: f32, y: f32) -> InputEvent {
        InputEvent::button_press(DeviceId::new(0), Offset::new(x, y))
    }

    fn release(x: f32, y: f32) -> InputEvent {
        InputEvent::button_release(DeviceId::new(0), Offset::new(x, y))
    }

    fn zero_duration() -> RecognizerSettings {
        RecognizerSettings::default().with_long_press_duration(Duration::ZERO)
    }

    #[test]
    fn test_long_press_completes_on_deadline() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let pressed = Arc::new(Mutex::new(None));
        let slot = pressed.clone();

        let recognizer = LongPressGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_settings(zero_duration())
            .with_on_long_press(move |details| {
                *slot.lock() = Some(details);
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(40.0, 40.0));
        assert_eq!(recognizer.gesture().state(), GestureState::Possible);

        timers.check_timers();
        assert_eq!(recognizer.gesture().state(), GestureState::Completed);
        let details = pressed.lock().clone().expect("long press fired");
        assert_eq!(details.position, Offset::new(40.0, 40.0));

        stage.deliver(&release(40.0, 40.0));
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
    }

    #[test]
    fn test_early_release_cancels() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let cancelled = Arc::new(Mutex::new(false));
        let flag = cancelled.clone();

        let recognizer = LongPressGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_on_cancel(move || {
                *flag.lock() = true;
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(40.0, 40.0));
        stage.deliver(&release(40.0, 40.0));

        assert!(*cancelled.lock());
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
        // the deadline was cancelled with the gesture
        assert_eq!(timers.check_timers(), 0);
    }

    #[test]
    fn test_drift_cancels() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let recognizer = LongPressGestureRecognizer::new(&stage.coordinator(), &timers);
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(40.0, 40.0));
        stage.deliver(&InputEvent::motion(DeviceId::new(0), Offset::new(80.0, 40.0)));

        assert_eq!(recognizer.gesture().state(), GestureState::Cancelled);
    }
}
