//! Tap gesture recognizer
//!
//! A tap is a press and release of a single point that never travels beyond
//! the cancellation threshold. N consecutive taps (double-tap, triple-tap)
//! are supported through
//! [`n_clicks_required`](crate::settings::RecognizerSettings::with_n_clicks_required);
//! between taps the gesture stays in POSSIBLE and an inter-tap timer cancels
//! it if the next press takes too long.

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

/// Details of a completed tap.
#[derive(Debug, Clone, PartialEq)]
pub struct TapDetails {
    /// Position of the final press.
    pub position: Offset,
    /// How many consecutive taps were performed.
    pub n_taps: u32,
}

/// Callback for completed taps.
pub type TapCallback = Arc<dyn Fn(TapDetails) + Send + Sync>;
/// Callback for cancelled taps.
pub type TapCancelCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct TapCallbacks {
    on_tap: Option<TapCallback>,
    on_cancel: Option<TapCancelCallback>,
}

#[derive(Default)]
struct TapState {
    taps_so_far: u32,
    press_position: Offset,
    timeout: Option<TimerHandle>,
}

/// Recognizes single and multi-taps.
///
/// # Example
///
/// ```rust,ignore
/// let recognizer = TapGestureRecognizer::new(&coordinator, &timers)
///     .with_on_tap(|details| {
///         println!("tapped at {}", details.position);
///     });
/// ```
pub struct TapGestureRecognizer {
    gesture: Gesture,
    timers: TimerService,
    weak_self: Weak<Self>,
    settings: Mutex<RecognizerSettings>,
    callbacks: Mutex<TapCallbacks>,
    tap_state: Mutex<TapState>,
}

impl TapGestureRecognizer {
    /// Creates a tap recognizer on `coordinator`, scheduling its inter-tap
    /// timeout on `timers`.
    pub fn new(coordinator: &GestureCoordinator, timers: &TimerService) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let gesture = Gesture::new(coordinator);
            gesture.set_label("tap");
            let hooks: Weak<dyn GestureHooks> = weak.clone();
            gesture.set_hooks(hooks);
            Self {
                gesture,
                timers: timers.clone(),
                weak_self: weak.clone(),
                settings: Mutex::new(RecognizerSettings::default()),
                callbacks: Mutex::new(TapCallbacks::default()),
                tap_state: Mutex::new(TapState::default()),
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

    /// Set the tap callback.
    pub fn with_on_tap(self: Arc<Self>, callback: impl Fn(TapDetails) + Send + Sync + 'static) -> Arc<Self> {
        self.callbacks.lock().on_tap = Some(Arc::new(callback));
        self
    }

    /// Set the cancel callback.
    pub fn with_on_cancel(self: Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        self.callbacks.lock().on_cancel = Some(Arc::new(callback));
        self
    }

    fn cancel_timeout(&self) {
        if let Some(timeout) = self.tap_state.lock().timeout.take() {
            timeout.cancel();
        }
    }

    /// Inter-tap timeout elapsed without a new press.
    fn on_timeout(&self) {
        if self.gesture.state() == GestureState::Possible {
            self.gesture.set_state(GestureState::Cancelled);
        }
    }
}

impl GestureHooks for TapGestureRecognizer {
    fn points_began(&self, gesture: &Gesture, points: &[GesturePoint]) {
        if gesture.point_count() > self.settings.lock().max_n_points() as usize {
            gesture.set_state(GestureState::Cancelled);
            return;
        }
        self.cancel_timeout();
        if let Some(point) = points.first() {
            self.tap_state.lock().press_position = point.begin_coords;
        }
    }

    fn points_moved(&self, gesture: &Gesture, points: &[GesturePoint]) {
        let Some(point) = points.first() else { return };
        let travelled = point.begin_coords.distance_to(point.latest_coords);
        if self.settings.lock().exceeds_cancel_threshold(travelled) {
            gesture.set_state(GestureState::Cancelled);
        }
    }

    fn points_ended(&self, gesture: &Gesture, _points: &[GesturePoint]) {
        let (required, timeout) = {
            let settings = self.settings.lock();
            (settings.n_clicks_required(), settings.tap_timeout())
        };
        let taps = {
            let mut state = self.tap_state.lock();
            state.taps_so_far += 1;
            state.taps_so_far
        };

        if taps >= required {
            gesture.set_state(GestureState::Completed);
        } else {
            let weak = self.weak_self.clone();
            let handle = self.timers.schedule(timeout, move || {
                if let Some(recognizer) = weak.upgrade() {
                    recognizer.on_timeout();
                }
            });
            self.tap_state.lock().timeout = Some(handle);
        }
    }

    fn points_cancelled(&self, gesture: &Gesture, _points: &[GesturePoint]) {
        gesture.set_state(GestureState::Cancelled);
    }

    fn state_changed(&self, _gesture: &Gesture, _old: GestureState, new: GestureState) {
        match new {
            GestureState::Completed => {
                let details = {
                    let state = self.tap_state.lock();
                    TapDetails {
                        position: state.press_position,
                        n_taps: state.taps_so_far,
                    }
                };
                if let Some(on_tap) = self.callbacks.lock().on_tap.clone() {
                    on_tap(details);
                }
            }
            GestureState::Cancelled => {
                self.cancel_timeout();
                self.tap_state.lock().taps_so_far = 0;
                if let Some(on_cancel) = self.callbacks.lock().on_cancel.clone() {
                    on_cancel();
                }
            }
            GestureState::Waiting => {
                self.cancel_timeout();
                self.tap_state.lock().taps_so_far = 0;
            }
            _ => {}
        }
    }
}

impl fmt::Debug for TapGestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapGestureRecognizer")
            .field("gesture", &self.gesture)
            .field("taps_so_far", &self.tap_state.lock().taps_so_far)
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

    fn motion(x: f32, y: f32) -> InputEvent {
        InputEvent::motion(DeviceId::new(0), Offset::new(x, y))
    }

    #[test]
    fn test_single_tap() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let tapped = Arc::new(Mutex::new(None));
        let slot = tapped.clone();

        let recognizer = TapGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_on_tap(move |details| {
                *slot.lock() = Some(details);
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(15.0, 15.0));
        assert_eq!(recognizer.gesture().state(), GestureState::Possible);

        stage.deliver(&release(15.0, 15.0));
        let details = tapped.lock().clone().expect("tap fired");
        assert_eq!(details.position, Offset::new(15.0, 15.0));
        assert_eq!(details.n_taps, 1);
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
    }

    #[test]
    fn test_movement_cancels_tap() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let cancelled = Arc::new(Mutex::new(false));
        let flag = cancelled.clone();

        let recognizer = TapGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_on_cancel(move || {
                *flag.lock() = true;
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(100.0, 100.0));
        stage.deliver(&motion(100.0, 130.0));

        assert!(*cancelled.lock());
        assert_eq!(recognizer.gesture().state(), GestureState::Cancelled);

        stage.deliver(&release(100.0, 130.0));
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
    }

    #[test]
    fn test_small_movement_keeps_tap() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let tapped = Arc::new(Mutex::new(false));
        let flag = tapped.clone();

        let recognizer = TapGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_on_tap(move |_| {
                *flag.lock() = true;
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(100.0, 100.0));
        stage.deliver(&motion(105.0, 105.0));
        stage.deliver(&release(105.0, 105.0));

        assert!(*tapped.lock());
    }

    #[test]
    fn test_double_tap() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let tapped = Arc::new(Mutex::new(None));
        let slot = tapped.clone();

        let recognizer = TapGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_settings(RecognizerSettings::default().with_n_clicks_required(2))
            .with_on_tap(move |details| {
                *slot.lock() = Some(details);
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(50.0, 50.0));
        stage.deliver(&release(50.0, 50.0));
        // waiting for the second tap, still possible with no points
        assert_eq!(recognizer.gesture().state(), GestureState::Possible);
        assert!(tapped.lock().is_none());

        stage.deliver(&press(52.0, 50.0));
        stage.deliver(&release(52.0, 50.0));
        let details = tapped.lock().clone().expect("double tap fired");
        assert_eq!(details.n_taps, 2);
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
    }

    #[test]
    fn test_inter_tap_timeout_cancels() {
        let stage = TestStage::new();
        let timers = TimerService::new();
        let cancelled = Arc::new(Mutex::new(false));
        let flag = cancelled.clone();

        let recognizer = TapGestureRecognizer::new(&stage.coordinator(), &timers)
            .with_settings(
                RecognizerSettings::default()
                    .with_n_clicks_required(2)
                    .with_tap_timeout(Duration::ZERO),
            )
            .with_on_cancel(move || {
                *flag.lock() = true;
            });
        stage.add_gesture(recognizer.gesture());

        stage.deliver(&press(50.0, 50.0));
        stage.deliver(&release(50.0, 50.0));
        timers.check_timers();

        assert!(*cancelled.lock());
        assert_eq!(recognizer.gesture().state(), GestureState::Waiting);
    }
}
