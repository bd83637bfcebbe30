//! The gesture base
//!
//! [`Gesture`] owns the five-state machine, the point store, and the
//! relationship bookkeeping. Concrete recognizers compose a `Gesture` and
//! attach themselves as its [`GestureHooks`]; the host drives it through
//! [`should_handle_sequence`](Gesture::should_handle_sequence) /
//! [`handle_event`](Gesture::handle_event) and reads results through state
//! observers.
//!
//! A `Gesture` is a cheap `Clone` handle over shared state, the same shape
//! as the rest of the crate's handles. All methods take `&self`; interior
//! mutability is per-field and never held across a callback, so hooks and
//! observers may call back into *other* gestures freely. Re-entering the
//! same gesture from one of its own hooks is not supported.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use strata_types::{
    ActorId, DeviceId, DeviceKinds, EventDisposition, EventKind, InputEvent, SequenceId,
};

use crate::coordinator::{GestureCoordinator, Outcome};
use crate::error::GestureError;
use crate::hooks::GestureHooks;
use crate::points::{GesturePoint, PointStore};
use crate::relationship::{FailureGate, RelationshipState};
use crate::state::GestureState;

type StateObserver = Arc<dyn Fn(&Gesture, GestureState) + Send + Sync>;
type MayRecognizePredicate = Arc<dyn Fn(&Gesture) -> bool + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    state_changed: Vec<StateObserver>,
    may_recognize: Vec<MayRecognizePredicate>,
}

pub(crate) struct GestureInner {
    pub(crate) id: u64,
    pub(crate) label: Mutex<Option<String>>,
    pub(crate) coordinator: GestureCoordinator,
    pub(crate) state: Mutex<GestureState>,
    /// What the subclass asked for while gated on a failure requirement:
    /// RECOGNIZING, or COMPLETED for the shortcut request.
    pub(crate) pending_target: Mutex<Option<GestureState>>,
    pub(crate) points: Mutex<PointStore>,
    pub(crate) allowed_kinds: Mutex<DeviceKinds>,
    pub(crate) actor: Mutex<Option<ActorId>>,
    pub(crate) hooks: Mutex<Option<Weak<dyn GestureHooks>>>,
    pub(crate) observers: Mutex<Observers>,
    pub(crate) rel: Mutex<RelationshipState>,
}

/// A stateful recognizer observing zero or more input points.
#[derive(Clone)]
pub struct Gesture {
    inner: Arc<GestureInner>,
}

impl PartialEq for Gesture {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Gesture {}

impl Gesture {
    /// Creates a gesture in WAITING, registered with `coordinator`.
    pub fn new(coordinator: &GestureCoordinator) -> Self {
        Self {
            inner: Arc::new(GestureInner {
                id: coordinator.next_gesture_id(),
                label: Mutex::new(None),
                coordinator: coordinator.clone(),
                state: Mutex::new(GestureState::Waiting),
                pending_target: Mutex::new(None),
                points: Mutex::new(PointStore::new()),
                allowed_kinds: Mutex::new(DeviceKinds::default()),
                actor: Mutex::new(None),
                hooks: Mutex::new(None),
                observers: Mutex::new(Observers::default()),
                rel: Mutex::new(RelationshipState::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<GestureInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<GestureInner> {
        &self.inner
    }

    /// The coordinator this gesture was created with.
    pub fn coordinator(&self) -> GestureCoordinator {
        self.inner.coordinator.clone()
    }

    /// Diagnostic label, if one was set.
    pub fn label(&self) -> Option<String> {
        self.inner.label.lock().clone()
    }

    /// Sets the diagnostic label used in log messages and errors.
    pub fn set_label(&self, label: impl Into<String>) {
        *self.inner.label.lock() = Some(label.into());
    }

    pub(crate) fn display_name(&self) -> String {
        self.inner
            .label
            .lock()
            .clone()
            .unwrap_or_else(|| format!("gesture#{}", self.inner.id))
    }

    /// Attaches the subclass hooks. Recognizers pass a weak reference to
    /// themselves, typically from `Arc::new_cyclic`.
    pub fn set_hooks(&self, hooks: Weak<dyn GestureHooks>) {
        *self.inner.hooks.lock() = Some(hooks);
    }

    pub(crate) fn hooks(&self) -> Option<Arc<dyn GestureHooks>> {
        self.inner.hooks.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Registers a state-change observer.
    pub fn on_state_changed(&self, observer: impl Fn(&Gesture, GestureState) + Send + Sync + 'static) {
        self.inner
            .observers
            .lock()
            .state_changed
            .push(Arc::new(observer));
    }

    /// Registers a may-recognize predicate. Predicates gate entry to
    /// POSSIBLE and RECOGNIZING; the first one returning `false` wins.
    pub fn on_may_recognize(&self, predicate: impl Fn(&Gesture) -> bool + Send + Sync + 'static) {
        self.inner
            .observers
            .lock()
            .may_recognize
            .push(Arc::new(predicate));
    }

    /// The device kinds this gesture accepts points from.
    pub fn allowed_device_kinds(&self) -> DeviceKinds {
        *self.inner.allowed_kinds.lock()
    }

    /// Restricts the device kinds this gesture accepts points from.
    pub fn set_allowed_device_kinds(&self, kinds: DeviceKinds) {
        *self.inner.allowed_kinds.lock() = kinds;
    }

    /// The actor this gesture is attached to.
    pub fn actor(&self) -> Option<ActorId> {
        *self.inner.actor.lock()
    }

    /// Attaches or detaches the gesture from an actor. Detaching while
    /// points are active cancels the gesture and drops them.
    pub fn set_actor(&self, actor: Option<ActorId>) {
        *self.inner.actor.lock() = actor;
        if actor.is_none() && !self.inner.points.lock().is_empty() {
            self.force_cancel();
            self.inner.points.lock().clear_all();
            if self.state().is_terminal() {
                self.move_to(GestureState::Waiting);
            }
        }
    }

    /// The current state.
    pub fn state(&self) -> GestureState {
        *self.inner.state.lock()
    }

    /// The public view of the tracked points.
    pub fn points(&self) -> Vec<GesturePoint> {
        self.inner.points.lock().public_points().into_vec()
    }

    /// Number of points visible to the subclass.
    pub fn point_count(&self) -> usize {
        self.inner.points.lock().public_len()
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Requests a state change, logging and ignoring illegal requests.
    pub fn set_state(&self, state: GestureState) {
        if let Err(err) = self.try_set_state(state) {
            tracing::warn!("{err}");
        }
    }

    /// Requests a state change.
    ///
    /// Requests to CANCELLED are always accepted (and may be no-ops from
    /// terminal states or WAITING). A request for COMPLETED from POSSIBLE is
    /// treated as RECOGNIZING followed by COMPLETED; if the intermediate
    /// RECOGNIZING is prevented, the second step is skipped.
    pub fn try_set_state(&self, state: GestureState) -> Result<(), GestureError> {
        let current = self.state();
        match (current, state) {
            // the idiomatic "give up" path, never an error
            (_, GestureState::Cancelled) => {
                self.force_cancel();
                Ok(())
            }
            (GestureState::Waiting, GestureState::Possible) => {
                // A blocked entry leaves the gesture in WAITING, silently.
                if self.recognize_gates_pass() {
                    self.move_to(GestureState::Possible);
                }
                Ok(())
            }
            (GestureState::Possible, GestureState::Recognizing) => {
                self.request_recognize(GestureState::Recognizing);
                Ok(())
            }
            (GestureState::Possible, GestureState::Completed) => {
                self.request_recognize(GestureState::Completed);
                Ok(())
            }
            // idempotent re-request, used to claim newly added points
            (GestureState::Recognizing, GestureState::Recognizing) => {
                self.claim_sequences();
                Ok(())
            }
            (GestureState::Recognizing, GestureState::Completed) => {
                self.move_to(GestureState::Completed);
                Ok(())
            }
            // while pending, the original request is still in flight
            (GestureState::RecognizePending, GestureState::Recognizing) => Ok(()),
            (GestureState::RecognizePending, GestureState::Completed) => {
                *self.inner.pending_target.lock() = Some(GestureState::Completed);
                Ok(())
            }
            (from, to) => Err(GestureError::IllegalTransition {
                gesture: self.display_name(),
                from,
                to,
            }),
        }
    }

    /// A request for RECOGNIZING (or the COMPLETED shortcut) from POSSIBLE.
    fn request_recognize(&self, target: GestureState) {
        if !self.recognize_gates_pass() {
            self.force_cancel();
            return;
        }
        match self.failure_gate() {
            FailureGate::Failed => self.force_cancel(),
            FailureGate::Blocked => {
                *self.inner.pending_target.lock() = Some(target);
                self.move_to(GestureState::RecognizePending);
            }
            FailureGate::Clear => {
                self.move_to(GestureState::Recognizing);
                if target == GestureState::Completed && self.state() == GestureState::Recognizing {
                    self.move_to(GestureState::Completed);
                }
            }
        }
    }

    /// Re-evaluates a pending gesture after one of its awaited peers
    /// resolved.
    pub(crate) fn reevaluate_pending(&self) {
        if self.state() != GestureState::RecognizePending {
            return;
        }
        if !self.recognize_gates_pass() {
            self.force_cancel();
            return;
        }
        match self.failure_gate() {
            FailureGate::Failed => self.force_cancel(),
            FailureGate::Blocked => {}
            FailureGate::Clear => {
                let target = self
                    .inner
                    .pending_target
                    .lock()
                    .take()
                    .unwrap_or(GestureState::Recognizing);
                self.move_to(GestureState::Recognizing);
                if target == GestureState::Completed && self.state() == GestureState::Recognizing {
                    self.move_to(GestureState::Completed);
                }
            }
        }
    }

    /// Moves to CANCELLED from any non-terminal, non-resting state.
    /// Idempotent.
    pub(crate) fn force_cancel(&self) {
        match self.state() {
            GestureState::Waiting | GestureState::Completed | GestureState::Cancelled => {}
            _ => self.move_to(GestureState::Cancelled),
        }
    }

    /// The gate consulted before entering POSSIBLE or RECOGNIZING: global
    /// single-active arbitration, then the may-recognize votes.
    pub(crate) fn recognize_gates_pass(&self) -> bool {
        self.global_start_allowed() && self.may_recognize_pass()
    }

    fn may_recognize_pass(&self) -> bool {
        if let Some(hooks) = self.hooks() {
            if !hooks.may_recognize(self) {
                return false;
            }
        }
        let predicates = self.inner.observers.lock().may_recognize.clone();
        predicates.iter().all(|predicate| predicate(self))
    }

    /// Performs the transition and its side effects. Callers have already
    /// validated the request.
    pub(crate) fn move_to(&self, new: GestureState) {
        let old = {
            let mut state = self.inner.state.lock();
            let old = *state;
            if old == new {
                return;
            }
            *state = new;
            old
        };
        tracing::trace!("gesture {}: {:?} -> {:?}", self.display_name(), old, new);

        // local bookkeeping first, so invariants hold when observers run
        match new {
            GestureState::Possible => {
                self.inner
                    .coordinator
                    .register_active(Arc::downgrade(&self.inner));
            }
            GestureState::RecognizePending => {}
            GestureState::Recognizing => {
                debug_assert!(
                    !self.inner.points.lock().is_empty(),
                    "gesture {} entered RECOGNIZING without a point",
                    self.display_name()
                );
                self.claim_sequences();
            }
            GestureState::Completed | GestureState::Cancelled => {
                self.inner.pending_target.lock().take();
                self.inner.points.lock().clear_public();
            }
            GestureState::Waiting => {
                self.inner.pending_target.lock().take();
                self.inner.points.lock().clear_all();
                self.inner.coordinator.remove_active(&self.inner);
                self.teardown_relationships();
            }
        }

        match new {
            GestureState::Recognizing => {
                // losers are cancelled before the winner announces itself
                self.maybe_cancel_independent_gestures();
                self.run_cancel_on_recognizing();
                self.notify_state_changed(old, new);
                self.inner
                    .coordinator
                    .resolve(Arc::downgrade(&self.inner), Outcome::Recognized);
            }
            GestureState::Cancelled => {
                // the cancellation is observable before dependents promote
                self.notify_state_changed(old, new);
                self.inner
                    .coordinator
                    .resolve(Arc::downgrade(&self.inner), Outcome::Cancelled);
                self.waiting_if_drained();
            }
            GestureState::Completed => {
                self.notify_state_changed(old, new);
                self.waiting_if_drained();
            }
            _ => self.notify_state_changed(old, new),
        }
    }

    fn notify_state_changed(&self, old: GestureState, new: GestureState) {
        if let Some(hooks) = self.hooks() {
            hooks.state_changed(self, old, new);
        }
        let observers = self.inner.observers.lock().state_changed.clone();
        for observer in observers {
            observer(self, new);
        }
    }

    /// COMPLETED and CANCELLED fall back to WAITING once the point store is
    /// empty.
    fn waiting_if_drained(&self) {
        if self.state().is_terminal() && self.inner.points.lock().is_empty() {
            self.move_to(GestureState::Waiting);
        }
    }

    /// Informs the host about every sequence not yet claimed.
    pub(crate) fn claim_sequences(&self) {
        let claimed = self.inner.points.lock().claim_all();
        for (device, sequence) in claimed {
            self.inner.coordinator.claim_sequence(device, sequence);
        }
    }

    // ========================================================================
    // Event dispatch
    // ========================================================================

    /// Offers a new sequence to the gesture. Returns whether the point was
    /// accepted and registered; a refused event should be propagated
    /// untouched.
    pub fn should_handle_sequence(&self, event: &InputEvent) -> bool {
        self.inner.coordinator.main_thread_assert();

        if !event.kind.is_begin() {
            return false;
        }
        let state = self.state();
        // a terminal gesture can no longer report points
        if state.is_terminal() {
            return false;
        }
        if !self.allowed_device_kinds().allows(event.device_kind) {
            return false;
        }
        {
            let points = self.inner.points.lock();
            if points.find(event.point_key()).is_some() {
                return false;
            }
            if let Some(source) = points.source_device() {
                if source != event.source_device {
                    return false;
                }
            }
        }
        if state == GestureState::Waiting && !self.recognize_gates_pass() {
            // silently rejected; the gesture stays in WAITING
            return false;
        }

        self.inner.points.lock().register(event);
        if state == GestureState::Waiting {
            self.move_to(GestureState::Possible);
        }
        true
    }

    /// Dispatches an event for a sequence this gesture tracks.
    ///
    /// Events for unknown sequences and synthetic events are propagated
    /// untouched. Events for claimed sequences of a RECOGNIZING gesture are
    /// consumed.
    pub fn handle_event(&self, event: &InputEvent) -> EventDisposition {
        self.inner.coordinator.main_thread_assert();

        if event.is_synthetic() {
            return EventDisposition::Propagate;
        }
        let Some(idx) = self.inner.points.lock().find(event.point_key()) else {
            return EventDisposition::Propagate;
        };

        if event.kind.is_crossing() {
            return self.dispatch_crossing(idx, event);
        }
        if self.state().is_terminal() {
            return self.absorb_terminal(idx, event);
        }
        self.dispatch_active(idx, event)
    }

    fn dispatch_crossing(&self, idx: usize, event: &InputEvent) -> EventDisposition {
        if !self.state().is_terminal() {
            let point = self.inner.points.lock().public_at(idx);
            if let (Some(hooks), Some(point)) = (self.hooks(), point) {
                hooks.crossing_event(self, &point, event);
            }
        }
        EventDisposition::Propagate
    }

    /// In COMPLETED/CANCELLED the gesture still absorbs terminal events for
    /// its outstanding sequences without reporting them, to keep the host's
    /// bookkeeping balanced.
    fn absorb_terminal(&self, idx: usize, event: &InputEvent) -> EventDisposition {
        {
            let mut points = self.inner.points.lock();
            match event.kind {
                EventKind::ButtonPress => {
                    points.note_button_press(idx);
                }
                EventKind::ButtonRelease => {
                    if points.note_button_release(idx) == 0 {
                        points.remove(idx);
                    }
                }
                EventKind::TouchEnd | EventKind::TouchCancel => {
                    points.remove(idx);
                }
                _ => {}
            }
        }
        self.waiting_if_drained();
        EventDisposition::Propagate
    }

    fn dispatch_active(&self, idx: usize, event: &InputEvent) -> EventDisposition {
        let was_claimed = self.inner.points.lock().is_claimed(idx);

        match event.kind {
            EventKind::ButtonPress | EventKind::TouchBegin => {
                let begun = self.inner.points.lock().is_begun(idx);
                if begun {
                    // a further press on the same point only bumps the counter
                    if event.kind == EventKind::ButtonPress {
                        self.inner.points.lock().note_button_press(idx);
                    }
                } else {
                    let point = self.inner.points.lock().begin_point(idx, event);
                    if let Some(hooks) = self.hooks() {
                        hooks.points_began(self, std::slice::from_ref(&point));
                    }
                }
            }
            EventKind::Motion | EventKind::TouchUpdate => {
                let point = self.inner.points.lock().move_point(idx, event);
                if let Some(hooks) = self.hooks() {
                    hooks.points_moved(self, std::slice::from_ref(&point));
                }
            }
            EventKind::ButtonRelease => {
                let remaining = self.inner.points.lock().note_button_release(idx);
                if remaining == 0 {
                    let point = self.inner.points.lock().end_point(idx, event);
                    if let Some(hooks) = self.hooks() {
                        hooks.points_ended(self, std::slice::from_ref(&point));
                    }
                    self.remove_point(event.point_key());
                }
            }
            EventKind::TouchEnd => {
                let point = self.inner.points.lock().end_point(idx, event);
                if let Some(hooks) = self.hooks() {
                    hooks.points_ended(self, std::slice::from_ref(&point));
                }
                self.remove_point(event.point_key());
            }
            EventKind::TouchCancel => {
                let point = self.inner.points.lock().end_point(idx, event);
                if let Some(hooks) = self.hooks() {
                    hooks.points_cancelled(self, std::slice::from_ref(&point));
                }
                self.remove_point(event.point_key());
            }
            EventKind::Enter | EventKind::Leave => unreachable!("crossing handled above"),
        }

        self.waiting_if_drained();

        if was_claimed && self.state() == GestureState::Recognizing {
            EventDisposition::Consume
        } else {
            EventDisposition::Propagate
        }
    }

    /// Removes a point after its hook ran; the subclass may have changed
    /// state (and thereby the public view) in between.
    fn remove_point(&self, key: (DeviceId, Option<SequenceId>)) {
        let mut points = self.inner.points.lock();
        if let Some(idx) = points.find(key) {
            points.remove(idx);
        }
    }

    /// The host cancelled a batch of sequences externally.
    pub fn sequences_cancelled(&self, device: DeviceId, sequences: &[SequenceId]) {
        self.inner.coordinator.main_thread_assert();

        let active = !self.state().is_terminal();
        for sequence in sequences {
            let key = (device, Some(*sequence));
            let Some(idx) = self.inner.points.lock().find(key) else {
                continue;
            };
            if active {
                let point = self.inner.points.lock().public_at(idx);
                if let (Some(hooks), Some(point)) = (self.hooks(), point) {
                    hooks.points_cancelled(self, std::slice::from_ref(&point));
                }
            }
            self.remove_point(key);
        }
        self.waiting_if_drained();
    }
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("id", &self.inner.id)
            .field("label", &*self.inner.label.lock())
            .field("state", &*self.inner.state.lock())
            .field("points", &self.inner.points.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{Button, DeviceKind, EventFlags, Offset};

    /// Hook probe recording which callbacks ran.
    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<&'static str>>,
    }

    impl Probe {
        fn attach(gesture: &Gesture) -> Arc<Self> {
            let probe = Arc::new(Self::default());
            let dyn_probe: Arc<dyn GestureHooks> = probe.clone();
            let hooks: Weak<dyn GestureHooks> = Arc::downgrade(&dyn_probe);
            gesture.set_hooks(hooks);
            probe
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl GestureHooks for Probe {
        fn points_began(&self, _gesture: &Gesture, _points: &[GesturePoint]) {
            self.calls.lock().push("began");
        }

        fn points_moved(&self, _gesture: &Gesture, _points: &[GesturePoint]) {
            self.calls.lock().push("moved");
        }

        fn points_ended(&self, _gesture: &Gesture, _points: &[GesturePoint]) {
            self.calls.lock().push("ended");
        }

        fn points_cancelled(&self, _gesture: &Gesture, _points: &[GesturePoint]) {
            self.calls.lock().push("cancelled");
        }

        fn crossing_event(&self, _gesture: &Gesture, _point: &GesturePoint, _event: &InputEvent) {
            self.calls.lock().push("crossing");
        }
    }

    fn gesture_with_point() -> (GestureCoordinator, Gesture) {
        let coordinator = GestureCoordinator::new();
        let gesture = Gesture::new(&coordinator);
        let event = InputEvent::button_press(DeviceId::new(0), Offset::new(10.0, 10.0));
        assert!(gesture.should_handle_sequence(&event));
        gesture.handle_event(&event);
        (coordinator, gesture)
    }

    #[test]
    fn test_first_point_enters_possible() {
        let (coordinator, gesture) = gesture_with_point();
        assert_eq!(gesture.state(), GestureState::Possible);
        assert_eq!(gesture.point_count(), 1);
        assert_eq!(coordinator.active_count(), 1);
    }

    #[test]
    fn test_synthetic_events_are_not_dispatched() {
        let (_coordinator, gesture) = gesture_with_point();
        let probe = Probe::attach(&gesture);

        let synthetic = InputEvent::motion(DeviceId::new(0), Offset::new(50.0, 50.0))
            .with_flags(EventFlags::SYNTHETIC);
        assert_eq!(gesture.handle_event(&synthetic), EventDisposition::Propagate);

        assert!(probe.calls().is_empty());
        assert_eq!(gesture.points()[0].latest_coords, Offset::new(10.0, 10.0));
    }

    #[test]
    fn test_unknown_sequence_propagates() {
        let (_coordinator, gesture) = gesture_with_point();
        let unknown = InputEvent::motion(DeviceId::new(9), Offset::ZERO);
        assert_eq!(gesture.handle_event(&unknown), EventDisposition::Propagate);
    }

    #[test]
    fn test_device_kind_filter() {
        let coordinator = GestureCoordinator::new();
        let gesture = Gesture::new(&coordinator);
        gesture.set_allowed_device_kinds(DeviceKinds::TOUCHSCREEN);

        let pointer = InputEvent::button_press(DeviceId::new(0), Offset::ZERO);
        assert!(!gesture.should_handle_sequence(&pointer));

        let touch = InputEvent::touch_begin(DeviceId::new(0), SequenceId::new(1), Offset::ZERO);
        assert!(gesture.should_handle_sequence(&touch));
    }

    #[test]
    fn test_single_source_device_discipline() {
        let (_coordinator, gesture) = gesture_with_point();
        let other_source =
            InputEvent::touch_begin(DeviceId::new(0), SequenceId::new(1), Offset::ZERO)
                .with_source_device(DeviceId::new(7))
                .with_device_kind(DeviceKind::Pointer);
        assert!(!gesture.should_handle_sequence(&other_source));
        assert_eq!(gesture.point_count(), 1);
    }

    #[test]
    fn test_button_counter_keeps_point_alive() {
        let (_coordinator, gesture) = gesture_with_point();
        let probe = Probe::attach(&gesture);

        // a second button pressed on the same point
        let second = InputEvent::button_press(DeviceId::new(0), Offset::new(10.0, 10.0))
            .with_button(Button::SECONDARY);
        assert!(!gesture.should_handle_sequence(&second));
        gesture.handle_event(&second);
        assert_eq!(gesture.point_count(), 1);

        let release = InputEvent::button_release(DeviceId::new(0), Offset::new(10.0, 10.0));
        gesture.handle_event(&release);
        // one button still down
        assert_eq!(gesture.point_count(), 1);
        assert!(probe.calls().is_empty());

        gesture.handle_event(&release);
        assert_eq!(gesture.point_count(), 0);
        assert_eq!(probe.calls(), vec!["ended"]);
    }

    #[test]
    fn test_crossing_events_forwarded_without_bucket_update() {
        let (_coordinator, gesture) = gesture_with_point();
        let probe = Probe::attach(&gesture);

        let enter = InputEvent::crossing(
            EventKind::Enter,
            DeviceId::new(0),
            Offset::new(99.0, 99.0),
            ActorId::new(1),
            None,
        );
        assert_eq!(gesture.handle_event(&enter), EventDisposition::Propagate);

        assert_eq!(probe.calls(), vec!["crossing"]);
        assert_eq!(gesture.points()[0].latest_coords, Offset::new(10.0, 10.0));
    }

    #[test]
    fn test_sequences_cancelled_reports_and_removes() {
        let coordinator = GestureCoordinator::new();
        let gesture = Gesture::new(&coordinator);
        let seq = SequenceId::new(4);
        let begin = InputEvent::touch_begin(DeviceId::new(0), seq, Offset::ZERO);
        assert!(gesture.should_handle_sequence(&begin));
        gesture.handle_event(&begin);
        let probe = Probe::attach(&gesture);

        gesture.sequences_cancelled(DeviceId::new(0), &[seq]);
        assert_eq!(probe.calls(), vec!["cancelled"]);
        assert_eq!(gesture.point_count(), 0);
        assert_eq!(gesture.state(), GestureState::Possible);
    }

    #[test]
    fn test_terminal_state_absorbs_without_reporting() {
        let (_coordinator, gesture) = gesture_with_point();
        let probe = Probe::attach(&gesture);

        gesture.set_state(GestureState::Cancelled);
        assert_eq!(gesture.state(), GestureState::Cancelled);
        assert_eq!(gesture.points().len(), 0);

        let release = InputEvent::button_release(DeviceId::new(0), Offset::new(10.0, 10.0));
        assert_eq!(gesture.handle_event(&release), EventDisposition::Propagate);
        assert_eq!(gesture.state(), GestureState::Waiting);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_detaching_actor_cancels_points() {
        let (coordinator, gesture) = gesture_with_point();
        gesture.set_actor(Some(ActorId::new(3)));
        assert_eq!(gesture.actor(), Some(ActorId::new(3)));

        gesture.set_actor(None);
        assert_eq!(gesture.state(), GestureState::Waiting);
        assert_eq!(gesture.point_count(), 0);
        assert_eq!(coordinator.active_count(), 0);
    }

    #[test]
    fn test_completed_gesture_refuses_new_sequences() {
        let (_coordinator, gesture) = gesture_with_point();
        gesture.set_state(GestureState::Recognizing);
        gesture.set_state(GestureState::Completed);

        let touch = InputEvent::touch_begin(DeviceId::new(0), SequenceId::new(2), Offset::ZERO)
            .with_device_kind(DeviceKind::Pointer);
        assert!(!gesture.should_handle_sequence(&touch));
    }
}
