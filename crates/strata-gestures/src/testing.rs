//! Test doubles for driving the coordinator
//!
//! [`TestStage`] is a miniature host: it offers begin events to every
//! attached gesture, sets up pairwise relationships when gestures share a
//! point, honors the delivery-order verdict, and routes follow-up events to
//! the gestures that accepted the sequence. [`RecordingHost`] captures
//! `claim_sequence` calls so tests can assert on them.
//!
//! These doubles drive the same public API a real host would; they contain
//! no shortcuts into the engine.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_types::{DeviceId, EventDisposition, InputEvent, SequenceId};

use crate::coordinator::GestureCoordinator;
use crate::gesture::Gesture;
use crate::host::GestureHost;
use crate::relationship::SequenceOrdering;

/// A [`GestureHost`] that records every claimed sequence.
#[derive(Default)]
pub struct RecordingHost {
    claims: Mutex<Vec<(DeviceId, Option<SequenceId>)>>,
}

impl RecordingHost {
    /// Creates an empty recording host.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The sequences claimed so far, in order.
    pub fn claims(&self) -> Vec<(DeviceId, Option<SequenceId>)> {
        self.claims.lock().clone()
    }
}

impl GestureHost for RecordingHost {
    fn claim_sequence(&self, device: DeviceId, sequence: Option<SequenceId>) {
        self.claims.lock().push((device, sequence));
    }
}

impl fmt::Debug for RecordingHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingHost")
            .field("claims", &self.claims.lock().len())
            .finish()
    }
}

struct Route {
    key: (DeviceId, Option<SequenceId>),
    gestures: Vec<Gesture>,
}

/// A miniature host driving attached gestures the way a stage would.
pub struct TestStage {
    coordinator: GestureCoordinator,
    host: Arc<RecordingHost>,
    gestures: Mutex<Vec<Gesture>>,
    routes: Mutex<Vec<Route>>,
}

impl TestStage {
    /// Creates a stage with its own coordinator and recording host.
    pub fn new() -> Self {
        let host = RecordingHost::new();
        let coordinator = GestureCoordinator::new();
        coordinator.set_host(host.clone());
        Self {
            coordinator,
            host,
            gestures: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
        }
    }

    /// The stage's coordinator, for creating gestures.
    pub fn coordinator(&self) -> GestureCoordinator {
        self.coordinator.clone()
    }

    /// The recording host behind the coordinator.
    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    /// Attaches a gesture to the stage.
    pub fn add_gesture(&self, gesture: &Gesture) {
        self.gestures.lock().push(gesture.clone());
    }

    /// Delivers one event the way a stage would: begin events are offered
    /// around and set up relationships, everything else follows the routing
    /// established at begin time. Delivery stops when a gesture consumes
    /// the event.
    pub fn deliver(&self, event: &InputEvent) {
        let key = event.point_key();

        if event.kind.is_begin() {
            let mut accepted: Vec<Gesture> = self
                .gestures
                .lock()
                .iter()
                .filter(|g| g.should_handle_sequence(event))
                .cloned()
                .collect();

            // first sharing of the point: negotiate pairs and honor the
            // delivery-order verdict
            for i in 0..accepted.len() {
                for j in (i + 1)..accepted.len() {
                    accepted[i].setup_sequence_relationship(&accepted[j], key.0, key.1);
                }
            }
            accepted.sort_by(|a, b| {
                match a.setup_sequence_relationship(b, key.0, key.1) {
                    SequenceOrdering::SelfFirst => Ordering::Less,
                    SequenceOrdering::Unordered => Ordering::Equal,
                    SequenceOrdering::PeerFirst => Ordering::Greater,
                }
            });

            for gesture in &accepted {
                if gesture.handle_event(event) == EventDisposition::Consume {
                    break;
                }
            }
            self.routes.lock().push(Route {
                key,
                gestures: accepted,
            });
            return;
        }

        let targets: Vec<Gesture> = self
            .routes
            .lock()
            .iter()
            .find(|route| route.key == key)
            .map(|route| route.gestures.clone())
            .unwrap_or_default();

        for gesture in &targets {
            if gesture.handle_event(event) == EventDisposition::Consume {
                break;
            }
        }

        if event.kind.is_end() {
            self.routes.lock().retain(|route| route.key != key);
        }
    }
}

impl Default for TestStage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStage")
            .field("gestures", &self.gestures.lock().len())
            .field("routes", &self.routes.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GestureState;
    use strata_types::Offset;

    #[test]
    fn test_stage_routes_begin_and_end() {
        let stage = TestStage::new();
        let gesture = Gesture::new(&stage.coordinator());
        stage.add_gesture(&gesture);

        stage.deliver(&InputEvent::button_press(DeviceId::new(0), Offset::ZERO));
        assert_eq!(gesture.state(), GestureState::Possible);
        assert_eq!(gesture.point_count(), 1);

        stage.deliver(&InputEvent::button_release(DeviceId::new(0), Offset::ZERO));
        assert_eq!(gesture.point_count(), 0);
    }

    #[test]
    fn test_host_records_claims() {
        let stage = TestStage::new();
        let gesture = Gesture::new(&stage.coordinator());
        stage.add_gesture(&gesture);

        stage.deliver(&InputEvent::button_press(DeviceId::new(0), Offset::ZERO));
        gesture.set_state(GestureState::Recognizing);

        assert_eq!(stage.host().claims(), vec![(DeviceId::new(0), None)]);
    }
}
