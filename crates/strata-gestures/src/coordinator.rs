//! The shared coordination context
//!
//! A [`GestureCoordinator`] is the explicit value tying a set of gestures
//! together: the active set used for global arbitration, the host the
//! coordinator reports claims to, and the resolution queue that orders
//! relationship cascades.
//!
//! The coordinator is a cheap `Clone` handle; every gesture created with it
//! shares the same underlying state. Hosts usually keep one per stage.
//!
//! # Cascade ordering
//!
//! State changes that can resolve other gestures (a peer reaching CANCELLED
//! or RECOGNIZING) are queued and drained first-in first-out by the
//! outermost call. A cancellation that unblocks several pending gestures
//! therefore finishes propagating before any of them promotes, and
//! promotions triggered by a promotion are processed after the cancellations
//! they caused.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use strata_types::{DeviceId, SequenceId};

use crate::gesture::{Gesture, GestureInner};
use crate::host::GestureHost;
use crate::state::GestureState;

/// How a gesture resolved, from the point of view of peers gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The gesture reached CANCELLED; dependents may promote.
    Cancelled,
    /// The gesture reached RECOGNIZING; dependents are cancelled.
    Recognized,
}

struct Resolution {
    gesture: Weak<GestureInner>,
    outcome: Outcome,
}

struct CoordinatorInner {
    active: Mutex<Vec<Weak<GestureInner>>>,
    host: Mutex<Option<Arc<dyn GestureHost>>>,
    queue: Mutex<VecDeque<Resolution>>,
    draining: AtomicBool,
    next_gesture_id: AtomicU64,
}

/// Shared context for a set of cooperating gestures.
#[derive(Clone)]
pub struct GestureCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl GestureCoordinator {
    /// Creates a coordinator with no host attached.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                active: Mutex::new(Vec::new()),
                host: Mutex::new(None),
                queue: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                next_gesture_id: AtomicU64::new(1),
            }),
        }
    }

    /// Attaches the host the coordinator reports to.
    pub fn set_host(&self, host: Arc<dyn GestureHost>) {
        *self.inner.host.lock() = Some(host);
    }

    /// Builder-style variant of [`set_host`](Self::set_host).
    pub fn with_host(self, host: Arc<dyn GestureHost>) -> Self {
        self.set_host(host);
        self
    }

    /// Gestures currently not in WAITING. Dead entries are pruned as a side
    /// effect.
    pub fn active_gestures(&self) -> Vec<Gesture> {
        let mut active = self.inner.active.lock();
        active.retain(|weak| weak.strong_count() > 0);
        active
            .iter()
            .filter_map(Weak::upgrade)
            .map(Gesture::from_inner)
            .collect()
    }

    /// Number of gestures currently not in WAITING.
    pub fn active_count(&self) -> usize {
        self.active_gestures().len()
    }

    pub(crate) fn next_gesture_id(&self) -> u64 {
        self.inner.next_gesture_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn register_active(&self, gesture: Weak<GestureInner>) {
        let mut active = self.inner.active.lock();
        if !active
            .iter()
            .any(|w| std::ptr::eq(w.as_ptr(), gesture.as_ptr()))
        {
            active.push(gesture);
        }
    }

    pub(crate) fn remove_active(&self, gesture: &Arc<GestureInner>) {
        self.inner
            .active
            .lock()
            .retain(|w| !std::ptr::eq(w.as_ptr(), Arc::as_ptr(gesture)));
    }

    pub(crate) fn claim_sequence(&self, device: DeviceId, sequence: Option<SequenceId>) {
        let host = self.inner.host.lock().clone();
        if let Some(host) = host {
            host.claim_sequence(device, sequence);
        }
    }

    pub(crate) fn main_thread_assert(&self) {
        if cfg!(debug_assertions) {
            let host = self.inner.host.lock().clone();
            if let Some(host) = host {
                host.main_thread_assert();
            }
        }
    }

    /// Queues a resolution and drains the queue unless a drain is already
    /// running further up the stack.
    pub(crate) fn resolve(&self, gesture: Weak<GestureInner>, outcome: Outcome) {
        self.inner
            .queue
            .lock()
            .push_back(Resolution { gesture, outcome });
        self.drain();
    }

    fn drain(&self) {
        if self.inner.draining.swap(true, Ordering::Acquire) {
            // The outermost drain picks this entry up.
            return;
        }

        loop {
            let resolution = self.inner.queue.lock().pop_front();
            let Some(resolution) = resolution else { break };
            self.process(&resolution);
        }

        self.inner.draining.store(false, Ordering::Release);
    }

    fn process(&self, resolution: &Resolution) {
        let dependents: Vec<Gesture> = self
            .active_gestures()
            .into_iter()
            .filter(|g| {
                g.state() == GestureState::RecognizePending
                    && g.awaits_failure_of(&resolution.gesture)
            })
            .collect();

        for dependent in dependents {
            match resolution.outcome {
                Outcome::Cancelled => {
                    tracing::debug!("re-evaluating pending gesture {}", dependent.display_name());
                    dependent.reevaluate_pending();
                }
                Outcome::Recognized => {
                    tracing::debug!(
                        "cancelling pending gesture {}: awaited peer recognized",
                        dependent.display_name()
                    );
                    dependent.force_cancel();
                }
            }
        }
    }
}

impl Default for GestureCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GestureCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCoordinator")
            .field("active", &self.inner.active.lock().len())
            .field("has_host", &self.inner.host.lock().is_some())
            .finish()
    }
}
