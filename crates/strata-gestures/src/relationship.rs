//! The relationship engine
//!
//! Decides, on every state transition, which gestures must be cancelled,
//! which must be inhibited, and which may progress.
//!
//! Two mechanisms cooperate:
//!
//! - **Pairwise edges.** When two gestures first share a point, the host
//!   calls [`setup_sequence_relationship`](Gesture::setup_sequence_relationship)
//!   and the pair negotiates, per direction, whether one side recognizing
//!   cancels the other. Defaults to mutual cancellation; subclass hooks and
//!   the [`can_not_cancel`](Gesture::can_not_cancel) override can clear a
//!   direction. The verdict also orders event delivery between the pair.
//! - **Global arbitration.** Only one gesture recognizes at a time. A
//!   gesture entering RECOGNIZING cancels every unrelated POSSIBLE gesture
//!   that is not explicitly allowed to start beside it, and unrelated
//!   gestures cannot enter POSSIBLE or RECOGNIZING while it runs.
//!
//! [`require_failure_of`](Gesture::require_failure_of) layers failure
//! chaining on top: a gesture whose requirement is outstanding sits in
//! RECOGNIZE_PENDING until the awaited peer cancels (promoting it) or
//! recognizes (cancelling it).
//!
//! Edges hold weak references only; a dropped peer is pruned wherever it is
//! encountered and never kept alive by its relationships.

use std::sync::{Arc, Weak};

use strata_types::{DeviceId, SequenceId};

use crate::gesture::{Gesture, GestureInner};
use crate::state::GestureState;

/// Delivery-order verdict for a gesture pair sharing a point.
///
/// The host consults a gesture that might cancel its peer on recognizing
/// *before* the peer, so observers see the loser cancelled before the winner
/// recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOrdering {
    /// Ask the calling gesture first: the peer's recognition cancels it,
    /// but not the other way around.
    SelfFirst,
    /// No preference; the directions are symmetric.
    Unordered,
    /// Ask the peer first.
    PeerFirst,
}

impl SequenceOrdering {
    /// The conventional signed form: -1 for self-first, +1 for peer-first.
    #[inline]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::SelfFirst => -1,
            Self::Unordered => 0,
            Self::PeerFirst => 1,
        }
    }

    const fn from_flags(cancels_peer: bool, cancelled_by_peer: bool) -> Self {
        match (cancels_peer, cancelled_by_peer) {
            (false, true) => Self::SelfFirst,
            (true, false) => Self::PeerFirst,
            _ => Self::Unordered,
        }
    }
}

/// State of this gesture's outstanding failure requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureGate {
    /// Every awaited peer has failed (or was never in the running).
    Clear,
    /// At least one awaited peer is still undecided.
    Blocked,
    /// An awaited peer recognized; the requirement can never be met.
    Failed,
}

/// One negotiated edge of the relationship graph.
#[derive(Debug)]
pub(crate) struct Edge {
    pub peer: Weak<GestureInner>,
    pub cancels_peer: bool,
    pub cancelled_by_peer: bool,
}

/// Per-gesture relationship bookkeeping.
///
/// `edges` and `cancel_on_recognizing` describe the current joint episode
/// and are torn down on the transition to WAITING. The remaining lists are
/// standing configuration installed by the client and survive episodes.
#[derive(Debug, Default)]
pub(crate) struct RelationshipState {
    pub edges: Vec<Edge>,
    pub cancel_on_recognizing: Vec<Weak<GestureInner>>,
    pub can_not_cancel: Vec<Weak<GestureInner>>,
    pub require_failure_of: Vec<Weak<GestureInner>>,
    pub independent_from: Vec<Weak<GestureInner>>,
}

fn weak_is(weak: &Weak<GestureInner>, target: &Arc<GestureInner>) -> bool {
    std::ptr::eq(weak.as_ptr(), Arc::as_ptr(target))
}

fn push_unique(list: &mut Vec<Weak<GestureInner>>, target: &Arc<GestureInner>) {
    if !list.iter().any(|w| weak_is(w, target)) {
        list.push(Arc::downgrade(target));
    }
}

/// May `gesture` start (or keep going) while `recognizing` runs?
fn other_allowed_to_start(gesture: &Gesture, recognizing: &Gesture) -> bool {
    if gesture.has_independence_from(recognizing) {
        return true;
    }
    let granted = recognizing
        .hooks()
        .map(|hooks| hooks.should_start_while(recognizing, gesture))
        .unwrap_or(false);
    match gesture.hooks() {
        Some(hooks) => hooks.other_gesture_may_start(gesture, recognizing, granted),
        None => granted,
    }
}

impl Gesture {
    // ========================================================================
    // Standing configuration
    // ========================================================================

    /// This gesture recognizing will not cancel `other`, whatever the
    /// defaults and hooks say. Takes effect when the pair next negotiates;
    /// call [`relationships_changed`](Self::relationships_changed) to apply
    /// it mid-sequence.
    pub fn can_not_cancel(&self, other: &Gesture) {
        push_unique(&mut self.inner().rel.lock().can_not_cancel, other.inner());
    }

    /// This gesture may start while `other` is already recognizing,
    /// overriding the global one-at-a-time default for the ordered pair.
    pub fn recognize_independently_from(&self, other: &Gesture) {
        push_unique(&mut self.inner().rel.lock().independent_from, other.inner());
    }

    /// This gesture cannot reach RECOGNIZING until `other` has been
    /// cancelled. While the requirement is outstanding the gesture reports
    /// RECOGNIZE_PENDING.
    pub fn require_failure_of(&self, other: &Gesture) {
        push_unique(&mut self.inner().rel.lock().require_failure_of, other.inner());
    }

    // ========================================================================
    // Pairwise negotiation
    // ========================================================================

    /// Called by the host when this gesture and `peer` first share the point
    /// `(device, sequence)`. Negotiates the cancellation flags for both
    /// directions, installs the mutual edge, and returns the delivery-order
    /// verdict. Calling again for a known pair returns the stored verdict.
    pub fn setup_sequence_relationship(
        &self,
        peer: &Gesture,
        device: DeviceId,
        sequence: Option<SequenceId>,
    ) -> SequenceOrdering {
        debug_assert!(self != peer);
        debug_assert!(
            self.has_point(device, sequence) && peer.has_point(device, sequence),
            "setup_sequence_relationship for a point the pair does not share"
        );

        if let Some(existing) = self.edge_flags(peer) {
            return SequenceOrdering::from_flags(existing.0, existing.1);
        }

        let (cancels_peer, cancelled_by_peer) = self.negotiate_pair(peer);
        self.store_edge(peer, cancels_peer, cancelled_by_peer);
        peer.store_edge(self, cancelled_by_peer, cancels_peer);

        tracing::debug!(
            "relationship {} <-> {}: cancels={} cancelled_by={}",
            self.display_name(),
            peer.display_name(),
            cancels_peer,
            cancelled_by_peer,
        );

        SequenceOrdering::from_flags(cancels_peer, cancelled_by_peer)
    }

    /// Re-negotiates every existing edge of this gesture, picking up
    /// overrides installed after the pair first met. Only the caller's
    /// edges are re-run; peers keep their own other relationships as-is.
    pub fn relationships_changed(&self) {
        let peers: Vec<Gesture> = {
            let rel = self.inner().rel.lock();
            rel.edges
                .iter()
                .filter_map(|e| e.peer.upgrade())
                .map(Gesture::from_inner)
                .collect()
        };
        for peer in peers {
            let (cancels_peer, cancelled_by_peer) = self.negotiate_pair(&peer);
            self.update_edge(&peer, cancels_peer, cancelled_by_peer);
            peer.update_edge(self, cancelled_by_peer, cancels_peer);
        }
    }

    /// Computes the two cancellation flags for this pair: defaults, then
    /// the subclass hooks of both sides, then the explicit overrides.
    fn negotiate_pair(&self, peer: &Gesture) -> (bool, bool) {
        let mut cancels_peer = true;
        let mut cancelled_by_peer = true;

        if let Some(hooks) = self.hooks() {
            hooks.should_influence(self, peer, &mut cancels_peer);
        }
        if let Some(hooks) = peer.hooks() {
            hooks.should_be_influenced_by(peer, self, &mut cancels_peer);
        }
        if self.has_can_not_cancel(peer) {
            cancels_peer = false;
        }

        if let Some(hooks) = peer.hooks() {
            hooks.should_influence(peer, self, &mut cancelled_by_peer);
        }
        if let Some(hooks) = self.hooks() {
            hooks.should_be_influenced_by(self, peer, &mut cancelled_by_peer);
        }
        if peer.has_can_not_cancel(self) {
            cancelled_by_peer = false;
        }

        (cancels_peer, cancelled_by_peer)
    }

    fn store_edge(&self, peer: &Gesture, cancels_peer: bool, cancelled_by_peer: bool) {
        let mut rel = self.inner().rel.lock();
        rel.edges.push(Edge {
            peer: Arc::downgrade(peer.inner()),
            cancels_peer,
            cancelled_by_peer,
        });
        if cancels_peer {
            push_unique(&mut rel.cancel_on_recognizing, peer.inner());
        }
    }

    fn update_edge(&self, peer: &Gesture, cancels_peer: bool, cancelled_by_peer: bool) {
        let mut rel = self.inner().rel.lock();
        if let Some(edge) = rel.edges.iter_mut().find(|e| weak_is(&e.peer, peer.inner())) {
            edge.cancels_peer = cancels_peer;
            edge.cancelled_by_peer = cancelled_by_peer;
        }
        let present = rel
            .cancel_on_recognizing
            .iter()
            .any(|w| weak_is(w, peer.inner()));
        if cancels_peer && !present {
            rel.cancel_on_recognizing.push(Arc::downgrade(peer.inner()));
        } else if !cancels_peer && present {
            rel.cancel_on_recognizing
                .retain(|w| !weak_is(w, peer.inner()));
        }
    }

    fn edge_flags(&self, peer: &Gesture) -> Option<(bool, bool)> {
        self.inner()
            .rel
            .lock()
            .edges
            .iter()
            .find(|e| weak_is(&e.peer, peer.inner()))
            .map(|e| (e.cancels_peer, e.cancelled_by_peer))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether this gesture and `other` share an episode edge.
    pub fn is_in_relationship_with(&self, other: &Gesture) -> bool {
        self.inner()
            .rel
            .lock()
            .edges
            .iter()
            .any(|e| weak_is(&e.peer, other.inner()))
    }

    pub(crate) fn has_can_not_cancel(&self, other: &Gesture) -> bool {
        self.inner()
            .rel
            .lock()
            .can_not_cancel
            .iter()
            .any(|w| weak_is(w, other.inner()))
    }

    pub(crate) fn has_independence_from(&self, other: &Gesture) -> bool {
        self.inner()
            .rel
            .lock()
            .independent_from
            .iter()
            .any(|w| weak_is(w, other.inner()))
    }

    pub(crate) fn awaits_failure_of(&self, target: &Weak<GestureInner>) -> bool {
        self.inner()
            .rel
            .lock()
            .require_failure_of
            .iter()
            .any(|w| std::ptr::eq(w.as_ptr(), target.as_ptr()))
    }

    pub(crate) fn has_point(&self, device: DeviceId, sequence: Option<SequenceId>) -> bool {
        self.inner().points.lock().find((device, sequence)).is_some()
    }

    // ========================================================================
    // Arbitration walks
    // ========================================================================

    /// State of this gesture's failure requirements. Dead targets count as
    /// passed; a target that recognized (even if it completed since) fails
    /// the requirement for good.
    pub(crate) fn failure_gate(&self) -> FailureGate {
        let targets: Vec<Gesture> = {
            let rel = self.inner().rel.lock();
            rel.require_failure_of
                .iter()
                .filter_map(Weak::upgrade)
                .map(Gesture::from_inner)
                .collect()
        };

        let mut gate = FailureGate::Clear;
        for target in targets {
            match target.state() {
                GestureState::Recognizing | GestureState::Completed => return FailureGate::Failed,
                GestureState::Possible | GestureState::RecognizePending => {
                    gate = FailureGate::Blocked;
                }
                GestureState::Waiting | GestureState::Cancelled => {}
            }
        }
        gate
    }

    /// The global one-at-a-time rule: unrelated gestures cannot start while
    /// another gesture is recognizing, unless explicitly allowed.
    pub(crate) fn global_start_allowed(&self) -> bool {
        for other in self.inner().coordinator.active_gestures() {
            if other == *self || other.state() != GestureState::Recognizing {
                continue;
            }
            if self.is_in_relationship_with(&other) {
                continue;
            }
            if !other_allowed_to_start(self, &other) {
                return false;
            }
        }
        true
    }

    /// On entering RECOGNIZING: cancel every POSSIBLE gesture that is
    /// neither related to this one nor allowed to run beside it.
    pub(crate) fn maybe_cancel_independent_gestures(&self) {
        for other in self.inner().coordinator.active_gestures() {
            if other == *self || other.state() != GestureState::Possible {
                continue;
            }
            if self.is_in_relationship_with(&other) {
                continue;
            }
            if other_allowed_to_start(&other, self) {
                continue;
            }
            tracing::debug!(
                "gesture {} recognized; cancelling independent {}",
                self.display_name(),
                other.display_name()
            );
            other.force_cancel();
        }
    }

    /// On entering RECOGNIZING: cancel the peers this gesture's recognition
    /// wins against. The set is emptied before the walk, so recursive
    /// cancellations cannot re-enter it.
    pub(crate) fn run_cancel_on_recognizing(&self) {
        let losers: Vec<Gesture> = {
            let mut rel = self.inner().rel.lock();
            std::mem::take(&mut rel.cancel_on_recognizing)
                .iter()
                .filter_map(Weak::upgrade)
                .map(Gesture::from_inner)
                .collect()
        };
        for loser in losers {
            if self.is_in_relationship_with(&loser) {
                tracing::debug!(
                    "gesture {} recognized; cancelling {}",
                    self.display_name(),
                    loser.display_name()
                );
                loser.force_cancel();
            }
        }
    }

    /// On entering WAITING: the joint episode is over. Both directions of
    /// every edge are dropped; standing configuration stays.
    pub(crate) fn teardown_relationships(&self) {
        let peers: Vec<Arc<GestureInner>> = {
            let mut rel = self.inner().rel.lock();
            let peers = rel.edges.iter().filter_map(|e| e.peer.upgrade()).collect();
            rel.edges.clear();
            rel.cancel_on_recognizing.clear();
            peers
        };
        for peer in peers {
            let mut rel = peer.rel.lock();
            rel.edges.retain(|e| !weak_is(&e.peer, self.inner()));
            rel.cancel_on_recognizing
                .retain(|w| !weak_is(w, self.inner()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::GestureCoordinator;
    use strata_types::{InputEvent, Offset};

    fn press() -> InputEvent {
        InputEvent::button_press(DeviceId::new(0), Offset::new(15.0, 15.0))
    }

    fn possible_pair() -> (GestureCoordinator, Gesture, Gesture) {
        let coordinator = GestureCoordinator::new();
        let a = Gesture::new(&coordinator);
        let b = Gesture::new(&coordinator);
        assert!(a.should_handle_sequence(&press()));
        assert!(b.should_handle_sequence(&press()));
        (coordinator, a, b)
    }

    #[test]
    fn test_default_negotiation_is_mutual() {
        let (_c, a, b) = possible_pair();
        let ordering = a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        assert_eq!(ordering, SequenceOrdering::Unordered);
        assert_eq!(ordering.as_i8(), 0);
    }

    #[test]
    fn test_membership_is_mutual() {
        let (_c, a, b) = possible_pair();
        a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        assert!(a.is_in_relationship_with(&b));
        assert!(b.is_in_relationship_with(&a));
    }

    #[test]
    fn test_can_not_cancel_orders_delivery() {
        let (_c, a, b) = possible_pair();
        // a can no longer cancel b, so b's recognition is the only threat
        // and a must be consulted first
        a.can_not_cancel(&b);
        let ordering = a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        assert_eq!(ordering, SequenceOrdering::SelfFirst);
        assert_eq!(ordering.as_i8(), -1);

        // the peer sees the mirror image
        let mirrored = b.setup_sequence_relationship(&a, DeviceId::new(0), None);
        assert_eq!(mirrored, SequenceOrdering::PeerFirst);
    }

    #[test]
    fn test_repeat_setup_returns_stored_verdict() {
        let (_c, a, b) = possible_pair();
        a.can_not_cancel(&b);
        let first = a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        // installing another override afterwards must not change the stored
        // verdict until relationships_changed is called
        b.can_not_cancel(&a);
        let second = a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_relationships_changed_renegotiates() {
        let (_c, a, b) = possible_pair();
        a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        a.can_not_cancel(&b);
        a.relationships_changed();
        let verdict = a.setup_sequence_relationship(&b, DeviceId::new(0), None);
        assert_eq!(verdict, SequenceOrdering::SelfFirst);
    }

    #[test]
    fn test_full_cycle_clears_relationships() {
        let (_c, a, b) = possible_pair();
        a.setup_sequence_relationship(&b, DeviceId::new(0), None);

        a.set_state(GestureState::Recognizing);
        a.set_state(GestureState::Completed);
        let release = InputEvent::button_release(DeviceId::new(0), Offset::new(15.0, 15.0));
        a.handle_event(&release);
        b.handle_event(&release);

        assert_eq!(a.state(), GestureState::Waiting);
        assert!(!a.is_in_relationship_with(&b));
        assert!(!b.is_in_relationship_with(&a));
    }

    #[test]
    fn test_dropped_peer_resolves_requirement() {
        let (_c, a, b) = possible_pair();
        a.require_failure_of(&b);
        drop(b);
        assert_eq!(a.failure_gate(), FailureGate::Clear);
    }
}
