//! Grab abstraction
//!
//! A grab is a polymorphic event-delivery target the host installs while
//! some interaction owns the input. The host funnels every event category
//! through the grab's hooks; each hook answers with a [`GrabDelivery`]
//! telling the host where (or whether) to emit the event.
//!
//! The base trait forwards nothing. [`ActorGrab`] scopes delivery to a
//! scene-graph subtree: crossing pairs that happen entirely inside the
//! subtree pass through unchanged, crossings that straddle its boundary are
//! swallowed, and every other category is re-emitted on the subtree root.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use strata_types::{ActorId, InputEvent};

/// Where the host should emit an event a grab was consulted about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabDelivery {
    /// Swallow the event.
    Discard,
    /// Emit the event on this actor.
    Deliver(ActorId),
}

/// A target for grabbed event delivery.
///
/// One hook per event category the host delivers. Every hook defaults to
/// [`GrabDelivery::Discard`]; a plain grab blocks all input.
pub trait EventGrab: Send + Sync {
    /// Enter/leave events.
    fn focus_crossing(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Key press/release events.
    fn key(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Pointer motion events.
    fn motion(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Button press/release events.
    fn button(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Scroll events.
    fn scroll(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Touchpad gesture events (swipe/pinch/hold frames).
    fn touchpad_gesture(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Touch begin/update/end/cancel events.
    fn touch(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// Tablet pad events.
    fn pad(&self, _event: &InputEvent) -> GrabDelivery {
        GrabDelivery::Discard
    }

    /// A newer grab superseded this one and has now ended. Returns whether
    /// the host should reinstate this grab.
    fn cancel(&self) -> bool {
        false
    }
}

/// The host's scene graph, reduced to the one question the grab needs
/// answered.
pub trait SceneTree: Send + Sync {
    /// The parent of `actor`, or `None` for the root.
    fn parent(&self, actor: ActorId) -> Option<ActorId>;
}

/// Whether `ancestor` is `actor` or one of its ancestors.
fn is_ancestor_or_self(tree: &dyn SceneTree, ancestor: ActorId, actor: ActorId) -> bool {
    let mut current = Some(actor);
    while let Some(node) = current {
        if node == ancestor {
            return true;
        }
        current = tree.parent(node);
    }
    false
}

/// The lowest common ancestor of two actors, if they share one.
fn common_ancestor(tree: &dyn SceneTree, a: ActorId, b: ActorId) -> Option<ActorId> {
    let mut chain: SmallVec<[ActorId; 8]> = SmallVec::new();
    let mut current = Some(a);
    while let Some(node) = current {
        chain.push(node);
        current = tree.parent(node);
    }

    let mut current = Some(b);
    while let Some(node) = current {
        if chain.contains(&node) {
            return Some(node);
        }
        current = tree.parent(node);
    }
    None
}

/// A grab scoped to a scene-graph subtree.
pub struct ActorGrab {
    tree: Arc<dyn SceneTree>,
    root: ActorId,
}

impl ActorGrab {
    /// Creates a grab delivering into the subtree rooted at `root`.
    pub fn new(tree: Arc<dyn SceneTree>, root: ActorId) -> Self {
        Self { tree, root }
    }

    /// The subtree root all non-crossing events are re-emitted on.
    pub fn root(&self) -> ActorId {
        self.root
    }

    fn deliver_on_root(&self) -> GrabDelivery {
        GrabDelivery::Deliver(self.root)
    }
}

impl EventGrab for ActorGrab {
    /// Crossing pairs whose common ancestor lies inside the subtree are
    /// emitted unchanged; pairs straddling the boundary are swallowed.
    fn focus_crossing(&self, event: &InputEvent) -> GrabDelivery {
        let Some(target) = event.target else {
            return GrabDelivery::Discard;
        };
        let junction = match event.related {
            Some(related) => common_ancestor(self.tree.as_ref(), target, related),
            None => Some(target),
        };
        match junction {
            Some(junction) if is_ancestor_or_self(self.tree.as_ref(), self.root, junction) => {
                GrabDelivery::Deliver(target)
            }
            _ => GrabDelivery::Discard,
        }
    }

    fn key(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn motion(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn button(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn scroll(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn touchpad_gesture(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn touch(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }

    fn pad(&self, _event: &InputEvent) -> GrabDelivery {
        self.deliver_on_root()
    }
}

impl fmt::Debug for ActorGrab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorGrab").field("root", &self.root).finish()
    }
}
