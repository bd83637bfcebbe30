//! Gesture recognition coordinator for Strata
//!
//! Turns low-level pointer and touch input into discrete gestures while
//! arbitrating between the candidates observing the same points.
//!
//! # Architecture
//!
//! ```text
//! Host (stage, seat)
//!     ↓ should_handle_sequence / handle_event
//! Gesture base (state machine + point store)        gesture, points, state
//!     ↓ hooks                                       hooks
//! Recognizers (tap, long-press, pan)                recognizers
//!     ↓ callbacks
//! Client code
//!
//! Arbitration between gestures:                     relationship, coordinator
//! Dispatch target selection:                        grab
//! Deadlines:                                        timer
//! ```
//!
//! Every gesture runs a five-state machine (WAITING → POSSIBLE →
//! RECOGNIZING → COMPLETED/CANCELLED, plus the observable RECOGNIZE_PENDING
//! while a failure requirement is outstanding). A [`GestureCoordinator`]
//! ties the gestures of one stage together: only one unrelated gesture
//! recognizes at a time, and recognizing cancels the losers synchronously.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_gestures::prelude::*;
//!
//! let coordinator = GestureCoordinator::new();
//! let timers = TimerService::new();
//!
//! let tap = TapGestureRecognizer::new(&coordinator, &timers)
//!     .with_on_tap(|details| println!("tap at {}", details.position));
//! let pan = PanGestureRecognizer::new(&coordinator)
//!     .with_on_pan_update(|details| println!("pan by {}", details.delta));
//!
//! // host event loop: offer begin events, route the rest,
//! // call timers.check_timers() each iteration
//! ```
//!
//! # Threading
//!
//! The coordinator is driven synchronously from the host's main thread.
//! Handles are `Send + Sync` for convenience, but state transitions, hook
//! invocations, and relationship walks all happen inline with the calls
//! that trigger them; re-entering a gesture from one of its own hooks is
//! not supported.

pub mod coordinator;
pub mod error;
pub mod gesture;
pub mod grab;
pub mod hooks;
pub mod host;
pub mod points;
pub mod recognizers;
pub mod relationship;
pub mod settings;
pub mod state;
pub mod testing;
pub mod timer;
pub mod velocity;

// Re-export main types
pub use coordinator::GestureCoordinator;
pub use error::GestureError;
pub use gesture::Gesture;
pub use grab::{ActorGrab, EventGrab, GrabDelivery, SceneTree};
pub use hooks::GestureHooks;
pub use host::GestureHost;
pub use points::GesturePoint;
pub use recognizers::{
    LongPressDetails, LongPressGestureRecognizer, PanEndDetails, PanGestureRecognizer,
    PanUpdateDetails, TapDetails, TapGestureRecognizer,
};
pub use relationship::SequenceOrdering;
pub use settings::{PanAxis, RecognizerSettings};
pub use state::GestureState;
pub use timer::{TimerHandle, TimerService};
pub use velocity::{DeltaHistory, Velocity};

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::coordinator::GestureCoordinator;
    pub use crate::gesture::Gesture;
    pub use crate::grab::{ActorGrab, EventGrab, GrabDelivery, SceneTree};
    pub use crate::hooks::GestureHooks;
    pub use crate::host::GestureHost;
    pub use crate::points::GesturePoint;
    pub use crate::recognizers::{
        LongPressGestureRecognizer, PanGestureRecognizer, TapGestureRecognizer,
    };
    pub use crate::relationship::SequenceOrdering;
    pub use crate::settings::{PanAxis, RecognizerSettings};
    pub use crate::state::GestureState;
    pub use crate::timer::TimerService;
    pub use strata_types::{
        ActorId, DeviceId, DeviceKind, DeviceKinds, EventDisposition, EventKind, InputEvent,
        Offset, SequenceId,
    };
}
