//! Gesture state machine states
//!
//! Every gesture is in exactly one of six states. WAITING is the rest state;
//! a gesture leaves it when it accepts its first point and returns to it when
//! its last point is gone after completion or cancellation.
//!
//! ```text
//! Waiting ──────────────► Possible (first accepted point)
//!    ▲                        │
//!    │                        ├──► Recognizing ──► Completed
//!    │                        │         │              │
//!    │                        │         └──► Cancelled │
//!    │                        │                   │    │
//!    │                        └──► Cancelled      │    │
//!    │                                  │         │    │
//!    └──────────────────────────────────┴─────────┴────┘ (point store empties)
//! ```
//!
//! [`GestureState::RecognizePending`] sits between Possible and Recognizing:
//! the subclass has asked to recognize, but an outstanding failure
//! requirement on a peer has not resolved yet.

/// State of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// At rest, holding no points.
    #[default]
    Waiting,

    /// Tracking points; might still become the recognized gesture.
    Possible,

    /// Recognition was requested but is gated on a peer failing first.
    ///
    /// Externally observable as its own state; the gesture promotes to
    /// [`Recognizing`](Self::Recognizing) when every awaited peer reaches
    /// [`Cancelled`](Self::Cancelled), and is cancelled if one of them
    /// recognizes instead.
    RecognizePending,

    /// The gesture has recognized and owns its sequences.
    Recognizing,

    /// The gesture finished successfully.
    ///
    /// Remaining sequences are absorbed without being reported; the gesture
    /// returns to [`Waiting`](Self::Waiting) once they are gone.
    Completed,

    /// The gesture gave up or was cancelled by a competitor.
    Cancelled,
}

impl GestureState {
    /// Whether the gesture is at rest.
    #[inline]
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Whether the gesture is tracking a potential gesture.
    #[inline]
    pub fn is_possible(self) -> bool {
        matches!(self, Self::Possible)
    }

    /// Whether recognition is pending on a failure requirement.
    #[inline]
    pub fn is_recognize_pending(self) -> bool {
        matches!(self, Self::RecognizePending)
    }

    /// Whether the gesture has recognized.
    #[inline]
    pub fn is_recognizing(self) -> bool {
        matches!(self, Self::Recognizing)
    }

    /// Whether the gesture is in a terminal state (completed or cancelled).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the gesture participates in arbitration (any state but
    /// [`Waiting`](Self::Waiting)).
    #[inline]
    pub fn is_active(self) -> bool {
        !self.is_waiting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_waiting() {
        assert_eq!(GestureState::default(), GestureState::Waiting);
    }

    #[test]
    fn test_is_active() {
        assert!(!GestureState::Waiting.is_active());
        assert!(GestureState::Possible.is_active());
        assert!(GestureState::RecognizePending.is_active());
        assert!(GestureState::Recognizing.is_active());
        assert!(GestureState::Completed.is_active());
        assert!(GestureState::Cancelled.is_active());
    }

    #[test]
    fn test_is_terminal() {
        assert!(GestureState::Completed.is_terminal());
        assert!(GestureState::Cancelled.is_terminal());
        assert!(!GestureState::Recognizing.is_terminal());
        assert!(!GestureState::RecognizePending.is_terminal());
        assert!(!GestureState::Waiting.is_terminal());
    }
}
