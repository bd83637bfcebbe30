//! Error types for the gesture coordinator

use thiserror::Error;

use crate::state::GestureState;

/// Errors surfaced by the gesture coordinator.
///
/// Only caller mistakes become errors; engine invariant violations are
/// programming bugs and abort in debug builds instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GestureError {
    /// A state change was requested that the transition table forbids.
    ///
    /// Requests to [`GestureState::Cancelled`] never produce this error;
    /// giving up is always accepted.
    #[error("gesture {gesture}: illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Diagnostic name of the gesture.
        gesture: String,
        /// The state the gesture was in.
        from: GestureState,
        /// The state that was requested.
        to: GestureState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_transition_display() {
        let err = GestureError::IllegalTransition {
            gesture: "tap".into(),
            from: GestureState::Possible,
            to: GestureState::Waiting,
        };
        let message = err.to_string();
        assert!(message.contains("tap"));
        assert!(message.contains("Possible"));
        assert!(message.contains("Waiting"));
    }
}
