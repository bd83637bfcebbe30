//! Host interface
//!
//! The coordinator is driven entirely by synchronous calls from its host and
//! talks back through this thin trait. Timers are served separately by
//! [`TimerService`](crate::timer::TimerService).

use strata_types::{DeviceId, SequenceId};

/// The host-side collaborator of the coordinator.
pub trait GestureHost: Send + Sync {
    /// A gesture entered RECOGNIZING and now owns this sequence. The host
    /// typically rewrites delivery of the sequence's remaining events.
    fn claim_sequence(&self, device: DeviceId, sequence: Option<SequenceId>);

    /// Asserts that the caller is on the host's main thread. Debug aid; the
    /// default does nothing.
    fn main_thread_assert(&self) {}
}
