//! Foundation types for the Strata gesture coordinator
//!
//! This crate provides the vocabulary shared between the coordinator and its
//! host: a small geometry type, strongly-typed device identifiers, and the
//! input event model.
//!
//! # Architecture
//!
//! ```text
//! Host (stage, seat, event loop)
//!     ↓
//! InputEvent (this crate)
//!     ↓
//! Gesture coordinator (strata-gestures)
//! ```
//!
//! # Modules
//!
//! - [`geometry`] - 2D offsets and distances
//! - [`device`] - Device, sequence, and actor identifiers
//! - [`event`] - The tagged input event sum

pub mod device;
pub mod event;
pub mod geometry;

// Re-export main types
pub use device::{ActorId, DeviceId, DeviceKind, DeviceKinds, SequenceId};
pub use event::{Button, EventDisposition, EventFlags, EventKind, InputEvent, Modifiers};
pub use geometry::Offset;
