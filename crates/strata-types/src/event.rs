//! Input event model
//!
//! The host delivers input to the coordinator as a tagged sum: one
//! [`InputEvent`] struct whose [`EventKind`] discriminates the nine event
//! kinds the coordinator recognizes. Every event carries the identifying
//! tuple the point store is keyed by - `(device, sequence)` - along with the
//! source hardware device, position, timestamp, button, modifier state, and
//! flags.
//!
//! # Example
//!
//! ```
//! use strata_types::{DeviceId, InputEvent, Offset};
//!
//! let press = InputEvent::button_press(DeviceId::new(0), Offset::new(15.0, 15.0));
//! assert!(press.kind.is_begin());
//! assert!(press.sequence.is_none()); // pointer buttons have no sequence
//! ```

use bitflags::bitflags;

use crate::device::{ActorId, DeviceId, DeviceKind, SequenceId};
use crate::geometry::Offset;

// ============================================================================
// EventKind
// ============================================================================

/// Discriminant of an [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A pointer button was pressed.
    ButtonPress,
    /// A pointer button was released.
    ButtonRelease,
    /// The pointer moved.
    Motion,
    /// A touch sequence started.
    TouchBegin,
    /// A touch sequence moved.
    TouchUpdate,
    /// A touch sequence ended.
    TouchEnd,
    /// A touch sequence was cancelled by the compositor or kernel.
    TouchCancel,
    /// The pointer entered an actor.
    Enter,
    /// The pointer left an actor.
    Leave,
}

impl EventKind {
    /// Whether this kind starts a new point.
    #[inline]
    pub fn is_begin(self) -> bool {
        matches!(self, Self::ButtonPress | Self::TouchBegin)
    }

    /// Whether this kind moves an existing point.
    #[inline]
    pub fn is_update(self) -> bool {
        matches!(self, Self::Motion | Self::TouchUpdate)
    }

    /// Whether this kind terminates a point (normally or by cancellation).
    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self, Self::ButtonRelease | Self::TouchEnd | Self::TouchCancel)
    }

    /// Whether this is a focus-crossing kind.
    #[inline]
    pub fn is_crossing(self) -> bool {
        matches!(self, Self::Enter | Self::Leave)
    }
}

// ============================================================================
// Button / Modifiers / EventFlags
// ============================================================================

/// A pointer button number, 1-based as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Button(pub u32);

impl Button {
    /// The primary (usually left) button.
    pub const PRIMARY: Self = Self(1);
    /// The middle button.
    pub const MIDDLE: Self = Self(2);
    /// The secondary (usually right) button.
    pub const SECONDARY: Self = Self(3);
}

bitflags! {
    /// Keyboard and button modifier state carried on every event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        /// Shift is held.
        const SHIFT = 1 << 0;
        /// Control is held.
        const CONTROL = 1 << 1;
        /// Alt is held.
        const ALT = 1 << 2;
        /// Super/logo is held.
        const SUPER = 1 << 3;
        /// Button 1 is held.
        const BUTTON1 = 1 << 8;
        /// Button 2 is held.
        const BUTTON2 = 1 << 9;
        /// Button 3 is held.
        const BUTTON3 = 1 << 10;
    }
}

bitflags! {
    /// Per-event flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u8 {
        /// The event was synthesized rather than produced by hardware.
        /// Synthetic events are never dispatched to gesture subclasses.
        const SYNTHETIC = 1 << 0;
        /// A pointer event emulated from a touch sequence.
        const POINTER_EMULATED = 1 << 1;
    }
}

// ============================================================================
// EventDisposition
// ============================================================================

/// What the receiver of an event wants the host to do with it next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Keep delivering the event to other handlers.
    Propagate,
    /// Stop delivery; the event has been consumed.
    Consume,
}

// ============================================================================
// InputEvent
// ============================================================================

/// A single input event as delivered by the host.
///
/// Points are identified by `(device, sequence)`; `sequence` is `None` for
/// pointer buttons. `source_device` names the hardware device behind a
/// logical one (e.g. the physical mouse behind the seat pointer) and is what
/// the single-device discipline of the point store compares.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    /// The event kind.
    pub kind: EventKind,
    /// The logical device the event arrived on.
    pub device: DeviceId,
    /// The hardware device that produced the event.
    pub source_device: DeviceId,
    /// Classification of the source device.
    pub device_kind: DeviceKind,
    /// The touch sequence, or `None` for pointer events.
    pub sequence: Option<SequenceId>,
    /// Event position in stage coordinates.
    pub position: Offset,
    /// Event timestamp in milliseconds (host-defined epoch).
    pub time_ms: u64,
    /// The button for press/release events.
    pub button: Option<Button>,
    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
    /// Event flags.
    pub flags: EventFlags,
    /// The actor the event is targeted at, for crossing events.
    pub target: Option<ActorId>,
    /// The other actor of a crossing pair (left for Enter, entered for Leave).
    pub related: Option<ActorId>,
}

impl InputEvent {
    fn new(kind: EventKind, device: DeviceId, device_kind: DeviceKind, position: Offset) -> Self {
        Self {
            kind,
            device,
            source_device: device,
            device_kind,
            sequence: None,
            position,
            time_ms: 0,
            button: None,
            modifiers: Modifiers::empty(),
            flags: EventFlags::empty(),
            target: None,
            related: None,
        }
    }

    /// A button press on a pointer device.
    pub fn button_press(device: DeviceId, position: Offset) -> Self {
        let mut event = Self::new(EventKind::ButtonPress, device, DeviceKind::Pointer, position);
        event.button = Some(Button::PRIMARY);
        event
    }

    /// A button release on a pointer device.
    pub fn button_release(device: DeviceId, position: Offset) -> Self {
        let mut event = Self::new(EventKind::ButtonRelease, device, DeviceKind::Pointer, position);
        event.button = Some(Button::PRIMARY);
        event
    }

    /// Pointer motion.
    pub fn motion(device: DeviceId, position: Offset) -> Self {
        Self::new(EventKind::Motion, device, DeviceKind::Pointer, position)
    }

    /// The start of a touch sequence.
    pub fn touch_begin(device: DeviceId, sequence: SequenceId, position: Offset) -> Self {
        let mut event = Self::new(EventKind::TouchBegin, device, DeviceKind::Touchscreen, position);
        event.sequence = Some(sequence);
        event
    }

    /// An update to a touch sequence.
    pub fn touch_update(device: DeviceId, sequence: SequenceId, position: Offset) -> Self {
        let mut event =
            Self::new(EventKind::TouchUpdate, device, DeviceKind::Touchscreen, position);
        event.sequence = Some(sequence);
        event
    }

    /// The end of a touch sequence.
    pub fn touch_end(device: DeviceId, sequence: SequenceId, position: Offset) -> Self {
        let mut event = Self::new(EventKind::TouchEnd, device, DeviceKind::Touchscreen, position);
        event.sequence = Some(sequence);
        event
    }

    /// Compositor-side cancellation of a touch sequence.
    pub fn touch_cancel(device: DeviceId, sequence: SequenceId, position: Offset) -> Self {
        let mut event =
            Self::new(EventKind::TouchCancel, device, DeviceKind::Touchscreen, position);
        event.sequence = Some(sequence);
        event
    }

    /// A crossing event (`Enter` or `Leave`) between two actors.
    pub fn crossing(
        kind: EventKind,
        device: DeviceId,
        position: Offset,
        target: ActorId,
        related: Option<ActorId>,
    ) -> Self {
        debug_assert!(kind.is_crossing());
        let mut event = Self::new(kind, device, DeviceKind::Pointer, position);
        event.target = Some(target);
        event.related = related;
        event
    }

    // ========================================================================
    // Builder-style setters
    // ========================================================================

    /// Set the timestamp.
    #[inline]
    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    /// Set the button.
    #[inline]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the source hardware device.
    #[inline]
    pub fn with_source_device(mut self, source: DeviceId) -> Self {
        self.source_device = source;
        self
    }

    /// Set the source device classification.
    #[inline]
    pub fn with_device_kind(mut self, kind: DeviceKind) -> Self {
        self.device_kind = kind;
        self
    }

    /// Set the modifier state.
    #[inline]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event flags.
    #[inline]
    pub fn with_flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The `(device, sequence)` pair identifying the point this event
    /// belongs to.
    #[inline]
    pub fn point_key(&self) -> (DeviceId, Option<SequenceId>) {
        (self.device, self.sequence)
    }

    /// Whether the event carries the synthetic flag.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.flags.contains(EventFlags::SYNTHETIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        assert!(EventKind::ButtonPress.is_begin());
        assert!(EventKind::TouchBegin.is_begin());
        assert!(EventKind::Motion.is_update());
        assert!(EventKind::TouchUpdate.is_update());
        assert!(EventKind::ButtonRelease.is_end());
        assert!(EventKind::TouchEnd.is_end());
        assert!(EventKind::TouchCancel.is_end());
        assert!(EventKind::Enter.is_crossing());
        assert!(!EventKind::Motion.is_crossing());
    }

    #[test]
    fn test_button_press_defaults() {
        let event = InputEvent::button_press(DeviceId::new(0), Offset::new(1.0, 2.0));
        assert_eq!(event.kind, EventKind::ButtonPress);
        assert_eq!(event.button, Some(Button::PRIMARY));
        assert_eq!(event.sequence, None);
        assert_eq!(event.source_device, event.device);
        assert!(!event.is_synthetic());
    }

    #[test]
    fn test_touch_events_carry_sequence() {
        let seq = SequenceId::new(3);
        let event = InputEvent::touch_begin(DeviceId::new(1), seq, Offset::ZERO);
        assert_eq!(event.sequence, Some(seq));
        assert_eq!(event.device_kind, DeviceKind::Touchscreen);
        assert_eq!(event.point_key(), (DeviceId::new(1), Some(seq)));
    }

    #[test]
    fn test_builder_setters() {
        let event = InputEvent::button_press(DeviceId::new(0), Offset::ZERO)
            .with_time(1234)
            .with_button(Button::SECONDARY)
            .with_source_device(DeviceId::new(5))
            .with_flags(EventFlags::SYNTHETIC);

        assert_eq!(event.time_ms, 1234);
        assert_eq!(event.button, Some(Button::SECONDARY));
        assert_eq!(event.source_device, DeviceId::new(5));
        assert!(event.is_synthetic());
    }

    #[test]
    fn test_crossing_pair() {
        let target = ActorId::new(1);
        let related = ActorId::new(2);
        let event = InputEvent::crossing(
            EventKind::Enter,
            DeviceId::new(0),
            Offset::ZERO,
            target,
            Some(related),
        );
        assert_eq!(event.target, Some(target));
        assert_eq!(event.related, Some(related));
    }
}
