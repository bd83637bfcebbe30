//! Type-safe identifiers using the newtype pattern
//!
//! Strongly-typed identifiers for input devices, touch sequences, and
//! scene-graph actors. Mixing them up is a compile error, and the
//! `NonZeroU64`-backed ones keep `Option<Id>` pointer-sized.

use std::fmt;
use std::num::NonZeroU64;

use bitflags::bitflags;

// ============================================================================
// DeviceId - Identifier for input devices
// ============================================================================

/// Unique identifier for an input device (mouse, touchscreen, stylus).
///
/// Uses `i32` to match platform seat APIs.
///
/// # Example
///
/// ```
/// use strata_types::DeviceId;
///
/// let mouse = DeviceId::new(0);
/// let touchscreen = DeviceId::new(1);
///
/// assert_ne!(mouse, touchscreen);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct DeviceId(i32);

impl DeviceId {
    /// Creates a new device ID.
    #[inline]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device:{}", self.0)
    }
}

impl From<i32> for DeviceId {
    #[inline]
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// SequenceId - Identifier for touch sequences
// ============================================================================

/// Identifier for a continuous stream of events belonging to one touch.
///
/// Pointer-button points have no sequence; they are represented as
/// `Option::<SequenceId>::None`. Backed by `NonZeroU64` so the `Option`
/// costs nothing.
///
/// # Example
///
/// ```
/// use strata_types::SequenceId;
///
/// let seq = SequenceId::new(7);
/// assert_eq!(seq.get(), 7);
///
/// assert_eq!(
///     std::mem::size_of::<Option<SequenceId>>(),
///     std::mem::size_of::<SequenceId>()
/// );
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SequenceId(NonZeroU64);

impl SequenceId {
    /// Creates a new sequence ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is 0. Use [`try_new`](Self::try_new) for fallible
    /// construction.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(NonZeroU64::new(id).expect("SequenceId cannot be 0"))
    }

    /// Creates a new sequence ID, returning `None` if `id` is 0.
    #[inline]
    pub const fn try_new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceId({})", self.0)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sequence:{}", self.0)
    }
}

// ============================================================================
// ActorId - Identifier for scene-graph nodes
// ============================================================================

/// Opaque handle for a scene-graph node owned by the host.
///
/// The coordinator never dereferences actors; it only threads them through
/// (gesture attachment, grab subtree roots, crossing event pairs).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ActorId(NonZeroU64);

impl ActorId {
    /// Creates a new actor ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is 0.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(NonZeroU64::new(id).expect("ActorId cannot be 0"))
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

// ============================================================================
// DeviceKind / DeviceKinds - Device classification
// ============================================================================

/// The classification of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DeviceKind {
    /// A relative pointing device (mouse, trackball).
    Pointer,
    /// A keyboard.
    Keyboard,
    /// A touchpad.
    Touchpad,
    /// A direct-touch screen.
    Touchscreen,
    /// A drawing tablet.
    Tablet,
    /// A stylus tip.
    Pen,
    /// A stylus eraser.
    Eraser,
    /// A joystick.
    Joystick,
    /// A tablet pad (buttons/rings/strips on the tablet itself).
    Pad,
}

impl DeviceKind {
    /// The bitset member corresponding to this kind.
    pub const fn mask(self) -> DeviceKinds {
        match self {
            DeviceKind::Pointer => DeviceKinds::POINTER,
            DeviceKind::Keyboard => DeviceKinds::KEYBOARD,
            DeviceKind::Touchpad => DeviceKinds::TOUCHPAD,
            DeviceKind::Touchscreen => DeviceKinds::TOUCHSCREEN,
            DeviceKind::Tablet => DeviceKinds::TABLET,
            DeviceKind::Pen => DeviceKinds::PEN,
            DeviceKind::Eraser => DeviceKinds::ERASER,
            DeviceKind::Joystick => DeviceKinds::JOYSTICK,
            DeviceKind::Pad => DeviceKinds::PAD,
        }
    }
}

bitflags! {
    /// A set of [`DeviceKind`]s, used to restrict which devices a gesture
    /// accepts points from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceKinds: u16 {
        /// Relative pointing devices.
        const POINTER = 1 << 0;
        /// Keyboards.
        const KEYBOARD = 1 << 1;
        /// Touchpads.
        const TOUCHPAD = 1 << 2;
        /// Direct-touch screens.
        const TOUCHSCREEN = 1 << 3;
        /// Drawing tablets.
        const TABLET = 1 << 4;
        /// Stylus tips.
        const PEN = 1 << 5;
        /// Stylus erasers.
        const ERASER = 1 << 6;
        /// Joysticks.
        const JOYSTICK = 1 << 7;
        /// Tablet pads.
        const PAD = 1 << 8;
    }
}

impl DeviceKinds {
    /// The device kinds gestures accept points from unless told otherwise:
    /// everything that can produce a positioned press.
    pub const GESTURE_DEFAULT: Self = Self::POINTER
        .union(Self::TOUCHSCREEN)
        .union(Self::TABLET)
        .union(Self::PEN)
        .union(Self::ERASER);

    /// Whether this set contains the given kind.
    #[inline]
    pub fn allows(self, kind: DeviceKind) -> bool {
        self.contains(kind.mask())
    }
}

impl Default for DeviceKinds {
    fn default() -> Self {
        Self::GESTURE_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id() {
        let id = DeviceId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(format!("{:?}", id), "DeviceId(42)");
        assert_eq!(format!("{}", id), "device:42");
    }

    #[test]
    fn test_sequence_id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<SequenceId>>(),
            std::mem::size_of::<SequenceId>()
        );
    }

    #[test]
    fn test_sequence_id_try_new() {
        assert!(SequenceId::try_new(0).is_none());
        assert!(SequenceId::try_new(1).is_some());
    }

    #[test]
    #[should_panic(expected = "SequenceId cannot be 0")]
    fn test_sequence_id_zero_panics() {
        let _ = SequenceId::new(0);
    }

    #[test]
    fn test_actor_id() {
        let id = ActorId::new(9);
        assert_eq!(id.get(), 9);
        assert_eq!(format!("{}", id), "actor:9");
    }

    #[test]
    fn test_device_kind_masks() {
        assert!(DeviceKinds::GESTURE_DEFAULT.allows(DeviceKind::Pointer));
        assert!(DeviceKinds::GESTURE_DEFAULT.allows(DeviceKind::Touchscreen));
        assert!(!DeviceKinds::GESTURE_DEFAULT.allows(DeviceKind::Keyboard));
        assert!(!DeviceKinds::GESTURE_DEFAULT.allows(DeviceKind::Pad));
    }

    #[test]
    fn test_device_kinds_default() {
        assert_eq!(DeviceKinds::default(), DeviceKinds::GESTURE_DEFAULT);
    }

    #[test]
    fn test_device_kinds_restriction() {
        let touch_only = DeviceKinds::TOUCHSCREEN;
        assert!(touch_only.allows(DeviceKind::Touchscreen));
        assert!(!touch_only.allows(DeviceKind::Pointer));
    }
}
