//! Concrete gesture recognizers
//!
//! Each recognizer composes a [`Gesture`](crate::gesture::Gesture) base,
//! implements [`GestureHooks`](crate::hooks::GestureHooks) on itself, and
//! translates point streams plus timers into domain callbacks.

pub mod long_press;
pub mod pan;
pub mod tap;

pub use long_press::{LongPressDetails, LongPressGestureRecognizer};
pub use pan::{PanEndDetails, PanGestureRecognizer, PanUpdateDetails};
pub use tap::{TapDetails, TapGestureRecognizer};
