//! Recognizer settings
//!
//! Tolerances and timeouts shared by the concrete recognizers, collected in
//! one builder-style value so hosts can tune them per input configuration.

use std::time::Duration;

/// Default distance a point may travel before a tap/press is cancelled
/// (logical pixels, sized for fingers).
pub const DEFAULT_CANCEL_THRESHOLD: f32 = 18.0;

/// Default number of consecutive taps a tap gesture requires.
pub const DEFAULT_N_CLICKS_REQUIRED: u32 = 1;

/// Default press duration before a long-press completes.
pub const DEFAULT_LONG_PRESS_DURATION: Duration = Duration::from_millis(500);

/// Default accumulated displacement before a pan begins.
pub const DEFAULT_BEGIN_THRESHOLD: f32 = 8.0;

/// Default maximum pause between the taps of a multi-tap.
pub const DEFAULT_TAP_TIMEOUT: Duration = Duration::from_millis(300);

/// Default minimum number of simultaneous points.
pub const DEFAULT_MIN_N_POINTS: u32 = 1;

/// Default maximum number of simultaneous points.
pub const DEFAULT_MAX_N_POINTS: u32 = 1;

/// Axis constraint for pan gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanAxis {
    /// Any direction.
    #[default]
    Free,
    /// Horizontal displacement only.
    Horizontal,
    /// Vertical displacement only.
    Vertical,
}

/// Configuration consumed by the concrete recognizers.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use strata_gestures::settings::RecognizerSettings;
///
/// let settings = RecognizerSettings::default()
///     .with_n_clicks_required(2)
///     .with_tap_timeout(Duration::from_millis(400));
/// assert_eq!(settings.n_clicks_required(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerSettings {
    cancel_threshold: f32,
    n_clicks_required: u32,
    long_press_duration: Duration,
    begin_threshold: f32,
    pan_axis: PanAxis,
    min_n_points: u32,
    max_n_points: u32,
    tap_timeout: Duration,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            cancel_threshold: DEFAULT_CANCEL_THRESHOLD,
            n_clicks_required: DEFAULT_N_CLICKS_REQUIRED,
            long_press_duration: DEFAULT_LONG_PRESS_DURATION,
            begin_threshold: DEFAULT_BEGIN_THRESHOLD,
            pan_axis: PanAxis::Free,
            min_n_points: DEFAULT_MIN_N_POINTS,
            max_n_points: DEFAULT_MAX_N_POINTS,
            tap_timeout: DEFAULT_TAP_TIMEOUT,
        }
    }
}

impl RecognizerSettings {
    // ========================================================================
    // Getters
    // ========================================================================

    /// Distance a point may travel before the gesture cancels.
    #[inline]
    pub fn cancel_threshold(&self) -> f32 {
        self.cancel_threshold
    }

    /// Consecutive taps required to complete a tap gesture.
    #[inline]
    pub fn n_clicks_required(&self) -> u32 {
        self.n_clicks_required
    }

    /// Press duration before a long-press completes.
    #[inline]
    pub fn long_press_duration(&self) -> Duration {
        self.long_press_duration
    }

    /// Accumulated displacement before a pan begins.
    #[inline]
    pub fn begin_threshold(&self) -> f32 {
        self.begin_threshold
    }

    /// Axis a pan is constrained to.
    #[inline]
    pub fn pan_axis(&self) -> PanAxis {
        self.pan_axis
    }

    /// Minimum number of simultaneous points.
    #[inline]
    pub fn min_n_points(&self) -> u32 {
        self.min_n_points
    }

    /// Maximum number of simultaneous points.
    #[inline]
    pub fn max_n_points(&self) -> u32 {
        self.max_n_points
    }

    /// Maximum pause between the taps of a multi-tap.
    #[inline]
    pub fn tap_timeout(&self) -> Duration {
        self.tap_timeout
    }

    // ========================================================================
    // Builder-style setters
    // ========================================================================

    /// Set the cancellation distance.
    #[inline]
    pub fn with_cancel_threshold(mut self, threshold: f32) -> Self {
        self.cancel_threshold = threshold;
        self
    }

    /// Set the number of consecutive taps required.
    #[inline]
    pub fn with_n_clicks_required(mut self, n: u32) -> Self {
        self.n_clicks_required = n.max(1);
        self
    }

    /// Set the long-press duration.
    #[inline]
    pub fn with_long_press_duration(mut self, duration: Duration) -> Self {
        self.long_press_duration = duration;
        self
    }

    /// Set the pan begin threshold.
    #[inline]
    pub fn with_begin_threshold(mut self, threshold: f32) -> Self {
        self.begin_threshold = threshold;
        self
    }

    /// Set the pan axis constraint.
    #[inline]
    pub fn with_pan_axis(mut self, axis: PanAxis) -> Self {
        self.pan_axis = axis;
        self
    }

    /// Set the minimum number of simultaneous points.
    #[inline]
    pub fn with_min_n_points(mut self, n: u32) -> Self {
        self.min_n_points = n.max(1);
        self
    }

    /// Set the maximum number of simultaneous points.
    #[inline]
    pub fn with_max_n_points(mut self, n: u32) -> Self {
        self.max_n_points = n.max(1);
        self
    }

    /// Set the inter-tap timeout.
    #[inline]
    pub fn with_tap_timeout(mut self, timeout: Duration) -> Self {
        self.tap_timeout = timeout;
        self
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Whether a travelled distance cancels a tap/press.
    #[inline]
    pub fn exceeds_cancel_threshold(&self, distance: f32) -> bool {
        distance > self.cancel_threshold
    }

    /// Whether an accumulated displacement starts a pan.
    #[inline]
    pub fn exceeds_begin_threshold(&self, distance: f32) -> bool {
        distance > self.begin_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RecognizerSettings::default();
        assert_eq!(settings.cancel_threshold(), DEFAULT_CANCEL_THRESHOLD);
        assert_eq!(settings.n_clicks_required(), 1);
        assert_eq!(settings.long_press_duration(), DEFAULT_LONG_PRESS_DURATION);
        assert_eq!(settings.pan_axis(), PanAxis::Free);
    }

    #[test]
    fn test_builder() {
        let settings = RecognizerSettings::default()
            .with_cancel_threshold(24.0)
            .with_pan_axis(PanAxis::Horizontal)
            .with_long_press_duration(Duration::from_millis(800));

        assert_eq!(settings.cancel_threshold(), 24.0);
        assert_eq!(settings.pan_axis(), PanAxis::Horizontal);
        assert_eq!(settings.long_press_duration(), Duration::from_millis(800));
    }

    #[test]
    fn test_click_and_point_counts_clamp_to_one() {
        let settings = RecognizerSettings::default()
            .with_n_clicks_required(0)
            .with_min_n_points(0)
            .with_max_n_points(0);
        assert_eq!(settings.n_clicks_required(), 1);
        assert_eq!(settings.min_n_points(), 1);
        assert_eq!(settings.max_n_points(), 1);
    }

    #[test]
    fn test_thresholds() {
        let settings = RecognizerSettings::default();
        assert!(!settings.exceeds_cancel_threshold(18.0));
        assert!(settings.exceeds_cancel_threshold(18.5));
        assert!(!settings.exceeds_begin_threshold(8.0));
        assert!(settings.exceeds_begin_threshold(8.5));
    }
}
