#![forbid(unsafe_code)]

//! Manager-wide configuration.
//!
//! Defaults are tuned for pointer-driven web UIs. Every value can be
//! overridden from the environment via [`OverlayConfig::from_env`]; values
//! are clamped to safe ranges by [`OverlayConfig::validated`].

use std::time::Duration;

use crate::position::MIN_SCREEN_GAP;

/// Upper bound for the viewport gap, in pixels.
const MAX_SCREEN_GAP: f64 = 64.0;

/// Bounds for the shake duration.
const MIN_SHAKE_MS: u64 = 50;
const MAX_SHAKE_MS: u64 = 2_000;

/// Upper bound for the hover-close delay.
const MAX_HOVER_CLOSE_MS: u64 = 5_000;

/// Overlay manager configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Distance kept between clamped panels and the viewport edge.
    pub min_screen_gap: f64,
    /// How long a panel stays in the shaking state after a blocked dismissal.
    pub shake_duration: Duration,
    /// Hover-close delay for panels that do not set their own.
    pub hover_close_delay: Option<Duration>,
    /// Disable enter/exit transitions for every panel.
    pub reduced_motion: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            min_screen_gap: MIN_SCREEN_GAP,
            shake_duration: Duration::from_millis(400),
            hover_close_delay: None,
            reduced_motion: false,
        }
    }
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_screen_gap(mut self, gap: f64) -> Self {
        self.min_screen_gap = gap;
        self
    }

    #[must_use]
    pub fn with_shake_duration(mut self, duration: Duration) -> Self {
        self.shake_duration = duration;
        self
    }

    #[must_use]
    pub fn with_hover_close_delay(mut self, delay: Option<Duration>) -> Self {
        self.hover_close_delay = delay;
        self
    }

    #[must_use]
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Load config from environment variables.
    ///
    /// Reads:
    /// - `PERCH_MIN_SCREEN_GAP`: viewport gap in pixels
    /// - `PERCH_SHAKE_MS`: shake duration in milliseconds
    /// - `PERCH_HOVER_CLOSE_MS`: default hover-close delay in milliseconds
    /// - `PERCH_REDUCED_MOTION`: "1" or "true" disables transitions
    ///
    /// Values are automatically clamped to valid ranges.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable lookup.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("PERCH_MIN_SCREEN_GAP")
            && let Ok(gap) = val.trim().parse::<f64>()
        {
            config.min_screen_gap = gap;
        }

        if let Some(val) = lookup("PERCH_SHAKE_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.shake_duration = Duration::from_millis(ms);
        }

        if let Some(val) = lookup("PERCH_HOVER_CLOSE_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.hover_close_delay = Some(Duration::from_millis(ms));
        }

        if let Some(val) = lookup("PERCH_REDUCED_MOTION") {
            let val = val.trim();
            config.reduced_motion = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config.validated()
    }

    /// Validate and clamp values to safe ranges.
    ///
    /// - `min_screen_gap` clamped to 0-64px (non-finite resets to the default)
    /// - `shake_duration` clamped to 50-2000ms
    /// - `hover_close_delay` capped at 5000ms
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.min_screen_gap = if self.min_screen_gap.is_finite() {
            self.min_screen_gap.clamp(0.0, MAX_SCREEN_GAP)
        } else {
            MIN_SCREEN_GAP
        };

        let shake_ms = self.shake_duration.as_millis() as u64;
        self.shake_duration = Duration::from_millis(shake_ms.clamp(MIN_SHAKE_MS, MAX_SHAKE_MS));

        self.hover_close_delay = self
            .hover_close_delay
            .map(|d| Duration::from_millis((d.as_millis() as u64).min(MAX_HOVER_CLOSE_MS)));

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.min_screen_gap, 8.0);
        assert_eq!(config.shake_duration, Duration::from_millis(400));
        assert!(config.hover_close_delay.is_none());
        assert!(!config.reduced_motion);
    }

    #[test]
    fn env_overrides() {
        let config = OverlayConfig::from_env_with(env(&[
            ("PERCH_MIN_SCREEN_GAP", "12"),
            ("PERCH_SHAKE_MS", "250"),
            ("PERCH_HOVER_CLOSE_MS", "300"),
            ("PERCH_REDUCED_MOTION", "TRUE"),
        ]));
        assert_eq!(config.min_screen_gap, 12.0);
        assert_eq!(config.shake_duration, Duration::from_millis(250));
        assert_eq!(config.hover_close_delay, Some(Duration::from_millis(300)));
        assert!(config.reduced_motion);
    }

    #[test]
    fn env_garbage_is_ignored() {
        let config = OverlayConfig::from_env_with(env(&[
            ("PERCH_MIN_SCREEN_GAP", "wide"),
            ("PERCH_SHAKE_MS", "-3"),
        ]));
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn validated_clamps() {
        let config = OverlayConfig::default()
            .with_min_screen_gap(500.0)
            .with_shake_duration(Duration::from_millis(1))
            .with_hover_close_delay(Some(Duration::from_secs(60)))
            .validated();
        assert_eq!(config.min_screen_gap, 64.0);
        assert_eq!(config.shake_duration, Duration::from_millis(50));
        assert_eq!(config.hover_close_delay, Some(Duration::from_millis(5_000)));

        let nan = OverlayConfig::default().with_min_screen_gap(f64::NAN).validated();
        assert_eq!(nan.min_screen_gap, 8.0);
    }
}
