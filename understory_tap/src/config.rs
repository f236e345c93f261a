// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap thresholds.

/// Spatial and temporal thresholds for tap recognition.
///
/// Values are set through the `with_*` builders. Zero or non-finite values are
/// treated as unset and replaced by the default, so hosts can forward optional
/// settings without filtering them.
///
/// ```
/// use understory_tap::TapConfig;
///
/// let config = TapConfig::default().with_touch_boundary(4.0).with_tap_delay(0);
/// assert_eq!(config.touch_boundary(), 4.0);
/// assert_eq!(config.tap_delay(), TapConfig::DEFAULT_TAP_DELAY);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapConfig {
    /// Maximum travel from the start point, per axis, in pixels.
    touch_boundary: f64,
    /// Window after an activation in which another tap counts as a duplicate (milliseconds).
    tap_delay: u64,
    /// Longest hold still recognized as a tap (milliseconds).
    tap_timeout: u64,
    /// Longest hold after which text fields still get explicit focus (milliseconds).
    focus_timeout: u64,
}

impl TapConfig {
    /// Default for [`TapConfig::touch_boundary`].
    pub const DEFAULT_TOUCH_BOUNDARY: f64 = 10.0;
    /// Default for [`TapConfig::tap_delay`].
    pub const DEFAULT_TAP_DELAY: u64 = 200;
    /// Default for [`TapConfig::tap_timeout`].
    pub const DEFAULT_TAP_TIMEOUT: u64 = 700;
    /// Default for [`TapConfig::focus_timeout`].
    pub const DEFAULT_FOCUS_TIMEOUT: u64 = 100;

    /// Maximum travel from the start point, per axis, in pixels.
    pub fn touch_boundary(&self) -> f64 {
        self.touch_boundary
    }

    /// Duplicate-tap window in milliseconds.
    pub fn tap_delay(&self) -> u64 {
        self.tap_delay
    }

    /// Long-press cutoff in milliseconds.
    pub fn tap_timeout(&self) -> u64 {
        self.tap_timeout
    }

    /// Explicit-focus cutoff in milliseconds.
    pub fn focus_timeout(&self) -> u64 {
        self.focus_timeout
    }

    /// Set the drift boundary.
    pub fn with_touch_boundary(mut self, pixels: f64) -> Self {
        self.touch_boundary = if pixels.is_finite() && pixels > 0.0 {
            pixels
        } else {
            Self::DEFAULT_TOUCH_BOUNDARY
        };
        self
    }

    /// Set the duplicate-tap window.
    pub fn with_tap_delay(mut self, ms: u64) -> Self {
        self.tap_delay = nonzero_or(ms, Self::DEFAULT_TAP_DELAY);
        self
    }

    /// Set the long-press cutoff.
    pub fn with_tap_timeout(mut self, ms: u64) -> Self {
        self.tap_timeout = nonzero_or(ms, Self::DEFAULT_TAP_TIMEOUT);
        self
    }

    /// Set the explicit-focus cutoff.
    pub fn with_focus_timeout(mut self, ms: u64) -> Self {
        self.focus_timeout = nonzero_or(ms, Self::DEFAULT_FOCUS_TIMEOUT);
        self
    }
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            touch_boundary: Self::DEFAULT_TOUCH_BOUNDARY,
            tap_delay: Self::DEFAULT_TAP_DELAY,
            tap_timeout: Self::DEFAULT_TAP_TIMEOUT,
            focus_timeout: Self::DEFAULT_FOCUS_TIMEOUT,
        }
    }
}

fn nonzero_or(value: u64, default: u64) -> u64 {
    if value == 0 { default } else { value }
}
