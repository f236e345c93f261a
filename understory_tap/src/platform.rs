// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform identity and the construction-time "is the shim needed?" gate.
//!
//! The profile is resolved once from the user agent and threaded by value into
//! the quirk policy, the tracker and the gate. Nothing in this crate reads
//! platform identity from ambient state.
//!
//! ```
//! use understory_tap::{Environment, PlatformProfile};
//!
//! let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 7_0 like Mac OS X) AppleWebKit/537.51.1";
//! let profile = PlatformProfile::from_user_agent(ua);
//! assert!(profile.contains(PlatformProfile::IOS | PlatformProfile::IOS_BAD_TARGET));
//! assert!(Environment::new(ua).needs_shim());
//!
//! // Desktop Chrome dispatches clicks without delay.
//! let desktop = "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0.0.0 Safari/537.36";
//! assert!(!Environment::new(desktop).needs_shim());
//! ```

use alloc::string::String;

bitflags::bitflags! {
    /// Platform identity, as far as tap quirks are concerned.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PlatformProfile: u8 {
        /// Android stock browser or Chrome on Android.
        const ANDROID        = 0b0000_0001;
        /// iPhone, iPad or iPod.
        const IOS            = 0b0000_0010;
        /// iOS 4, which lacks touch identifiers and scroll tracking.
        const IOS4           = 0b0000_0100;
        /// iOS 6 and 7, which report stale touch-end targets.
        const IOS_BAD_TARGET = 0b0000_1000;
        /// Windows Phone, which also claims to be Android and iOS.
        const WINDOWS_PHONE  = 0b0001_0000;
        /// BlackBerry 10.
        const BLACKBERRY10   = 0b0010_0000;
    }
}

impl PlatformProfile {
    /// Resolve the profile from a user agent string.
    pub fn from_user_agent(ua: &str) -> Self {
        let mut profile = Self::empty();
        let windows_phone = ua.contains("Windows Phone");
        if windows_phone {
            profile |= Self::WINDOWS_PHONE;
        }
        if !windows_phone && ua.find("Android").is_some_and(|i| i > 0) {
            profile |= Self::ANDROID;
        }
        let ios = ["iPad", "iPhone", "iPod"].iter().any(|d| ua.contains(d));
        if !windows_phone && ios {
            profile |= Self::IOS;
            if has_os_major(ua, |major| major == 4) {
                profile |= Self::IOS4;
            }
            if has_os_major(ua, |major| (6..=7).contains(&major)) {
                profile |= Self::IOS_BAD_TARGET;
            }
        }
        if ua.find("BB10").is_some_and(|i| i > 0) {
            profile |= Self::BLACKBERRY10;
        }
        profile
    }

    /// Label activation already reaches the control natively.
    pub fn native_label_activation(self) -> bool {
        self.contains(Self::ANDROID)
    }

    /// Selects receive focus natively on tap.
    pub fn focuses_select_natively(self) -> bool {
        self.contains(Self::ANDROID)
    }

    /// Selects open on pointer down rather than on click.
    pub fn select_needs_mouse_down(self) -> bool {
        self.contains(Self::ANDROID)
    }

    /// Native pointer down/up events race synthetic activations.
    pub fn races_pointer_events(self) -> bool {
        self.contains(Self::ANDROID)
    }

    /// Touch scrolling quirks: selection-aware starts, file inputs needing
    /// native clicks, caret placement instead of focus.
    pub fn touch_scroll_quirks(self) -> bool {
        self.contains(Self::IOS)
    }

    /// Stray repeated touch starts can be recognized by identifier.
    pub fn tracks_touch_identifiers(self) -> bool {
        self.contains(Self::IOS) && !self.contains(Self::IOS4)
    }

    /// Scroll ancestors can be tracked to tell scrolls from taps.
    pub fn tracks_scroll_ancestors(self) -> bool {
        !self.contains(Self::IOS4)
    }

    /// Touch-end targets must be re-resolved from the contact position.
    pub fn retargets_touch_end(self) -> bool {
        self.contains(Self::IOS_BAD_TARGET)
    }

    /// Selects still need the native click to open their picker.
    pub fn keeps_native_select_click(self) -> bool {
        self.contains(Self::IOS)
    }
}

/// Match `OS <digit>_<digit>` with the leading digit accepted by `major`.
fn has_os_major(ua: &str, major: impl Fn(u32) -> bool) -> bool {
    ua.match_indices("OS ").any(|(i, m)| {
        let mut rest = ua[i + m.len()..].chars();
        matches!(
            (rest.next(), rest.next(), rest.next()),
            (Some(d), Some('_'), Some(minor))
                if d.to_digit(10).is_some_and(&major) && minor.is_ascii_digit()
        )
    })
}

/// Leading decimal number after the first occurrence of `marker`, or zero.
fn version_after(ua: &str, marker: &str) -> u32 {
    ua.find(marker)
        .map(|i| leading_number(&ua[i + marker.len()..]).0)
        .unwrap_or(0)
}

/// Parse leading ASCII digits; returns the value and the unparsed rest.
fn leading_number(s: &str) -> (u32, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let value = s[..end].bytes().fold(0_u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    });
    (value, &s[end..])
}

/// `Version/<major>.<minor>` as reported by BlackBerry browsers.
fn blackberry_version(ua: &str) -> Option<(u32, u32)> {
    let i = ua.find("Version/")?;
    let (major, rest) = leading_number(&ua[i + "Version/".len()..]);
    let rest = rest.strip_prefix('.')?;
    let (minor, _) = leading_number(rest);
    Some((major, minor))
}

/// Effective `touch-action` of the surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// Platform default gesture handling.
    #[default]
    Auto,
    /// All touch gestures disabled on the surface.
    None,
    /// Pan and pinch only; the platform skips the double-tap delay.
    Manipulation,
    /// Any other value.
    Other,
}

/// Everything the construction-time gate looks at.
#[derive(Clone, Debug)]
pub struct Environment {
    /// User agent string.
    pub user_agent: String,
    /// Whether the platform delivers touch events at all.
    pub touch_supported: bool,
    /// Content of the viewport meta tag, if present.
    pub viewport: Option<String>,
    /// Scroll width of the document element.
    pub document_scroll_width: Option<f64>,
    /// Outer width of the window.
    pub window_outer_width: Option<f64>,
    /// Effective touch action of the surface.
    pub touch_action: TouchAction,
    /// Whether events support stopping listeners on the same node.
    pub supports_immediate_propagation_stop: bool,
}

impl Environment {
    /// A touch-capable environment with the given user agent and no viewport hints.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            touch_supported: true,
            viewport: None,
            document_scroll_width: None,
            window_outer_width: None,
            touch_action: TouchAction::Auto,
            supports_immediate_propagation_stop: true,
        }
    }

    /// Set the viewport meta content.
    pub fn with_viewport(mut self, content: impl Into<String>) -> Self {
        self.viewport = Some(content.into());
        self
    }

    /// Set document scroll width and window outer width.
    pub fn with_widths(mut self, document_scroll_width: f64, window_outer_width: f64) -> Self {
        self.document_scroll_width = Some(document_scroll_width);
        self.window_outer_width = Some(window_outer_width);
        self
    }

    /// Set the surface's touch action.
    pub fn with_touch_action(mut self, touch_action: TouchAction) -> Self {
        self.touch_action = touch_action;
        self
    }

    /// Set whether touch events are supported.
    pub fn with_touch_supported(mut self, supported: bool) -> Self {
        self.touch_supported = supported;
        self
    }

    /// Set whether immediate propagation stop is available.
    pub fn with_immediate_propagation_stop(mut self, supported: bool) -> Self {
        self.supports_immediate_propagation_stop = supported;
        self
    }

    /// Platform profile for this environment's user agent.
    pub fn profile(&self) -> PlatformProfile {
        PlatformProfile::from_user_agent(&self.user_agent)
    }

    /// Whether taps on this surface suffer the native activation delay.
    pub fn needs_shim(&self) -> bool {
        if !self.touch_supported {
            return false;
        }

        let ua = self.user_agent.as_str();
        let profile = self.profile();

        let chrome = version_after(ua, "Chrome/");
        if chrome > 0 {
            if !profile.contains(PlatformProfile::ANDROID) {
                // Desktop Chrome with touch support.
                return false;
            }
            if self.viewport.is_some() && (self.unscalable() || (chrome > 31 && self.width_fits()))
            {
                return false;
            }
        }

        if profile.contains(PlatformProfile::BLACKBERRY10)
            && blackberry_version(ua).is_some_and(|v| v >= (10, 3))
            && self.viewport.is_some()
            && (self.unscalable() || self.width_fits())
        {
            return false;
        }

        if version_after(ua, "Firefox/") >= 27
            && self.viewport.is_some()
            && (self.unscalable() || self.width_fits())
        {
            return false;
        }

        !matches!(
            self.touch_action,
            TouchAction::None | TouchAction::Manipulation
        )
    }

    fn unscalable(&self) -> bool {
        self.viewport
            .as_deref()
            .is_some_and(|content| content.contains("user-scalable=no"))
    }

    fn width_fits(&self) -> bool {
        matches!(
            (self.document_scroll_width, self.window_outer_width),
            (Some(doc), Some(outer)) if doc <= outer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_OS4: &str =
        "Mozilla/5.0 (iPhone; U; CPU iPhone OS 4_3_2 like Mac OS X; en-us) AppleWebKit/533.17.9";
    const IPHONE_OS9: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) AppleWebKit/601.1.46";
    const IPAD_OS16: &str = "Mozilla/5.0 (iPad; CPU OS 16_1 like Mac OS X) AppleWebKit/605.1.15";
    const ANDROID_STOCK: &str =
        "Mozilla/5.0 (Linux; U; Android 4.0.3; en-us) AppleWebKit/534.30 Version/4.0 Mobile Safari/534.30";
    const ANDROID_CHROME: &str =
        "Mozilla/5.0 (Linux; Android 10; Pixel 3) AppleWebKit/537.36 Chrome/83.0.4103.106 Mobile Safari/537.36";
    const WINDOWS_PHONE: &str = "Mozilla/5.0 (Mobile; Windows Phone 8.1; Android 4.0; ARM; Trident/7.0; iPhone) like Gecko";
    const BB10: &str = "Mozilla/5.0 (BB10; Touch) AppleWebKit/537.35+ Version/10.3.1.2243 Mobile Safari/537.35+";
    const FIREFOX_ANDROID: &str = "Mozilla/5.0 (Android 9; Mobile; rv:68.0) Gecko/68.0 Firefox/68.0";

    #[test]
    fn profiles_from_user_agents() {
        assert_eq!(
            PlatformProfile::from_user_agent(IPHONE_OS4),
            PlatformProfile::IOS | PlatformProfile::IOS4
        );
        assert_eq!(
            PlatformProfile::from_user_agent(IPHONE_OS9),
            PlatformProfile::IOS
        );
        assert_eq!(
            PlatformProfile::from_user_agent(IPAD_OS16),
            PlatformProfile::IOS
        );
        assert_eq!(
            PlatformProfile::from_user_agent(ANDROID_STOCK),
            PlatformProfile::ANDROID
        );
        assert_eq!(
            PlatformProfile::from_user_agent(WINDOWS_PHONE),
            PlatformProfile::WINDOWS_PHONE
        );
        assert_eq!(
            PlatformProfile::from_user_agent(BB10),
            PlatformProfile::BLACKBERRY10
        );
    }

    #[test]
    fn quirk_queries_follow_profile() {
        let ios4 = PlatformProfile::from_user_agent(IPHONE_OS4);
        assert!(ios4.touch_scroll_quirks());
        assert!(!ios4.tracks_touch_identifiers());
        assert!(!ios4.tracks_scroll_ancestors());

        let android = PlatformProfile::from_user_agent(ANDROID_STOCK);
        assert!(android.races_pointer_events());
        assert!(android.native_label_activation());
        assert!(android.tracks_scroll_ancestors());
        assert!(!android.keeps_native_select_click());
    }

    #[test]
    fn no_touch_means_no_shim() {
        assert!(!Environment::new(IPHONE_OS9).with_touch_supported(false).needs_shim());
    }

    #[test]
    fn chrome_android_with_unscalable_viewport_needs_no_shim() {
        let env = Environment::new(ANDROID_CHROME);
        assert!(env.needs_shim());
        assert!(!env.clone().with_viewport("width=device-width, user-scalable=no").needs_shim());
        assert!(!env
            .clone()
            .with_viewport("width=device-width")
            .with_widths(360.0, 360.0)
            .needs_shim());
        assert!(env
            .with_viewport("width=device-width")
            .with_widths(980.0, 360.0)
            .needs_shim());
    }

    #[test]
    fn blackberry_and_firefox_viewport_rules() {
        assert!(Environment::new(BB10).needs_shim());
        assert!(!Environment::new(BB10).with_viewport("user-scalable=no").needs_shim());
        assert!(Environment::new(FIREFOX_ANDROID).needs_shim());
        assert!(!Environment::new(FIREFOX_ANDROID)
            .with_viewport("width=device-width")
            .with_widths(400.0, 412.0)
            .needs_shim());
    }

    #[test]
    fn touch_action_disables_shim() {
        let env = Environment::new(IPHONE_OS9);
        assert!(!env.clone().with_touch_action(TouchAction::Manipulation).needs_shim());
        assert!(!env.clone().with_touch_action(TouchAction::None).needs_shim());
        assert!(env.with_touch_action(TouchAction::Other).needs_shim());
    }

    #[test]
    fn version_parsing() {
        assert_eq!(version_after("Chrome/83.0", "Chrome/"), 83);
        assert_eq!(version_after("Safari", "Chrome/"), 0);
        assert_eq!(blackberry_version(BB10), Some((10, 3)));
        assert_eq!(blackberry_version("Version/10"), None);
    }
}
