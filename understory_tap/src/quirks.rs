// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element policy: which elements keep native activation, and which need
//! their focus managed explicitly.

use crate::platform::PlatformProfile;
use crate::types::{ElementFlags, ElementInfo, InputType, Tag};

/// Pure predicates over element descriptions, parameterized by platform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuirkPolicy {
    profile: PlatformProfile,
}

impl QuirkPolicy {
    /// Create a policy for `profile`.
    pub const fn new(profile: PlatformProfile) -> Self {
        Self { profile }
    }

    /// The platform this policy answers for.
    pub const fn profile(&self) -> PlatformProfile {
        self.profile
    }

    /// Whether native activation must be preserved for `element`.
    ///
    /// When true, no synthetic activation is dispatched and the native one is
    /// let through.
    pub fn needs_click(&self, element: &ElementInfo<'_>) -> bool {
        match element.tag {
            Tag::Button | Tag::Select | Tag::TextArea if element.is_disabled() => return true,
            Tag::Input => {
                if element.is_disabled()
                    || (self.profile.touch_scroll_quirks() && element.input_type == InputType::File)
                {
                    return true;
                }
            }
            Tag::Label | Tag::IFrame | Tag::Video => return true,
            _ => {}
        }
        element.flags.contains(ElementFlags::NEEDS_CLICK)
    }

    /// Whether `element` needs focus given explicitly before activation.
    pub fn needs_focus(&self, element: &ElementInfo<'_>) -> bool {
        match element.tag {
            Tag::TextArea => true,
            Tag::Select => !self.profile.focuses_select_natively(),
            Tag::Input => match element.input_type {
                InputType::Button
                | InputType::Checkbox
                | InputType::File
                | InputType::Image
                | InputType::Radio
                | InputType::Submit => false,
                _ => !element
                    .flags
                    .intersects(ElementFlags::DISABLED | ElementFlags::READ_ONLY),
            },
            _ => element.flags.contains(ElementFlags::NEEDS_FOCUS),
        }
    }
}
