// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building and dispatching synthetic activations.

use crate::platform::PlatformProfile;
use crate::types::{ActivationKind, Dom, DomMut, EventOrigin, SyntheticActivation, Tag, Touch};

/// Builds synthetic activations and applies the focus changes around them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationDispatcher {
    profile: PlatformProfile,
}

impl ActivationDispatcher {
    /// Create a dispatcher for `profile`.
    pub const fn new(profile: PlatformProfile) -> Self {
        Self { profile }
    }

    /// Activation type for `target`.
    pub fn activation_kind<D: Dom>(&self, dom: &D, target: D::Node) -> ActivationKind {
        let is_select = dom.element(target).is_some_and(|e| e.tag == Tag::Select);
        if is_select && self.profile.select_needs_mouse_down() {
            ActivationKind::MouseDown
        } else {
            ActivationKind::Click
        }
    }

    /// Blur any other focused element, then dispatch a synthetic activation at
    /// `target` carrying the coordinates of `touch`.
    pub fn send<D: DomMut>(
        &self,
        dom: &mut D,
        target: D::Node,
        touch: &Touch,
    ) -> SyntheticActivation<D::Node> {
        if let Some(active) = dom.active_element().filter(|&a| a != target) {
            dom.blur(active);
        }

        let event = SyntheticActivation {
            kind: self.activation_kind(&*dom, target),
            target,
            screen: touch.screen,
            client: touch.client,
            detail: 1,
            bubbles: true,
            cancelable: true,
            origin: EventOrigin::Synthetic,
        };
        tracing::debug!(kind = ?event.kind, node = ?target, "synthetic activation");
        dom.dispatch_activation(event);
        event
    }

    /// Give `element` focus.
    ///
    /// On platforms with touch scrolling quirks, text fields get a caret at the
    /// end of their value instead; date and time pickers are focused normally.
    pub fn focus<D: DomMut>(&self, dom: &mut D, element: D::Node) {
        let caret = dom.element(element).and_then(|info| {
            let pickers = info.tag == Tag::Input && info.input_type.is_date_like();
            info.selection_len.filter(|_| !pickers)
        });
        match caret {
            Some(len) if self.profile.touch_scroll_quirks() => {
                dom.set_selection_range(element, len, len);
            }
            _ => dom.focus(element),
        }
    }
}
