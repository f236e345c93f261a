// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap recognition state machine.
//!
//! A [`GestureTracker`] follows one contact from touch start to touch end and
//! decides whether it was a tap. Qualifying taps are turned into a synthetic
//! activation right away instead of waiting for the platform's delayed one.
//!
//! ## States
//!
//! `Idle → Tracking → {Qualified | Aborted} → Idle`
//!
//! - **Start**: exactly one contact on the target enters tracking. Multi-touch
//!   starts are ignored. A start shortly after the previous activation
//!   prevents its default action, which keeps the platform from zooming.
//! - **Move**: leaving the start target, or drifting more than
//!   [`TapConfig::touch_boundary`] on either axis, aborts.
//! - **Cancel**: always aborts.
//! - **End**: runs the qualification steps below in order; the first that
//!   applies decides the outcome.
//!   1. Within [`TapConfig::tap_delay`] of the previous activation: a duplicate.
//!      The next native activation will be swallowed.
//!   2. Held longer than [`TapConfig::tap_timeout`]: a long press.
//!   3. Labels are replaced by the control they label, which gets focus. On
//!      platforms where label activation already works, stop here.
//!   4. Fields that need explicit focus are focused and activated, unless the
//!      hold exceeded [`TapConfig::focus_timeout`] or the document is framed
//!      and the field is an input.
//!   5. If the scroll ancestor moved since the start, the gesture was a scroll.
//!   6. Otherwise activate, unless the element keeps its native activation.
//!
//! All timing is evaluated from event timestamps. No timers are involved.
//!
//! ## Ghost guard
//!
//! After a synthetic activation (or a duplicate tap) the tracker keeps the
//! target around with `tracking == false`. The
//! [`NativeEventGate`](crate::NativeEventGate) uses it to recognize and
//! consume the platform's own follow-up events. Every other abort clears it.
//!
//! ```
//! use kurbo::Point;
//! use understory_tap::{GestureTracker, TapConfig, TapResult, Touch, TouchEvent};
//! # use understory_tap::{Dom, DomMut, ElementInfo, ScrollMetrics, SyntheticActivation, Tag};
//! # struct OneButton(Vec<SyntheticActivation<u32>>);
//! # impl Dom for OneButton {
//! #     type Node = u32;
//! #     fn is_text(&self, _: u32) -> bool { false }
//! #     fn parent(&self, _: u32) -> Option<u32> { None }
//! #     fn first_child(&self, _: u32) -> Option<u32> { None }
//! #     fn next_sibling(&self, _: u32) -> Option<u32> { None }
//! #     fn element(&self, _: u32) -> Option<ElementInfo<'_>> {
//! #         Some(ElementInfo { tag: Tag::Button, ..ElementInfo::default() })
//! #     }
//! #     fn label_control(&self, _: u32) -> Option<u32> { None }
//! #     fn element_by_id(&self, _: &str) -> Option<u32> { None }
//! #     fn scroll_metrics(&self, _: u32) -> ScrollMetrics { ScrollMetrics::default() }
//! #     fn active_element(&self) -> Option<u32> { None }
//! #     fn has_text_selection(&self) -> bool { false }
//! #     fn is_embedded(&self) -> bool { false }
//! #     fn element_from_point(&self, _: Point) -> Option<u32> { None }
//! # }
//! # impl DomMut for OneButton {
//! #     fn focus(&mut self, _: u32) {}
//! #     fn blur(&mut self, _: u32) {}
//! #     fn set_selection_range(&mut self, _: u32, _: usize, _: usize) {}
//! #     fn dispatch_activation(&mut self, ev: SyntheticActivation<u32>) { self.0.push(ev) }
//! # }
//! let mut dom = OneButton(Vec::new());
//! let mut tracker = GestureTracker::new(TapConfig::default(), Default::default());
//!
//! let down = Touch::at(1, Point::new(100.0, 100.0));
//! tracker.on_touch_start(&dom, &TouchEvent::single(7, 1_000, down));
//!
//! let up = Touch::at(1, Point::new(102.0, 101.0));
//! let response = tracker.on_touch_end(&mut dom, &TouchEvent::ended(7, 1_050, up));
//! assert_eq!(response.result, TapResult::Activated(7));
//! assert!(response.prevent_default);
//! assert_eq!(dom.0.len(), 1);
//! ```

use kurbo::Point;

use crate::config::TapConfig;
use crate::dispatch::ActivationDispatcher;
use crate::platform::PlatformProfile;
use crate::quirks::QuirkPolicy;
use crate::resolve::TargetResolver;
use crate::types::{Dom, DomMut, Tag, Touch, TouchEvent};

/// Why a gesture was not turned into a synthetic activation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// A move event landed on a different target.
    TargetChanged,
    /// The contact drifted beyond the touch boundary.
    Moved,
    /// The platform cancelled the touch.
    Cancelled,
    /// The tap came too soon after the previous activation.
    DuplicateTap,
    /// The contact was held longer than the tap timeout.
    LongPress,
    /// A field needing focus was held too long for explicit focus.
    FocusTimeout,
    /// A text input inside an embedded frame; native focus handles it.
    EmbeddedInput,
    /// The scroll ancestor moved during the gesture.
    Scrolled,
    /// The end event carried no contact to take coordinates from.
    MissingContact,
}

/// Outcome of a touch event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapResult<K> {
    /// The event was not part of a tracked gesture and passes through.
    Ignored,
    /// A gesture is being tracked.
    Tracking,
    /// Tracking stopped; native handling proceeds.
    Aborted(AbortReason),
    /// The gesture was a tap, but the element keeps its native activation.
    NativeActivation(K),
    /// A synthetic activation was dispatched at the element.
    Activated(K),
}

/// What a touch handler decided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TouchResponse<K> {
    /// Classification of the event.
    pub result: TapResult<K>,
    /// Whether the host should prevent the touch event's default action.
    pub prevent_default: bool,
}

impl<K> TouchResponse<K> {
    /// Let the event through unchanged.
    pub const fn pass(result: TapResult<K>) -> Self {
        Self {
            result,
            prevent_default: false,
        }
    }

    /// Prevent the event's default action.
    pub const fn prevent(result: TapResult<K>) -> Self {
        Self {
            result,
            prevent_default: true,
        }
    }
}

/// Per-surface gesture state. Read it through [`GestureTracker::state`].
#[derive(Clone, Debug, PartialEq)]
pub struct GestureState<K> {
    /// A candidate tap is in flight.
    pub tracking: bool,
    /// Timestamp of the tracked touch start.
    pub track_start: u64,
    /// Timestamp of the last touch end that qualified as a tap.
    pub last_activation: Option<u64>,
    /// Gesture target while tracking; afterwards the ghost guard, if any.
    pub target: Option<K>,
    /// Page coordinates of the first contact.
    pub start: Point,
    /// Identifier of the most recent start's contact.
    pub last_touch_id: Option<i64>,
    /// Swallow the next native activation regardless of target.
    pub cancel_next_native: bool,
}

impl<K> Default for GestureState<K> {
    fn default() -> Self {
        Self {
            tracking: false,
            track_start: 0,
            last_activation: None,
            target: None,
            start: Point::ZERO,
            last_touch_id: None,
            cancel_next_native: false,
        }
    }
}

/// Tap recognizer for one surface.
#[derive(Clone, Debug)]
pub struct GestureTracker<K> {
    config: TapConfig,
    quirks: QuirkPolicy,
    dispatcher: ActivationDispatcher,
    resolver: TargetResolver<K>,
    state: GestureState<K>,
}

impl<K: Copy + Eq + core::hash::Hash + core::fmt::Debug> GestureTracker<K> {
    /// Create a tracker with `config` for `profile`.
    pub fn new(config: TapConfig, profile: PlatformProfile) -> Self {
        Self {
            config,
            quirks: QuirkPolicy::new(profile),
            dispatcher: ActivationDispatcher::new(profile),
            resolver: TargetResolver::new(),
            state: GestureState::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &GestureState<K> {
        &self.state
    }

    /// Thresholds in use.
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Element policy in use.
    pub fn quirks(&self) -> &QuirkPolicy {
        &self.quirks
    }

    /// Target resolver and its scroll side-table.
    pub fn resolver(&self) -> &TargetResolver<K> {
        &self.resolver
    }

    /// Mutable access to the target resolver.
    pub fn resolver_mut(&mut self) -> &mut TargetResolver<K> {
        &mut self.resolver
    }

    /// Forget the current gesture, the ghost guard and all cached scroll state.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
        self.resolver.clear();
    }

    /// Handle a touch start.
    pub fn on_touch_start<D: Dom<Node = K>>(
        &mut self,
        dom: &D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        let [touch] = event.target_touches.as_slice() else {
            tracing::trace!(contacts = event.target_touches.len(), "not a single-contact start");
            return TouchResponse::pass(TapResult::Ignored);
        };

        let target = self.resolver.resolve_target(dom, event.target);
        let profile = self.quirks.profile();

        if profile.touch_scroll_quirks() {
            // Taps that end a text selection belong to the platform.
            if dom.has_text_selection() {
                return TouchResponse::pass(TapResult::Ignored);
            }

            if profile.tracks_touch_identifiers() {
                // Some platforms replay the previous start when an alert or
                // confirm dialog is dismissed; swallow it.
                if touch.identifier != 0 && self.state.last_touch_id == Some(touch.identifier) {
                    tracing::debug!(id = touch.identifier, "stray repeated touch start");
                    return TouchResponse::prevent(TapResult::Ignored);
                }
                self.state.last_touch_id = Some(touch.identifier);
            }
        }

        if profile.tracks_scroll_ancestors() {
            self.resolver.update_scroll_ancestor(dom, target);
        }

        self.state.tracking = true;
        self.state.track_start = event.timestamp;
        self.state.target = Some(target);
        self.state.start = touch.page;

        // Suppress double-tap zoom on a quick second tap.
        let prevent = self.within_tap_delay(event.timestamp);
        TouchResponse {
            result: TapResult::Tracking,
            prevent_default: prevent,
        }
    }

    /// Handle a touch move.
    pub fn on_touch_move<D: Dom<Node = K>>(
        &mut self,
        dom: &D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        if !self.state.tracking {
            return TouchResponse::pass(TapResult::Ignored);
        }

        let target = self.resolver.resolve_target(dom, event.target);
        if self.state.target != Some(target) {
            return self.abort(AbortReason::TargetChanged);
        }
        if event.changed_touch().is_some_and(|t| self.has_moved(t)) {
            return self.abort(AbortReason::Moved);
        }
        TouchResponse::pass(TapResult::Tracking)
    }

    /// Handle a touch cancel.
    pub fn on_touch_cancel(&mut self) -> TouchResponse<K> {
        let was_tracking = self.state.tracking;
        self.state.tracking = false;
        self.state.target = None;
        if was_tracking {
            tracing::debug!(reason = ?AbortReason::Cancelled, "tap aborted");
            TouchResponse::pass(TapResult::Aborted(AbortReason::Cancelled))
        } else {
            TouchResponse::pass(TapResult::Ignored)
        }
    }

    /// Handle a touch end; may focus elements and dispatch a synthetic activation.
    pub fn on_touch_end<D: DomMut<Node = K>>(
        &mut self,
        dom: &mut D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        if !self.state.tracking {
            return TouchResponse::pass(TapResult::Ignored);
        }
        let Some(tracked) = self.state.target else {
            return self.abort(AbortReason::Cancelled);
        };
        let now = event.timestamp;

        if self.within_tap_delay(now) {
            // Keep the target as ghost guard so the gate swallows the native one.
            self.state.tracking = false;
            self.state.cancel_next_native = true;
            tracing::debug!(reason = ?AbortReason::DuplicateTap, node = ?tracked, "tap aborted");
            return TouchResponse::pass(TapResult::Aborted(AbortReason::DuplicateTap));
        }

        if now.saturating_sub(self.state.track_start) > self.config.tap_timeout() {
            return self.abort(AbortReason::LongPress);
        }

        let Some(touch) = event.changed_touch().copied() else {
            return self.abort(AbortReason::MissingContact);
        };

        self.state.cancel_next_native = false;
        self.state.last_activation = Some(now);
        self.state.tracking = false;
        let held = now.saturating_sub(self.state.track_start);
        self.state.track_start = 0;

        let profile = self.quirks.profile();
        let mut target = tracked;
        if profile.retargets_touch_end()
            && let Some(hit) = dom.element_from_point(touch.client)
        {
            self.resolver.inherit_scroll_ancestor(tracked, hit);
            target = hit;
        }
        // Scroll state was recorded for the gesture's own element.
        let scroll_origin = target;

        let Some((tag, needs_focus)) = dom
            .element(target)
            .map(|info| (info.tag, self.quirks.needs_focus(&info)))
        else {
            self.state.target = None;
            return TouchResponse::pass(TapResult::Ignored);
        };

        if tag == Tag::Label {
            if let Some(control) = self.resolver.find_control(&*dom, target) {
                self.dispatcher.focus(dom, control);
                if profile.native_label_activation() {
                    self.state.target = None;
                    return TouchResponse::pass(TapResult::NativeActivation(control));
                }
                target = control;
            }
        } else if needs_focus {
            if held > self.config.focus_timeout() {
                return self.abort(AbortReason::FocusTimeout);
            }
            if profile.touch_scroll_quirks() && dom.is_embedded() && tag == Tag::Input {
                return self.abort(AbortReason::EmbeddedInput);
            }

            self.dispatcher.focus(dom, target);
            self.dispatcher.send(dom, target, &touch);

            // Native selects still need their own click to open the picker.
            if profile.keeps_native_select_click() && tag == Tag::Select {
                self.state.target = Some(target);
                return TouchResponse::pass(TapResult::Activated(target));
            }
            self.state.target = None;
            return TouchResponse::prevent(TapResult::Activated(target));
        }

        if profile.tracks_scroll_ancestors() && self.resolver.scroll_changed(&*dom, scroll_origin)
        {
            return self.abort(AbortReason::Scrolled);
        }

        let needs_click = dom
            .element(target)
            .is_none_or(|info| self.quirks.needs_click(&info));
        if needs_click {
            self.state.target = None;
            return TouchResponse::pass(TapResult::NativeActivation(target));
        }

        self.dispatcher.send(dom, target, &touch);
        self.state.target = Some(target);
        TouchResponse::prevent(TapResult::Activated(target))
    }

    /// Clear tracking and the ghost guard, e.g. after a stray native click.
    pub(crate) fn clear_target(&mut self) {
        self.state.tracking = false;
        self.state.target = None;
    }

    fn abort(&mut self, reason: AbortReason) -> TouchResponse<K> {
        tracing::debug!(?reason, node = ?self.state.target, "tap aborted");
        self.state.tracking = false;
        self.state.target = None;
        TouchResponse::pass(TapResult::Aborted(reason))
    }

    fn within_tap_delay(&self, now: u64) -> bool {
        self.state
            .last_activation
            .is_some_and(|last| now.saturating_sub(last) < self.config.tap_delay())
    }

    fn has_moved(&self, touch: &Touch) -> bool {
        let boundary = self.config.touch_boundary();
        (touch.page.x - self.state.start.x).abs() > boundary
            || (touch.page.y - self.state.start.y).abs() > boundary
    }
}
