// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gate for the platform's own pointer and click events.
//!
//! Once a tap has been turned into a synthetic activation, the platform still
//! delivers its delayed native events for the same touch. The gate recognizes
//! those follow-ups by the tracker's ghost guard and consumes them so that the
//! element is activated exactly once.
//!
//! ## Rules
//!
//! An event is let through when any of these hold:
//! - no gesture target is remembered,
//! - the event is a synthetic activation produced by this crate,
//! - the event cannot be cancelled.
//!
//! Otherwise it is consumed if the remembered target does not need native
//! activation, or if the tracker asked for the next native activation to be
//! cancelled. Click events additionally:
//! - pass (and clear the tracker) if they arrive while a gesture is in flight,
//! - pass if they are keyboard submissions (`detail == 0` on a submit input
//!   or submit button),
//! - clear the remembered target when consumed.

use crate::platform::Environment;
use crate::tracker::GestureTracker;
use crate::types::{Dom, EventOrigin, NativeEvent, NativeKind};

/// How a consumed event should be stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Suppression {
    /// Stop other listeners on the same node and further propagation, and
    /// prevent the default action.
    StopImmediate,
    /// Stop propagation, prevent the default action, and mark the event so
    /// that listeners registered before the shim can ignore it.
    MarkStopped,
}

/// Verdict for a native event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GateDecision {
    /// Let the event reach its listeners.
    Pass,
    /// Swallow the event.
    Consume(Suppression),
}

impl GateDecision {
    /// Whether the event should be swallowed.
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consume(_))
    }
}

/// Decides whether native pointer and click events reach the page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NativeEventGate {
    suppression: Suppression,
}

impl NativeEventGate {
    /// Create a gate that suppresses with `suppression`.
    pub const fn new(suppression: Suppression) -> Self {
        Self { suppression }
    }

    /// Pick the suppression mechanism `env` supports.
    pub fn for_environment(env: &Environment) -> Self {
        Self::new(if env.supports_immediate_propagation_stop {
            Suppression::StopImmediate
        } else {
            Suppression::MarkStopped
        })
    }

    /// Suppression used for consumed events.
    pub fn suppression(&self) -> Suppression {
        self.suppression
    }

    /// Route `event` to [`Self::on_pointer`] or [`Self::on_click`] by kind.
    pub fn on_native<D: Dom>(
        &self,
        tracker: &mut GestureTracker<D::Node>,
        dom: &D,
        event: &NativeEvent<D::Node>,
    ) -> GateDecision {
        match event.kind {
            NativeKind::Click => self.on_click(tracker, dom, event),
            NativeKind::MouseOver | NativeKind::MouseDown | NativeKind::MouseUp => {
                self.on_pointer(tracker, dom, event)
            }
        }
    }

    /// Decide a native mouse event.
    pub fn on_pointer<D: Dom>(
        &self,
        tracker: &GestureTracker<D::Node>,
        dom: &D,
        event: &NativeEvent<D::Node>,
    ) -> GateDecision {
        let state = tracker.state();
        let Some(target) = state.target else {
            return GateDecision::Pass;
        };
        if event.origin == EventOrigin::Synthetic || !event.cancelable {
            return GateDecision::Pass;
        }

        let needs_click = dom
            .element(target)
            .is_none_or(|info| tracker.quirks().needs_click(&info));
        if !needs_click || state.cancel_next_native {
            tracing::debug!(kind = ?event.kind, node = ?target, "native event consumed");
            GateDecision::Consume(self.suppression)
        } else {
            GateDecision::Pass
        }
    }

    /// Decide a native click.
    pub fn on_click<D: Dom>(
        &self,
        tracker: &mut GestureTracker<D::Node>,
        dom: &D,
        event: &NativeEvent<D::Node>,
    ) -> GateDecision {
        // A click during a gesture means the platform activated on its own.
        if tracker.state().tracking {
            tracker.clear_target();
            return GateDecision::Pass;
        }

        let keyboard_submit = event.detail == 0
            && dom
                .element(event.target)
                .is_some_and(|info| info.is_submit());
        if keyboard_submit {
            return GateDecision::Pass;
        }

        let decision = self.on_pointer(tracker, dom, event);
        if decision.is_consumed() {
            tracker.clear_target();
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TapConfig;
    use crate::platform::PlatformProfile;
    use crate::test_dom::TestDom;
    use crate::types::{ElementInfo, InputType, Tag, Touch, TouchEvent};
    use kurbo::Point;

    const CONSUME: GateDecision = GateDecision::Consume(Suppression::StopImmediate);

    fn tapped(dom: &mut TestDom, target: u32) -> GestureTracker<u32> {
        let mut t = GestureTracker::new(TapConfig::default(), PlatformProfile::empty());
        let touch = Touch::at(1, Point::new(10.0, 10.0));
        t.on_touch_start(&*dom, &TouchEvent::single(target, 0, touch));
        t.on_touch_end(dom, &TouchEvent::ended(target, 30, touch));
        t
    }

    #[test]
    fn passes_everything_without_a_target() {
        let mut dom = TestDom::new();
        let button = dom.add_element(None, Tag::Button);
        let mut t = GestureTracker::new(TapConfig::default(), PlatformProfile::empty());
        let gate = NativeEventGate::new(Suppression::StopImmediate);
        for kind in [NativeKind::MouseDown, NativeKind::Click] {
            let ev = NativeEvent::native(kind, button);
            assert_eq!(gate.on_native(&mut t, &dom, &ev), GateDecision::Pass);
        }
    }

    #[test]
    fn ghost_click_is_consumed_once() {
        let mut dom = TestDom::new();
        let button = dom.add_element(None, Tag::Button);
        let mut t = tapped(&mut dom, button);
        let gate = NativeEventGate::new(Suppression::StopImmediate);

        let down = NativeEvent::native(NativeKind::MouseDown, button);
        assert_eq!(gate.on_native(&mut t, &dom, &down), CONSUME);
        // Pointer events leave the guard in place for the click.
        assert_eq!(t.state().target, Some(button));

        let click = NativeEvent::native(NativeKind::Click, button);
        assert_eq!(gate.on_native(&mut t, &dom, &click), CONSUME);
        assert_eq!(t.state().target, None);
        assert_eq!(gate.on_native(&mut t, &dom, &click), GateDecision::Pass);
    }

    #[test]
    fn synthetic_and_uncancelable_events_pass() {
        let mut dom = TestDom::new();
        let button = dom.add_element(None, Tag::Button);
        let mut t = tapped(&mut dom, button);
        let gate = NativeEventGate::new(Suppression::StopImmediate);

        let synthetic = dom.dispatched()[0].as_native();
        assert_eq!(gate.on_click(&mut t, &dom, &synthetic), GateDecision::Pass);

        let mut uncancelable = NativeEvent::native(NativeKind::Click, button);
        uncancelable.cancelable = false;
        assert_eq!(gate.on_click(&mut t, &dom, &uncancelable), GateDecision::Pass);
        assert_eq!(t.state().target, Some(button));
    }

    #[test]
    fn click_during_gesture_clears_tracking() {
        let mut dom = TestDom::new();
        let button = dom.add_element(None, Tag::Button);
        let mut t = GestureTracker::new(TapConfig::default(), PlatformProfile::empty());
        let touch = Touch::at(1, Point::new(10.0, 10.0));
        t.on_touch_start(&dom, &TouchEvent::single(button, 0, touch));

        let gate = NativeEventGate::new(Suppression::StopImmediate);
        let click = NativeEvent::native(NativeKind::Click, button);
        assert_eq!(gate.on_click(&mut t, &dom, &click), GateDecision::Pass);
        assert!(!t.state().tracking);
        assert_eq!(t.state().target, None);

        let r = t.on_touch_end(&mut dom, &TouchEvent::ended(button, 20, touch));
        assert_eq!(r.result, crate::TapResult::Ignored);
    }

    #[test]
    fn keyboard_submit_passes() {
        let mut dom = TestDom::new();
        let submit = dom.add(None, ElementInfo {
            tag: Tag::Input,
            input_type: InputType::Submit,
            ..ElementInfo::default()
        });
        let mut t = tapped(&mut dom, submit);
        let gate = NativeEventGate::new(Suppression::MarkStopped);

        let mut keyboard = NativeEvent::native(NativeKind::Click, submit);
        keyboard.detail = 0;
        assert_eq!(gate.on_click(&mut t, &dom, &keyboard), GateDecision::Pass);

        let click = NativeEvent::native(NativeKind::Click, submit);
        assert_eq!(
            gate.on_click(&mut t, &dom, &click),
            GateDecision::Consume(Suppression::MarkStopped)
        );
    }

    #[test]
    fn keyboard_activation_of_form_button_passes() {
        let mut dom = TestDom::new();
        let tapped_button = dom.add_element(None, Tag::Button);
        let submit = dom.add_element(None, Tag::Button);
        let plain = dom.add(None, ElementInfo {
            tag: Tag::Button,
            input_type: InputType::Button,
            ..ElementInfo::default()
        });
        let mut t = tapped(&mut dom, tapped_button);
        let gate = NativeEventGate::new(Suppression::StopImmediate);

        let mut enter = NativeEvent::native(NativeKind::Click, submit);
        enter.detail = 0;
        assert_eq!(gate.on_click(&mut t, &dom, &enter), GateDecision::Pass);
        assert_eq!(t.state().target, Some(tapped_button));

        // A `type="button"` button does not submit, so the guard applies.
        let mut enter = NativeEvent::native(NativeKind::Click, plain);
        enter.detail = 0;
        assert_eq!(gate.on_click(&mut t, &dom, &enter), CONSUME);
    }

    #[test]
    fn cancel_flag_consumes_even_when_native_click_is_needed() {
        let mut dom = TestDom::new();
        let video = dom.add_element(None, Tag::Video);
        let mut t = GestureTracker::new(TapConfig::default(), PlatformProfile::empty());
        let touch = Touch::at(1, Point::new(10.0, 10.0));
        // First tap qualifies but keeps its native click.
        t.on_touch_start(&dom, &TouchEvent::single(video, 0, touch));
        t.on_touch_end(&mut dom, &TouchEvent::ended(video, 20, touch));
        // Second tap is a duplicate.
        t.on_touch_start(&dom, &TouchEvent::single(video, 60, touch));
        t.on_touch_end(&mut dom, &TouchEvent::ended(video, 80, touch));
        assert!(t.state().cancel_next_native);

        let gate = NativeEventGate::new(Suppression::StopImmediate);
        let click = NativeEvent::native(NativeKind::Click, video);
        assert_eq!(gate.on_click(&mut t, &dom, &click), CONSUME);
    }

    #[test]
    fn environment_selects_suppression() {
        let env = Environment::new("iPhone OS 7_0").with_immediate_propagation_stop(false);
        assert_eq!(
            NativeEventGate::for_environment(&env).suppression(),
            Suppression::MarkStopped
        );
    }
}
