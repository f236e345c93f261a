// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attach/detach lifecycle for one surface.
//!
//! [`FastTap`] owns the listener registrations it made on a [`Surface`] and
//! routes the host's events to the [`GestureTracker`] and [`NativeEventGate`].
//! A handle is inert when the environment does not need the shim, and becomes
//! inert again after [`FastTap::detach`]; inert handles pass every event
//! through.

use smallvec::SmallVec;

use crate::config::TapConfig;
use crate::gate::{GateDecision, NativeEventGate};
use crate::platform::{Environment, PlatformProfile};
use crate::tracker::{GestureTracker, TapResult, TouchResponse};
use crate::types::{Dom, DomMut, ListenerKind, ListenerPhase, NativeEvent, Surface, TouchEvent};

const TOUCH_LISTENERS: [ListenerKind; 4] = [
    ListenerKind::TouchStart,
    ListenerKind::TouchMove,
    ListenerKind::TouchEnd,
    ListenerKind::TouchCancel,
];

const POINTER_LISTENERS: [ListenerKind; 3] = [
    ListenerKind::MouseOver,
    ListenerKind::MouseDown,
    ListenerKind::MouseUp,
];

#[derive(Clone, Debug)]
struct Engaged<K> {
    tracker: GestureTracker<K>,
    gate: NativeEventGate,
}

/// Fast-tap handling for one surface.
///
/// `K` is the host's node key and `L` its listener handle.
#[derive(Clone, Debug)]
pub struct FastTap<K, L> {
    engaged: Option<Engaged<K>>,
    listeners: SmallVec<[L; 8]>,
}

impl<K: Copy + Eq + core::hash::Hash + core::fmt::Debug, L> FastTap<K, L> {
    /// A handle that passes everything through and owns no listeners.
    pub fn inert() -> Self {
        Self {
            engaged: None,
            listeners: SmallVec::new(),
        }
    }

    /// Install on `surface` if `env` needs it.
    ///
    /// Touch listeners go on the bubble phase and the click listener on the
    /// capture phase. On platforms where native mouse events race the
    /// synthetic activation, mouse over/down/up are captured as well.
    pub fn attach<S: Surface<Listener = L>>(
        surface: &mut S,
        env: &Environment,
        config: TapConfig,
    ) -> Self {
        if !env.needs_shim() {
            tracing::debug!(user_agent = %env.user_agent, "fast tap not needed");
            return Self::inert();
        }

        let profile = env.profile();
        let mut listeners = SmallVec::new();
        if profile.races_pointer_events() {
            for kind in POINTER_LISTENERS {
                listeners.push(surface.add_listener(kind, ListenerPhase::Capture));
            }
        }
        listeners.push(surface.add_listener(ListenerKind::Click, ListenerPhase::Capture));
        for kind in TOUCH_LISTENERS {
            listeners.push(surface.add_listener(kind, ListenerPhase::Bubble));
        }

        tracing::debug!(?profile, listeners = listeners.len(), "fast tap attached");
        Self {
            engaged: Some(Engaged {
                tracker: GestureTracker::new(config, profile),
                gate: NativeEventGate::for_environment(env),
            }),
            listeners,
        }
    }

    /// Remove every listener and drop all gesture state.
    ///
    /// Calling this again, or on an inert handle, does nothing.
    pub fn detach<S: Surface<Listener = L>>(&mut self, surface: &mut S) {
        for listener in self.listeners.drain(..) {
            surface.remove_listener(listener);
        }
        if let Some(mut engaged) = self.engaged.take() {
            engaged.tracker.reset();
            tracing::debug!("fast tap detached");
        }
    }

    /// Whether this handle is intercepting events.
    pub fn is_active(&self) -> bool {
        self.engaged.is_some()
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Platform profile in effect, if active.
    pub fn profile(&self) -> Option<PlatformProfile> {
        self.engaged.as_ref().map(|e| e.tracker.quirks().profile())
    }

    /// The tracker, if active.
    pub fn tracker(&self) -> Option<&GestureTracker<K>> {
        self.engaged.as_ref().map(|e| &e.tracker)
    }

    /// Drop cached scroll state for `node`, e.g. when the host recycles its key.
    pub fn forget_node(&mut self, node: K) {
        if let Some(e) = &mut self.engaged {
            e.tracker.resolver_mut().forget(node);
        }
    }

    /// Handle a touch start.
    pub fn on_touch_start<D: Dom<Node = K>>(
        &mut self,
        dom: &D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        match &mut self.engaged {
            Some(e) => e.tracker.on_touch_start(dom, event),
            None => TouchResponse::pass(TapResult::Ignored),
        }
    }

    /// Handle a touch move.
    pub fn on_touch_move<D: Dom<Node = K>>(
        &mut self,
        dom: &D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        match &mut self.engaged {
            Some(e) => e.tracker.on_touch_move(dom, event),
            None => TouchResponse::pass(TapResult::Ignored),
        }
    }

    /// Handle a touch end.
    pub fn on_touch_end<D: DomMut<Node = K>>(
        &mut self,
        dom: &mut D,
        event: &TouchEvent<K>,
    ) -> TouchResponse<K> {
        match &mut self.engaged {
            Some(e) => e.tracker.on_touch_end(dom, event),
            None => TouchResponse::pass(TapResult::Ignored),
        }
    }

    /// Handle a touch cancel.
    pub fn on_touch_cancel(&mut self) -> TouchResponse<K> {
        match &mut self.engaged {
            Some(e) => e.tracker.on_touch_cancel(),
            None => TouchResponse::pass(TapResult::Ignored),
        }
    }

    /// Handle a native mouse or click event, including redelivered synthetic ones.
    pub fn on_native<D: Dom<Node = K>>(
        &mut self,
        dom: &D,
        event: &NativeEvent<K>,
    ) -> GateDecision {
        match &mut self.engaged {
            Some(e) => e.gate.on_native(&mut e.tracker, dom, event),
            None => {
                tracing::trace!(kind = ?event.kind, "inert handle, passing");
                GateDecision::Pass
            }
        }
    }
}
