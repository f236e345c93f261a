// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tap: low-latency tap activation for touch surfaces.
//!
//! Touch platforms often hold back the activation (click) that follows a tap,
//! waiting to see whether a second tap turns it into a zoom gesture. This
//! crate recognizes taps from the raw touch stream, dispatches a synthetic
//! activation at touch end, and swallows the platform's delayed native events
//! so the element is activated exactly once.
//!
//! The pieces:
//! - [`Environment`] and [`PlatformProfile`]: decide once, at attach time,
//!   whether a surface needs this at all and which platform quirks apply.
//! - [`GestureTracker`]: the tap state machine, driven by touch events.
//! - [`NativeEventGate`]: classifies native mouse and click events as
//!   pass-through or consumed.
//! - [`TargetResolver`], [`QuirkPolicy`] and [`ActivationDispatcher`]:
//!   target resolution, per-element policy and synthetic dispatch.
//! - [`FastTap`]: ties the above to a [`Surface`] with an attach/detach
//!   lifecycle.
//!
//! The host describes its document through the [`Dom`] and [`DomMut`]
//! traits. Nodes are identified by a host-chosen key; all per-element state
//! this crate keeps lives in side-tables keyed by it.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_tap::{
//!     Dom, DomMut, ElementInfo, Environment, FastTap, GateDecision, ListenerKind,
//!     ListenerPhase, NativeEvent, NativeKind, ScrollMetrics, Surface, SyntheticActivation,
//!     Tag, TapConfig, TapResult, Touch, TouchEvent,
//! };
//!
//! /// A page with a single button (node 0).
//! #[derive(Default)]
//! struct Page {
//!     listeners: u32,
//!     queue: Vec<SyntheticActivation<u32>>,
//! }
//!
//! impl Dom for Page {
//!     type Node = u32;
//!     fn is_text(&self, _: u32) -> bool { false }
//!     fn parent(&self, _: u32) -> Option<u32> { None }
//!     fn first_child(&self, _: u32) -> Option<u32> { None }
//!     fn next_sibling(&self, _: u32) -> Option<u32> { None }
//!     fn element(&self, _: u32) -> Option<ElementInfo<'_>> {
//!         Some(ElementInfo { tag: Tag::Button, ..ElementInfo::default() })
//!     }
//!     fn label_control(&self, _: u32) -> Option<u32> { None }
//!     fn element_by_id(&self, _: &str) -> Option<u32> { None }
//!     fn scroll_metrics(&self, _: u32) -> ScrollMetrics { ScrollMetrics::default() }
//!     fn active_element(&self) -> Option<u32> { None }
//!     fn has_text_selection(&self) -> bool { false }
//!     fn is_embedded(&self) -> bool { false }
//!     fn element_from_point(&self, _: Point) -> Option<u32> { Some(0) }
//! }
//!
//! impl DomMut for Page {
//!     fn focus(&mut self, _: u32) {}
//!     fn blur(&mut self, _: u32) {}
//!     fn set_selection_range(&mut self, _: u32, _: usize, _: usize) {}
//!     fn dispatch_activation(&mut self, event: SyntheticActivation<u32>) {
//!         self.queue.push(event);
//!     }
//! }
//!
//! impl Surface for Page {
//!     type Listener = u32;
//!     fn add_listener(&mut self, _: ListenerKind, _: ListenerPhase) -> u32 {
//!         self.listeners += 1;
//!         self.listeners
//!     }
//!     fn remove_listener(&mut self, _: u32) {
//!         self.listeners -= 1;
//!     }
//! }
//!
//! let mut page = Page::default();
//! let env = Environment::new("Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X)");
//! let mut tap = FastTap::attach(&mut page, &env, TapConfig::default());
//! assert!(tap.is_active());
//!
//! let touch = Touch::at(1, Point::new(100.0, 100.0));
//! tap.on_touch_start(&page, &TouchEvent::single(0, 1_000, touch));
//! let end = tap.on_touch_end(&mut page, &TouchEvent::ended(0, 1_050, touch));
//! assert_eq!(end.result, TapResult::Activated(0));
//!
//! // The synthetic activation is delivered and passes the gate...
//! let synthetic = page.queue[0].as_native();
//! assert_eq!(tap.on_native(&page, &synthetic), GateDecision::Pass);
//! // ...while the platform's own click for the same tap is swallowed.
//! let ghost = NativeEvent::native(NativeKind::Click, 0);
//! assert!(tap.on_native(&page, &ghost).is_consumed());
//!
//! tap.detach(&mut page);
//! assert_eq!(page.listeners, 0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std` and `tracing/std`.
//! - `libm`: for `no_std` builds, forwards to `kurbo/libm`.
//!
//! Diagnostics are emitted as [`tracing`] events; this crate never installs a
//! subscriber.

#![no_std]

extern crate alloc;

mod config;
mod dispatch;
mod gate;
mod platform;
mod quirks;
mod resolve;
mod shim;
mod tracker;
mod types;

#[cfg(test)]
mod test_dom;

pub use config::TapConfig;
pub use dispatch::ActivationDispatcher;
pub use gate::{GateDecision, NativeEventGate, Suppression};
pub use platform::{Environment, PlatformProfile, TouchAction};
pub use quirks::QuirkPolicy;
pub use resolve::{ScrollAssociation, TargetResolver};
pub use shim::FastTap;
pub use tracker::{AbortReason, GestureState, GestureTracker, TapResult, TouchResponse};
pub use types::{
    ActivationKind, Dom, DomMut, ElementFlags, ElementInfo, EventOrigin, InputType, ListenerKind,
    ListenerPhase, NativeEvent, NativeKind, ScrollMetrics, Surface, SyntheticActivation, Tag,
    Touch, TouchEvent, TouchList,
};
