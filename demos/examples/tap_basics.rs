// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap basics: a quick tap, a drag, a double tap and a label on an in-memory page.
//!
//! Run:
//! - `cargo run -p understory_examples --example tap_basics`
//! - `RUST_LOG=understory_tap=debug cargo run -p understory_examples --example tap_basics`

use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_tap::{
    Dom, DomMut, ElementInfo, Environment, EventOrigin, FastTap, GateDecision, InputType,
    ListenerKind, ListenerPhase, NativeEvent, NativeKind, ScrollMetrics, Surface,
    SyntheticActivation, Tag, TapConfig, Touch, TouchEvent,
};

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) AppleWebKit/601.1.46";

fn tap(
    fast: &mut FastTap<NodeId, u32>,
    page: &mut Page,
    target: NodeId,
    (t0, t1): (u64, u64),
    (from, to): (Point, Point),
) {
    let id = i64::try_from(t0).unwrap_or(i64::MAX);
    let start = fast.on_touch_start(&*page, &TouchEvent::single(target, t0, Touch::at(id, from)));
    if from != to {
        let moved = TouchEvent::single(target, (t0 + t1) / 2, Touch::at(id, to));
        fast.on_touch_move(&*page, &moved);
    }
    let end = fast.on_touch_end(page, &TouchEvent::ended(target, t1, Touch::at(id, to)));
    println!(
        "  {}: start {:?}, end {:?} (prevent default: {})",
        page.name(target),
        start.result,
        end.result,
        end.prevent_default
    );
    page.settle(fast, target);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut page = Page::new();
    let form = page.add(None, "form", ElementInfo::default());
    let ok = page.add(Some(form), "ok", button());
    let agree = page.add(
        Some(form),
        "agree",
        ElementInfo {
            tag: Tag::Input,
            input_type: InputType::Checkbox,
            ..ElementInfo::default()
        },
    );
    page.set_id(agree, "agree");
    let label = page.add(
        Some(form),
        "agree-label",
        ElementInfo {
            tag: Tag::Label,
            html_for: Some("agree"),
            ..ElementInfo::default()
        },
    );
    let label_text = page.add_text(label);

    let env = Environment::new(IPHONE);
    let mut fast = FastTap::attach(&mut page, &env, TapConfig::default());
    println!(
        "attached: active={}, profile={:?}, listeners={}",
        fast.is_active(),
        fast.profile(),
        page.listener_count()
    );

    let here = Point::new(100.0, 100.0);
    println!("quick tap:");
    tap(&mut fast, &mut page, ok, (1_000, 1_050), (here, Point::new(102.0, 101.0)));

    println!("drag:");
    tap(&mut fast, &mut page, ok, (2_000, 2_080), (here, Point::new(150.0, 100.0)));

    println!("double tap:");
    tap(&mut fast, &mut page, ok, (3_000, 3_040), (here, here));
    tap(&mut fast, &mut page, ok, (3_060, 3_090), (here, here));

    println!("label:");
    tap(&mut fast, &mut page, label_text, (4_000, 4_030), (here, here));

    println!("page saw:");
    for event in &page.log {
        match event {
            PageEvent::Focused(name) => println!("  focused {name}"),
            PageEvent::Blurred(name) => println!("  blurred {name}"),
            PageEvent::Activated { target, synthetic } => {
                println!("  activated {target} (synthetic: {synthetic})");
            }
        }
    }

    fast.detach(&mut page);
    println!("detached: listeners={}", page.listener_count());
}

type NodeId = usize;

#[derive(Clone, Debug, Default)]
struct Node {
    name: &'static str,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: bool,
    info: ElementInfo<'static>,
    id: Option<&'static str>,
}

/// What reached the page's own listeners.
#[derive(Clone, Debug, PartialEq)]
enum PageEvent {
    /// An element received focus.
    Focused(&'static str),
    /// An element lost focus.
    Blurred(&'static str),
    /// An activation reached listeners.
    Activated {
        /// Element name.
        target: &'static str,
        /// Whether it was the synthetic one.
        synthetic: bool,
    },
}

/// An in-memory page that implements the host traits and records what
/// reaches its own listeners.
#[derive(Debug, Default)]
struct Page {
    nodes: Vec<Node>,
    active: Option<NodeId>,
    pending: Vec<SyntheticActivation<NodeId>>,
    listeners: Vec<(u32, ListenerKind, ListenerPhase)>,
    next_listener: u32,
    /// Everything the page observed, in order.
    log: Vec<PageEvent>,
}

impl Page {
    /// An empty page.
    fn new() -> Self {
        Self::default()
    }

    /// Add an element under `parent`.
    fn add(
        &mut self,
        parent: Option<NodeId>,
        name: &'static str,
        info: ElementInfo<'static>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            parent,
            info,
            ..Node::default()
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    /// Add a text node under `parent`.
    fn add_text(&mut self, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), "#text", ElementInfo::default());
        self.nodes[id].text = true;
        id
    }

    /// Give `node` a document id.
    fn set_id(&mut self, node: NodeId, id: &'static str) {
        self.nodes[node].id = Some(id);
    }

    /// Name of `node`.
    fn name(&self, node: NodeId) -> &'static str {
        self.nodes[node].name
    }

    /// Number of registered listeners.
    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver queued synthetic activations and then a native click at
    /// `target`, as the platform would after a touch ends.
    ///
    /// Every event first goes through `tap`; only the ones it passes are
    /// logged as reaching the page.
    fn settle(&mut self, tap: &mut FastTap<NodeId, u32>, target: NodeId) {
        let mut events: Vec<NativeEvent<NodeId>> =
            self.pending.drain(..).map(|ev| ev.as_native()).collect();
        events.push(NativeEvent::native(NativeKind::Click, target));
        for event in events {
            let name = self.name(event.target);
            match tap.on_native(&*self, &event) {
                GateDecision::Pass => self.log.push(PageEvent::Activated {
                    target: name,
                    synthetic: event.origin == EventOrigin::Synthetic,
                }),
                GateDecision::Consume(how) => {
                    tracing::info!(node = name, ?how, "native click swallowed");
                }
            }
        }
    }
}

impl Dom for Page {
    type Node = NodeId;

    fn is_text(&self, node: NodeId) -> bool {
        self.nodes[node].text
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].children.first().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = &self.nodes[self.nodes[node].parent?].children;
        let pos = siblings.iter().position(|&c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn element(&self, node: NodeId) -> Option<ElementInfo<'_>> {
        let n = &self.nodes[node];
        (!n.text).then(|| n.info.clone())
    }

    fn label_control(&self, _label: NodeId) -> Option<NodeId> {
        None
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.id == Some(id))
    }

    fn scroll_metrics(&self, node: NodeId) -> ScrollMetrics {
        ScrollMetrics::default()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn has_text_selection(&self) -> bool {
        false
    }

    fn is_embedded(&self) -> bool {
        false
    }

    fn element_from_point(&self, _client: Point) -> Option<NodeId> {
        None
    }
}

impl DomMut for Page {
    fn focus(&mut self, node: NodeId) {
        let name = self.name(node);
        self.active = Some(node);
        self.log.push(PageEvent::Focused(name));
    }

    fn blur(&mut self, node: NodeId) {
        if self.active == Some(node) {
            self.active = None;
        }
        let name = self.name(node);
        self.log.push(PageEvent::Blurred(name));
    }

    fn set_selection_range(&mut self, node: NodeId, _start: usize, _end: usize) {
        self.focus(node);
    }

    fn dispatch_activation(&mut self, event: SyntheticActivation<NodeId>) {
        self.pending.push(event);
    }
}

impl Surface for Page {
    type Listener = u32;

    fn add_listener(&mut self, kind: ListenerKind, phase: ListenerPhase) -> u32 {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, kind, phase));
        id
    }

    fn remove_listener(&mut self, listener: u32) {
        self.listeners.retain(|&(id, _, _)| id != listener);
    }
}

/// A default-typed button.
fn button() -> ElementInfo<'static> {
    ElementInfo {
        tag: Tag::Button,
        ..ElementInfo::default()
    }
}
