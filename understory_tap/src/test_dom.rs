// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host used by unit tests.

use alloc::vec::Vec;

use kurbo::Point;

use crate::types::{
    Dom, DomMut, ElementInfo, ListenerKind, ListenerPhase, ScrollMetrics, Surface,
    SyntheticActivation, Tag,
};

/// Side effect observed on the host.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    Focus(u32),
    Blur(u32),
    Selection(u32, usize, usize),
    Dispatch(SyntheticActivation<u32>),
}

#[derive(Clone, Debug, Default)]
struct NodeData {
    parent: Option<u32>,
    children: Vec<u32>,
    text: bool,
    info: ElementInfo<'static>,
    id: Option<&'static str>,
    label_control: Option<u32>,
    scroll: ScrollMetrics,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TestDom {
    nodes: Vec<NodeData>,
    pub(crate) active: Option<u32>,
    pub(crate) selection: bool,
    pub(crate) embedded: bool,
    pub(crate) hit: Option<u32>,
    pub(crate) effects: Vec<Effect>,
    listeners: Vec<(u32, ListenerKind, ListenerPhase)>,
    next_listener: u32,
}

impl TestDom {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, parent: Option<u32>, info: ElementInfo<'static>) -> u32 {
        self.push(parent, NodeData {
            info,
            ..NodeData::default()
        })
    }

    pub(crate) fn add_element(&mut self, parent: Option<u32>, tag: Tag) -> u32 {
        self.add(parent, ElementInfo {
            tag,
            ..ElementInfo::default()
        })
    }

    pub(crate) fn add_text(&mut self, parent: u32) -> u32 {
        self.push(Some(parent), NodeData {
            text: true,
            ..NodeData::default()
        })
    }

    fn push(&mut self, parent: Option<u32>, mut data: NodeData) -> u32 {
        let key = u32::try_from(self.nodes.len()).expect("test trees stay small");
        data.parent = parent;
        self.nodes.push(data);
        if let Some(p) = parent {
            self.nodes[p as usize].children.push(key);
        }
        key
    }

    pub(crate) fn reparent(&mut self, node: u32, new_parent: u32) {
        if let Some(old) = self.nodes[node as usize].parent {
            self.nodes[old as usize].children.retain(|&c| c != node);
        }
        self.nodes[node as usize].parent = Some(new_parent);
        self.nodes[new_parent as usize].children.push(node);
    }

    pub(crate) fn set_id(&mut self, node: u32, id: &'static str) {
        self.nodes[node as usize].id = Some(id);
    }

    pub(crate) fn set_label_control(&mut self, label: u32, control: u32) {
        self.nodes[label as usize].label_control = Some(control);
    }

    pub(crate) fn set_scroll(&mut self, node: u32, metrics: ScrollMetrics) {
        self.nodes[node as usize].scroll = metrics;
    }

    pub(crate) fn scroll_to(&mut self, node: u32, top: f64) {
        self.nodes[node as usize].scroll.scroll_top = top;
    }

    pub(crate) fn info_mut(&mut self, node: u32) -> &mut ElementInfo<'static> {
        &mut self.nodes[node as usize].info
    }

    pub(crate) fn dispatched(&self) -> Vec<SyntheticActivation<u32>> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Dispatch(ev) => Some(*ev),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn has_listener(&self, kind: ListenerKind, phase: ListenerPhase) -> bool {
        self.listeners
            .iter()
            .any(|&(_, k, p)| k == kind && p == phase)
    }
}

impl Dom for TestDom {
    type Node = u32;

    fn is_text(&self, node: u32) -> bool {
        self.nodes[node as usize].text
    }

    fn parent(&self, node: u32) -> Option<u32> {
        self.nodes[node as usize].parent
    }

    fn first_child(&self, node: u32) -> Option<u32> {
        self.nodes[node as usize].children.first().copied()
    }

    fn next_sibling(&self, node: u32) -> Option<u32> {
        let parent = self.nodes[node as usize].parent?;
        let siblings = &self.nodes[parent as usize].children;
        let pos = siblings.iter().position(|&c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn element(&self, node: u32) -> Option<ElementInfo<'_>> {
        let data = &self.nodes[node as usize];
        (!data.text).then(|| data.info.clone())
    }

    fn label_control(&self, label: u32) -> Option<u32> {
        self.nodes[label as usize].label_control
    }

    fn element_by_id(&self, id: &str) -> Option<u32> {
        self.nodes
            .iter()
            .position(|n| n.id == Some(id))
            .and_then(|i| u32::try_from(i).ok())
    }

    fn scroll_metrics(&self, node: u32) -> ScrollMetrics {
        self.nodes[node as usize].scroll
    }

    fn active_element(&self) -> Option<u32> {
        self.active
    }

    fn has_text_selection(&self) -> bool {
        self.selection
    }

    fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn element_from_point(&self, _client: Point) -> Option<u32> {
        self.hit
    }
}

impl DomMut for TestDom {
    fn focus(&mut self, node: u32) {
        self.active = Some(node);
        self.effects.push(Effect::Focus(node));
    }

    fn blur(&mut self, node: u32) {
        if self.active == Some(node) {
            self.active = None;
        }
        self.effects.push(Effect::Blur(node));
    }

    fn set_selection_range(&mut self, node: u32, start: usize, end: usize) {
        self.active = Some(node);
        self.effects.push(Effect::Selection(node, start, end));
    }

    fn dispatch_activation(&mut self, event: SyntheticActivation<u32>) {
        self.effects.push(Effect::Dispatch(event));
    }
}

impl Surface for TestDom {
    type Listener = u32;

    fn add_listener(&mut self, kind: ListenerKind, phase: ListenerPhase) -> u32 {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, kind, phase));
        id
    }

    fn remove_listener(&mut self, listener: u32) {
        let before = self.listeners.len();
        self.listeners.retain(|&(id, _, _)| id != listener);
        assert_eq!(
            before,
            self.listeners.len() + 1,
            "listener {listener} removed twice or never added"
        );
    }
}
