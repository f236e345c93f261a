// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target resolution: logical targets for raw event targets, label controls,
//! and the per-element scroll-ancestor side-table.

use hashbrown::HashMap;

use crate::types::{Dom, InputType};

/// Scroll ancestor recorded for an element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollAssociation<K> {
    /// Nearest ancestor (or the element itself) whose content overflows.
    pub scroll_parent: K,
    /// Its scroll offset when the last gesture started.
    pub last_scroll_top: f64,
}

#[derive(Copy, Clone, Debug)]
struct Cached<K> {
    assoc: ScrollAssociation<K>,
    last_used: u64,
}

/// Maps raw targets to logical ones and caches scroll ancestors.
///
/// The cache is keyed by node identity and owned here rather than stored on
/// the host's nodes. It holds at most [`TargetResolver::CACHE_LIMIT`]
/// entries; the least recently used one is evicted first, so it stays small
/// no matter how many distinct nodes are tapped. Hosts that recycle node keys
/// can also call [`TargetResolver::forget`] when a node goes away.
#[derive(Clone, Debug)]
pub struct TargetResolver<K> {
    scroll: HashMap<K, Cached<K>>,
    clock: u64,
}

impl<K> Default for TargetResolver<K> {
    fn default() -> Self {
        Self {
            scroll: HashMap::new(),
            clock: 0,
        }
    }
}

impl<K: Copy + Eq + core::hash::Hash> TargetResolver<K> {
    /// Most scroll associations kept at once.
    pub const CACHE_LIMIT: usize = 32;

    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text nodes resolve to their parent; everything else to itself.
    pub fn resolve_target<D: Dom<Node = K>>(&self, dom: &D, node: K) -> K {
        if dom.is_text(node) {
            dom.parent(node).unwrap_or(node)
        } else {
            node
        }
    }

    /// Find (or reuse) the scroll ancestor of `element` and record its current
    /// scroll offset.
    ///
    /// The cached ancestor is reused as long as it still contains `element`.
    /// Returns the ancestor, or `None` when no ancestor overflows.
    pub fn update_scroll_ancestor<D: Dom<Node = K>>(&mut self, dom: &D, element: K) -> Option<K> {
        let cached = self
            .scroll
            .get(&element)
            .map(|c| c.assoc.scroll_parent)
            .filter(|&parent| dom.contains(parent, element));

        let parent = match cached {
            Some(parent) => parent,
            None => {
                let mut current = Some(element);
                let found = loop {
                    let Some(node) = current else { break None };
                    if dom.scroll_metrics(node).overflows() {
                        break Some(node);
                    }
                    current = dom.parent(node);
                };
                let Some(parent) = found else {
                    self.scroll.remove(&element);
                    return None;
                };
                parent
            }
        };

        let last_scroll_top = dom.scroll_metrics(parent).scroll_top;
        self.store(element, ScrollAssociation {
            scroll_parent: parent,
            last_scroll_top,
        });
        Some(parent)
    }

    /// Whether the scroll ancestor of `element` moved since the gesture started.
    pub fn scroll_changed<D: Dom<Node = K>>(&self, dom: &D, element: K) -> bool {
        self.scroll.get(&element).is_some_and(|c| {
            dom.scroll_metrics(c.assoc.scroll_parent).scroll_top != c.assoc.last_scroll_top
        })
    }

    /// Carry the scroll association of `from` over to `to`.
    ///
    /// Used when the touch-end target is re-resolved from the contact position.
    pub fn inherit_scroll_ancestor(&mut self, from: K, to: K) {
        if from == to {
            return;
        }
        match self.scroll.get(&from).map(|c| c.assoc) {
            Some(assoc) => self.store(to, assoc),
            None => {
                self.scroll.remove(&to);
            }
        }
    }

    /// Recorded association for `element`.
    pub fn scroll_association(&self, element: K) -> Option<&ScrollAssociation<K>> {
        self.scroll.get(&element).map(|c| &c.assoc)
    }

    /// Number of cached scroll associations.
    pub fn cached_len(&self) -> usize {
        self.scroll.len()
    }

    /// The form control a label activates.
    ///
    /// Tries the host's native association, then the `for` id, then the first
    /// labelable descendant in document order.
    pub fn find_control<D: Dom<Node = K>>(&self, dom: &D, label: K) -> Option<K> {
        if let Some(control) = dom.label_control(label) {
            return Some(control);
        }
        if let Some(id) = dom.element(label).and_then(|info| info.html_for) {
            return dom.element_by_id(id);
        }
        first_labelable_descendant(dom, label)
    }

    /// Drop cached state for `node`.
    pub fn forget(&mut self, node: K) {
        self.scroll.remove(&node);
    }

    /// Drop all cached state.
    pub fn clear(&mut self) {
        self.scroll.clear();
    }

    fn store(&mut self, element: K, assoc: ScrollAssociation<K>) {
        self.clock += 1;
        if !self.scroll.contains_key(&element) && self.scroll.len() >= Self::CACHE_LIMIT {
            let oldest = self
                .scroll
                .iter()
                .min_by_key(|(_, c)| c.last_used)
                .map(|(&key, _)| key);
            if let Some(key) = oldest {
                self.scroll.remove(&key);
            }
        }
        self.scroll.insert(element, Cached {
            assoc,
            last_used: self.clock,
        });
    }
}

/// Depth-first, document-order search below `root`.
fn first_labelable_descendant<D: Dom>(dom: &D, root: D::Node) -> Option<D::Node> {
    let mut next = dom.first_child(root);
    while let Some(node) = next {
        if let Some(info) = dom.element(node) {
            let labelable = info.tag.is_labelable() && !info.is_input(InputType::Hidden);
            if labelable {
                return Some(node);
            }
        }
        next = next_in_subtree(dom, root, node);
    }
    None
}

fn next_in_subtree<D: Dom>(dom: &D, root: D::Node, node: D::Node) -> Option<D::Node> {
    if let Some(child) = dom.first_child(node) {
        return Some(child);
    }
    let mut current = node;
    while current != root {
        if let Some(sibling) = dom.next_sibling(current) {
            return Some(sibling);
        }
        current = dom.parent(current)?;
    }
    None
}
