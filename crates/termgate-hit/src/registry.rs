//! Per-frame hit-test registry.
//!
//! # Invariants
//!
//! 1. `hit_test_at` returns the entry registered last among those whose
//!    bounds contain the point (registration order is paint order).
//! 2. Ancestor chains are fixed at registration and list only registered
//!    ancestors, innermost first.
//! 3. `reset` drops every entry; dispatch state (hover target, pending
//!    click) survives so hover continuity holds across frames.
//!
//! Queries are a linear scan. Registries hold one frame's interactive
//! elements and are rebuilt every frame, so a spatial index would cost more
//! to build than it saves.

use std::collections::HashMap;

use smallvec::SmallVec;
use termgate_core::Rect;

use crate::config::DispatchConfig;
use crate::dispatch::DispatchState;
use crate::layout::{ElementId, Handlers, LayoutNode};

/// Ancestor ids, innermost first.
pub type AncestorChain = SmallVec<[ElementId; 8]>;

// ---------------------------------------------------------------------------
// Hit entry
// ---------------------------------------------------------------------------

/// A registered element.
#[derive(Debug, Clone)]
pub struct HitEntry {
    pub id: ElementId,
    /// Absolute bounds.
    pub bounds: Rect,
    /// Registered ancestors, innermost first.
    pub ancestors: AncestorChain,
    pub handlers: Handlers,
    /// Registration order within the frame (higher = on top).
    order: u32,
}

impl HitEntry {
    /// Registration order within the frame (higher = on top).
    #[inline]
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Check if point (x, y) is inside this entry's bounds.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.bounds.contains(x, y)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Hit-test registry and owner of the dispatch state.
///
/// Construct one per render loop (or per test). Each frame: [`reset`],
/// then [`register_from_layout`], then feed events to
/// [`handle_mouse_event`](Self::handle_mouse_event).
///
/// [`reset`]: Self::reset
/// [`register_from_layout`]: Self::register_from_layout
#[derive(Debug, Default)]
pub struct HitRegistry {
    /// Entries in registration order.
    entries: Vec<HitEntry>,
    /// Id -> position in `entries`. With duplicate ids the later entry wins.
    index: HashMap<ElementId, usize>,
    next_order: u32,
    pub(crate) config: DispatchConfig,
    pub(crate) dispatch: DispatchState,
}

impl HitRegistry {
    /// Empty registry with default dispatch configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Discard all entries before a new frame's registration pass.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.next_order = 0;
    }

    /// Drop entries and dispatch state; the registry is as new.
    pub fn teardown(&mut self) {
        self.reset();
        self.dispatch = DispatchState::default();
    }

    /// Depth-first walk registering every node with at least one handler.
    ///
    /// Children register after their parent, so they sit on top of it.
    pub fn register_from_layout(&mut self, root: &LayoutNode) {
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let before = self.entries.len();
        let mut ancestors: Vec<ElementId> = Vec::new();
        self.register_node(root, &mut ancestors);
        termgate_core::debug!(
            registered = self.entries.len() - before,
            total = self.entries.len(),
            "hit registry rebuilt"
        );
    }

    fn register_node(&mut self, node: &LayoutNode, ancestors: &mut Vec<ElementId>) {
        let registered = !node.handlers.is_empty();
        if registered {
            let chain: AncestorChain = ancestors.iter().rev().copied().collect();
            self.push_entry(node.id, node.bounds, node.handlers.clone(), chain);
            ancestors.push(node.id);
        }
        for child in &node.children {
            self.register_node(child, ancestors);
        }
        if registered {
            ancestors.pop();
        }
    }

    /// Register a single element on top of everything registered so far.
    ///
    /// `ancestors` lists enclosing element ids, innermost first. Elements
    /// without handlers are not registered; returns whether it was.
    pub fn register(
        &mut self,
        id: ElementId,
        bounds: Rect,
        handlers: Handlers,
        ancestors: impl IntoIterator<Item = ElementId>,
    ) -> bool {
        if handlers.is_empty() {
            return false;
        }
        self.push_entry(id, bounds, handlers, ancestors.into_iter().collect());
        true
    }

    fn push_entry(
        &mut self,
        id: ElementId,
        bounds: Rect,
        handlers: Handlers,
        ancestors: AncestorChain,
    ) {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        self.index.insert(id, self.entries.len());
        self.entries.push(HitEntry {
            id,
            bounds,
            ancestors,
            handlers,
            order,
        });
    }

    /// Replace an element's bounds. Returns `false` for unknown ids.
    pub fn update_bounds(&mut self, id: ElementId, bounds: Rect) -> bool {
        match self.index.get(&id) {
            Some(&pos) => {
                self.entries[pos].bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Unregister an element. Returns `false` for unknown ids.
    ///
    /// Descendants keep their entries; bubbling skips the missing ancestor.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(pos) = self.index.remove(&id) else {
            return false;
        };
        self.entries.remove(pos);
        self.rebuild_index();
        true
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (pos, entry) in self.entries.iter().enumerate() {
            self.index.insert(entry.id, pos);
        }
    }

    /// Whether any interactive element is registered.
    ///
    /// Render loops use this to toggle terminal mouse reporting.
    #[must_use]
    pub fn has_clickable_elements(&self) -> bool {
        !self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn entry(&self, id: ElementId) -> Option<&HitEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    /// All entries, bottom-most first.
    #[must_use]
    pub fn entries(&self) -> &[HitEntry] {
        &self.entries
    }

    /// Topmost entry containing `(x, y)`, or `None`.
    #[must_use]
    pub fn hit_test_at(&self, x: u16, y: u16) -> Option<&HitEntry> {
        self.hit_slot(x, y).map(|slot| &self.entries[slot])
    }

    /// Position in `entries` of the topmost entry containing `(x, y)`.
    pub(crate) fn hit_slot(&self, x: u16, y: u16) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.contains(x, y))
    }

    /// Position in `entries` of the entry `id` resolves to.
    pub(crate) fn slot_of(&self, id: ElementId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Element the pointer is currently over, as last seen by a move.
    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.dispatch.hovered
    }
}
