#![forbid(unsafe_code)]

//! Recording host for tests.
//!
//! [`RecordingHost`] keeps every side effect the engine requests so tests can
//! assert on tab indices, focus, clicks, visibility, placement, and the
//! document scroll lock without a real rendering backend.

use std::cell::{Cell, RefCell};

use ahash::AHashMap;
use unveil_core::geometry::{Rect, Size};
use unveil_layout::Placement;

use crate::host::{ElementId, Host};
use crate::roving::FocusableItem;

/// A [`Host`] that records what the engine asked it to do.
#[derive(Debug, Default)]
pub struct RecordingHost {
    tab_indices: RefCell<AHashMap<ElementId, i32>>,
    focused: Cell<Option<ElementId>>,
    focus_log: RefCell<Vec<ElementId>>,
    clicks: RefCell<Vec<ElementId>>,
    shown: RefCell<AHashMap<ElementId, bool>>,
    rects: RefCell<AHashMap<ElementId, Rect>>,
    parents: RefCell<AHashMap<ElementId, ElementId>>,
    placements: RefCell<AHashMap<ElementId, Placement>>,
    viewport: Cell<Size>,
    scroll_locked: Cell<bool>,
    scroll_lock_writes: Cell<usize>,
}

impl RecordingHost {
    /// A host with the given viewport size.
    pub fn new(width: u32, height: u32) -> Self {
        let host = Self::default();
        host.viewport.set(Size::new(width, height));
        host
    }

    /// Give an element laid-out bounds.
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.rects.borrow_mut().insert(element, rect);
    }

    /// Make `child` part of `parent`'s subtree.
    pub fn set_parent(&self, child: ElementId, parent: ElementId) {
        self.parents.borrow_mut().insert(child, parent);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.viewport.set(Size::new(width, height));
    }

    pub fn tab_index(&self, element: ElementId) -> Option<i32> {
        self.tab_indices.borrow().get(&element).copied()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused.get()
    }

    /// Every element that received focus, in order.
    pub fn focus_log(&self) -> Vec<ElementId> {
        self.focus_log.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<ElementId> {
        self.clicks.borrow().clone()
    }

    pub fn is_shown(&self, content: ElementId) -> bool {
        self.shown.borrow().get(&content).copied().unwrap_or(false)
    }

    pub fn placement(&self, content: ElementId) -> Option<Placement> {
        self.placements.borrow().get(&content).copied()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    /// Number of times the scroll lock was written.
    pub fn scroll_lock_writes(&self) -> usize {
        self.scroll_lock_writes.get()
    }
}

impl Host for RecordingHost {
    fn set_tab_index(&self, element: ElementId, tab_index: i32) {
        self.tab_indices.borrow_mut().insert(element, tab_index);
    }

    fn focus(&self, element: ElementId) {
        self.focused.set(Some(element));
        self.focus_log.borrow_mut().push(element);
    }

    fn click(&self, element: ElementId) {
        self.clicks.borrow_mut().push(element);
    }

    fn set_open(&self, content: ElementId, open: bool) {
        self.shown.borrow_mut().insert(content, open);
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.rects.borrow().get(&element).copied()
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let parents = self.parents.borrow();
        let mut current = Some(node);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = parents.get(&element).copied();
        }
        false
    }

    fn place(&self, content: ElementId, placement: Placement) {
        self.placements.borrow_mut().insert(content, placement);
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.set(locked);
        self.scroll_lock_writes.set(self.scroll_lock_writes.get() + 1);
    }
}

/// Build enabled items for `elements`.
pub fn items(elements: &[ElementId]) -> Vec<FocusableItem> {
    elements.iter().map(|&e| FocusableItem::new(e)).collect()
}

/// Build items from `(element, disabled)` pairs.
pub fn items_with_disabled(elements: &[(ElementId, bool)]) -> Vec<FocusableItem> {
    elements
        .iter()
        .map(|&(e, disabled)| FocusableItem::new(e).disabled(disabled))
        .collect()
}
