#![forbid(unsafe_code)]

//! Shared dismissal coordination for open disclosures.
//!
//! Every open disclosure registers here instead of installing its own
//! document listeners. The host forwards global input to [`handle_event`],
//! which decides which instance, if any, is dismissed.
//!
//! # Invariants
//!
//! - Entries are ordered by registration; the last entry is topmost.
//! - Escape is offered to the topmost instance only. Whether or not it closes,
//!   instances below never see that keypress.
//! - A pointer press outside the topmost floating instance closes it and is
//!   then offered to the next instance down. The cascade stops at a modal
//!   instance or at the first instance that owns the press target.
//! - Unregistering removes an entry from any stack position.
//! - The registry holds [`Weak`] references; a dropped instance is pruned the
//!   next time the stack is walked.
//!
//! # Failure Modes
//!
//! - Registering an id twice is ignored.
//! - Unregistering an unknown id returns `false`.
//! - An instance that does not unregister itself when dismissed is removed by
//!   the coordinator, so routing always makes progress.
//!
//! No registry borrow is held while an instance is called back, so instances
//! may register, unregister, or open other disclosures from inside
//! [`Dismissible::dismiss`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use unveil_core::event::{Event, KeyCode, MouseEvent};

use crate::config::Mode;
use crate::disclosure::DisclosureId;
use crate::host::ElementId;

/// Why an instance is being dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Escape pressed while the instance was topmost.
    Escape,
    /// Pointer pressed outside trigger and content.
    OutsidePointer,
    /// An item was activated.
    Activation,
    /// `close()` called by the widget.
    Explicit,
}

/// What [`handle_event`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Delivered to an open instance, which kept it (a press inside content).
    Consumed,
    /// At least one instance closed.
    Dismissed,
    /// Nothing open cared about the event.
    Ignored,
}

/// An open surface the coordinator can close.
pub trait Dismissible {
    fn mode(&self) -> Mode;

    /// Whether this instance closes for `reason`.
    fn accepts(&self, reason: DismissReason) -> bool;

    /// Whether `target` is inside the trigger or content subtree.
    fn owns(&self, target: ElementId) -> bool;

    /// Close. Implementations are expected to [`unregister`] themselves.
    fn dismiss(&self, reason: DismissReason);

    /// Recompute placement after the viewport changed.
    fn reposition(&self);
}

struct Entry {
    id: DisclosureId,
    instance: Weak<dyn Dismissible>,
}

/// Ordered stack of open instances, topmost last.
#[derive(Default)]
pub struct DismissalRegistry {
    entries: Vec<Entry>,
}

impl DismissalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id` on top. Returns `false` if it was already registered.
    pub fn register(&mut self, id: DisclosureId, instance: Weak<dyn Dismissible>) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push(Entry { id, instance });
        true
    }

    /// Remove `id` from any position.
    pub fn unregister(&mut self, id: DisclosureId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        self.entries.remove(index);
        true
    }

    /// The topmost live instance. Dropped instances above it are pruned.
    pub fn topmost(&mut self) -> Option<(DisclosureId, Rc<dyn Dismissible>)> {
        while let Some(entry) = self.entries.last() {
            if let Some(instance) = entry.instance.upgrade() {
                return Some((entry.id, instance));
            }
            tracing::trace!(id = entry.id.id(), "pruned dropped disclosure");
            self.entries.pop();
        }
        None
    }

    pub fn topmost_id(&self) -> Option<DisclosureId> {
        self.entries.last().map(|e| e.id)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: DisclosureId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Registered ids, bottom to top.
    pub fn ids(&self) -> Vec<DisclosureId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    fn live(&self) -> Vec<Rc<dyn Dismissible>> {
        self.entries.iter().filter_map(|e| e.instance.upgrade()).collect()
    }
}

impl std::fmt::Debug for DismissalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissalRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

thread_local! {
    static REGISTRY: RefCell<DismissalRegistry> = RefCell::new(DismissalRegistry::new());
}

/// Register an open instance on this thread's stack.
pub fn register(id: DisclosureId, instance: Weak<dyn Dismissible>) -> bool {
    REGISTRY.with(|r| {
        let mut registry = r.borrow_mut();
        let added = registry.register(id, instance);
        if added {
            tracing::debug!(id = id.id(), depth = registry.depth(), "dismissal registered");
        }
        added
    })
}

/// Remove an instance. Safe to call during thread teardown.
pub fn unregister(id: DisclosureId) -> bool {
    REGISTRY
        .try_with(|r| {
            let mut registry = r.borrow_mut();
            let removed = registry.unregister(id);
            if removed {
                tracing::debug!(id = id.id(), depth = registry.depth(), "dismissal unregistered");
            }
            removed
        })
        .unwrap_or(false)
}

pub fn topmost() -> Option<DisclosureId> {
    REGISTRY.with(|r| r.borrow().topmost_id())
}

pub fn depth() -> usize {
    REGISTRY.with(|r| r.borrow().depth())
}

pub fn is_registered(id: DisclosureId) -> bool {
    REGISTRY.with(|r| r.borrow().contains(id))
}

fn live_topmost() -> Option<(DisclosureId, Rc<dyn Dismissible>)> {
    REGISTRY.with(|r| r.borrow_mut().topmost())
}

fn dismiss(id: DisclosureId, instance: &dyn Dismissible, reason: DismissReason) {
    tracing::debug!(id = id.id(), ?reason, "dismissing disclosure");
    instance.dismiss(reason);
    if unregister(id) {
        tracing::warn!(id = id.id(), "dismissed disclosure stayed registered; removed");
    }
}

/// Route a global input event.
///
/// `target` is the element under the pointer for mouse events (the DOM event
/// target); `None` means the press landed outside every known element.
pub fn handle_event(event: &Event, target: Option<ElementId>) -> EventDisposition {
    match event {
        Event::Key(key) if key.is_press() && key.code == KeyCode::Escape => handle_escape(),
        Event::Mouse(mouse) if mouse.is_down() => handle_pointer_down(mouse, target),
        Event::Resize { width, height } => {
            let live = REGISTRY.with(|r| r.borrow().live());
            tracing::trace!(width, height, count = live.len(), "repositioning disclosures");
            for instance in live {
                instance.reposition();
            }
            EventDisposition::Ignored
        }
        _ => EventDisposition::Ignored,
    }
}

fn handle_escape() -> EventDisposition {
    let Some((id, top)) = live_topmost() else {
        return EventDisposition::Ignored;
    };
    if !top.accepts(DismissReason::Escape) {
        tracing::trace!(id = id.id(), "topmost disclosure declined escape");
        return EventDisposition::Ignored;
    }
    dismiss(id, &*top, DismissReason::Escape);
    EventDisposition::Dismissed
}

fn handle_pointer_down(mouse: &MouseEvent, target: Option<ElementId>) -> EventDisposition {
    let mut dismissed = false;
    while let Some((id, top)) = live_topmost() {
        if target.is_some_and(|t| top.owns(t)) {
            return if dismissed {
                EventDisposition::Dismissed
            } else {
                EventDisposition::Consumed
            };
        }
        if top.mode() == Mode::Modal || !top.accepts(DismissReason::OutsidePointer) {
            break;
        }
        tracing::trace!(id = id.id(), x = mouse.x, y = mouse.y, "pointer down outside");
        dismiss(id, &*top, DismissReason::OutsidePointer);
        dismissed = true;
    }
    if dismissed {
        EventDisposition::Dismissed
    } else {
        EventDisposition::Ignored
    }
}
