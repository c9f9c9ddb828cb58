#![forbid(unsafe_code)]

//! Disclosure controller: the open/close state machine every widget holds.
//!
//! A [`Disclosure`] ties together the viewport positioner, the roving focus
//! group, the dismissal coordinator, and the scroll-lock registry. Menus,
//! selects, dialogs, tabs, and carousels each hold one and configure it with
//! a [`DisclosureConfig`]; nothing extends it.
//!
//! # Lifecycle
//!
//! `open()` shows the content right away, takes the top slot of the dismissal
//! stack, and queues a settle step on the post-paint queue ([`crate::frame`]).
//! Once the host flushes that queue the settle step runs, always in this
//! order:
//!
//! 1. placement (floating mode), from the laid-out content size;
//! 2. roving focus initialization over the current items;
//! 3. the [`DisclosureEvent::Open`] event;
//! 4. the scroll lock (modal mode).
//!
//! Holding the stack slot from `open()` keeps a freshly opened instance
//! topmost for Escape and outside presses before its first paint. Item
//! navigation and activation wait for the settle step.
//!
//! `close()` hides the content, unregisters, releases the scroll lock,
//! restores focus to the trigger, and emits [`DisclosureEvent::Close`].
//!
//! # Invariants
//!
//! - Status is exactly one of [`Status::Closed`] and [`Status::Open`].
//! - `Close` is emitted once per open/close pair; redundant calls are no-ops.
//! - A settle step queued by an earlier open cycle never runs against a later
//!   one (generation check).
//! - An open instance holds a dismissal stack slot from `open()` until
//!   close or drop.
//! - A settled modal instance holds one scroll-lock reference, released on
//!   close or drop.
//!
//! # Failure Modes
//!
//! - No trigger: opens and closes normally, focus is not restored.
//! - Content or trigger not laid out: placement is skipped for that pass.
//! - Dropping an open instance unregisters it and releases its lock without
//!   emitting events.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use unveil_core::event::{Event, KeyCode, KeyEvent};
use unveil_core::geometry::{Point, Rect};
use unveil_layout::{Placement, Side, Viewport, compute_placement};

use crate::config::{DisclosureConfig, InitialFocus, Mode};
use crate::dismissal::{self, DismissReason, Dismissible, EventDisposition};
use crate::frame;
use crate::host::{ElementId, Host};
use crate::roving::{FocusableItem, KeyOutcome, RovingFocusGroup};
use crate::scroll_lock::ScrollLockGuard;

static DISCLOSURE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a disclosure instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisclosureId(u64);

impl DisclosureId {
    pub(crate) fn next() -> Self {
        Self(DISCLOSURE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Logical state of a disclosure instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Content hidden. Initial state.
    #[default]
    Closed,
    /// Content shown, whether or not the settle step has run yet.
    Open,
}

/// Notifications delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureEvent {
    /// The instance finished opening (after placement and focus).
    Open,
    /// The instance closed, for any reason.
    Close,
    /// An item was activated; emitted before an activation-triggered close.
    Activated(ElementId),
}

type Listener = dyn Fn(DisclosureEvent);

/// Keeps a listener attached. Dropping it detaches the listener.
#[must_use = "dropping the subscription detaches the listener"]
pub struct Subscription {
    _listener: Rc<Listener>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct State {
    status: Status,
    config: DisclosureConfig,
    trigger: Option<ElementId>,
    content: ElementId,
    items: Vec<FocusableItem>,
    focus: RovingFocusGroup,
    cursor: Option<Point>,
    placement: Option<Placement>,
    generation: u64,
    settled: bool,
    scroll_lock: Option<ScrollLockGuard>,
}

struct Shared {
    id: DisclosureId,
    host: Rc<dyn Host>,
    me: Weak<Shared>,
    state: RefCell<State>,
    listeners: RefCell<Vec<Weak<Listener>>>,
}

/// A disclosure instance owned by one widget.
pub struct Disclosure {
    inner: Rc<Shared>,
}

impl Disclosure {
    /// Create a closed instance over `content`.
    pub fn new(host: Rc<dyn Host>, content: ElementId, config: DisclosureConfig) -> Self {
        let id = DisclosureId::next();
        tracing::trace!(id = id.id(), mode = ?config.mode, "disclosure created");
        let inner = Rc::new_cyclic(|me| Shared {
            id,
            host,
            me: me.clone(),
            state: RefCell::new(State {
                status: Status::Closed,
                config,
                trigger: None,
                content,
                items: Vec::new(),
                focus: RovingFocusGroup::new(),
                cursor: None,
                placement: None,
                generation: 0,
                settled: false,
                scroll_lock: None,
            }),
            listeners: RefCell::new(Vec::new()),
        });
        Self { inner }
    }

    /// Set the element that opens this instance and regains focus on close.
    #[must_use]
    pub fn with_trigger(self, trigger: ElementId) -> Self {
        self.inner.state.borrow_mut().trigger = Some(trigger);
        self
    }

    /// Set the initial focusable items.
    #[must_use]
    pub fn with_items(self, items: Vec<FocusableItem>) -> Self {
        self.inner.state.borrow_mut().items = items;
        self
    }

    // --- Queries ---

    /// Unique id of this instance.
    #[inline]
    pub fn id(&self) -> DisclosureId {
        self.inner.id
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.inner.state.borrow().status
    }

    /// Reflects the `open` attribute.
    pub fn is_open(&self) -> bool {
        self.status() == Status::Open
    }

    /// Whether the deferred settle step has run for the current open cycle.
    pub fn is_settled(&self) -> bool {
        self.inner.state.borrow().settled
    }

    /// Floating or modal, from the config.
    pub fn mode(&self) -> Mode {
        self.inner.state.borrow().config.mode
    }

    /// A copy of the configuration.
    pub fn config(&self) -> DisclosureConfig {
        self.inner.state.borrow().config.clone()
    }

    /// The trigger element, if one was supplied.
    pub fn trigger(&self) -> Option<ElementId> {
        self.inner.state.borrow().trigger
    }

    /// The content element shown and hidden by this instance.
    pub fn content(&self) -> ElementId {
        self.inner.state.borrow().content
    }

    /// Last placement applied in this open cycle.
    pub fn placement(&self) -> Option<Placement> {
        self.inner.state.borrow().placement
    }

    /// Index of the item holding tab index 0.
    pub fn active_index(&self) -> Option<usize> {
        self.inner.state.borrow().focus.active()
    }

    /// Element of the active item.
    pub fn active_element(&self) -> Option<ElementId> {
        self.inner.state.borrow().focus.active_element()
    }

    /// Version of the roving item collection.
    pub fn items_version(&self) -> u64 {
        self.inner.state.borrow().focus.version()
    }

    // --- State machine ---

    /// Open below or beside the trigger. No-op if already open.
    pub fn open(&self) -> bool {
        self.inner.open(None)
    }

    /// Open anchored at a pointer position (context menus).
    pub fn open_at(&self, point: Point) -> bool {
        self.inner.open(Some(point))
    }

    /// Close. No-op if already closed.
    pub fn close(&self) -> bool {
        self.inner.close(DismissReason::Explicit)
    }

    /// Close if open, else open.
    pub fn toggle(&self) -> bool {
        if self.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    /// Setting or removing the `open` attribute.
    pub fn set_open(&self, open: bool) -> bool {
        if open { self.open() } else { self.close() }
    }

    // --- Content ---

    /// Replace the focusable items after the content changed.
    ///
    /// While open, the roving group applies its rebuild policy right away;
    /// otherwise the items are used on the next open. Returns `true` if the
    /// group was rebuilt.
    pub fn set_items(&self, items: Vec<FocusableItem>) -> bool {
        let shared = &self.inner;
        let mut state = shared.state.borrow_mut();
        let state = &mut *state;
        state.items.clone_from(&items);
        if state.status == Status::Open && state.settled {
            state.focus.set_items(items, &*shared.host)
        } else {
            false
        }
    }

    /// Recompute placement now. Returns the applied placement.
    pub fn reposition(&self) -> Option<Placement> {
        self.inner.apply_placement()
    }

    // --- Input ---

    /// Apply the keyboard contract to a key routed to this instance.
    ///
    /// Escape goes through the dismissal coordinator, so it closes the
    /// topmost instance, which need not be this one.
    pub fn handle_key(&self, key: &KeyEvent) -> EventDisposition {
        if key.code == KeyCode::Escape {
            return dismissal::handle_event(&Event::Key(*key), None);
        }

        let outcome = {
            let shared = &self.inner;
            let mut state = shared.state.borrow_mut();
            if state.status != Status::Open || !state.settled {
                return EventDisposition::Ignored;
            }
            let orientation = state.config.orientation;
            state.focus.handle_key(key, orientation, &*shared.host)
        };

        match outcome {
            KeyOutcome::Moved | KeyOutcome::Unchanged => EventDisposition::Consumed,
            KeyOutcome::Activate => {
                self.activate();
                if self.is_open() {
                    EventDisposition::Consumed
                } else {
                    EventDisposition::Dismissed
                }
            }
            KeyOutcome::Ignored => EventDisposition::Ignored,
        }
    }

    /// Move the active item by `delta`.
    pub fn move_by(&self, delta: isize) -> bool {
        self.inner.with_focus(|focus, host| focus.move_by(delta, host))
    }

    /// Make the item at `index` active (pointer hover).
    pub fn move_to(&self, index: usize) -> bool {
        self.inner.with_focus(|focus, host| focus.move_to(index, host))
    }

    /// Jump to the first enabled item.
    pub fn move_to_first(&self) -> bool {
        self.inner.with_focus(|focus, host| focus.move_to_first(host))
    }

    /// Jump to the last enabled item.
    pub fn move_to_last(&self) -> bool {
        self.inner.with_focus(|focus, host| focus.move_to_last(host))
    }

    /// Click the active item, emit [`DisclosureEvent::Activated`], and close
    /// if configured to. Returns the activated element.
    pub fn activate(&self) -> Option<ElementId> {
        self.inner.activate()
    }

    // --- Events ---

    /// Attach a listener for open, close, and activation events.
    pub fn subscribe(&self, listener: impl Fn(DisclosureEvent) + 'static) -> Subscription {
        let listener: Rc<Listener> = Rc::new(listener);
        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.retain(|l| l.strong_count() > 0);
        listeners.push(Rc::downgrade(&listener));
        Subscription {
            _listener: listener,
        }
    }
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Disclosure")
            .field("id", &self.inner.id)
            .field("status", &state.status)
            .field("mode", &state.config.mode)
            .field("trigger", &state.trigger)
            .field("content", &state.content)
            .finish_non_exhaustive()
    }
}

impl Drop for Disclosure {
    fn drop(&mut self) {
        let Ok(mut state) = self.inner.state.try_borrow_mut() else {
            return;
        };
        if state.status == Status::Open {
            tracing::debug!(id = self.inner.id.id(), "open disclosure dropped");
        }
        state.status = Status::Closed;
        state.generation += 1;
        let lock = state.scroll_lock.take();
        drop(state);
        dismissal::unregister(self.inner.id);
        drop(lock);
    }
}

impl Shared {
    fn open(&self, cursor: Option<Point>) -> bool {
        let (content, generation, mode) = {
            let mut state = self.state.borrow_mut();
            if state.status == Status::Open {
                return false;
            }
            state.status = Status::Open;
            state.generation += 1;
            state.settled = false;
            state.cursor = cursor;
            state.placement = None;
            (state.content, state.generation, state.config.mode)
        };

        let _span = tracing::debug_span!("disclosure.open", id = self.id.id(), ?mode).entered();
        self.host.set_open(content, true);

        let weak: Weak<dyn Dismissible> = self.me.clone();
        dismissal::register(self.id, weak);

        let me = self.me.clone();
        frame::request_after_paint(move || {
            if let Some(shared) = me.upgrade() {
                shared.settle(generation);
            }
        });
        tracing::debug!(generation, "disclosure opened");
        true
    }

    fn settle(&self, generation: u64) {
        let (mode, initial) = {
            let state = self.state.borrow();
            if state.status != Status::Open || state.generation != generation || state.settled {
                tracing::trace!(id = self.id.id(), generation, "stale settle discarded");
                return;
            }
            (state.config.mode, state.config.initial_focus)
        };
        let _span = tracing::debug_span!("disclosure.settle", id = self.id.id(), generation).entered();

        if mode == Mode::Floating {
            self.apply_placement();
        }

        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            state.settled = true;
            let items = state.items.clone();
            match initial {
                InitialFocus::FirstItem => {
                    state.focus.initialize(items, &*self.host);
                }
                InitialFocus::Element(element) => {
                    state.focus.reset(items, &*self.host);
                    self.host.focus(element);
                }
                InitialFocus::None => {
                    state.focus.reset(items, &*self.host);
                }
            }
        }

        self.emit(DisclosureEvent::Open);

        // A listener may have closed (or closed and reopened) the instance.
        if !self.is_current(generation) {
            return;
        }

        if mode == Mode::Modal {
            let guard = ScrollLockGuard::acquire(self.host.clone());
            self.state.borrow_mut().scroll_lock = Some(guard);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.borrow();
        state.status == Status::Open && state.generation == generation
    }

    fn close(&self, reason: DismissReason) -> bool {
        let (content, trigger, restore, lock) = {
            let mut state = self.state.borrow_mut();
            if state.status == Status::Closed {
                return false;
            }
            state.status = Status::Closed;
            state.generation += 1;
            state.settled = false;
            state.cursor = None;
            (
                state.content,
                state.trigger,
                state.config.restore_focus,
                state.scroll_lock.take(),
            )
        };

        let _span = tracing::debug_span!("disclosure.close", id = self.id.id(), ?reason).entered();
        self.host.set_open(content, false);
        dismissal::unregister(self.id);
        drop(lock);

        if restore {
            match trigger {
                Some(trigger) => self.host.focus(trigger),
                None => tracing::debug!("no trigger; focus not restored"),
            }
        }

        tracing::debug!("disclosure closed");
        self.emit(DisclosureEvent::Close);
        true
    }

    fn apply_placement(&self) -> Option<Placement> {
        let (content, anchor, side, margin) = {
            let state = self.state.borrow();
            if state.status != Status::Open || state.config.mode != Mode::Floating {
                return None;
            }
            let (anchor, side) = match state.cursor {
                Some(point) => (Some(Rect::at(point)), Side::Cursor),
                None => (
                    state.trigger.and_then(|t| self.host.bounding_rect(t)),
                    state.config.side,
                ),
            };
            (state.content, anchor, side, state.config.edge_margin)
        };

        let Some(anchor) = anchor else {
            tracing::debug!(id = self.id.id(), "no anchor; placement skipped");
            return None;
        };
        let Some(bounds) = self.host.bounding_rect(content) else {
            tracing::debug!(id = self.id.id(), "content not laid out; placement skipped");
            return None;
        };

        let view = self.host.viewport_size();
        let viewport = Viewport::new(view.width, view.height).margin(margin);
        let placement = compute_placement(anchor, bounds.size(), viewport, side);
        self.host.place(content, placement);
        self.state.borrow_mut().placement = Some(placement);
        tracing::trace!(
            id = self.id.id(),
            top = placement.top,
            left = placement.left,
            flipped_x = placement.flipped_x,
            flipped_y = placement.flipped_y,
            "disclosure placed"
        );
        Some(placement)
    }

    fn activate(&self) -> Option<ElementId> {
        let (target, close) = {
            let state = self.state.borrow();
            if state.status != Status::Open || !state.settled {
                return None;
            }
            (state.focus.activation_target()?, state.config.close_on_activate)
        };

        // Click handlers may call back into this instance.
        self.host.click(target);
        tracing::debug!(id = self.id.id(), element = target, "item activated");
        self.emit(DisclosureEvent::Activated(target));

        if close {
            self.close(DismissReason::Activation);
        }
        Some(target)
    }

    fn with_focus(&self, f: impl FnOnce(&mut RovingFocusGroup, &dyn Host) -> bool) -> bool {
        let mut state = self.state.borrow_mut();
        if state.status != Status::Open || !state.settled {
            return false;
        }
        f(&mut state.focus, &*self.host)
    }

    fn emit(&self, event: DisclosureEvent) {
        let listeners: Vec<Rc<Listener>> = self
            .listeners
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl Dismissible for Shared {
    fn mode(&self) -> Mode {
        self.state.borrow().config.mode
    }

    fn accepts(&self, reason: DismissReason) -> bool {
        let state = self.state.borrow();
        match reason {
            DismissReason::Escape => state.config.close_on_escape,
            DismissReason::OutsidePointer => {
                state.config.mode == Mode::Floating && state.config.close_on_outside_pointer
            }
            DismissReason::Activation => state.config.close_on_activate,
            DismissReason::Explicit => true,
        }
    }

    fn owns(&self, target: ElementId) -> bool {
        let (content, trigger) = {
            let state = self.state.borrow();
            (state.content, state.trigger)
        };
        self.host.contains(content, target) || trigger.is_some_and(|t| self.host.contains(t, target))
    }

    fn dismiss(&self, reason: DismissReason) {
        self.close(reason);
    }

    fn reposition(&self) {
        self.apply_placement();
    }
}
