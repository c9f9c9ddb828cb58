#![forbid(unsafe_code)]

//! The rendering host seen by the engine.
//!
//! Widgets own their markup. They hand the engine element handles (trigger,
//! content, focusable items) and a [`Host`] that performs the few side
//! effects the engine needs. A browser binding, a terminal backend, and the
//! recording test double all implement the same trait.
//!
//! # Re-entrancy
//!
//! Methods take `&self`; hosts use interior mutability the way DOM handles do.
//! The engine never holds internal borrows while calling [`Host::click`], so
//! click handlers may call back into a `Disclosure`. All other methods must
//! not call back into the engine.

use unveil_core::geometry::{Rect, Size};
use unveil_layout::Placement;

/// Opaque handle to a host element.
pub type ElementId = u64;

/// Tab index of the single keyboard-reachable item in a roving group.
pub const TAB_INDEX_ACTIVE: i32 = 0;

/// Tab index of every other item.
pub const TAB_INDEX_INACTIVE: i32 = -1;

/// Side effects the engine asks of its host.
pub trait Host {
    /// Assign `tabIndex` on an element.
    fn set_tab_index(&self, element: ElementId, tab_index: i32);

    /// Move input focus to an element.
    fn focus(&self, element: ElementId);

    /// Dispatch a synthetic activation (click) on an element.
    fn click(&self, element: ElementId);

    /// Show or hide the content and reflect the `open` attribute.
    fn set_open(&self, content: ElementId, open: bool);

    /// Laid-out bounds of an element, `None` if it is not rendered.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Current viewport size.
    fn viewport_size(&self) -> Size;

    /// Whether `node` is `ancestor` or lies inside its subtree.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    /// Apply a computed placement to floating content.
    fn place(&self, content: ElementId, placement: Placement);

    /// Lock or unlock document scrolling.
    fn set_scroll_locked(&self, locked: bool);
}
