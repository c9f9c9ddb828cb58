#![forbid(unsafe_code)]

//! Unveil: a disclosure and roving-focus engine for menus, selects, dialogs,
//! tabs, and carousels.
//!
//! This crate re-exports the workspace crates and provides a [`prelude`].
//!
//! ```ignore
//! use unveil::prelude::*;
//!
//! let menu = Disclosure::new(host, content, DisclosureConfig::menu())
//!     .with_trigger(trigger)
//!     .with_items(items);
//! menu.open();
//! // after the host paints:
//! frame::flush();
//! ```

pub use unveil_core;
pub use unveil_layout;
pub use unveil_widgets;

pub use unveil_core::event::{Event, KeyCode, KeyEvent, MouseEvent};
pub use unveil_core::geometry::{Point, Rect, Size};
pub use unveil_layout::{Placement, Side, Viewport, compute_placement};
pub use unveil_widgets::{
    Disclosure, DisclosureConfig, DisclosureEvent, EventDisposition, FocusableItem, Host, Mode,
    Orientation,
};

pub mod prelude {
    //! Common imports for widgets built on Unveil.

    pub use unveil_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
    pub use unveil_core::geometry::{Point, Rect, Size};
    pub use unveil_layout::{Placement, Side};
    pub use unveil_widgets::{
        Disclosure, DisclosureConfig, DisclosureEvent, ElementId, EventDisposition, FocusableItem,
        Host, InitialFocus, Mode, Orientation, RovingFocusGroup, Subscription, dismissal, frame,
        scroll_lock,
    };
}
