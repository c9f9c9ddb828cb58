#![forbid(unsafe_code)]

//! Disclosure engine for Unveil widgets.
//!
//! Menus, selects, dialogs, tabs, and carousels all hold a [`Disclosure`]
//! configured with a [`DisclosureConfig`]. The host forwards global input to
//! [`dismissal::handle_event`] and calls [`frame::flush`] after each paint.

pub mod config;
pub mod disclosure;
pub mod dismissal;
pub mod frame;
pub mod host;
pub mod roving;
pub mod scroll_lock;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::{ConfigError, DisclosureConfig, InitialFocus, Mode};
pub use disclosure::{Disclosure, DisclosureEvent, DisclosureId, Status, Subscription};
pub use dismissal::{DismissReason, Dismissible, DismissalRegistry, EventDisposition};
pub use host::{ElementId, Host, TAB_INDEX_ACTIVE, TAB_INDEX_INACTIVE};
pub use roving::{FocusableItem, KeyOutcome, Orientation, RovingFocusGroup};
pub use scroll_lock::ScrollLockGuard;
