#![forbid(unsafe_code)]

//! Core types for Unveil: geometry and input events.

pub mod event;
pub mod geometry;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use geometry::{Point, Rect, Size};
