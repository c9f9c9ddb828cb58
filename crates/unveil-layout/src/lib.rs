#![forbid(unsafe_code)]

//! Placement of floating surfaces relative to an anchor and the viewport.

pub mod placement;

pub use placement::{Placement, Side, Viewport, compute_placement};
