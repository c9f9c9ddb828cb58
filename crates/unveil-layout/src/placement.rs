#![forbid(unsafe_code)]

//! Viewport positioner for floating surfaces.
//!
//! [`compute_placement`] maps an anchor rectangle, the rendered content size,
//! and the viewport bounds to a top-left coordinate for the content.
//!
//! # Invariants
//!
//! - The function is pure: no host access, no caching. Callers re-run it on
//!   every open and on every viewport resize, since content size can change.
//! - If the content fits inside the viewport, the returned rectangle is fully
//!   inside the viewport: `top >= 0`, `left >= 0`,
//!   `top + height <= viewport.height`, `left + width <= viewport.width`.
//! - If the content is larger than the viewport on an axis, that axis is
//!   pinned to `0` (the leading edge stays visible).
//!
//! # Flip rules
//!
//! | Side | Default | Vertical overflow | Horizontal overflow |
//! |------|---------|-------------------|---------------------|
//! | `Below` | under the anchor, left-aligned | above the anchor | left edge at `width - content - margin` |
//! | `Above` | over the anchor, left-aligned | under the anchor (overflowing the top) | as `Below` |
//! | `Cursor` | at the anchor origin | `y - content height` | `x - content width` |

use unveil_core::geometry::{Rect, Size};

/// Viewport bounds used for overflow checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Gap kept between a horizontally clamped surface and the right edge.
    pub margin: u32,
}

impl Viewport {
    /// Create a viewport without an edge margin.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            margin: 0,
        }
    }

    /// Set the edge margin.
    #[must_use]
    pub const fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Preferred side of the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    /// Dropdown style: below the anchor, left edges aligned.
    #[default]
    Below,
    /// Above the anchor, left edges aligned.
    Above,
    /// Context-menu style: at the anchor origin (the pointer position).
    Cursor,
}

/// Result of [`compute_placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub top: i32,
    pub left: i32,
    /// The surface was moved to the other side horizontally.
    pub flipped_x: bool,
    /// The surface was moved to the other side vertically.
    pub flipped_y: bool,
}

impl Placement {
    /// The rectangle occupied by content of `size` at this placement.
    #[inline]
    pub const fn rect(self, size: Size) -> Rect {
        Rect::new(self.left, self.top, size.width, size.height)
    }
}

/// Compute where to put `content` next to `anchor` inside `viewport`.
///
/// For [`Side::Cursor`] the anchor's origin is the pointer position and its
/// size is ignored.
pub fn compute_placement(anchor: Rect, content: Size, viewport: Viewport, side: Side) -> Placement {
    let width = i64::from(content.width);
    let height = i64::from(content.height);
    let view_w = i64::from(viewport.width);
    let view_h = i64::from(viewport.height);
    let anchor_x = i64::from(anchor.x);
    let anchor_y = i64::from(anchor.y);
    let anchor_bottom = i64::from(anchor.bottom());

    let (top, flipped_y) = match side {
        Side::Below => {
            if anchor_bottom + height > view_h {
                (anchor_y - height, true)
            } else {
                (anchor_bottom, false)
            }
        }
        Side::Above => {
            let above = anchor_y - height;
            if above < 0 {
                (anchor_bottom, true)
            } else {
                (above, false)
            }
        }
        Side::Cursor => {
            if anchor_y + height > view_h {
                (anchor_y - height, true)
            } else {
                (anchor_y, false)
            }
        }
    };

    let (left, flipped_x) = if anchor_x + width > view_w {
        match side {
            Side::Cursor => (anchor_x - width, true),
            Side::Below | Side::Above => (view_w - width - i64::from(viewport.margin), true),
        }
    } else {
        (anchor_x, false)
    };

    Placement {
        top: clamp_axis(top, height, view_h),
        left: clamp_axis(left, width, view_w),
        flipped_x,
        flipped_y,
    }
}

/// Clamp a leading edge into `[0, view - extent]`, pinning to `0` when the
/// extent does not fit.
fn clamp_axis(start: i64, extent: i64, view: i64) -> i32 {
    let max = (view - extent).max(0);
    start.clamp(0, max) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::geometry::Point;

    const VIEW: Viewport = Viewport::new(1024, 768);

    #[test]
    fn dropdown_below_anchor() {
        let anchor = Rect::new(100, 50, 80, 24);
        let p = compute_placement(anchor, Size::new(200, 300), VIEW, Side::Below);
        assert_eq!(p.top, 74);
        assert_eq!(p.left, 100);
        assert!(!p.flipped_x);
        assert!(!p.flipped_y);
    }

    #[test]
    fn dropdown_flips_above_when_bottom_overflows() {
        let anchor = Rect::new(100, 600, 80, 24);
        let p = compute_placement(anchor, Size::new(200, 300), VIEW, Side::Below);
        assert!(p.flipped_y);
        assert_eq!(p.top, 300);
    }

    #[test]
    fn dropdown_clamps_left_edge_with_margin() {
        let anchor = Rect::new(900, 50, 80, 24);
        let p = compute_placement(anchor, Size::new(200, 100), VIEW.margin(8), Side::Below);
        assert!(p.flipped_x);
        assert_eq!(p.left, 1024 - 200 - 8);
    }

    #[test]
    fn above_flips_below_when_top_overflows() {
        let anchor = Rect::new(10, 20, 80, 24);
        let p = compute_placement(anchor, Size::new(100, 100), VIEW, Side::Above);
        assert!(p.flipped_y);
        assert_eq!(p.top, 44);
    }

    #[test]
    fn above_stays_above_when_room() {
        let anchor = Rect::new(10, 400, 80, 24);
        let p = compute_placement(anchor, Size::new(100, 100), VIEW, Side::Above);
        assert!(!p.flipped_y);
        assert_eq!(p.top, 300);
    }

    #[test]
    fn context_menu_at_cursor() {
        let anchor = Rect::at(Point::new(300, 200));
        let p = compute_placement(anchor, Size::new(150, 120), VIEW, Side::Cursor);
        assert_eq!((p.left, p.top), (300, 200));
        assert!(!p.flipped_x && !p.flipped_y);
    }

    #[test]
    fn bottom_right_corner_flips_both_axes() {
        let cursor = Rect::at(Point::new(1000, 700));
        let content = Size::new(200, 300);
        let p = compute_placement(cursor, content, VIEW, Side::Cursor);
        assert!(p.flipped_x);
        assert!(p.flipped_y);
        assert_eq!((p.left, p.top), (800, 400));

        let trigger = Rect::new(950, 730, 60, 30);
        let p = compute_placement(trigger, content, VIEW, Side::Below);
        assert!(p.flipped_x);
        assert!(p.flipped_y);
        let rect = p.rect(content);
        assert!(rect.x >= 0 && rect.y >= 0);
        assert!(rect.right() <= 1024 && rect.bottom() <= 768);
    }

    #[test]
    fn oversized_content_pins_to_origin() {
        let anchor = Rect::new(500, 500, 10, 10);
        let p = compute_placement(anchor, Size::new(2000, 1000), VIEW, Side::Below);
        assert_eq!((p.left, p.top), (0, 0));
    }

    #[test]
    fn flipped_above_near_top_is_clamped() {
        // Tall content under an anchor near the top: flipping above would go
        // negative, so the result is pinned inside the viewport.
        let anchor = Rect::new(0, 100, 50, 20);
        let p = compute_placement(anchor, Size::new(100, 700), VIEW, Side::Below);
        assert!(p.flipped_y);
        assert_eq!(p.top, 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn side_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Side::Cursor).unwrap(), "\"cursor\"");
        let side: Side = serde_json::from_str("\"above\"").unwrap();
        assert_eq!(side, Side::Above);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_side() -> impl Strategy<Value = Side> {
            prop_oneof![Just(Side::Below), Just(Side::Above), Just(Side::Cursor)]
        }

        proptest! {
            #[test]
            fn fitting_content_stays_in_viewport(
                ax in -200i32..1300,
                ay in -200i32..1000,
                aw in 0u32..300,
                ah in 0u32..100,
                cw in 0u32..=1024,
                ch in 0u32..=768,
                margin in 0u32..32,
                side in any_side(),
            ) {
                let anchor = Rect::new(ax, ay, aw, ah);
                let content = Size::new(cw, ch);
                let p = compute_placement(anchor, content, VIEW.margin(margin), side);
                prop_assert!(p.top >= 0);
                prop_assert!(p.left >= 0);
                prop_assert!(i64::from(p.top) + i64::from(ch) <= 768);
                prop_assert!(i64::from(p.left) + i64::from(cw) <= 1024);
            }

            #[test]
            fn placement_is_deterministic(
                ax in 0i32..1024,
                ay in 0i32..768,
                cw in 0u32..400,
                ch in 0u32..400,
                side in any_side(),
            ) {
                let anchor = Rect::new(ax, ay, 20, 20);
                let content = Size::new(cw, ch);
                prop_assert_eq!(
                    compute_placement(anchor, content, VIEW, side),
                    compute_placement(anchor, content, VIEW, side)
                );
            }
        }
    }
}
