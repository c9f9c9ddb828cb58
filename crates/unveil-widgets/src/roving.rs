#![forbid(unsafe_code)]

//! Roving tab index over an ordered set of focusable items.
//!
//! Only one item of a composite widget is reachable with Tab at a time. Arrow
//! keys move that designation; Home/End jump to the boundaries.
//!
//! # Invariants
//!
//! - At most one non-disabled item has tab index [`TAB_INDEX_ACTIVE`]; every
//!   other item, including every disabled item, has [`TAB_INDEX_INACTIVE`].
//! - If at least one item is enabled, exactly one item is active after
//!   [`RovingFocusGroup::initialize`].
//! - Navigation never wraps. Moving past the last enabled item (or before the
//!   first) leaves the active item unchanged.
//!
//! # Failure Modes
//!
//! - Empty or all-disabled groups: every navigation call returns `false` and
//!   performs no host calls beyond the initial tab index assignment.
//! - `move_to` with a disabled or out-of-range index returns `false`.
//! - `activate` re-checks the disabled flag of the active item, so a stale
//!   active index can never click a disabled element.

use unveil_core::event::{KeyCode, KeyEvent};

use crate::host::{ElementId, Host, TAB_INDEX_ACTIVE, TAB_INDEX_INACTIVE};

/// One focusable element of a roving group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusableItem {
    pub element: ElementId,
    /// Position in the group, assigned when the group is (re)built.
    pub index: usize,
    pub disabled: bool,
}

impl FocusableItem {
    /// An enabled item; the index is assigned by the group.
    pub const fn new(element: ElementId) -> Self {
        Self {
            element,
            index: 0,
            disabled: false,
        }
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Which arrow keys move focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Up/Down (menus, selects, listboxes).
    #[default]
    Vertical,
    /// Left/Right (tabs, carousels).
    Horizontal,
    /// Both axes.
    Both,
}

impl Orientation {
    fn delta(self, code: KeyCode) -> Option<isize> {
        let vertical = matches!(self, Self::Vertical | Self::Both);
        let horizontal = matches!(self, Self::Horizontal | Self::Both);
        match code {
            KeyCode::Down if vertical => Some(1),
            KeyCode::Up if vertical => Some(-1),
            KeyCode::Right if horizontal => Some(1),
            KeyCode::Left if horizontal => Some(-1),
            _ => None,
        }
    }
}

/// Result of routing a key through [`RovingFocusGroup::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A navigation key moved the active item.
    Moved,
    /// A navigation key had nothing to do (boundary, empty group).
    Unchanged,
    /// Enter/Space: the caller should activate the active item.
    Activate,
    /// Not a key this group handles.
    Ignored,
}

/// Ordered focusable items with a single active index.
#[derive(Debug, Clone, Default)]
pub struct RovingFocusGroup {
    items: Vec<FocusableItem>,
    active: Option<usize>,
    version: u64,
}

impl RovingFocusGroup {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    pub fn items(&self) -> &[FocusableItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the item holding tab index 0.
    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.active.map(|i| self.items[i].element)
    }

    /// Incremented every time the collection is rebuilt from scratch.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Tab index the group assigned to the item at `index`.
    pub fn tab_index(&self, index: usize) -> Option<i32> {
        if index >= self.items.len() {
            return None;
        }
        Some(if self.active == Some(index) {
            TAB_INDEX_ACTIVE
        } else {
            TAB_INDEX_INACTIVE
        })
    }

    // --- Building ---

    /// Replace the items, make the first enabled item active, and focus it.
    ///
    /// Returns the focused element. An empty collection clears the group and
    /// touches nothing in the host.
    pub fn initialize(&mut self, items: Vec<FocusableItem>, host: &dyn Host) -> Option<ElementId> {
        self.reset(items, host)?;
        let element = self.active_element()?;
        host.focus(element);
        Some(element)
    }

    /// Like [`initialize`](Self::initialize) without moving focus.
    ///
    /// Used when the caller focuses something else (a dialog's explicit
    /// initial-focus target).
    pub fn reset(&mut self, mut items: Vec<FocusableItem>, host: &dyn Host) -> Option<usize> {
        for (index, item) in items.iter_mut().enumerate() {
            item.index = index;
        }
        self.items = items;
        self.version += 1;
        self.active = self.items.iter().position(|item| !item.disabled);

        for item in &self.items {
            let tab_index = if Some(item.index) == self.active {
                TAB_INDEX_ACTIVE
            } else {
                TAB_INDEX_INACTIVE
            };
            host.set_tab_index(item.element, tab_index);
        }

        tracing::trace!(
            len = self.items.len(),
            active = ?self.active,
            version = self.version,
            "roving group rebuilt"
        );
        self.active
    }

    /// Update the collection after the content changed.
    ///
    /// A different item count rebuilds the group from scratch (and focuses
    /// the first enabled item); the previous active index is not carried
    /// over. With the same count the active index is kept unless that item
    /// became disabled. Returns `true` if the group was rebuilt.
    pub fn set_items(&mut self, mut items: Vec<FocusableItem>, host: &dyn Host) -> bool {
        if items.len() != self.items.len() {
            self.initialize(items, host);
            return true;
        }

        let keep = self.active.filter(|&i| !items[i].disabled);
        if keep.is_none() {
            self.initialize(items, host);
            return true;
        }

        for (index, item) in items.iter_mut().enumerate() {
            item.index = index;
            let tab_index = if Some(index) == keep {
                TAB_INDEX_ACTIVE
            } else {
                TAB_INDEX_INACTIVE
            };
            host.set_tab_index(item.element, tab_index);
        }
        self.items = items;
        false
    }

    // --- Navigation ---

    /// Move `delta` items, skipping disabled items in the same direction.
    ///
    /// The target is clamped to the group bounds; there is no wraparound.
    /// Returns `true` if the active item changed.
    pub fn move_by(&mut self, delta: isize, host: &dyn Host) -> bool {
        let Some(current) = self.active else {
            return false;
        };
        if delta == 0 {
            return false;
        }

        let last = self.items.len() - 1;
        let start = current.saturating_add_signed(delta).min(last);
        let target = if delta > 0 {
            (start..=last).find(|&i| !self.items[i].disabled)
        } else {
            (0..=start).rev().find(|&i| !self.items[i].disabled)
        };

        match target {
            Some(target) if target != current => {
                self.focus_index(target, host);
                true
            }
            _ => false,
        }
    }

    /// Jump to the first enabled item.
    pub fn move_to_first(&mut self, host: &dyn Host) -> bool {
        let target = self.items.iter().position(|item| !item.disabled);
        self.jump(target, host)
    }

    /// Jump to the last enabled item.
    pub fn move_to_last(&mut self, host: &dyn Host) -> bool {
        let target = self.items.iter().rposition(|item| !item.disabled);
        self.jump(target, host)
    }

    /// Make `index` active (pointer hover, click on a tab).
    pub fn move_to(&mut self, index: usize, host: &dyn Host) -> bool {
        let enabled = self.items.get(index).is_some_and(|item| !item.disabled);
        self.jump(enabled.then_some(index), host)
    }

    fn jump(&mut self, target: Option<usize>, host: &dyn Host) -> bool {
        match target {
            Some(target) if self.active != Some(target) => {
                self.focus_index(target, host);
                true
            }
            _ => false,
        }
    }

    fn focus_index(&mut self, target: usize, host: &dyn Host) {
        if let Some(previous) = self.active {
            host.set_tab_index(self.items[previous].element, TAB_INDEX_INACTIVE);
        }
        let element = self.items[target].element;
        host.set_tab_index(element, TAB_INDEX_ACTIVE);
        host.focus(element);
        self.active = Some(target);
    }

    // --- Activation ---

    /// The element a synthetic activation would click, if any.
    pub fn activation_target(&self) -> Option<ElementId> {
        let item = self.items.get(self.active?)?;
        (!item.disabled).then_some(item.element)
    }

    /// Click the active item. Disabled items are never clicked.
    pub fn activate(&self, host: &dyn Host) -> Option<ElementId> {
        let element = self.activation_target()?;
        host.click(element);
        Some(element)
    }

    // --- Keyboard ---

    /// Apply the keyboard contract: arrows per `orientation`, Home/End,
    /// Enter/Space. Releases are ignored.
    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        orientation: Orientation,
        host: &dyn Host,
    ) -> KeyOutcome {
        if !key.is_press() {
            return KeyOutcome::Ignored;
        }

        let moved = match key.code {
            KeyCode::Home => self.move_to_first(host),
            KeyCode::End => self.move_to_last(host),
            KeyCode::Enter | KeyCode::Char(' ') => return KeyOutcome::Activate,
            code => match orientation.delta(code) {
                Some(delta) => self.move_by(delta, host),
                None => return KeyOutcome::Ignored,
            },
        };

        if moved {
            KeyOutcome::Moved
        } else {
            KeyOutcome::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingHost, items, items_with_disabled};

    const A: ElementId = 1;
    const B: ElementId = 2;
    const C: ElementId = 3;
    const D: ElementId = 4;

    fn host() -> RecordingHost {
        RecordingHost::new(800, 600)
    }

    #[test]
    fn initialize_focuses_first_item() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        assert_eq!(group.initialize(items(&[A, B, C]), &host), Some(A));
        assert_eq!(host.tab_index(A), Some(0));
        assert_eq!(host.tab_index(B), Some(-1));
        assert_eq!(host.tab_index(C), Some(-1));
        assert_eq!(host.focused(), Some(A));
        assert_eq!(group.version(), 1);
    }

    #[test]
    fn initialize_skips_disabled_first_item() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        let focused = group.initialize(items_with_disabled(&[(A, true), (B, false)]), &host);
        assert_eq!(focused, Some(B));
        assert_eq!(host.tab_index(A), Some(-1));
        assert_eq!(host.tab_index(B), Some(0));
    }

    #[test]
    fn initialize_empty_is_noop() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        assert_eq!(group.initialize(Vec::new(), &host), None);
        assert!(group.is_empty());
        assert_eq!(host.focused(), None);
        assert!(!group.move_by(1, &host));
        assert!(!group.move_to_first(&host));
        assert!(!group.move_to_last(&host));
        assert_eq!(group.activate(&host), None);
    }

    #[test]
    fn skips_disabled_item_moving_forward() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items_with_disabled(&[(A, false), (B, true), (C, false)]), &host);
        assert_eq!(host.tab_index(A), Some(0));

        assert!(group.move_by(1, &host));
        assert_eq!(group.active_element(), Some(C));
        assert_eq!(host.tab_index(C), Some(0));
        assert_eq!(host.tab_index(A), Some(-1));
        assert_eq!(host.tab_index(B), Some(-1));
        assert_eq!(host.focused(), Some(C));
    }

    #[test]
    fn no_wraparound_at_end() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        assert!(group.move_by(1, &host));
        assert!(!group.move_by(1, &host));
        assert_eq!(group.active_element(), Some(B));
    }

    #[test]
    fn no_wraparound_at_start() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        assert!(!group.move_by(-1, &host));
        assert_eq!(group.active_element(), Some(A));
    }

    #[test]
    fn trailing_disabled_items_are_a_boundary() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items_with_disabled(&[(A, false), (B, false), (C, true)]), &host);
        group.move_by(1, &host);
        assert!(!group.move_by(1, &host));
        assert_eq!(group.active_element(), Some(B));
    }

    #[test]
    fn large_delta_clamps_to_bounds() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B, C, D]), &host);
        assert!(group.move_by(100, &host));
        assert_eq!(group.active_element(), Some(D));
        assert!(group.move_by(-100, &host));
        assert_eq!(group.active_element(), Some(A));
    }

    #[test]
    fn home_and_end_skip_disabled() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(
            items_with_disabled(&[(A, true), (B, false), (C, false), (D, true)]),
            &host,
        );
        assert_eq!(group.active_element(), Some(B));
        assert!(group.move_to_last(&host));
        assert_eq!(group.active_element(), Some(C));
        assert!(group.move_to_first(&host));
        assert_eq!(group.active_element(), Some(B));
        assert!(!group.move_to_first(&host));
    }

    #[test]
    fn all_disabled_navigation_is_noop() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        assert_eq!(
            group.initialize(items_with_disabled(&[(A, true), (B, true)]), &host),
            None
        );
        assert_eq!(host.tab_index(A), Some(-1));
        assert_eq!(host.tab_index(B), Some(-1));
        assert!(!group.move_by(1, &host));
        assert!(!group.move_to_last(&host));
        assert_eq!(host.focused(), None);
    }

    #[test]
    fn activate_clicks_active_item() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        group.move_by(1, &host);
        assert_eq!(group.activate(&host), Some(B));
        assert_eq!(host.clicks(), vec![B]);
    }

    #[test]
    fn activate_rejects_disabled_active_item() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        // Force a stale state: the active item is now flagged disabled.
        group.items[0].disabled = true;
        assert_eq!(group.activate(&host), None);
        assert!(host.clicks().is_empty());
    }

    #[test]
    fn move_to_ignores_disabled_and_out_of_range() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items_with_disabled(&[(A, false), (B, true), (C, false)]), &host);
        assert!(!group.move_to(1, &host));
        assert!(!group.move_to(9, &host));
        assert!(group.move_to(2, &host));
        assert_eq!(group.active_element(), Some(C));
    }

    #[test]
    fn set_items_with_new_count_rebuilds() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B, C]), &host);
        group.move_by(2, &host);
        assert_eq!(group.active(), Some(2));

        assert!(group.set_items(items(&[A, B]), &host));
        assert_eq!(group.active(), Some(0));
        assert_eq!(group.version(), 2);
        assert_eq!(host.focused(), Some(A));
    }

    #[test]
    fn set_items_with_same_count_keeps_active() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B, C]), &host);
        group.move_by(1, &host);

        assert!(!group.set_items(items_with_disabled(&[(A, true), (B, false), (C, false)]), &host));
        assert_eq!(group.active_element(), Some(B));
        assert_eq!(group.version(), 1);
        assert!(group.items()[0].disabled);
    }

    #[test]
    fn set_items_rebuilds_when_active_becomes_disabled() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B, C]), &host);
        group.move_by(1, &host);

        assert!(group.set_items(items_with_disabled(&[(A, false), (B, true), (C, false)]), &host));
        assert_eq!(group.active_element(), Some(A));
        assert_eq!(host.tab_index(B), Some(-1));
    }

    #[test]
    fn indices_are_assigned_in_order() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[C, A, B]), &host);
        let indices: Vec<usize> = group.items().iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn keyboard_contract_vertical() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B, C]), &host);
        let v = Orientation::Vertical;

        let down = KeyEvent::new(KeyCode::Down);
        assert_eq!(group.handle_key(&down, v, &host), KeyOutcome::Moved);
        assert_eq!(group.active_element(), Some(B));

        let end = KeyEvent::new(KeyCode::End);
        assert_eq!(group.handle_key(&end, v, &host), KeyOutcome::Moved);
        assert_eq!(group.handle_key(&down, v, &host), KeyOutcome::Unchanged);

        let home = KeyEvent::new(KeyCode::Home);
        assert_eq!(group.handle_key(&home, v, &host), KeyOutcome::Moved);
        assert_eq!(group.active_element(), Some(A));

        let right = KeyEvent::new(KeyCode::Right);
        assert_eq!(group.handle_key(&right, v, &host), KeyOutcome::Ignored);

        let enter = KeyEvent::new(KeyCode::Enter);
        assert_eq!(group.handle_key(&enter, v, &host), KeyOutcome::Activate);
        let space = KeyEvent::new(KeyCode::Char(' '));
        assert_eq!(group.handle_key(&space, v, &host), KeyOutcome::Activate);
    }

    #[test]
    fn keyboard_contract_horizontal() {
        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        let h = Orientation::Horizontal;

        let down = KeyEvent::new(KeyCode::Down);
        assert_eq!(group.handle_key(&down, h, &host), KeyOutcome::Ignored);
        let right = KeyEvent::new(KeyCode::Right);
        assert_eq!(group.handle_key(&right, h, &host), KeyOutcome::Moved);
        let left = KeyEvent::new(KeyCode::Left);
        assert_eq!(group.handle_key(&left, h, &host), KeyOutcome::Moved);
        assert_eq!(group.active_element(), Some(A));
    }

    #[test]
    fn key_release_is_ignored() {
        use unveil_core::event::KeyEventKind;

        let host = host();
        let mut group = RovingFocusGroup::new();
        group.initialize(items(&[A, B]), &host);
        let release = KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Release);
        assert_eq!(
            group.handle_key(&release, Orientation::Vertical, &host),
            KeyOutcome::Ignored
        );
        assert_eq!(group.active_element(), Some(A));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Op {
            MoveBy(isize),
            First,
            Last,
            To(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (-4isize..=4).prop_map(Op::MoveBy),
                Just(Op::First),
                Just(Op::Last),
                (0usize..12).prop_map(Op::To),
            ]
        }

        proptest! {
            #[test]
            fn exactly_one_enabled_item_is_tabbable(
                disabled in prop::collection::vec(any::<bool>(), 1..10),
                ops in prop::collection::vec(op(), 0..40),
            ) {
                prop_assume!(disabled.iter().any(|d| !d));

                let host = RecordingHost::new(800, 600);
                let pairs: Vec<(ElementId, bool)> = disabled
                    .iter()
                    .enumerate()
                    .map(|(i, &d)| (i as ElementId + 100, d))
                    .collect();
                let mut group = RovingFocusGroup::new();
                group.initialize(items_with_disabled(&pairs), &host);

                for op in ops {
                    match op {
                        Op::MoveBy(delta) => { group.move_by(delta, &host); }
                        Op::First => { group.move_to_first(&host); }
                        Op::Last => { group.move_to_last(&host); }
                        Op::To(index) => { group.move_to(index, &host); }
                    }

                    let active: Vec<ElementId> = pairs
                        .iter()
                        .filter(|(e, _)| host.tab_index(*e) == Some(TAB_INDEX_ACTIVE))
                        .map(|(e, _)| *e)
                        .collect();
                    prop_assert_eq!(active.len(), 1);
                    let active_disabled = pairs
                        .iter()
                        .any(|(e, d)| *e == active[0] && *d);
                    prop_assert!(!active_disabled);
                    for (element, _) in &pairs {
                        if *element != active[0] {
                            prop_assert_eq!(host.tab_index(*element), Some(TAB_INDEX_INACTIVE));
                        }
                    }
                    prop_assert_eq!(host.focused(), Some(active[0]));
                }
            }
        }
    }
}
