#![forbid(unsafe_code)]

//! Disclosure configuration and per-widget presets.
//!
//! Every consuming widget describes its behavior with a [`DisclosureConfig`]
//! rather than by overriding engine methods. The presets capture the
//! behaviors of the stock widgets; builder methods adjust individual fields.
//!
//! With the `policy-config` feature a config can be loaded from TOML:
//!
//! ```ignore
//! let config = DisclosureConfig::from_toml_str(r#"
//!     mode = "modal"
//!     close_on_outside_pointer = false
//!     initial_focus = { element = 42 }
//! "#)?;
//! ```

use unveil_layout::Side;

use crate::host::ElementId;
use crate::roving::Orientation;

/// Floating (menus, selects) or modal (dialogs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Positioned next to a trigger or the pointer; closes on outside press.
    #[default]
    Floating,
    /// Blocks the page and locks document scrolling.
    Modal,
}

/// Where focus goes once the content is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InitialFocus {
    /// First enabled focusable item.
    #[default]
    FirstItem,
    /// A specific element supplied by the widget.
    Element(ElementId),
    /// Leave focus alone; the widget manages it.
    None,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "policy-config")]
    #[error("failed to parse disclosure config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid disclosure config: {0}")]
    Invalid(&'static str),
}

/// Behavior of one disclosure instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisclosureConfig {
    pub mode: Mode,
    /// Preferred side for floating placement.
    pub side: Side,
    pub orientation: Orientation,
    pub close_on_escape: bool,
    /// Floating only; modal backdrop clicks are handled by the widget.
    pub close_on_outside_pointer: bool,
    /// Close after an item is activated (menus, selects).
    pub close_on_activate: bool,
    pub initial_focus: InitialFocus,
    /// Focus the trigger again on close.
    pub restore_focus: bool,
    /// Gap kept from the right viewport edge when clamping.
    pub edge_margin: u32,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self::menu()
    }
}

impl DisclosureConfig {
    /// Dropdown menu: below the trigger, closes on activation.
    pub fn menu() -> Self {
        Self {
            mode: Mode::Floating,
            side: Side::Below,
            orientation: Orientation::Vertical,
            close_on_escape: true,
            close_on_outside_pointer: true,
            close_on_activate: true,
            initial_focus: InitialFocus::FirstItem,
            restore_focus: true,
            edge_margin: 0,
        }
    }

    /// Context menu: opened at the pointer.
    pub fn context_menu() -> Self {
        Self::menu().side(Side::Cursor)
    }

    /// Select dropdown: a menu whose activation commits a value.
    pub fn select() -> Self {
        Self::menu()
    }

    /// Modal dialog.
    pub fn dialog() -> Self {
        Self {
            mode: Mode::Modal,
            close_on_outside_pointer: false,
            close_on_activate: false,
            ..Self::menu()
        }
    }

    /// Alert dialog: requires an explicit answer, so Escape does not close it.
    pub fn alert_dialog() -> Self {
        Self::dialog().close_on_escape(false)
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    #[must_use]
    pub fn close_on_outside_pointer(mut self, close: bool) -> Self {
        self.close_on_outside_pointer = close;
        self
    }

    #[must_use]
    pub fn close_on_activate(mut self, close: bool) -> Self {
        self.close_on_activate = close;
        self
    }

    #[must_use]
    pub fn initial_focus(mut self, focus: InitialFocus) -> Self {
        self.initial_focus = focus;
        self
    }

    #[must_use]
    pub fn restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }

    #[must_use]
    pub fn edge_margin(mut self, margin: u32) -> Self {
        self.edge_margin = margin;
        self
    }

    /// Reject combinations the engine does not honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Modal && self.close_on_outside_pointer {
            return Err(ConfigError::Invalid(
                "modal surfaces are not closed by outside pointer presses",
            ));
        }
        if self.mode == Mode::Modal && self.side == Side::Cursor {
            return Err(ConfigError::Invalid("modal surfaces are not positioned at the cursor"));
        }
        Ok(())
    }

    /// Parse and validate a TOML policy. Missing keys take the [`menu`](Self::menu)
    /// defaults.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
