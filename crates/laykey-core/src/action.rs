// Laykey Action Vocabulary
// The tagged value a keymap table assigns to each (layer, position) slot

use std::fmt;

use strum_macros::{Display as StrumDisplay, EnumString};

use crate::{KeyCode, LayerId, Modifiers};

/// The action bound to a (layer, position) slot in the keymap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Defer to the next lower active layer.
    Transparent,
    /// Explicit "do nothing"; also the sentinel returned when transparency
    /// fallthrough exhausts the stack.
    NoOp,
    /// Emit a literal keycode.
    Key(KeyCode),
    /// Emit a keycode with modifiers pre-applied (shortcut binding).
    Shifted { mods: Modifiers, key: KeyCode },
    /// Activate a layer while the key is held.
    MomentaryLayer(LayerId),
    /// Dual function: keycode on tap, layer while held.
    LayerTap { layer: LayerId, tap: KeyCode },
    /// Dual function: keycode on tap, modifier set while held.
    ModTap { hold: Modifiers, tap: KeyCode },
    /// Vendor-defined action, forwarded uninterpreted.
    Special(SpecialToken),
}

impl Action {
    pub fn is_transparent(self) -> bool {
        matches!(self, Action::Transparent)
    }

    /// True for bindings that go through the tap/hold state machine.
    pub fn is_dual_function(self) -> bool {
        matches!(self, Action::LayerTap { .. } | Action::ModTap { .. })
    }

    /// The momentary/layer-tap target, if this action activates a layer.
    pub fn layer_target(self) -> Option<LayerId> {
        match self {
            Action::MomentaryLayer(layer) | Action::LayerTap { layer, .. } => Some(layer),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Transparent => write!(f, "transparent"),
            Action::NoOp => write!(f, "no-op"),
            Action::Key(key) => write!(f, "{}", key),
            Action::Shifted { mods, key } => write!(f, "{}+{}", mods, key),
            Action::MomentaryLayer(layer) => write!(f, "MO({})", layer),
            Action::LayerTap { layer, tap } => write!(f, "LT({}, {})", layer, tap),
            Action::ModTap { hold, tap } => write!(f, "MT({}, {})", hold, tap),
            Action::Special(token) => write!(f, "SPECIAL({})", token),
        }
    }
}

/// Opaque vendor token carried by `Action::Special`.
///
/// The engine forwards these on press via `Effect::Forward` without
/// interpreting them; bootloader entry, EEPROM handling and lighting are
/// the vendor collaborator's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum SpecialToken {
    Bootloader,
    EepromClear,
    RgbToggle,
    TappingTermUp,
    TappingTermDown,
    TappingTermPrint,
    MouseButton1,
    UserMacro,
}
