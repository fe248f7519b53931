// Laykey Modifier Set
// A set of keyboard modifiers, laid out in HID modifier-byte bit order

use std::fmt;

use crate::KeyCode;

/// A set of modifier keys.
///
/// Bit layout matches the HID report modifier byte: LeftCtrl is bit 0
/// through RightGui at bit 7. A `Shifted` binding carries one of these so
/// the engine can emit the modifier key-downs before the wrapped keycode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const LEFT_CTRL: Modifiers = Modifiers(1 << 0);
    pub const LEFT_SHIFT: Modifiers = Modifiers(1 << 1);
    pub const LEFT_ALT: Modifiers = Modifiers(1 << 2);
    pub const LEFT_GUI: Modifiers = Modifiers(1 << 3);
    pub const RIGHT_CTRL: Modifiers = Modifiers(1 << 4);
    pub const RIGHT_SHIFT: Modifiers = Modifiers(1 << 5);
    pub const RIGHT_ALT: Modifiers = Modifiers(1 << 6);
    pub const RIGHT_GUI: Modifiers = Modifiers(1 << 7);

    pub fn empty() -> Self {
        Modifiers(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Parse a single modifier alias, e.g. "Shift", "LCtrl", "Cmd", "RC".
    ///
    /// Unsided aliases resolve to the left-hand key, which is what ends up
    /// in the HID report for pre-applied shortcut modifiers.
    pub fn from_alias(alias: &str) -> Option<Modifiers> {
        let m = match alias.trim() {
            "Ctrl" | "C" | "LCtrl" | "LC" => Modifiers::LEFT_CTRL,
            "RCtrl" | "RC" => Modifiers::RIGHT_CTRL,
            "Shift" | "LShift" => Modifiers::LEFT_SHIFT,
            "RShift" => Modifiers::RIGHT_SHIFT,
            "Alt" | "A" | "Opt" | "Option" | "LAlt" | "LA" | "LOpt" => Modifiers::LEFT_ALT,
            "RAlt" | "RA" | "ROpt" => Modifiers::RIGHT_ALT,
            "Cmd" | "Win" | "Super" | "Meta" | "Gui" | "LCmd" | "LWin" | "LMeta" => {
                Modifiers::LEFT_GUI
            }
            "RCmd" | "RWin" | "RMeta" => Modifiers::RIGHT_GUI,
            _ => return None,
        };
        Some(m)
    }

    /// The keycodes backing this set, in bit order (LeftCtrl first).
    ///
    /// Key-down effects are emitted in this order; key-ups in the reverse,
    /// so modifier nesting around a wrapped key is preserved.
    pub fn keycodes(self) -> impl Iterator<Item = KeyCode> {
        (0..8u16)
            .filter(move |bit| self.0 & (1 << bit) != 0)
            .map(|bit| KeyCode::new(0xE0 + bit))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.keycodes() {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", key)?;
            first = false;
        }
        if first {
            write!(f, "(none)")?;
        }
        Ok(())
    }
}
