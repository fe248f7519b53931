// Laykey KeyCode Type
// Represents a single logical key as a USB HID usage code (Keyboard/Keypad page)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A logical keycode, identified by its HID usage ID.
///
/// The engine never interprets keycodes beyond equality; they are resolved
/// from the keymap table and handed to the HID-reporting collaborator inside
/// `Effect::KeyDown` / `Effect::KeyUp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(u16);

impl KeyCode {
    /// The "no key" usage ID.
    pub const NONE: KeyCode = KeyCode(0);

    pub fn new(usage: u16) -> Self {
        KeyCode(usage)
    }

    /// Raw HID usage ID.
    pub fn usage(self) -> u16 {
        self.0
    }

    /// Display name for this keycode (e.g. "A", "SPACE", "LEFT_SHIFT").
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }

    /// True for the HID modifier range (LeftCtrl..RightGui).
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&self.0)
    }
}

impl From<u16> for KeyCode {
    fn from(usage: u16) -> Self {
        KeyCode(usage)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KeyCode {
    type Err = UnknownKeyName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| UnknownKeyName(s.to_string()))
    }
}

/// Error returned when a key name cannot be resolved to a usage ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: '{0}'")]
pub struct UnknownKeyName(pub String);

/// Display name for a HID usage ID.
pub fn key_name(usage: u16) -> &'static str {
    names()
        .get(usage as usize)
        .copied()
        .unwrap_or("UNKNOWN")
}

/// Look up a keycode by its display name (case-insensitive).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    static BY_NAME: OnceLock<HashMap<String, u16>> = OnceLock::new();
    let map = BY_NAME.get_or_init(|| {
        let mut map = HashMap::new();
        for (usage, name) in names().iter().enumerate() {
            if *name != "UNKNOWN" {
                map.insert(name.to_string(), usage as u16);
            }
        }
        map
    });
    map.get(&name.trim().to_uppercase().replace('-', "_"))
        .map(|&usage| KeyCode(usage))
}

fn names() -> &'static Vec<&'static str> {
    static KEY_NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    KEY_NAMES.get_or_init(|| {
        let mut names = vec!["UNKNOWN"; 0x100];
        names[0x00] = "NONE";
        names[0x04] = "A";
        names[0x05] = "B";
        names[0x06] = "C";
        names[0x07] = "D";
        names[0x08] = "E";
        names[0x09] = "F";
        names[0x0A] = "G";
        names[0x0B] = "H";
        names[0x0C] = "I";
        names[0x0D] = "J";
        names[0x0E] = "K";
        names[0x0F] = "L";
        names[0x10] = "M";
        names[0x11] = "N";
        names[0x12] = "O";
        names[0x13] = "P";
        names[0x14] = "Q";
        names[0x15] = "R";
        names[0x16] = "S";
        names[0x17] = "T";
        names[0x18] = "U";
        names[0x19] = "V";
        names[0x1A] = "W";
        names[0x1B] = "X";
        names[0x1C] = "Y";
        names[0x1D] = "Z";
        names[0x1E] = "1";
        names[0x1F] = "2";
        names[0x20] = "3";
        names[0x21] = "4";
        names[0x22] = "5";
        names[0x23] = "6";
        names[0x24] = "7";
        names[0x25] = "8";
        names[0x26] = "9";
        names[0x27] = "0";
        names[0x28] = "ENTER";
        names[0x29] = "ESC";
        names[0x2A] = "BACKSPACE";
        names[0x2B] = "TAB";
        names[0x2C] = "SPACE";
        names[0x2D] = "MINUS";
        names[0x2E] = "EQUAL";
        names[0x2F] = "LEFT_BRACKET";
        names[0x30] = "RIGHT_BRACKET";
        names[0x31] = "BACKSLASH";
        names[0x33] = "SEMICOLON";
        names[0x34] = "QUOTE";
        names[0x35] = "GRAVE";
        names[0x36] = "COMMA";
        names[0x37] = "DOT";
        names[0x38] = "SLASH";
        names[0x39] = "CAPS_LOCK";
        names[0x3A] = "F1";
        names[0x3B] = "F2";
        names[0x3C] = "F3";
        names[0x3D] = "F4";
        names[0x3E] = "F5";
        names[0x3F] = "F6";
        names[0x40] = "F7";
        names[0x41] = "F8";
        names[0x42] = "F9";
        names[0x43] = "F10";
        names[0x44] = "F11";
        names[0x45] = "F12";
        names[0x46] = "PRINT_SCREEN";
        names[0x47] = "SCROLL_LOCK";
        names[0x48] = "PAUSE";
        names[0x49] = "INSERT";
        names[0x4A] = "HOME";
        names[0x4B] = "PAGE_UP";
        names[0x4C] = "DELETE";
        names[0x4D] = "END";
        names[0x4E] = "PAGE_DOWN";
        names[0x4F] = "RIGHT";
        names[0x50] = "LEFT";
        names[0x51] = "DOWN";
        names[0x52] = "UP";
        names[0x53] = "NUM_LOCK";
        names[0x54] = "KP_SLASH";
        names[0x55] = "KP_ASTERISK";
        names[0x56] = "KP_MINUS";
        names[0x57] = "KP_PLUS";
        names[0x58] = "KP_ENTER";
        names[0x59] = "KP_1";
        names[0x5A] = "KP_2";
        names[0x5B] = "KP_3";
        names[0x5C] = "KP_4";
        names[0x5D] = "KP_5";
        names[0x5E] = "KP_6";
        names[0x5F] = "KP_7";
        names[0x60] = "KP_8";
        names[0x61] = "KP_9";
        names[0x62] = "KP_0";
        names[0x63] = "KP_DOT";
        names[0x65] = "APPLICATION";
        names[0xE0] = "LEFT_CTRL";
        names[0xE1] = "LEFT_SHIFT";
        names[0xE2] = "LEFT_ALT";
        names[0xE3] = "LEFT_GUI";
        names[0xE4] = "RIGHT_CTRL";
        names[0xE5] = "RIGHT_SHIFT";
        names[0xE6] = "RIGHT_ALT";
        names[0xE7] = "RIGHT_GUI";
        names
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(KeyCode::new(0x04).name(), "A");
        assert_eq!(KeyCode::new(0x2C).name(), "SPACE");
        assert_eq!(KeyCode::new(0xE1).name(), "LEFT_SHIFT");
        assert_eq!(KeyCode::new(0xFF).name(), "UNKNOWN");
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("A"), Some(KeyCode::new(0x04)));
        assert_eq!(key_from_name("a"), Some(KeyCode::new(0x04)));
        assert_eq!(key_from_name("  space "), Some(KeyCode::new(0x2C)));
        assert_eq!(key_from_name("PAGE-UP"), Some(KeyCode::new(0x4B)));
        assert_eq!(key_from_name("NotAKey"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("GRAVE".parse::<KeyCode>(), Ok(KeyCode::new(0x35)));
        assert!(matches!(
            "BOGUS".parse::<KeyCode>(),
            Err(UnknownKeyName(name)) if name == "BOGUS"
        ));
    }

    #[test]
    fn test_is_modifier() {
        assert!(KeyCode::new(0xE0).is_modifier());
        assert!(KeyCode::new(0xE7).is_modifier());
        assert!(!KeyCode::new(0x04).is_modifier());
    }
}
