// Laykey Config - Action Token Parser
// Parses keymap cell tokens like "A", "Shift-Cmd-M", "MO(fn)",
// "LT(nav, SPACE)", "MT(RCtrl, L)" and "SPECIAL(bootloader)"

use std::str::FromStr;

use indexmap::IndexMap;

use crate::{Action, KeyCode, LayerId, Modifiers, SpecialToken};

/// Errors from parsing a single action token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("action token cannot be empty")]
    EmptyToken,

    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("unknown layer: '{0}'")]
    UnknownLayer(String),

    #[error("unknown special token: '{0}'")]
    UnknownSpecial(String),

    #[error("malformed action token: '{0}'")]
    Malformed(String),
}

/// Parse one keymap cell token against a layer-name registry.
///
/// Grammar:
///   `____` / `TRNS`         transparent
///   `XXXX` / `NONE`         explicit no-op
///   `A`, `SPACE`, ...       literal keycode (shifted aliases included)
///   `Shift-Cmd-M`           keycode with pre-applied modifiers
///   `MO(fn)`                momentary layer
///   `LT(nav, SPACE)`        layer-tap
///   `MT(RCtrl, L)`          mod-tap
///   `SPECIAL(bootloader)`   vendor token
pub fn parse_action(
    token: &str,
    layers: &IndexMap<String, LayerId>,
) -> Result<Action, ActionParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ActionParseError::EmptyToken);
    }

    if token.chars().all(|c| c == '_') && token.len() >= 2 {
        return Ok(Action::Transparent);
    }
    match token.to_uppercase().as_str() {
        "TRNS" | "TRANS" => return Ok(Action::Transparent),
        "XXXX" | "NONE" => return Ok(Action::NoOp),
        _ => {}
    }

    if let Some(inner) = call_args(token, "MO") {
        let layer = layer_by_name(inner, layers)?;
        return Ok(Action::MomentaryLayer(layer));
    }
    if let Some(inner) = call_args(token, "LT") {
        let (layer_name, key_name) = split_pair(token, inner)?;
        let layer = layer_by_name(layer_name, layers)?;
        let tap = parse_key(key_name)?;
        return Ok(Action::LayerTap { layer, tap });
    }
    if let Some(inner) = call_args(token, "MT") {
        let (mods_str, key_name) = split_pair(token, inner)?;
        let hold = parse_modifiers(mods_str)?;
        let tap = parse_key(key_name)?;
        return Ok(Action::ModTap { hold, tap });
    }
    if let Some(inner) = call_args(token, "SPECIAL") {
        let special = SpecialToken::from_str(inner.trim())
            .map_err(|_| ActionParseError::UnknownSpecial(inner.trim().to_string()))?;
        return Ok(Action::Special(special));
    }

    // Whole-token lookup first: key names may themselves contain hyphens
    // (PAGE-UP), which must not be misread as a modifier combo.
    if let Ok(base) = parse_key_or_shifted(token) {
        return Ok(apply_mods(Modifiers::empty(), base));
    }

    // Hyphenated combo: modifier aliases, then the key name.
    if let Some((mods_str, key_name)) = token.rsplit_once('-') {
        if !mods_str.is_empty() && !key_name.is_empty() {
            let mods = parse_modifiers(mods_str)?;
            return Ok(apply_mods(mods, parse_key_or_shifted(key_name)?));
        }
        return Err(ActionParseError::Malformed(token.to_string()));
    }

    Err(ActionParseError::UnknownKey(token.to_string()))
}

/// Extract the argument list of `NAME(...)` tokens.
fn call_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    let rest = token.strip_prefix(name)?;
    let rest = rest.trim_start();
    rest.strip_prefix('(')?.trim_end().strip_suffix(')')
}

fn split_pair<'a>(token: &str, inner: &'a str) -> Result<(&'a str, &'a str), ActionParseError> {
    inner
        .split_once(',')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| ActionParseError::Malformed(token.to_string()))
}

fn layer_by_name(
    name: &str,
    layers: &IndexMap<String, LayerId>,
) -> Result<LayerId, ActionParseError> {
    layers
        .get(name.trim())
        .copied()
        .ok_or_else(|| ActionParseError::UnknownLayer(name.trim().to_string()))
}

fn parse_key(name: &str) -> Result<KeyCode, ActionParseError> {
    crate::keycode::key_from_name(name).ok_or_else(|| ActionParseError::UnknownKey(name.to_string()))
}

fn parse_modifiers(spec: &str) -> Result<Modifiers, ActionParseError> {
    let mut mods = Modifiers::empty();
    for part in spec.split('-') {
        let m = Modifiers::from_alias(part)
            .ok_or_else(|| ActionParseError::UnknownModifier(part.trim().to_string()))?;
        mods.insert(m);
    }
    Ok(mods)
}

fn apply_mods(mods: Modifiers, base: (Modifiers, KeyCode)) -> Action {
    let (implied, key) = base;
    let mods = mods.union(implied);
    if mods.is_empty() {
        Action::Key(key)
    } else {
        Action::Shifted { mods, key }
    }
}

/// Resolve a key name, accepting shifted punctuation aliases (e.g. `TILDE`
/// is Shift+GRAVE). Returns the implied modifiers plus the base keycode.
fn parse_key_or_shifted(name: &str) -> Result<(Modifiers, KeyCode), ActionParseError> {
    if let Some(base) = shifted_alias(name) {
        return Ok((Modifiers::LEFT_SHIFT, base));
    }
    Ok((Modifiers::empty(), parse_key(name)?))
}

fn shifted_alias(name: &str) -> Option<KeyCode> {
    let base = match name.trim().to_uppercase().as_str() {
        "TILDE" => "GRAVE",
        "EXCLAIM" => "1",
        "AT" => "2",
        "HASH" => "3",
        "DOLLAR" => "4",
        "PERCENT" => "5",
        "CARET" => "6",
        "AMPERSAND" => "7",
        "ASTERISK" => "8",
        "LPAREN" => "9",
        "RPAREN" => "0",
        "UNDERSCORE" => "MINUS",
        "PLUS" => "EQUAL",
        "LBRACE" => "LEFT_BRACKET",
        "RBRACE" => "RIGHT_BRACKET",
        "PIPE" => "BACKSLASH",
        "COLON" => "SEMICOLON",
        "DQUOTE" => "QUOTE",
        "QUESTION" => "SLASH",
        _ => return None,
    };
    crate::keycode::key_from_name(base)
}
