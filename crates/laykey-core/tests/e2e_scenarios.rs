// Laykey End-to-End Test Scenarios
//
// Drives the engine from a TOML configuration through realistic event
// sequences and checks the emitted effect streams.

use laykey_core::{
    Config, Effect, Effects, Engine, KeyCode, LayerId, Position, RolloverPolicy, SpecialToken,
};

// A cut-down 60%-board keymap: two base layers (mac/win), a function
// overlay reached via MO, a navigation layer on a space layer-tap, a
// home-row mod-tap and a couple of shifted shortcuts.
const KEYMAP: &str = r#"
[geometry]
rows = 3
cols = 5

[engine]
tap_hold_timeout_ms = 200
rollover = "strict-hold"
base_layer = "mac"

[[layer]]
name = "mac"
base = true
keys = [
    ["GRAVE", "1",          "2",            "3",              "BACKSPACE"],
    ["ESC",   "A",          "Shift-Cmd-M",  "MT(RCtrl, L)",   "ENTER"],
    ["MO(fn)", "LT(nav, SPACE)", "Z",       "X",              "SPECIAL(rgb-toggle)"],
]

[[layer]]
name = "win"
base = true
keys = [
    ["ESC",   "1",          "2",            "3",              "BACKSPACE"],
    ["CAPS_LOCK", "A",      "Shift-Ctrl-M", "L",              "ENTER"],
    ["MO(fn)", "SPACE",     "Z",            "____",           "SPECIAL(rgb-toggle)"],
]

[[layer]]
name = "fn"
keys = [
    ["SPECIAL(bootloader)", "F1", "F2", "F3", "SPECIAL(eeprom-clear)"],
    ["____", "____", "____", "____", "____"],
    ["____", "____", "____", "____", "____"],
]

[[layer]]
name = "nav"
keys = [
    ["____", "____", "____", "____", "____"],
    ["____", "LEFT", "DOWN", "____", "____"],
    ["____", "____", "____", "____", "____"],
]
"#;

fn engine() -> Engine {
    Config::from_toml_str(KEYMAP).unwrap().into_engine().unwrap()
}

fn engine_with_rollover(policy: &str) -> Engine {
    let toml = KEYMAP.replace("strict-hold", policy);
    Config::from_toml_str(&toml).unwrap().into_engine().unwrap()
}

fn kc(name: &str) -> KeyCode {
    name.parse().unwrap()
}

fn layer(engine: &Engine, name: &str) -> LayerId {
    engine.table().layer_id(name).unwrap()
}

/// Press then release, returning the concatenated effects.
fn tap(engine: &mut Engine, pos: Position, at: u64, released_at: u64) -> Effects {
    let mut effects = engine.press(pos, at).unwrap();
    effects.extend(engine.release(pos, released_at).unwrap());
    effects
}

const GRAVE: Position = Position { row: 0, col: 0 };
const A_KEY: Position = Position { row: 1, col: 1 };
const SHORTCUT: Position = Position { row: 1, col: 2 };
const HOMEROW_L: Position = Position { row: 1, col: 3 };
const FN_KEY: Position = Position { row: 2, col: 0 };
const SPACE_NAV: Position = Position { row: 2, col: 1 };
const X_KEY: Position = Position { row: 2, col: 3 };

#[test]
fn plain_typing_round_trips() {
    let mut engine = engine();
    let effects = tap(&mut engine, A_KEY, 0, 40);
    assert_eq!(
        effects.as_slice(),
        &[Effect::KeyDown(kc("A")), Effect::KeyUp(kc("A"))]
    );
    assert_eq!(engine.stack().depth(), 1);
}

#[test]
fn fn_overlay_resolves_and_falls_through() {
    let mut engine = engine();
    let fn_layer = layer(&engine, "fn");

    let on = engine.press(FN_KEY, 0).unwrap();
    assert_eq!(on.as_slice(), &[Effect::LayerActivated(fn_layer)]);

    // Opaque on the overlay.
    let f1 = tap(&mut engine, Position::new(0, 1), 10, 20);
    assert_eq!(
        f1.as_slice(),
        &[Effect::KeyDown(kc("F1")), Effect::KeyUp(kc("F1"))]
    );

    // Transparent on the overlay: falls through to the base layer.
    let a = tap(&mut engine, A_KEY, 30, 40);
    assert_eq!(
        a.as_slice(),
        &[Effect::KeyDown(kc("A")), Effect::KeyUp(kc("A"))]
    );

    let off = engine.release(FN_KEY, 50).unwrap();
    assert_eq!(off.as_slice(), &[Effect::LayerDeactivated(fn_layer)]);
}

#[test]
fn momentary_push_pop_is_symmetric_around_other_keys() {
    let mut engine = engine();
    let before = engine.stack().depth();

    engine.press(FN_KEY, 0).unwrap();
    engine.press(Position::new(0, 2), 5).unwrap();
    engine.release(Position::new(0, 2), 15).unwrap();
    engine.release(FN_KEY, 20).unwrap();

    assert_eq!(engine.stack().depth(), before);
}

#[test]
fn vendor_tokens_reach_the_forward_boundary() {
    let mut engine = engine();
    let effects = tap(&mut engine, Position::new(2, 4), 0, 10);
    assert_eq!(
        effects.as_slice(),
        &[Effect::Forward(SpecialToken::RgbToggle)]
    );

    // Bootloader entry lives on the fn overlay.
    engine.press(FN_KEY, 20).unwrap();
    let boot = engine.press(GRAVE, 30).unwrap();
    assert_eq!(
        boot.as_slice(),
        &[Effect::Forward(SpecialToken::Bootloader)]
    );
}

#[test]
fn space_taps_and_holds() {
    let mut engine = engine();
    let nav = layer(&engine, "nav");

    // Quick tap: space.
    let effects = tap(&mut engine, SPACE_NAV, 0, 100);
    assert_eq!(
        effects.as_slice(),
        &[Effect::KeyDown(kc("SPACE")), Effect::KeyUp(kc("SPACE"))]
    );
    assert!(!engine.stack().contains(nav));

    // Hold across the timeout: navigation layer, no space.
    engine.press(SPACE_NAV, 200).unwrap();
    let committed = engine.tick(450);
    assert_eq!(committed.as_slice(), &[Effect::LayerActivated(nav)]);

    let left = tap(&mut engine, A_KEY, 460, 470);
    assert_eq!(
        left.as_slice(),
        &[Effect::KeyDown(kc("LEFT")), Effect::KeyUp(kc("LEFT"))]
    );

    let up = engine.release(SPACE_NAV, 500).unwrap();
    assert_eq!(up.as_slice(), &[Effect::LayerDeactivated(nav)]);
    assert!(!engine.stack().contains(nav));
}

#[test]
fn strict_hold_turns_a_roll_into_navigation() {
    let mut engine = engine_with_rollover("strict-hold");
    let nav = layer(&engine, "nav");

    engine.press(SPACE_NAV, 0).unwrap();
    // Rolling onto A before the timeout commits the hold; A resolves as
    // LEFT through the now-committed nav layer.
    let effects = engine.press(A_KEY, 50).unwrap();
    assert_eq!(
        effects.as_slice(),
        &[Effect::LayerActivated(nav), Effect::KeyDown(kc("LEFT"))]
    );
}

#[test]
fn permissive_tap_lets_a_roll_tap() {
    let mut engine = engine_with_rollover("permissive-tap");
    let nav = layer(&engine, "nav");

    engine.press(SPACE_NAV, 0).unwrap();
    // The speculative layer still applies to the interleaved key.
    let interleaved = engine.press(A_KEY, 50).unwrap();
    assert_eq!(interleaved.as_slice(), &[Effect::KeyDown(kc("LEFT"))]);
    engine.release(A_KEY, 60).unwrap();

    // Early release still taps.
    let up = engine.release(SPACE_NAV, 120).unwrap();
    assert_eq!(
        up.as_slice(),
        &[Effect::KeyDown(kc("SPACE")), Effect::KeyUp(kc("SPACE"))]
    );
    assert!(!engine.stack().contains(nav));
}

#[test]
fn shortcut_preserves_modifier_nesting() {
    let mut engine = engine();
    let effects = tap(&mut engine, SHORTCUT, 0, 30);
    assert_eq!(
        effects.as_slice(),
        &[
            Effect::KeyDown(kc("LEFT_SHIFT")),
            Effect::KeyDown(kc("LEFT_GUI")),
            Effect::KeyDown(kc("M")),
            Effect::KeyUp(kc("M")),
            Effect::KeyUp(kc("LEFT_GUI")),
            Effect::KeyUp(kc("LEFT_SHIFT")),
        ]
    );
}

#[test]
fn home_row_mod_tap() {
    let mut engine = engine_with_rollover("permissive-tap");

    // Tap: the letter.
    let effects = tap(&mut engine, HOMEROW_L, 0, 80);
    assert_eq!(
        effects.as_slice(),
        &[Effect::KeyDown(kc("L")), Effect::KeyUp(kc("L"))]
    );

    // Hold: the modifier wraps another key.
    engine.press(HOMEROW_L, 200).unwrap();
    let committed = engine.tick(450);
    assert_eq!(committed.as_slice(), &[Effect::KeyDown(kc("RIGHT_CTRL"))]);
    let copy = tap(&mut engine, X_KEY, 460, 470);
    assert_eq!(
        copy.as_slice(),
        &[Effect::KeyDown(kc("X")), Effect::KeyUp(kc("X"))]
    );
    let up = engine.release(HOMEROW_L, 500).unwrap();
    assert_eq!(up.as_slice(), &[Effect::KeyUp(kc("RIGHT_CTRL"))]);
}

#[test]
fn base_layer_switch_reroutes_the_matrix() {
    let mut engine = engine();
    let win = layer(&engine, "win");

    // Mac base: grave in the corner.
    let effects = tap(&mut engine, GRAVE, 0, 10);
    assert_eq!(effects.first(), Some(&Effect::KeyDown(kc("GRAVE"))));

    engine.set_base_layer(win).unwrap();
    let effects = tap(&mut engine, GRAVE, 20, 30);
    assert_eq!(effects.first(), Some(&Effect::KeyDown(kc("ESC"))));

    // The win base leaves one slot transparent; it resolves to nothing.
    let effects = tap(&mut engine, X_KEY, 40, 50);
    assert!(effects.is_empty());
}

#[test]
fn concurrent_dual_function_keys_stay_independent() {
    let mut engine = engine_with_rollover("permissive-tap");
    let nav = layer(&engine, "nav");

    engine.press(SPACE_NAV, 0).unwrap();
    // Nav is transparent over the mod-tap slot, so the speculative layer
    // lets it fall through to the base; both keys go pending.
    engine.press(HOMEROW_L, 50).unwrap();

    // Timers fire separately and in press order.
    let first = engine.tick(210);
    assert_eq!(first.as_slice(), &[Effect::LayerActivated(nav)]);
    let second = engine.tick(260);
    assert_eq!(second.as_slice(), &[Effect::KeyDown(kc("RIGHT_CTRL"))]);

    // Releases in the opposite order still pair correctly.
    let up_l = engine.release(HOMEROW_L, 300).unwrap();
    assert_eq!(up_l.as_slice(), &[Effect::KeyUp(kc("RIGHT_CTRL"))]);
    let up_space = engine.release(SPACE_NAV, 320).unwrap();
    assert_eq!(up_space.as_slice(), &[Effect::LayerDeactivated(nav)]);
    assert_eq!(engine.stack().depth(), 1);
}

#[test]
fn rollover_policies_match_config() {
    assert_eq!(
        engine_with_rollover("strict-hold").config().rollover,
        RolloverPolicy::StrictHold
    );
    assert_eq!(
        engine_with_rollover("permissive-tap").config().rollover,
        RolloverPolicy::PermissiveTap
    );
}
