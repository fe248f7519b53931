// Laykey Resolution Engine
// Consumes press/release/tick events, resolves them against the keymap
// table and layer stack, and emits effects. Single-threaded and run-to-
// completion: every event is fully processed before the next is accepted.

use std::collections::HashMap;

use log::{debug, warn};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::{Action, Effect, Effects, KeyCode, KeymapTable, LayerId, LayerStack, Modifiers, Position};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Contract violations surfaced by the engine. Resolution itself is total;
/// these only flag bad input from collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("position {position} outside the {rows}x{cols} matrix")]
    PositionOutOfRange {
        position: Position,
        rows: u8,
        cols: u8,
    },

    #[error("layer {0} is not a base layer")]
    NotABaseLayer(LayerId),
}

/// Policy for a second key pressed while a dual-function key is still
/// pending tap/hold disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum RolloverPolicy {
    /// Any other press immediately commits the pending key to hold.
    StrictHold,
    /// Only the hold timer commits; a fast roll always taps.
    PermissiveTap,
}

/// Engine configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Duration distinguishing a tap from a hold, in milliseconds.
    pub tap_hold_timeout_ms: u64,
    pub rollover: RolloverPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tap_hold_timeout_ms: 200,
            rollover: RolloverPolicy::StrictHold,
        }
    }
}

/// What a pending dual-function key becomes if it resolves as a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DualBinding {
    Layer { layer: LayerId, tap: KeyCode },
    Modifier { hold: Modifiers, tap: KeyCode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapHoldPhase {
    /// Timing the press; tap and hold are both still possible.
    Pending,
    /// Hold committed (timer fired or rollover interrupted).
    Held,
}

/// Per-position transient state, created on press and destroyed on release.
#[derive(Debug, Clone, Copy)]
enum PressedState {
    /// Plain key (possibly with pre-applied modifiers); release emits the
    /// matching key-ups.
    Simple { mods: Modifiers, key: KeyCode },
    /// Owns a momentary stack entry; release pops it.
    Momentary { layer: LayerId },
    /// Dual-function key in the tap/hold machine.
    TapHold {
        binding: DualBinding,
        pressed_at: u64,
        phase: TapHoldPhase,
    },
    /// Special token already forwarded on press; release is consumed.
    SpecialHeld,
    /// Resolved to no action; release is consumed silently.
    Inert,
}

/// The layer-resolution engine.
///
/// Owns the keymap table, the layer stack and the per-position pressed-key
/// state exclusively. Callers feed it `press`/`release`/`tick` events with
/// caller-supplied millisecond timestamps and consume the returned effects;
/// nothing outside the engine mutates its state.
#[derive(Debug)]
pub struct Engine {
    table: KeymapTable,
    stack: LayerStack,
    pressed: HashMap<Position, PressedState>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with `base` as the initial bottom of the stack.
    ///
    /// `base` must be one of the table's base-flagged layers; the initial
    /// selection is the external persistence collaborator's business and
    /// arrives here as a plain value.
    pub fn new(table: KeymapTable, base: LayerId, config: EngineConfig) -> EngineResult<Self> {
        if !table.is_base_layer(base) {
            return Err(EngineError::NotABaseLayer(base));
        }
        Ok(Self {
            table,
            stack: LayerStack::new(base),
            pressed: HashMap::new(),
            config,
        })
    }

    pub fn table(&self) -> &KeymapTable {
        &self.table
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Switch the base layer (e.g. an OS toggle or dip switch relayed by
    /// the host). Momentary layers above the base are left alone.
    pub fn set_base_layer(&mut self, base: LayerId) -> EngineResult<()> {
        if !self.table.is_base_layer(base) {
            return Err(EngineError::NotABaseLayer(base));
        }
        debug!("base layer -> '{}'", self.table.layer_name(base));
        self.stack.set_base(base);
        Ok(())
    }

    /// Process a key press at `now_ms` milliseconds.
    pub fn press(&mut self, position: Position, now_ms: u64) -> EngineResult<Effects> {
        self.check_bounds(position)?;
        let mut effects = Effects::new();

        // A press for a position already down violates the scanning
        // collaborator's contract; retire the stale state (and any stack
        // entry it owns) so the stack cannot accumulate orphaned entries.
        if let Some(stale) = self.pressed.remove(&position) {
            warn!("press for {} while already down; replacing state", position);
            if matches!(
                stale,
                PressedState::Momentary { .. }
                    | PressedState::TapHold {
                        binding: DualBinding::Layer { .. },
                        ..
                    }
            ) {
                self.stack.release_owned(position);
            }
        }

        // Under strict-hold, a new press resolves any pending dual-function
        // keys to hold first, so this key sees the committed stack.
        if self.config.rollover == RolloverPolicy::StrictHold {
            self.commit_pending(None, &mut effects);
        }

        let action = self.table.resolve(position, &self.stack);
        debug!("press {} @{}ms -> {}", position, now_ms, action);

        let state = match action {
            Action::Key(key) => {
                effects.push(Effect::KeyDown(key));
                PressedState::Simple {
                    mods: Modifiers::empty(),
                    key,
                }
            }
            Action::Shifted { mods, key } => {
                for m in mods.keycodes() {
                    effects.push(Effect::KeyDown(m));
                }
                effects.push(Effect::KeyDown(key));
                PressedState::Simple { mods, key }
            }
            Action::MomentaryLayer(layer) => {
                self.stack.push_momentary(layer, position);
                effects.push(Effect::LayerActivated(layer));
                PressedState::Momentary { layer }
            }
            Action::LayerTap { layer, tap } => {
                // Speculative push: interleaved keys resolve through the
                // layer while the tap/hold outcome is still open. The
                // activation effect is withheld until the hold commits.
                self.stack.push_momentary(layer, position);
                PressedState::TapHold {
                    binding: DualBinding::Layer { layer, tap },
                    pressed_at: now_ms,
                    phase: TapHoldPhase::Pending,
                }
            }
            Action::ModTap { hold, tap } => PressedState::TapHold {
                binding: DualBinding::Modifier { hold, tap },
                pressed_at: now_ms,
                phase: TapHoldPhase::Pending,
            },
            Action::Special(token) => {
                // No tap/hold negotiation: specials fire on press.
                effects.push(Effect::Forward(token));
                PressedState::SpecialHeld
            }
            Action::NoOp | Action::Transparent => PressedState::Inert,
        };
        self.pressed.insert(position, state);
        Ok(effects)
    }

    /// Process a key release at `now_ms` milliseconds.
    pub fn release(&mut self, position: Position, now_ms: u64) -> EngineResult<Effects> {
        self.check_bounds(position)?;
        let mut effects = Effects::new();

        let Some(state) = self.pressed.remove(&position) else {
            // Ordering is the scanning collaborator's contract; a stray
            // release is logged rather than treated as fatal.
            warn!("release for {} without matching press", position);
            return Ok(effects);
        };

        match state {
            PressedState::Simple { mods, key } => {
                effects.push(Effect::KeyUp(key));
                let down: Vec<KeyCode> = mods.keycodes().collect();
                for m in down.into_iter().rev() {
                    effects.push(Effect::KeyUp(m));
                }
            }
            PressedState::Momentary { layer } => {
                if self.stack.release_owned(position).is_none() {
                    warn!("momentary entry for {} already gone", position);
                }
                effects.push(Effect::LayerDeactivated(layer));
            }
            PressedState::TapHold {
                binding,
                pressed_at,
                phase,
            } => {
                let held_long = now_ms.saturating_sub(pressed_at) >= self.config.tap_hold_timeout_ms;
                match (phase, held_long) {
                    (TapHoldPhase::Pending, false) => self.resolve_tap(position, binding, &mut effects),
                    // Timer elapsed but no tick arrived in between:
                    // announce and retire the hold in one go so layer
                    // activation effects stay paired.
                    (TapHoldPhase::Pending, true) => {
                        self.emit_hold_commit(binding, &mut effects);
                        self.resolve_hold_release(position, binding, &mut effects);
                    }
                    (TapHoldPhase::Held, _) => {
                        self.resolve_hold_release(position, binding, &mut effects)
                    }
                }
            }
            PressedState::SpecialHeld | PressedState::Inert => {}
        }
        debug!("release {} @{}ms -> {} effect(s)", position, now_ms, effects.len());
        Ok(effects)
    }

    /// Evaluate hold timers. Commits every pending dual-function key whose
    /// timer has elapsed by `now_ms`. Cannot fail.
    pub fn tick(&mut self, now_ms: u64) -> Effects {
        let mut effects = Effects::new();
        self.commit_pending(Some(now_ms), &mut effects);
        effects
    }

    fn check_bounds(&self, position: Position) -> EngineResult<()> {
        if !self.table.contains(position) {
            return Err(EngineError::PositionOutOfRange {
                position,
                rows: self.table.rows(),
                cols: self.table.cols(),
            });
        }
        Ok(())
    }

    /// Commit pending tap/hold keys to held. With `deadline = Some(now)`,
    /// only keys whose timer elapsed; with `None` (rollover interrupt),
    /// all of them. Commit order is by press time so concurrent pending
    /// keys resolve deterministically.
    fn commit_pending(&mut self, deadline: Option<u64>, effects: &mut Effects) {
        let mut due: Vec<(u64, Position, DualBinding)> = self
            .pressed
            .iter()
            .filter_map(|(&pos, state)| match *state {
                PressedState::TapHold {
                    binding,
                    pressed_at,
                    phase: TapHoldPhase::Pending,
                } => match deadline {
                    Some(now) if now.saturating_sub(pressed_at) < self.config.tap_hold_timeout_ms => {
                        None
                    }
                    _ => Some((pressed_at, pos, binding)),
                },
                _ => None,
            })
            .collect();
        due.sort_by_key(|&(pressed_at, position, _)| (pressed_at, position));

        for (pressed_at, position, binding) in due {
            if let Some(PressedState::TapHold { phase, .. }) = self.pressed.get_mut(&position) {
                *phase = TapHoldPhase::Held;
            }
            debug!(
                "hold committed for {} (pressed at {}ms)",
                position, pressed_at
            );
            self.emit_hold_commit(binding, effects);
        }
    }

    fn emit_hold_commit(&self, binding: DualBinding, effects: &mut Effects) {
        match binding {
            // The layer is already in the stack from the speculative push;
            // only the announcement was withheld.
            DualBinding::Layer { layer, .. } => effects.push(Effect::LayerActivated(layer)),
            DualBinding::Modifier { hold, .. } => {
                for m in hold.keycodes() {
                    effects.push(Effect::KeyDown(m));
                }
            }
        }
    }

    fn resolve_tap(&mut self, position: Position, binding: DualBinding, effects: &mut Effects) {
        match binding {
            DualBinding::Layer { tap, .. } => {
                // Pop the speculative layer silently; it was never
                // announced.
                self.stack.release_owned(position);
                effects.push(Effect::KeyDown(tap));
                effects.push(Effect::KeyUp(tap));
            }
            DualBinding::Modifier { tap, .. } => {
                effects.push(Effect::KeyDown(tap));
                effects.push(Effect::KeyUp(tap));
            }
        }
    }

    fn resolve_hold_release(
        &mut self,
        position: Position,
        binding: DualBinding,
        effects: &mut Effects,
    ) {
        match binding {
            DualBinding::Layer { layer, .. } => {
                self.stack.release_owned(position);
                effects.push(Effect::LayerDeactivated(layer));
            }
            DualBinding::Modifier { hold, .. } => {
                let down: Vec<KeyCode> = hold.keycodes().collect();
                for m in down.into_iter().rev() {
                    effects.push(Effect::KeyUp(m));
                }
            }
        }
    }
}
