// Laykey Keymap Table
// Immutable, validated mapping from (layer, position) to Action, plus the
// first-match-wins transparency fallthrough over a layer stack

use indexmap::IndexMap;
use log::warn;

use crate::{Action, LayerId, LayerStack, Position};

/// Validation errors for a keymap table. All of these are load-time and
/// fatal; a built `KeymapTable` never fails at resolution time.
#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("keymap geometry must be non-zero, got {rows}x{cols}")]
    ZeroGeometry { rows: u8, cols: u8 },

    #[error("keymap defines no layers")]
    NoLayers,

    #[error("duplicate layer name: '{0}'")]
    DuplicateLayer(String),

    #[error("layer '{layer}' has {got} rows, expected {expected}")]
    WrongRowCount {
        layer: String,
        expected: usize,
        got: usize,
    },

    #[error("layer '{layer}' row {row} has {got} entries, expected {expected}")]
    WrongRowLength {
        layer: String,
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("layer '{layer}' at {position} targets undefined layer {target}")]
    InvalidLayerTarget {
        layer: String,
        position: Position,
        target: LayerId,
    },

    #[error("layer '{0}' is not a base layer and no binding reaches it")]
    UnreachableLayer(String),

    #[error("keymap has no base layer")]
    NoBaseLayer,
}

#[derive(Debug, Clone)]
struct LayerDef {
    name: String,
    base: bool,
    actions: Vec<Action>,
}

#[derive(Debug)]
struct PendingLayer {
    name: String,
    base: bool,
    grid: Vec<Vec<Action>>,
}

/// Builder for a `KeymapTable`. Layers are added in definition order; all
/// validation happens in `build`.
#[derive(Debug)]
pub struct KeymapBuilder {
    rows: u8,
    cols: u8,
    layers: Vec<PendingLayer>,
}

impl KeymapBuilder {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            layers: Vec::new(),
        }
    }

    /// Add a layer as a grid of rows. `base` marks the layer as selectable
    /// as the bottom of the stack.
    pub fn layer(
        &mut self,
        name: impl Into<String>,
        base: bool,
        grid: Vec<Vec<Action>>,
    ) -> &mut Self {
        self.layers.push(PendingLayer {
            name: name.into(),
            base,
            grid,
        });
        self
    }

    pub fn build(self) -> Result<KeymapTable, KeymapError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(KeymapError::ZeroGeometry {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.layers.is_empty() {
            return Err(KeymapError::NoLayers);
        }

        let mut by_name: IndexMap<String, LayerId> = IndexMap::new();
        let mut layers = Vec::with_capacity(self.layers.len());
        for (index, pending) in self.layers.into_iter().enumerate() {
            if by_name
                .insert(pending.name.clone(), LayerId::new(index as u8))
                .is_some()
            {
                return Err(KeymapError::DuplicateLayer(pending.name));
            }
            if pending.grid.len() != self.rows as usize {
                return Err(KeymapError::WrongRowCount {
                    layer: pending.name,
                    expected: self.rows as usize,
                    got: pending.grid.len(),
                });
            }
            for (row, entries) in pending.grid.iter().enumerate() {
                if entries.len() != self.cols as usize {
                    return Err(KeymapError::WrongRowLength {
                        layer: pending.name,
                        row,
                        expected: self.cols as usize,
                        got: entries.len(),
                    });
                }
            }
            layers.push(LayerDef {
                name: pending.name,
                base: pending.base,
                actions: pending.grid.into_iter().flatten().collect(),
            });
        }

        if !layers.iter().any(|l| l.base) {
            return Err(KeymapError::NoBaseLayer);
        }

        let table = KeymapTable {
            rows: self.rows,
            cols: self.cols,
            by_name,
            layers,
        };
        table.validate_targets()?;
        table.validate_reachability()?;
        table.warn_on_transparent_base();
        Ok(table)
    }
}

/// The immutable keymap table: per-layer, per-position action assignments.
///
/// Constructed once at startup through `KeymapBuilder` (or the TOML config
/// loader) and then only read; resolution is a total function over it.
#[derive(Debug, Clone)]
pub struct KeymapTable {
    rows: u8,
    cols: u8,
    by_name: IndexMap<String, LayerId>,
    layers: Vec<LayerDef>,
}

impl KeymapTable {
    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.by_name.get(name).copied()
    }

    pub fn layer_name(&self, layer: LayerId) -> &str {
        &self.layers[layer.index()].name
    }

    pub fn is_base_layer(&self, layer: LayerId) -> bool {
        self.layers
            .get(layer.index())
            .map(|l| l.base)
            .unwrap_or(false)
    }

    /// Layer IDs flagged as base candidates, in definition order.
    pub fn base_layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.base)
            .map(|(i, _)| LayerId::new(i as u8))
    }

    /// All layer names in definition order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// The action assigned to (layer, position). Caller guarantees both are
    /// in range; the engine bounds-checks positions before calling this.
    pub fn get(&self, layer: LayerId, position: Position) -> Action {
        let slot = position.row as usize * self.cols as usize + position.col as usize;
        self.layers[layer.index()].actions[slot]
    }

    /// Resolve the effective action for a position against an active layer
    /// stack: first non-transparent entry from the top of the stack down.
    ///
    /// Total and deterministic. Exhausted fallthrough (every active layer
    /// transparent at this position) yields `Action::NoOp`.
    pub fn resolve(&self, position: Position, stack: &LayerStack) -> Action {
        for layer in stack.iter_top_down() {
            let action = self.get(layer, position);
            if !action.is_transparent() {
                return action;
            }
        }
        Action::NoOp
    }

    fn validate_targets(&self) -> Result<(), KeymapError> {
        for layer in &self.layers {
            for (slot, action) in layer.actions.iter().enumerate() {
                if let Some(target) = action.layer_target() {
                    if target.index() >= self.layers.len() {
                        return Err(KeymapError::InvalidLayerTarget {
                            layer: layer.name.clone(),
                            position: self.slot_position(slot),
                            target,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_reachability(&self) -> Result<(), KeymapError> {
        let mut reachable = vec![false; self.layers.len()];
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.base {
                reachable[i] = true;
            }
            for action in &layer.actions {
                if let Some(target) = action.layer_target() {
                    reachable[target.index()] = true;
                }
            }
        }
        for (i, ok) in reachable.iter().enumerate() {
            if !ok {
                return Err(KeymapError::UnreachableLayer(self.layers[i].name.clone()));
            }
        }
        Ok(())
    }

    // Base layers are expected to be fully populated, but real keymaps
    // leave the odd hole (the original's second base layer does), so this
    // is a warning, not an error. Resolution falls back to NoOp.
    fn warn_on_transparent_base(&self) {
        for layer in self.layers.iter().filter(|l| l.base) {
            let holes = layer
                .actions
                .iter()
                .filter(|a| a.is_transparent())
                .count();
            if holes > 0 {
                warn!(
                    "base layer '{}' has {} transparent entries; they resolve to no-op",
                    layer.name, holes
                );
            }
        }
    }

    fn slot_position(&self, slot: usize) -> Position {
        Position::new(
            (slot / self.cols as usize) as u8,
            (slot % self.cols as usize) as u8,
        )
    }
}
