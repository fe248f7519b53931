// Laykey Config Parser - TOML with Serde
// Loads and validates a keymap configuration file into the engine inputs

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::actions::{parse_action, ActionParseError};
use crate::engine::{Engine, EngineConfig, EngineError, RolloverPolicy};
use crate::{Action, KeymapBuilder, KeymapError, KeymapTable, LayerId};

/// Configuration loading errors. All fatal at load time, before the engine
/// accepts any events.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("layer '{layer}' row {row} col {col}: {source}")]
    InvalidAction {
        layer: String,
        row: usize,
        col: usize,
        source: ActionParseError,
    },

    #[error("invalid rollover policy: '{0}' (expected 'strict-hold' or 'permissive-tap')")]
    InvalidRollover(String),

    #[error("base_layer names undefined layer '{0}'")]
    UnknownBaseLayer(String),

    #[error("base_layer '{0}' is not flagged base = true")]
    NotABaseLayer(String),

    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

/// Root TOML table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    geometry: GeometryToml,

    #[serde(default)]
    engine: EngineToml,

    #[serde(default, rename = "layer")]
    layers: Vec<LayerToml>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeometryToml {
    rows: u8,
    cols: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineToml {
    tap_hold_timeout_ms: Option<u64>,
    rollover: Option<String>,
    base_layer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerToml {
    name: String,

    /// Selectable as the bottom of the stack.
    #[serde(default)]
    base: bool,

    /// Grid of action tokens, one inner array per matrix row.
    keys: Vec<Vec<String>>,
}

/// A fully validated configuration: the immutable keymap table plus engine
/// options and the initial base layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub table: KeymapTable,
    pub engine: EngineConfig,
    pub base: LayerId,
}

impl Config {
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        // Layer names are registered first so action tokens can reference
        // layers defined later in the file.
        let mut layer_ids: IndexMap<String, LayerId> = IndexMap::new();
        for (index, layer) in raw.layers.iter().enumerate() {
            if layer_ids
                .insert(layer.name.clone(), LayerId::new(index as u8))
                .is_some()
            {
                return Err(KeymapError::DuplicateLayer(layer.name.clone()).into());
            }
        }

        let mut builder = KeymapBuilder::new(raw.geometry.rows, raw.geometry.cols);
        for layer in &raw.layers {
            let mut grid: Vec<Vec<Action>> = Vec::with_capacity(layer.keys.len());
            for (row, tokens) in layer.keys.iter().enumerate() {
                let mut actions = Vec::with_capacity(tokens.len());
                for (col, token) in tokens.iter().enumerate() {
                    let action = parse_action(token, &layer_ids).map_err(|source| {
                        ConfigError::InvalidAction {
                            layer: layer.name.clone(),
                            row,
                            col,
                            source,
                        }
                    })?;
                    actions.push(action);
                }
                grid.push(actions);
            }
            builder.layer(layer.name.clone(), layer.base, grid);
        }
        let table = builder.build()?;

        let base = match &raw.engine.base_layer {
            Some(name) => {
                let id = table
                    .layer_id(name)
                    .ok_or_else(|| ConfigError::UnknownBaseLayer(name.clone()))?;
                if !table.is_base_layer(id) {
                    return Err(ConfigError::NotABaseLayer(name.clone()));
                }
                id
            }
            // Builder guarantees at least one base-flagged layer exists.
            None => table.base_layers().next().ok_or(KeymapError::NoBaseLayer)?,
        };

        let mut engine = EngineConfig::default();
        if let Some(timeout) = raw.engine.tap_hold_timeout_ms {
            engine.tap_hold_timeout_ms = timeout;
        }
        if let Some(rollover) = &raw.engine.rollover {
            engine.rollover = RolloverPolicy::from_str(rollover)
                .map_err(|_| ConfigError::InvalidRollover(rollover.clone()))?;
        }

        Ok(Self {
            table,
            engine,
            base,
        })
    }

    /// Build the engine from this configuration.
    pub fn into_engine(self) -> Result<Engine, EngineError> {
        Engine::new(self.table, self.base, self.engine)
    }
}
