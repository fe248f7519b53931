// Laykey Core Library
// Keymap layer-resolution engine: per-layer action tables, an owned layer
// stack with transparent fallthrough, and tap/hold disambiguation

pub mod action;
pub mod config;
pub mod effect;
pub mod engine;
pub mod handler;
pub mod keycode;
pub mod keymap;
pub mod layer;
pub mod modifier;
pub mod position;

pub use action::{Action, SpecialToken};
pub use config::{Config, ConfigError};
pub use effect::{Effect, Effects};
pub use engine::{Engine, EngineConfig, EngineError, EngineResult, RolloverPolicy};
pub use handler::{Disposition, EffectHandler, HandlerChain};
pub use keycode::{key_from_name, key_name, KeyCode, UnknownKeyName};
pub use keymap::{KeymapBuilder, KeymapError, KeymapTable};
pub use layer::{LayerId, LayerStack};
pub use modifier::Modifiers;
pub use position::Position;
