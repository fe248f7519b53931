// Laykey Effect Vocabulary
// What the engine emits; consumed by the HID-reporting and vendor-callback
// collaborators, never fed back into engine state

use std::fmt;

use smallvec::SmallVec;

use crate::{KeyCode, LayerId, SpecialToken};

/// A single output of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    LayerActivated(LayerId),
    LayerDeactivated(LayerId),
    /// Vendor token forwarded uninterpreted.
    Forward(SpecialToken),
}

/// Effect buffer returned by `press`/`release`/`tick`. Most events produce
/// at most a handful of effects, so this stays on the stack.
pub type Effects = SmallVec<[Effect; 4]>;

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::KeyDown(key) => write!(f, "key-down {}", key),
            Effect::KeyUp(key) => write!(f, "key-up {}", key),
            Effect::LayerActivated(layer) => write!(f, "layer-on {}", layer),
            Effect::LayerDeactivated(layer) => write!(f, "layer-off {}", layer),
            Effect::Forward(token) => write!(f, "forward {}", token),
        }
    }
}
