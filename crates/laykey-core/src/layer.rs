// Laykey Layer Stack
// Ordered set of active layers: one base entry at the bottom, momentary
// entries above it, each owned by the key position that activated it

use std::fmt;

use crate::Position;

/// Index into the keymap table's fixed list of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u8);

impl LayerId {
    pub fn new(index: u8) -> Self {
        LayerId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StackEntry {
    layer: LayerId,
    /// Position whose press pushed this entry; `None` for the base entry.
    owner: Option<Position>,
}

/// The stack of currently active layers.
///
/// Invariants: never empty, the bottom entry is the base layer, and entries
/// above it are ordered by recency of activation (most recent last, highest
/// resolution priority).
#[derive(Debug, Clone)]
pub struct LayerStack {
    entries: Vec<StackEntry>,
}

impl LayerStack {
    pub fn new(base: LayerId) -> Self {
        Self {
            entries: vec![StackEntry { layer: base, owner: None }],
        }
    }

    pub fn base(&self) -> LayerId {
        self.entries[0].layer
    }

    /// Replace the base layer, leaving momentary entries untouched.
    pub fn set_base(&mut self, base: LayerId) {
        self.entries[0].layer = base;
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, layer: LayerId) -> bool {
        self.entries.iter().any(|e| e.layer == layer)
    }

    /// Push a momentarily-activated layer owned by `owner`.
    pub fn push_momentary(&mut self, layer: LayerId, owner: Position) {
        self.entries.push(StackEntry {
            layer,
            owner: Some(owner),
        });
    }

    /// Remove the entry owned by `owner`, wherever it sits in the stack.
    ///
    /// Releases are not guaranteed to come in LIFO order relative to other
    /// momentary keys, so this searches by owner rather than popping.
    pub fn release_owned(&mut self, owner: Position) -> Option<LayerId> {
        let idx = self
            .entries
            .iter()
            .rposition(|e| e.owner == Some(owner))?;
        Some(self.entries.remove(idx).layer)
    }

    /// Active layers from highest resolution priority down to the base.
    pub fn iter_top_down(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries.iter().rev().map(|e| e.layer)
    }
}

impl fmt::Display for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", entry.layer)?;
        }
        write!(f, "]")
    }
}
