use std::fmt;

use serde::{Deserialize, Serialize};

/// 32-bit flag set published by bitfield variables (session flags, engine
/// warnings, camera state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct BitField(pub u32);

impl BitField {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Whether bit number `bit` (0..32) is set. Out-of-range bits read as clear.
    pub const fn is_set(&self, bit: u32) -> bool {
        bit < 32 && self.0 & (1 << bit) != 0
    }

    /// Whether any bit of `mask` is set.
    pub const fn has_flag(&self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    /// Whether every bit of `mask` is set.
    pub const fn has_all(&self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Indices of the set bits, lowest first.
    pub fn set_bits(&self) -> impl Iterator<Item = u32> + '_ {
        (0..32).filter(move |bit| self.is_set(*bit))
    }
}

impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
