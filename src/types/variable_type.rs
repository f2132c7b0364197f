//! Telemetry variable type definitions

use serde::{Deserialize, Serialize};

use crate::lut::Lut;
use crate::{Result, TelemetryError};

/// Value types the writer publishes, keyed by their wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum VariableType {
    /// 8-bit character (code 0)
    Char,
    /// Single-byte boolean (code 1)
    Bool,
    /// 32-bit signed integer (code 2)
    Int32,
    /// 32-bit flag set (code 3)
    BitField,
    /// 32-bit float (code 4)
    Float32,
    /// 64-bit float (code 5)
    Float64,
}

/// Wire code to `(type, element size)`.
const TYPE_CODES: Lut<i32, (VariableType, usize), 6> = Lut::from_sorted_codes([
    (0, (VariableType::Char, 1)),
    (1, (VariableType::Bool, 1)),
    (2, (VariableType::Int32, 4)),
    (3, (VariableType::BitField, 4)),
    (4, (VariableType::Float32, 4)),
    (5, (VariableType::Float64, 8)),
]);

impl VariableType {
    /// Decode a wire type code. Unknown codes are a malformed schema.
    pub fn from_code(code: i32, variable: &str) -> Result<Self> {
        TYPE_CODES.lookup(&code).map(|(data_type, _)| *data_type).ok_or_else(|| {
            TelemetryError::malformed_schema(variable, format!("unknown type code {code}"))
        })
    }

    /// Wire code for this type.
    pub const fn code(&self) -> i32 {
        match self {
            VariableType::Char => 0,
            VariableType::Bool => 1,
            VariableType::Int32 => 2,
            VariableType::BitField => 3,
            VariableType::Float32 => 4,
            VariableType::Float64 => 5,
        }
    }

    /// Size in bytes of one element.
    pub fn size(&self) -> usize {
        TYPE_CODES.lookup(&self.code()).map_or(0, |(_, size)| *size)
    }
}
