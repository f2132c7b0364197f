//! Telemetry variable schema types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{VarData, VariableType};
use crate::{Result, TelemetryError};

/// Decoded variable headers of one schema generation.
///
/// Entries are kept sorted by name so lookups are a binary search. A schema is
/// immutable once built; a new writer generation produces a new schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct VariableSchema {
    variables: Vec<VariableInfo>,
    buf_len: usize,
}

impl VariableSchema {
    /// Build a schema over samples of `buf_len` bytes.
    ///
    /// Rejects with [`TelemetryError::MalformedSchema`] any empty name, zero
    /// count, repeated name, or variable extending past `buf_len`.
    pub fn new(mut variables: Vec<VariableInfo>, buf_len: usize) -> Result<Self> {
        let mut seen = HashSet::with_capacity(variables.len());
        for info in &variables {
            if info.name.is_empty() {
                return Err(TelemetryError::malformed_schema("<unnamed>", "empty variable name"));
            }
            if info.count == 0 {
                return Err(TelemetryError::malformed_schema(&info.name, "count of 0"));
            }
            if !seen.insert(info.name.as_str()) {
                return Err(TelemetryError::malformed_schema(&info.name, "duplicate name"));
            }
            let end = info.byte_len().checked_add(info.offset);
            if end.is_none_or(|end| end > buf_len) {
                return Err(TelemetryError::malformed_schema(
                    &info.name,
                    format!(
                        "offset {} + {} bytes exceeds sample length {}",
                        info.offset,
                        info.byte_len(),
                        buf_len
                    ),
                ));
            }
        }
        drop(seen);

        variables.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { variables, buf_len })
    }

    /// Schema with no variables, for captures that carry only a session description.
    pub fn empty() -> Self {
        Self { variables: Vec::new(), buf_len: 0 }
    }

    /// Variable by name, or [`TelemetryError::NotFound`].
    pub fn lookup(&self, name: &str) -> Result<&VariableInfo> {
        self.get(name).ok_or_else(|| TelemetryError::not_found(name))
    }

    pub fn get(&self, name: &str) -> Option<&VariableInfo> {
        self.variables
            .binary_search_by(|info| info.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.variables[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Look up `name` and read it out of `sample`.
    pub fn extract<T: VarData>(&self, sample: &[u8], name: &str) -> Result<T> {
        T::from_bytes(sample, self.lookup(name)?)
    }

    /// Sample length in bytes.
    pub fn buf_len(&self) -> usize {
        self.buf_len
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableInfo> {
        self.variables.iter()
    }
}

/// Information about a specific telemetry variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct VariableInfo {
    /// Variable name as published by the writer
    pub name: String,
    pub data_type: VariableType,
    /// Byte offset within the sample
    pub offset: usize,
    /// Number of elements (1 for scalar, >1 for arrays)
    pub count: usize,
    /// Whether the writer treats the count as elapsed time
    pub count_as_time: bool,
    /// Units of measurement (e.g., "m/s", "C", "N*m")
    pub units: String,
    pub description: String,
}

impl VariableInfo {
    /// Scalar variable with empty units and description.
    pub fn scalar(name: impl Into<String>, data_type: VariableType, offset: usize) -> Self {
        Self::array(name, data_type, offset, 1)
    }

    pub fn array(
        name: impl Into<String>,
        data_type: VariableType,
        offset: usize,
        count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            offset,
            count,
            count_as_time: false,
            units: String::new(),
            description: String::new(),
        }
    }

    /// Total bytes occupied in the sample.
    pub fn byte_len(&self) -> usize {
        self.data_type.size().saturating_mul(self.count)
    }
}
