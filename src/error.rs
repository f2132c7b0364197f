//! Error types for telemetry ingestion.
//!
//! Every fallible operation in the crate returns [`TelemetryError`]. The variants
//! follow the failure taxonomy of the ingestion path:
//!
//! - **Availability**: [`TelemetryError::BufferUnavailable`] when the writer's
//!   shared region cannot be opened. Recoverable by retrying the open at a higher
//!   layer.
//! - **Transient**: [`TelemetryError::TornRead`] after the bounded read retry
//!   budget is exhausted.
//! - **Informational**: [`TelemetryError::SchemaChanged`] when the writer
//!   published a new variable-header generation that must be re-decoded.
//! - **Data integrity**: [`TelemetryError::MalformedSchema`] and
//!   [`TelemetryError::Parse`]. The offending sample or session description is
//!   discarded and the previous valid state stays in effect.
//! - **Usage**: [`TelemetryError::NotFound`] and [`TelemetryError::TypeMismatch`]
//!   for lookups and typed extraction that do not match the schema.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use paddock::TelemetryError;
//!
//! let error = TelemetryError::buffer_unavailable("simulator not running");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Shared telemetry buffer unavailable: {reason}")]
    BufferUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Torn read: no consistent sample after {attempts} attempt(s)")]
    TornRead { attempts: u32 },

    #[error("Schema generation changed from {from} to {to}")]
    SchemaChanged { from: String, to: String },

    #[error("Malformed schema at '{variable}': {reason}")]
    MalformedSchema { variable: String, reason: String },

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Key '{key}' not found")]
    NotFound { key: String },

    #[error("Duplicate key {key} in lookup table")]
    DuplicateKey { key: String },

    #[error("Type mismatch: {details}")]
    TypeMismatch { details: String },

    #[error("Memory access out of bounds at offset {offset:#x}")]
    Memory { offset: usize },

    #[error("Buffer operation failed: {context}")]
    Buffer { context: String, buffer_index: Option<usize> },

    #[error("Capture format error in {context}: {details}")]
    Format { context: String, details: String },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Header version mismatch: expected {expected}, found {found}")]
    Version { expected: u32, found: u32 },

    #[error("Cannot {operation} while provider is {state}")]
    InvalidState { operation: &'static str, state: String },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::BufferUnavailable { .. } => true,
            TelemetryError::TornRead { .. } => true,
            TelemetryError::SchemaChanged { .. } => true,
            TelemetryError::Buffer { .. } => true,
            TelemetryError::MalformedSchema { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::NotFound { .. } => false,
            TelemetryError::DuplicateKey { .. } => false,
            TelemetryError::TypeMismatch { .. } => false,
            TelemetryError::Memory { .. } => false,
            TelemetryError::Format { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::Version { .. } => false,
            TelemetryError::InvalidState { .. } => false,
            TelemetryError::Config { .. } => false,
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => true,
        }
    }

    /// Returns true for failures scoped to one sample or session generation.
    ///
    /// These never tear down a provider; the last known-good state is kept.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            TelemetryError::MalformedSchema { .. }
                | TelemetryError::Parse { .. }
                | TelemetryError::Format { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::BufferUnavailable { .. } => vec![
                "Ensure the simulator is running",
                "Check permissions for shared memory access",
                "Retry opening the source on the next poll",
            ],
            TelemetryError::TornRead { .. } => vec![
                "Poll again on the next writer tick",
                "Increase the read retry budget if this persists",
            ],
            TelemetryError::SchemaChanged { .. } => {
                vec!["Re-decode the variable schema before reading further samples"]
            }
            TelemetryError::MalformedSchema { .. } => vec![
                "Verify the writer's header version",
                "Discard the sample and keep the previous schema",
            ],
            TelemetryError::Parse { .. } => vec![
                "Inspect the session description around the reported line",
                "Keep the previous session description in effect",
            ],
            TelemetryError::NotFound { .. } => vec![
                "Check variable name spelling",
                "Verify the variable exists in the current schema generation",
            ],
            TelemetryError::DuplicateKey { .. } => {
                vec!["Remove the repeated key from the table literal"]
            }
            TelemetryError::TypeMismatch { .. } => vec![
                "Request the type declared by the variable header",
                "Check VariableInfo::data_type before extracting",
            ],
            TelemetryError::Memory { .. } => vec![
                "Check offsets against the sample length",
                "Verify the schema matches the sample generation",
            ],
            TelemetryError::Buffer { .. } => vec![
                "Size scratch buffers to at least the header's buf_len",
                "Check buffer synchronization",
            ],
            TelemetryError::Format { .. } => vec![
                "Verify the capture file is complete",
                "Records before the damaged one remain readable",
            ],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::Version { .. } => vec![
                "Update the simulator to a supported version",
                "Update this library to a compatible version",
            ],
            TelemetryError::InvalidState { .. } => vec![
                "Bind a source before polling",
                "Create a new provider instead of rebinding",
            ],
            TelemetryError::Config { .. } => vec!["Check configuration values against their documented ranges"],
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => vec![
                "Check Windows API permissions",
                "Verify system resources availability",
            ],
        }
    }

    /// Helper constructor for an unavailable writer region.
    pub fn buffer_unavailable(reason: impl Into<String>) -> Self {
        TelemetryError::BufferUnavailable { reason: reason.into(), source: None }
    }

    /// Helper constructor for an unavailable writer region with source.
    pub fn buffer_unavailable_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::BufferUnavailable { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for malformed schema entries.
    pub fn malformed_schema(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        TelemetryError::MalformedSchema { variable: variable.into(), reason: reason.into() }
    }

    /// Helper constructor for session-description parse failures.
    pub fn parse_error(line: usize, reason: impl Into<String>) -> Self {
        TelemetryError::Parse { line, reason: reason.into() }
    }

    /// Helper constructor for absent lookup keys.
    pub fn not_found(key: impl std::fmt::Display) -> Self {
        TelemetryError::NotFound { key: key.to_string() }
    }

    /// Helper constructor for binary capture format errors.
    pub fn format_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Format { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for buffer operation errors.
    pub fn buffer_operation_error(context: impl Into<String>, buffer_index: Option<usize>) -> Self {
        TelemetryError::Buffer { context: context.into(), buffer_index }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        TelemetryError::WindowsApi { operation: operation.into(), source }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        let line = err.location().map(|location| location.line()).unwrap_or(0);
        TelemetryError::Parse { line, reason: err.to_string() }
    }
}

#[cfg(windows)]
impl From<core::Error> for TelemetryError {
    fn from(err: core::Error) -> Self {
        TelemetryError::WindowsApi {
            operation: "Unknown Windows operation".to_string(),
            source: err,
        }
    }
}
