//! Reader and provider configuration.
//!
//! Both configs deserialize from YAML with every field optional:
//!
//! ```rust
//! use paddock::ProviderConfig;
//!
//! let config = ProviderConfig::from_yaml_str("reader:\n  retry_budget: 3\nparse_session: false\n").unwrap();
//! assert_eq!(config.reader.retry_budget, 3);
//! assert_eq!(config.reader.slot_count, 4);
//! assert!(!config.parse_session);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::header::MAX_SLOTS;
use crate::{Result, TelemetryError};

/// Knobs for [`BufferReader`](crate::memory::BufferReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Copy attempts per read before giving up with a torn read.
    pub retry_budget: u32,
    /// Upper bound on rotating slots considered (1..=4).
    pub slot_count: usize,
    /// Bound on waits for the writer's data-ready signal, in milliseconds.
    pub poll_timeout_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { retry_budget: 2, slot_count: MAX_SLOTS, poll_timeout_ms: 16 }
    }
}

impl ReaderConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_budget == 0 {
            return Err(TelemetryError::Config { details: "retry_budget must be at least 1".to_string() });
        }
        if !(1..=MAX_SLOTS).contains(&self.slot_count) {
            return Err(TelemetryError::Config {
                details: format!("slot_count {} outside 1..={MAX_SLOTS}", self.slot_count),
            });
        }
        Ok(())
    }
}

/// Knobs for [`SessionDataProvider`](crate::provider::SessionDataProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub reader: ReaderConfig,
    /// Parse the session description when its generation marker changes.
    pub parse_session: bool,
    /// Reject schemas whose well-known variables have an unexpected shape.
    pub check_known_variables: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { reader: ReaderConfig::default(), parse_session: true, check_known_variables: false }
    }
}

impl ProviderConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(text).map_err(|err| TelemetryError::Config {
            details: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reader.validate()
    }
}
