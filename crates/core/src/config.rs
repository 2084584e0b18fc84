//! Configuration for registry pools
//!
//! The process-wide pool always runs with [`PoolConfig::default`]. Callers that
//! build their own pool can tune it here.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings for a pool of idle deferral registries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of idle registries kept for reuse (None = unlimited)
    pub max_idle: Option<usize>,
    /// Initial action capacity of newly allocated registries
    pub stack_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: None,
            stack_capacity: 4,
        }
    }
}

impl PoolConfig {
    /// Cap the number of idle registries the pool keeps
    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = Some(max_idle);
        self
    }

    /// Set the initial action capacity for new registries
    #[must_use]
    pub fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    /// Check the settings for values that would make the pool useless
    pub fn validate(&self) -> Result<()> {
        if self.max_idle == Some(0) {
            return Err(Error::configuration(
                "max_idle must be greater than zero; omit it for an unbounded pool",
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
