//! # CLI Configuration
//!
//! Optional YAML file supplying defaults that command-line flags override:
//!
//! ```yaml
//! batch_size: 1024
//! encoding:
//!   width_bytes: 8
//!   big_endian: false
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use ebr_crypto::AmountEncoding;

/// Recorder capacity used when none is configured.
pub const DEFAULT_BATCH_SIZE: u64 = 1024;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Recorder capacity; indexer roots are recorded at `batch_size - 1`.
    pub batch_size: u64,
    /// Source-chain amount layout.
    pub encoding: AmountEncoding,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            encoding: AmountEncoding::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config YAML: {}", path.display()))?;
        if config.batch_size == 0 {
            bail!("batch_size must be greater than zero in {}", path.display());
        }
        Ok(config)
    }
}
