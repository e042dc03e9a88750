use serde::{Deserialize, Serialize};

use super::ahca::AhcaConfig;
use super::moeca::MoecaConfig;
use crate::quality::DEFAULT_MEMORY_LIMIT;

/// Root configuration structure for servicemap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicemapConfig {
    #[serde(default)]
    pub ahca: AhcaConfig,

    #[serde(default)]
    pub moeca: MoecaConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_memory_limit_mb() -> usize {
    DEFAULT_MEMORY_LIMIT / (1024 * 1024)
}

/// Bounds of the per-run sub-metric cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Estimated size in MiB after which the cache is cleared (default: 256)
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: default_memory_limit_mb(),
        }
    }
}

impl CacheConfig {
    pub fn memory_limit_bytes(&self) -> usize {
        self.memory_limit_mb.saturating_mul(1024 * 1024)
    }
}
