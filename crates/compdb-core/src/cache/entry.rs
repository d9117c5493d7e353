use serde::{Deserialize, Serialize};

use super::{CacheError, Result, CACHE_VERSION};
use crate::compdb::FlagMap;

/// Serialized content of the cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFlags {
    /// Schema version for cache format
    pub version: u32,

    /// Blake3 hash of the database bytes the flags were extracted from
    pub source_hash: String,

    /// Timestamp when cached (for diagnostics)
    pub cached_at: u64,

    pub flags: FlagMap,
}

impl CachedFlags {
    pub fn new(flags: FlagMap, source_hash: String) -> Self {
        Self {
            version: CACHE_VERSION,
            source_hash,
            cached_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            flags,
        }
    }

    pub fn is_version_compatible(&self) -> bool {
        self.version == CACHE_VERSION
    }

    /// Serialize to binary format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(CacheError::from)
    }

    /// Deserialize from binary format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(CacheError::from)
    }
}
