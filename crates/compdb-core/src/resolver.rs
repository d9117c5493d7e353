//! Cache-or-parse resolution of per-file compiler flags

use std::path::Path;
use tracing::{debug, info, warn};

use crate::cache::{hash_bytes, CacheError, FlagCache};
use crate::compdb::{CompilationDatabase, FlagMap};
use crate::config::{InvalidationPolicy, ResolverConfig};
use crate::errors::ResolveError;

/// Where a resolved flag map came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    /// The database was decoded and the cache (re)written
    Parsed,
    /// The cache file was used and the database was not read
    Cached,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub flags: FlagMap,
    pub source: FlagSource,
}

impl Resolution {
    /// Flags for `file`, or `None` if the database has no entry for it
    pub fn lookup(&self, file: &str) -> Option<&[String]> {
        self.flags.get(file).map(Vec::as_slice)
    }
}

/// Resolves flag maps for compilation databases
pub struct FlagResolver {
    config: ResolverConfig,
}

impl FlagResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Cache handle for `database_path` under this resolver's configuration
    pub fn cache_for(&self, database_path: &Path) -> FlagCache {
        FlagCache::new(database_path, &self.config)
    }

    /// Produce the flag map for `database_path`
    ///
    /// With the existence policy an existing cache file is returned as-is and
    /// the database is never opened, even if it changed since the cache was
    /// written. Delete the cache (see `clear_cache`) to pick up changes.
    pub fn resolve(&self, database_path: &Path) -> Result<Resolution, ResolveError> {
        if !self.config.use_cache {
            debug!("Cache disabled, parsing {:?}", database_path);
            let bytes = CompilationDatabase::read_bytes(database_path)?;
            let flags = CompilationDatabase::from_slice(&bytes, database_path)?.to_flag_map();
            return Ok(Resolution {
                flags,
                source: FlagSource::Parsed,
            });
        }

        let cache = self.cache_for(database_path);

        if cache.exists() {
            match cache.load() {
                Ok(cached) => match self.config.invalidation {
                    InvalidationPolicy::Existence => {
                        debug!("Using cache {:?}", cache.path());
                        return Ok(Resolution {
                            flags: cached.flags,
                            source: FlagSource::Cached,
                        });
                    }
                    InvalidationPolicy::ContentHash => {
                        let bytes = CompilationDatabase::read_bytes(database_path)?;
                        if hash_bytes(&bytes) == cached.source_hash {
                            debug!("Cache {:?} matches database content", cache.path());
                            return Ok(Resolution {
                                flags: cached.flags,
                                source: FlagSource::Cached,
                            });
                        }
                        info!("Compilation database changed, rebuilding cache");
                        return self.parse_and_store(&cache, database_path, bytes);
                    }
                },
                Err(CacheError::VersionMismatch { .. }) => {
                    warn!("Discarding cache written by another version");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let bytes = CompilationDatabase::read_bytes(database_path)?;
        self.parse_and_store(&cache, database_path, bytes)
    }

    fn parse_and_store(
        &self,
        cache: &FlagCache,
        database_path: &Path,
        bytes: Vec<u8>,
    ) -> Result<Resolution, ResolveError> {
        let database = CompilationDatabase::from_slice(&bytes, database_path)?;
        let flags = database.to_flag_map();
        info!(
            "Parsed {} compile commands ({} files) from {:?}",
            database.len(),
            flags.len(),
            database_path
        );

        cache.store(&flags, &hash_bytes(&bytes))?;

        Ok(Resolution {
            flags,
            source: FlagSource::Parsed,
        })
    }

    /// Flags recorded for `target_file`, `None` on a lookup miss
    pub fn flags_for(
        &self,
        database_path: &Path,
        target_file: &str,
    ) -> Result<Option<Vec<String>>, ResolveError> {
        let mut resolution = self.resolve(database_path)?;
        let flags = resolution.flags.swap_remove(target_file);
        if flags.is_none() {
            debug!("No entry for {:?} in {:?}", target_file, database_path);
        }
        Ok(flags)
    }

    /// Remove the cache file for `database_path`, if any
    pub fn clear_cache(&self, database_path: &Path) -> Result<(), ResolveError> {
        self.cache_for(database_path).clear()?;
        Ok(())
    }
}

impl Default for FlagResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

/// Flags for `target_file` using the default configuration
///
/// A file missing from the database yields an empty list.
pub fn resolve_flags(database_path: &Path, target_file: &str) -> Result<Vec<String>, ResolveError> {
    Ok(FlagResolver::default()
        .flags_for(database_path, target_file)?
        .unwrap_or_default())
}
