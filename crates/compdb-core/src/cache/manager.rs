use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::compdb::FlagMap;
use crate::config::ResolverConfig;

use super::{CacheError, CachedFlags, Result, CACHE_VERSION};

/// Cache file belonging to one compilation database
pub struct FlagCache {
    /// Path to the cache file (`<database dir>/<cache file name>`)
    cache_path: PathBuf,
}

impl FlagCache {
    /// Create a cache handle for `database_path`
    ///
    /// Nothing is read or created until `load` or `store` is called.
    pub fn new(database_path: &Path, config: &ResolverConfig) -> Self {
        let dir = database_path.parent().unwrap_or_else(|| Path::new(""));
        Self {
            cache_path: dir.join(&config.cache_file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    pub fn exists(&self) -> bool {
        self.cache_path.is_file()
    }

    /// Read the cache file
    ///
    /// Returns `CorruptedFile` if the content cannot be decoded and
    /// `VersionMismatch` if it was written with another cache format.
    pub fn load(&self) -> Result<CachedFlags> {
        let bytes = std::fs::read(&self.cache_path)?;

        let cached = CachedFlags::from_bytes(&bytes).map_err(|e| {
            warn!("Corrupted cache file {:?}: {:?}", self.cache_path, e);
            CacheError::CorruptedFile {
                path: self.cache_path.clone(),
            }
        })?;

        if !cached.is_version_compatible() {
            warn!(
                "Cache version mismatch: expected {}, found {}",
                CACHE_VERSION, cached.version
            );
            return Err(CacheError::VersionMismatch {
                expected: CACHE_VERSION,
                found: cached.version,
            });
        }

        debug!(
            "Loaded {} cached entries from {:?}",
            cached.flags.len(),
            self.cache_path
        );
        Ok(cached)
    }

    /// Write `flags` to the cache file, replacing any previous content
    pub fn store(&self, flags: &FlagMap, source_hash: &str) -> Result<()> {
        let cached = CachedFlags::new(flags.clone(), source_hash.to_string());
        let bytes = cached.to_bytes()?;
        std::fs::write(&self.cache_path, &bytes)?;

        info!(
            "Saved {} entries to cache {:?}",
            flags.len(),
            self.cache_path
        );
        Ok(())
    }

    /// Delete the cache file so the next resolve re-parses the database
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.cache_path) {
            Ok(()) => {
                info!("Cache cleared: {:?}", self.cache_path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_flags() -> FlagMap {
        let mut flags = FlagMap::default();
        flags.insert("src/a.c".to_string(), vec!["-DA".to_string(), "-O2".to_string()]);
        flags
    }

    #[test]
    fn test_cache_path_is_sibling_of_database() {
        let cache = FlagCache::new(
            Path::new("/work/build/compile_commands.json"),
            &ResolverConfig::default(),
        );
        assert_eq!(cache.path(), Path::new("/work/build/cached_options.txt"));
    }

    #[test]
    fn test_cache_path_for_bare_file_name() {
        let cache = FlagCache::new(
            Path::new("compile_commands.json"),
            &ResolverConfig::default(),
        );
        assert_eq!(cache.path(), Path::new("cached_options.txt"));
    }

    #[test]
    fn test_store_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FlagCache::new(
            &temp_dir.path().join("compile_commands.json"),
            &ResolverConfig::default(),
        );
        assert!(!cache.exists());

        cache.store(&sample_flags(), "abc").unwrap();
        assert!(cache.exists());

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.flags, sample_flags());
        assert_eq!(loaded.source_hash, "abc");
    }

    #[test]
    fn test_load_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FlagCache::new(
            &temp_dir.path().join("compile_commands.json"),
            &ResolverConfig::default(),
        );
        std::fs::write(cache.path(), b"\x01\x02").unwrap();

        assert!(matches!(
            cache.load(),
            Err(CacheError::CorruptedFile { .. })
        ));
    }

    #[test]
    fn test_load_other_version() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FlagCache::new(
            &temp_dir.path().join("compile_commands.json"),
            &ResolverConfig::default(),
        );
        let mut cached = CachedFlags::new(sample_flags(), String::new());
        cached.version = CACHE_VERSION + 1;
        std::fs::write(cache.path(), cached.to_bytes().unwrap()).unwrap();

        assert!(matches!(
            cache.load(),
            Err(CacheError::VersionMismatch { found, .. }) if found == CACHE_VERSION + 1
        ));
    }

    #[test]
    fn test_clear_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FlagCache::new(
            &temp_dir.path().join("compile_commands.json"),
            &ResolverConfig::default(),
        );
        cache.store(&sample_flags(), "abc").unwrap();
        cache.clear().unwrap();
        assert!(!cache.exists());

        // Clearing a missing cache is not an error
        cache.clear().unwrap();
    }
}
