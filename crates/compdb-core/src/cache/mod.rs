//! On-disk cache of parsed compilation databases
//!
//! The parsed flag map is stored next to the database so later invocations
//! can skip JSON decoding and flag extraction entirely. Under the default
//! existence policy the cache is never refreshed automatically: once the file
//! exists it stands in for the database until it is deleted.

mod entry;
mod error;
mod hash;
mod manager;

pub use entry::CachedFlags;
pub use error::{CacheError, Result};
pub use hash::{hash_bytes, hash_file};
pub use manager::FlagCache;

/// Cache format version - increment when the cached layout changes
pub const CACHE_VERSION: u32 = 1;

/// Default cache file name, created in the database's directory
pub const CACHE_FILE_NAME: &str = "cached_options.txt";
