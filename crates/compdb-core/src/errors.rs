use thiserror::Error;

use crate::cache::CacheError;
use crate::compdb::DatabaseError;

/// Failure while producing a flag map
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ResolveError {
    /// True when the compilation database itself is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::Database(DatabaseError::NotFound { .. }))
    }
}
