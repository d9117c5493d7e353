pub mod cache;
pub mod compdb;
pub mod config;
pub mod errors;
pub mod flags;
pub mod models;
pub mod resolver;

pub use compdb::{CompilationDatabase, CompileCommand, DatabaseError, FlagMap};
pub use config::{CliOverrides, InvalidationPolicy, ResolverConfig};
pub use errors::ResolveError;
pub use flags::{extract_flags, FlagExtractor};
pub use resolver::{resolve_flags, FlagResolver, FlagSource, Resolution};
