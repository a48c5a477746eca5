//! Validated author entity and its SQLite persistence.
//! This crate is the single source of truth for author field invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorField, AuthorRecord, AuthorValidationError, ValidationKind};
pub use model::id::{parse_author_id, AuthorId, AuthorIdSource};
pub use repo::author_repo::{
    AuthorRepository, RepoError, RepoResult, SqliteAuthorRepository, StorageError,
};
pub use service::author_service::AuthorService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
