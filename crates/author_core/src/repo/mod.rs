//! Repository layer for author persistence.
//!
//! # Responsibility
//! - Define the author data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Only parameterized statements reach SQLite.
//! - Read paths rebuild authors through `Author::new` and reject invalid
//!   persisted state instead of masking it.

pub mod author_repo;
