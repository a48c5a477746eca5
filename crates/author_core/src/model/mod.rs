//! Domain model for persisted authors.
//!
//! # Responsibility
//! - Define the canonical `Author` record and its wire projection.
//! - Own every field rule applied on construction, mutation and read-back.
//!
//! # Invariants
//! - An `Author` value is always fully valid; there is no half-built state.
//! - Every author is identified by a non-nil `AuthorId`.

pub mod author;
pub mod id;
pub mod rules;
