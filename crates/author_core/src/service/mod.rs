//! Author use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Add "row must exist" semantics the repository leaves to callers.

pub mod author_service;
