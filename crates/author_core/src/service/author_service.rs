//! Author use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for registering, finding and editing authors.
//! - Turn zero-row writes into `RepoError::NotFound`.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::author::Author;
use crate::model::id::{parse_author_id, AuthorIdSource};
use crate::model::rules::normalize_activation_token;
use crate::repo::author_repo::{AuthorRepository, RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for author operations.
pub struct AuthorService<R: AuthorRepository> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new author.
    pub fn register_author(&self, author: &Author) -> RepoResult<()> {
        self.repo.insert_author(author)?;
        info!(
            "event=author_register module=service status=ok author_id={} pending_activation={}",
            author.id(),
            author.activation_token().is_some()
        );
        Ok(())
    }

    pub fn get_author(&self, id: impl AuthorIdSource) -> RepoResult<Option<Author>> {
        self.repo.find_author_by_id(id)
    }

    pub fn search_authors(&self, fragment: &str) -> RepoResult<Vec<Author>> {
        self.repo.find_authors_by_username(fragment)
    }

    /// Updates an author that must already be stored.
    ///
    /// # Errors
    /// - `NotFound` when no row has the author's id.
    pub fn update_existing_author(&self, author: &Author) -> RepoResult<()> {
        if self.repo.update_author(author)? == 0 {
            return Err(RepoError::NotFound(author.id()));
        }
        Ok(())
    }

    /// Deletes a stored author by id and returns the removed record.
    pub fn delete_existing_author(&self, id: impl AuthorIdSource) -> RepoResult<Author> {
        let id = parse_author_id(id)?;
        let author = self
            .repo
            .find_author_by_id(id)?
            .ok_or(RepoError::NotFound(id))?;

        if self.repo.delete_author(&author)? == 0 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=author_delete module=service status=ok author_id={id}");
        Ok(author)
    }

    /// Clears a pending activation token when `token` matches it.
    ///
    /// Activating an already active author is reported as a mismatch.
    pub fn activate_author(&self, id: impl AuthorIdSource, token: &str) -> RepoResult<Author> {
        let id = parse_author_id(id)?;
        let token = normalize_activation_token(token)?;
        let mut author = self
            .repo
            .find_author_by_id(id)?
            .ok_or(RepoError::NotFound(id))?;

        if author.activation_token() != Some(token.as_str()) {
            return Err(RepoError::ActivationTokenMismatch(id));
        }

        author.set_activation_token(None)?;
        self.update_existing_author(&author)?;
        info!("event=author_activate module=service status=ok author_id={id}");
        Ok(author)
    }
}
