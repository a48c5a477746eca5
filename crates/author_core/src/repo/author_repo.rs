//! Author repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete and the two lookups over the `author` table.
//! - Keep SQL and the raw 16-byte id encoding inside the persistence boundary.
//!
//! # Invariants
//! - The repository borrows the caller's connection and never opens, closes
//!   or caches anything.
//! - Malformed ids are rejected before any statement is prepared.
//! - Username search matches the sanitized fragment literally.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::author::{Author, AuthorValidationError};
use crate::model::id::{parse_author_id, AuthorId, AuthorIdSource};
use crate::model::rules::sanitize_text;
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUTHOR_TABLE: &str = "author";
const AUTHOR_COLUMNS: &[&str] = &[
    "authorId",
    "authorActivationToken",
    "authorAvatarUrl",
    "authorEmail",
    "authorHash",
    "authorUsername",
];
const AUTHOR_SELECT_SQL: &str = "SELECT
    authorId,
    authorActivationToken,
    authorAvatarUrl,
    authorEmail,
    authorHash,
    authorUsername
FROM author";
const LIKE_ESCAPE: char = '\\';

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of the backing store, or data in it that is not a valid author.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    CorruptRow(AuthorValidationError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CorruptRow(err) => write!(f, "invalid persisted author data: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::CorruptRow(err) => Some(err),
        }
    }
}

/// Repository error for author persistence and lookups.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input failed an author rule; nothing reached storage.
    Validation(AuthorValidationError),
    /// Username search fragment was empty after sanitizing.
    EmptyFragment,
    Storage(StorageError),
    NotFound(AuthorId),
    ActivationTokenMismatch(AuthorId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns true when the store failed or returned corrupt data, as
    /// opposed to the caller supplying bad input.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmptyFragment => write!(f, "username search fragment is empty or insecure"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "author not found: {id}"),
            Self::ActivationTokenMismatch(id) => {
                write!(f, "activation token does not match author {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthorValidationError> for RepoError {
    fn from(value: AuthorValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(StorageError::Db(value))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Db(DbError::Sqlite(value)))
    }
}

/// Repository interface for author persistence.
pub trait AuthorRepository {
    /// Inserts a new row keyed by the author's id.
    fn insert_author(&self, author: &Author) -> RepoResult<()>;
    /// Overwrites every column of the matching row and returns the number of
    /// rows changed. Zero is not an error here.
    fn update_author(&self, author: &Author) -> RepoResult<usize>;
    /// Deletes the matching row and returns the number of rows removed.
    fn delete_author(&self, author: &Author) -> RepoResult<usize>;
    /// Looks up one author; `id` is validated before any SQL runs.
    fn find_author_by_id(&self, id: impl AuthorIdSource) -> RepoResult<Option<Author>>;
    /// Returns every author whose username contains `fragment`, in storage
    /// order.
    fn find_authors_by_username(&self, fragment: &str) -> RepoResult<Vec<Author>>;
}

/// SQLite-backed author repository over a caller-owned connection.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Wraps a connection whose author schema is already in place.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `author`
    ///   table does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn insert_author(&self, author: &Author) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO author (
                authorId,
                authorActivationToken,
                authorAvatarUrl,
                authorEmail,
                authorHash,
                authorUsername
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                author.id().as_bytes().as_slice(),
                author.activation_token(),
                author.avatar_url(),
                author.email(),
                author.password_hash(),
                author.username(),
            ],
        )?;

        debug!("event=author_insert module=repo status=ok author_id={}", author.id());
        Ok(())
    }

    fn update_author(&self, author: &Author) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE author
             SET
                authorActivationToken = ?2,
                authorAvatarUrl = ?3,
                authorEmail = ?4,
                authorHash = ?5,
                authorUsername = ?6
             WHERE authorId = ?1;",
            params![
                author.id().as_bytes().as_slice(),
                author.activation_token(),
                author.avatar_url(),
                author.email(),
                author.password_hash(),
                author.username(),
            ],
        )?;

        debug!(
            "event=author_update module=repo status=ok author_id={} rows={changed}",
            author.id()
        );
        Ok(changed)
    }

    fn delete_author(&self, author: &Author) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM author WHERE authorId = ?1;",
            [author.id().as_bytes().as_slice()],
        )?;

        debug!(
            "event=author_delete module=repo status=ok author_id={} rows={changed}",
            author.id()
        );
        Ok(changed)
    }

    fn find_author_by_id(&self, id: impl AuthorIdSource) -> RepoResult<Option<Author>> {
        let id = parse_author_id(id)?;

        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE authorId = ?1;"))?;
        let mut rows = stmt.query([id.as_bytes().as_slice()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }

        Ok(None)
    }

    fn find_authors_by_username(&self, fragment: &str) -> RepoResult<Vec<Author>> {
        let fragment = sanitize_text(fragment);
        if fragment.is_empty() {
            return Err(RepoError::EmptyFragment);
        }
        let pattern = format!("%{}%", escape_like(&fragment));

        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL} WHERE authorUsername LIKE ?1 ESCAPE '{LIKE_ESCAPE}';"
        ))?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }

        debug!(
            "event=author_search module=repo status=ok fragment_chars={} matches={}",
            fragment.chars().count(),
            authors.len()
        );
        Ok(authors)
    }
}

/// Escapes LIKE metacharacters so `value` only matches itself.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id: Vec<u8> = row.get("authorId")?;
    let activation_token: Option<String> = row.get("authorActivationToken")?;
    let avatar_url: String = row.get("authorAvatarUrl")?;
    let email: String = row.get("authorEmail")?;
    let password_hash: String = row.get("authorHash")?;
    let username: String = row.get("authorUsername")?;

    Author::new(
        id.as_slice(),
        activation_token.as_deref(),
        &avatar_url,
        &email,
        &password_hash,
        &username,
    )
    .map_err(|err| {
        warn!(
            "event=author_read module=repo status=error error_code=corrupt_row field={}",
            err.field()
        );
        RepoError::Storage(StorageError::CorruptRow(err))
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([AUTHOR_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(AUTHOR_TABLE));
    }

    if let Some(column) = AUTHOR_COLUMNS
        .iter()
        .copied()
        .find(|required| !columns.iter().any(|name| name.as_str() == *required))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: AUTHOR_TABLE,
            column,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_escapes_wildcards_and_escape_char() {
        assert_eq!(escape_like("alice"), "alice");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
