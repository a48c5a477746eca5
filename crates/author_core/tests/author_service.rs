use author_core::db::open_db_in_memory;
use author_core::{Author, AuthorService, RepoError, SqliteAuthorRepository, ValidationKind};
use uuid::Uuid;

const TOKEN: &str = "fedcba9876543210fedcba9876543210";

fn pending_author(username: &str) -> Author {
    Author::generate(
        Some(TOKEN),
        "https://cdn.example.com/avatar.png",
        &format!("{username}@example.com"),
        &format!("$argon2id$v=19$m=65536,t=4,p=1${}", "D".repeat(66)),
        username,
    )
    .unwrap()
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let author = pending_author("erin");
    service.register_author(&author).unwrap();

    let fetched = service.get_author(author.id()).unwrap().unwrap();
    assert_eq!(fetched, author);

    let found = service.search_authors("eri").unwrap();
    assert_eq!(found, vec![author]);
}

#[test]
fn update_existing_requires_stored_row() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let mut author = pending_author("frank");
    let err = service.update_existing_author(&author).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == author.id()));

    service.register_author(&author).unwrap();
    author.set_username("franklin").unwrap();
    service.update_existing_author(&author).unwrap();
    assert_eq!(
        service.get_author(author.id()).unwrap().unwrap().username(),
        "franklin"
    );
}

#[test]
fn delete_existing_returns_removed_author() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let author = pending_author("gina");
    service.register_author(&author).unwrap();

    let removed = service
        .delete_existing_author(author.id().to_string())
        .unwrap();
    assert_eq!(removed, author);
    assert!(service.get_author(author.id()).unwrap().is_none());

    let err = service.delete_existing_author(author.id()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn activation_clears_matching_token() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let author = pending_author("hank");
    service.register_author(&author).unwrap();

    let err = service
        .activate_author(author.id(), "00000000000000000000000000000000")
        .unwrap_err();
    assert!(matches!(err, RepoError::ActivationTokenMismatch(_)));

    let activated = service
        .activate_author(author.id(), &TOKEN.to_uppercase())
        .unwrap();
    assert_eq!(activated.activation_token(), None);

    let stored = service.get_author(author.id()).unwrap().unwrap();
    assert_eq!(stored.activation_token(), None);

    let err = service.activate_author(author.id(), TOKEN).unwrap_err();
    assert!(matches!(err, RepoError::ActivationTokenMismatch(_)));
}

#[test]
fn activation_validates_inputs_first() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let err = service.activate_author("nope", TOKEN).unwrap_err();
    assert!(
        matches!(err, RepoError::Validation(ref inner) if inner.kind() == ValidationKind::InvalidIdentifier)
    );

    let err = service.activate_author(Uuid::new_v4(), "abc123").unwrap_err();
    assert!(
        matches!(err, RepoError::Validation(ref inner) if inner.kind() == ValidationKind::InvalidLength)
    );

    let err = service
        .activate_author(Uuid::new_v4(), TOKEN)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
