//! Command-line front end for the author store.
//!
//! # Responsibility
//! - Open (or create) a SQLite author database and run one command on it.
//! - Print author snapshots as JSON on stdout, failures on stderr.
//!
//! Logging is enabled only when `AUTHOR_LOG_DIR` is set; the level comes
//! from `AUTHOR_LOG_LEVEL` or the build-mode default.

use author_core::db::open_db;
use author_core::{
    default_log_level, init_logging, Author, AuthorService, SqliteAuthorRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: author_cli <db-path> <command>
commands:
  add <username> <email> <avatar-url> <password-hash> [activation-token]
  get <id>
  find <username-fragment>
  activate <id> <activation-token>
  delete <id>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [db_path, command, rest @ ..] = args else {
        return Err(USAGE.into());
    };

    if let Ok(log_dir) = std::env::var("AUTHOR_LOG_DIR") {
        let level = std::env::var("AUTHOR_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir)?;
    }

    let conn = open_db(db_path)?;
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn)?);
    info!("event=cli_command module=cli status=start command={command}");

    match (command.as_str(), rest) {
        ("add", [username, email, avatar_url, password_hash, token @ ..]) if token.len() <= 1 => {
            let author = Author::generate(
                token.first().map(String::as_str),
                avatar_url,
                email,
                password_hash,
                username,
            )?;
            service.register_author(&author)?;
            print_json(&author)
        }
        ("get", [id]) => match service.get_author(id)? {
            Some(author) => print_json(&author),
            None => Err(format!("author not found: {id}").into()),
        },
        ("find", [fragment]) => print_json(&service.search_authors(fragment)?),
        ("activate", [id, token]) => print_json(&service.activate_author(id, token)?),
        ("delete", [id]) => print_json(&service.delete_existing_author(id)?),
        _ => Err(USAGE.into()),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
