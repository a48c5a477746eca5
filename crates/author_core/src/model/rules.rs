//! Field rules for author data.
//!
//! # Responsibility
//! - Normalize and validate each author field in isolation.
//! - Provide the shared text sanitizer used by usernames and search fragments.
//!
//! # Invariants
//! - Rules are pure: they return the canonical value or an error, never both.
//! - Length limits count Unicode scalar values, not bytes.

use crate::model::author::{AuthorField, AuthorValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::Url;

pub const ACTIVATION_TOKEN_LEN: usize = 32;
pub const AVATAR_URL_MAX_CHARS: usize = 255;
pub const EMAIL_MAX_CHARS: usize = 128;
pub const EMAIL_LOCAL_PART_MAX_CHARS: usize = 64;
/// Encoded length of an Argon2 PHC string with the default parameters.
pub const PASSWORD_HASH_LEN: usize = 97;
pub const USERNAME_MAX_CHARS: usize = 32;

static EMAIL_DOT_ATOM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("valid email dot-atom regex")
});
// RFC 5322 quoted-string: printable ASCII, with `"` and `\` only as quoted pairs.
static EMAIL_QUOTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^"(?:[\x20\x21\x23-\x5B\x5D-\x7E]|\\[\x20-\x7E])*"$"#)
        .expect("valid email quoted-string regex")
});
static EMAIL_HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    )
    .expect("valid email hostname regex")
});
// An unterminated tag swallows the rest of the input.
static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*(?:>|$)").expect("valid markup tag regex"));

/// Normalizes an activation token to 32 lowercase hex digits.
///
/// # Errors
/// - `InvalidFormat` when the trimmed value is empty or contains non-hex digits.
/// - `InvalidLength` when the value is not exactly 32 digits long.
pub fn normalize_activation_token(raw: &str) -> Result<String, AuthorValidationError> {
    let token = raw.trim().to_ascii_lowercase();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AuthorValidationError::InvalidFormat {
            field: AuthorField::ActivationToken,
            expected: "hexadecimal digits",
        });
    }

    let actual = token.chars().count();
    if actual != ACTIVATION_TOKEN_LEN {
        return Err(AuthorValidationError::InvalidLength {
            field: AuthorField::ActivationToken,
            expected: ACTIVATION_TOKEN_LEN,
            actual,
        });
    }

    Ok(token)
}

/// Validates an absolute avatar URL and returns the trimmed input unchanged.
///
/// The parsed form is only used for validation; storing it would rewrite
/// the caller's URL (trailing slashes, case folding of the host).
pub fn validate_avatar_url(raw: &str) -> Result<String, AuthorValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_url("url is empty"));
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid_url("url contains whitespace or control characters"));
    }

    let parsed = Url::parse(trimmed).map_err(|err| invalid_url(err.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid_url(format!(
            "url with scheme `{}` has no host",
            parsed.scheme()
        )));
    }

    ensure_max_chars(AuthorField::AvatarUrl, trimmed, AVATAR_URL_MAX_CHARS)?;
    Ok(trimmed.to_string())
}

/// Validates an email address after trimming surrounding whitespace.
pub fn validate_email(raw: &str) -> Result<String, AuthorValidationError> {
    let trimmed = raw.trim();
    if !is_email_address(trimmed) {
        return Err(AuthorValidationError::InvalidEmail);
    }

    ensure_max_chars(AuthorField::Email, trimmed, EMAIL_MAX_CHARS)?;
    Ok(trimmed.to_string())
}

/// Accepts a dot-atom or quoted-string local part and either a multi-label
/// hostname or an `[IPv4]` / `[IPv6:...]` address literal.
fn is_email_address(value: &str) -> bool {
    // Quoted local parts may contain `@`; the domain never does.
    let Some((local_part, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local_part.chars().count() > EMAIL_LOCAL_PART_MAX_CHARS {
        return false;
    }
    if !EMAIL_DOT_ATOM_RE.is_match(local_part) && !EMAIL_QUOTED_RE.is_match(local_part) {
        return false;
    }

    match domain
        .strip_prefix('[')
        .and_then(|literal| literal.strip_suffix(']'))
    {
        Some(literal) => match literal.strip_prefix("IPv6:") {
            Some(v6) => v6.parse::<Ipv6Addr>().is_ok(),
            None => literal.parse::<Ipv4Addr>().is_ok(),
        },
        None => EMAIL_HOSTNAME_RE.is_match(domain),
    }
}

/// Validates a stored password hash by length only.
///
/// The hash algorithm is not inspected; any 97-character encoding passes.
pub fn validate_password_hash(raw: &str) -> Result<String, AuthorValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthorValidationError::EmptyOrInsecure {
            field: AuthorField::PasswordHash,
        });
    }

    let actual = trimmed.chars().count();
    if actual != PASSWORD_HASH_LEN {
        return Err(AuthorValidationError::InvalidLength {
            field: AuthorField::PasswordHash,
            expected: PASSWORD_HASH_LEN,
            actual,
        });
    }

    Ok(trimmed.to_string())
}

/// Sanitizes and validates a username.
pub fn validate_username(raw: &str) -> Result<String, AuthorValidationError> {
    let username = sanitize_text(raw);
    if username.is_empty() {
        return Err(AuthorValidationError::EmptyOrInsecure {
            field: AuthorField::Username,
        });
    }

    ensure_max_chars(AuthorField::Username, &username, USERNAME_MAX_CHARS)?;
    Ok(username)
}

/// Strips markup tags, angle brackets and control characters, then trims.
///
/// Shared by username validation and username search so both see the same
/// text for the same input.
pub fn sanitize_text(raw: &str) -> String {
    let without_tags = MARKUP_TAG_RE.replace_all(raw.trim(), "");
    without_tags
        .chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

fn ensure_max_chars(
    field: AuthorField,
    value: &str,
    max: usize,
) -> Result<(), AuthorValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(AuthorValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn invalid_url(reason: impl Into<String>) -> AuthorValidationError {
    AuthorValidationError::InvalidUrl {
        field: AuthorField::AvatarUrl,
        reason: reason.into(),
    }
}
