//! Author identifier parsing.
//!
//! # Responsibility
//! - Turn caller-provided identifier representations into a canonical `Uuid`.
//!
//! # Invariants
//! - Accepted inputs are a `Uuid`, any textual form `uuid` understands, or
//!   the raw 16-byte encoding used by storage.
//! - The nil UUID is never a valid author id.

use crate::model::author::{AuthorField, AuthorValidationError};
use uuid::Uuid;

/// Stable identifier for every author.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type AuthorId = Uuid;

/// Any value that can be interpreted as an author identifier.
pub trait AuthorIdSource {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError>;
}

impl AuthorIdSource for Uuid {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        reject_nil(*self)
    }
}

impl AuthorIdSource for str {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        let uuid = Uuid::parse_str(self.trim()).map_err(|err| invalid(err.to_string()))?;
        reject_nil(uuid)
    }
}

impl AuthorIdSource for String {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        self.as_str().to_author_id()
    }
}

/// Exactly 16 bytes are always read as the raw storage encoding, even when
/// they happen to be valid UTF-8. No textual UUID form is 16 characters long,
/// so text callers lose nothing; they should pass `&str` instead.
impl AuthorIdSource for [u8] {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        if self.len() == 16 {
            let uuid = Uuid::from_slice(self).map_err(|err| invalid(err.to_string()))?;
            return reject_nil(uuid);
        }

        // Anything other than the raw encoding must be textual.
        match std::str::from_utf8(self) {
            Ok(text) => text.to_author_id(),
            Err(_) => Err(invalid(format!(
                "expected 16 raw bytes or UTF-8 text, got {} bytes",
                self.len()
            ))),
        }
    }
}

impl AuthorIdSource for [u8; 16] {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        reject_nil(Uuid::from_bytes(*self))
    }
}

impl AuthorIdSource for Vec<u8> {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        self.as_slice().to_author_id()
    }
}

impl<T: AuthorIdSource + ?Sized> AuthorIdSource for &T {
    fn to_author_id(&self) -> Result<AuthorId, AuthorValidationError> {
        (**self).to_author_id()
    }
}

/// Parses and validates an author identifier.
///
/// # Errors
/// - Returns `InvalidIdentifier` when `source` is not a 128-bit UUID or is nil.
pub fn parse_author_id(source: impl AuthorIdSource) -> Result<AuthorId, AuthorValidationError> {
    source.to_author_id()
}

fn reject_nil(uuid: Uuid) -> Result<AuthorId, AuthorValidationError> {
    if uuid.is_nil() {
        return Err(invalid("nil uuid is not a valid author id".to_string()));
    }
    Ok(uuid)
}

fn invalid(reason: String) -> AuthorValidationError {
    AuthorValidationError::InvalidIdentifier {
        field: AuthorField::Id,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_author_id;
    use crate::model::author::ValidationKind;
    use uuid::Uuid;

    const SAMPLE: &str = "11111111-2222-4333-8444-555555555555";

    #[test]
    fn parses_hyphenated_and_simple_text() {
        let expected = Uuid::parse_str(SAMPLE).unwrap();
        assert_eq!(parse_author_id(SAMPLE).unwrap(), expected);
        assert_eq!(
            parse_author_id("11111111222243338444555555555555").unwrap(),
            expected
        );
        assert_eq!(parse_author_id(format!(" {SAMPLE} ")).unwrap(), expected);
    }

    #[test]
    fn parses_raw_bytes() {
        let expected = Uuid::parse_str(SAMPLE).unwrap();
        let bytes = *expected.as_bytes();
        assert_eq!(parse_author_id(bytes).unwrap(), expected);
        assert_eq!(parse_author_id(bytes.to_vec()).unwrap(), expected);
        assert_eq!(parse_author_id(&bytes[..]).unwrap(), expected);
    }

    #[test]
    fn textual_bytes_fall_back_to_string_parsing() {
        let expected = Uuid::parse_str(SAMPLE).unwrap();
        assert_eq!(parse_author_id(SAMPLE.as_bytes()).unwrap(), expected);
    }

    #[test]
    fn sixteen_bytes_are_raw_even_when_textual() {
        let raw = b"not-a-uuid-12345";
        assert_eq!(
            parse_author_id(&raw[..]).unwrap(),
            Uuid::from_bytes(*raw)
        );

        let err = parse_author_id("not-a-uuid-12345").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidIdentifier);
    }

    #[test]
    fn rejects_garbage_and_nil() {
        let err = parse_author_id("not-a-uuid").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidIdentifier);

        let err = parse_author_id(Uuid::nil()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidIdentifier);

        let err = parse_author_id(&[0xff_u8, 0xfe, 0x01][..]).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidIdentifier);
    }
}
