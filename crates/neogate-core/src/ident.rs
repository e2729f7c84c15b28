//! Identifier safety for query interpolation.
//!
//! Labels and relationship types cannot be passed as query parameters in
//! Cypher, so tools splice them into query templates as text. The guard's
//! substring scan cannot catch an identifier that assembles a forbidden
//! clause out of benign-looking fragments, so every interpolation site must
//! validate the identifier here first.

use thiserror::Error;

/// Rejection from [`validate_identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier `{0}` must not start with a digit")]
    LeadingDigit(String),

    #[error("identifier `{0}` contains characters outside letters, digits, and underscore")]
    InvalidCharacter(String),
}

/// Validate a caller-supplied label or relationship type before it is
/// interpolated into a query template.
///
/// Allowed: letters, digits, and underscore, not starting with a digit.
pub fn validate_identifier(ident: &str) -> Result<(), IdentError> {
    let mut chars = ident.chars();
    let first = chars.next().ok_or(IdentError::Empty)?;

    if first.is_ascii_digit() {
        return Err(IdentError::LeadingDigit(ident.to_string()));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(IdentError::InvalidCharacter(ident.to_string()));
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(IdentError::InvalidCharacter(ident.to_string()))
    }
}
