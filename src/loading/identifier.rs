//! SQL identifier validation and quoting.
//!
//! Table and column names come from user input and file headers. They are never interpolated
//! raw: each name is checked, then emitted as a double-quoted identifier with embedded `"`
//! doubled.

use thiserror::Error;

/// Longest accepted identifier, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Why a name cannot be used as an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{name}' is {len} characters long (max {max})", max = MAX_IDENTIFIER_LEN)]
    TooLong { name: String, len: usize },

    #[error("identifier {name:?} contains a control character at position {position}")]
    ControlCharacter { name: String, position: usize },

    #[error("table name '{name}' has more than two dot-separated parts")]
    TooManyParts { name: String },
}

/// Check that `name` can be quoted as an identifier.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong {
            name: name.to_string(),
            len,
        });
    }
    if let Some(position) = name.chars().position(char::is_control) {
        return Err(IdentifierError::ControlCharacter {
            name: name.to_string(),
            position,
        });
    }
    Ok(())
}

/// Validate and double-quote a single identifier.
pub fn quote_identifier(name: &str) -> Result<String, IdentifierError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Validate and quote a table name, optionally schema-qualified as `schema.table`.
pub fn quote_table_name(name: &str) -> Result<String, IdentifierError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(IdentifierError::TooManyParts {
            name: name.to_string(),
        });
    }
    let quoted = parts
        .into_iter()
        .map(quote_identifier)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join("."))
}
