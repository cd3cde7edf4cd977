//! Untrusted request input → typed values.
//!
//! Runs before any store access. The search term is passed through as-is;
//! case folding and substring matching belong to the store query.

use thiserror::Error;

use crate::contract::model::UserId;

/// Tag distinguishing validation failures for the transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Structurally invalid parameters (e.g. `q` supplied twice).
    Malformed,
    /// A path id that is not a plain decimal number.
    InvalidIdFormat,
}

impl ValidationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationErrorKind::Malformed => "validation_error",
            ValidationErrorKind::InvalidIdFormat => "invalid_id_format",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {cause}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: &'static str,
    pub cause: String,
}

impl ValidationError {
    pub fn malformed(field: &'static str, cause: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::Malformed,
            field,
            cause: cause.into(),
        }
    }

    pub fn invalid_id_format(cause: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidIdFormat,
            field: "id",
            cause: cause.into(),
        }
    }
}

/// Validated list/search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub fn with_query(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()) }
    }

    /// The search term, with an empty string treated as absent.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}

/// Parse a raw (still percent-encoded) query string.
///
/// Parameters other than `q` are ignored.
pub fn parse_search_params(raw_query: Option<&str>) -> Result<SearchParams, ValidationError> {
    let mut q = None;

    for (key, value) in url::form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes()) {
        if key.starts_with("q[") {
            return Err(ValidationError::malformed("q", "Expected string"));
        }
        if key != "q" {
            continue;
        }
        if q.is_some() {
            return Err(ValidationError::malformed(
                "q",
                "Expected a single value, received several",
            ));
        }
        q = Some(value.into_owned());
    }

    Ok(SearchParams { q })
}

/// Accept one or more ASCII digits and nothing else.
pub fn parse_user_id(raw: &str) -> Result<UserId, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_id_format("ID must be a number"));
    }
    raw.parse::<UserId>()
        .map_err(|_| ValidationError::invalid_id_format("ID is out of range"))
}
