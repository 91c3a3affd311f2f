//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Only usage errors surface through this type. A failed intent resolution
/// is reported inside the response instead, and degraded strategies simply
/// yield fewer candidates.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Recipe collection was not a list
    #[error("Invalid recipe collection: expected a list, found {0}")]
    InvalidRecipes(String),

    /// A collaborator reported failure
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// Which collaborator failed
        collaborator: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SearchError {
    /// Shorthand for a collaborator failure.
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        SearchError::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::InvalidRecipes(_) => SearchErrorCode::InvalidRecipes,
            SearchError::Collaborator { .. } => SearchErrorCode::Collaborator,
            SearchError::JsonError(_) => SearchErrorCode::JsonParsing,
        }
    }
}

/// Error code for integration with birch-core error handling.
/// Range: 11xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCode {
    /// Recipe collection was not a list
    InvalidRecipes = 11001,
    /// Collaborator failure
    Collaborator = 11003,
    /// JSON parsing error
    JsonParsing = 11004,
}

impl From<SearchError> for birch_core::Error {
    fn from(err: SearchError) -> Self {
        use birch_core::ErrorCode;

        let code = match &err {
            SearchError::InvalidRecipes(_) => ErrorCode::InvalidRecipes,
            SearchError::Collaborator { .. } => ErrorCode::CollaboratorUnavailable,
            SearchError::JsonError(_) => ErrorCode::InvalidFormat,
        };
        birch_core::Error::new(code, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            SearchError::InvalidRecipes("object".into()).code() as u32,
            11001
        );
        assert_eq!(
            SearchError::collaborator("intent resolver", "offline").code(),
            SearchErrorCode::Collaborator
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: birch_core::Error = SearchError::InvalidRecipes("string".into()).into();
        assert_eq!(err.code, birch_core::ErrorCode::InvalidRecipes);
        assert!(err.message.contains("string"));
    }
}
