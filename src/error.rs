//! Error types for the share upload workflow
//!
//! One error enum covers the whole crate. The variants fall into four
//! user-visible categories:
//! - precondition errors (missing token/company/project/document/file),
//!   caught before any network call
//! - transport errors (timeout, DNS, connection)
//! - API-level failures (`success: false` envelopes, non-2xx statuses)
//! - parse errors (malformed JSON bodies)
//!
//! Precondition errors are fixed by the user completing the form; everything
//! else is retryable by re-invoking the same action.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, ShareError>;

#[derive(Error, Debug)]
pub enum ShareError {
    // --- Precondition errors (checked before any I/O) ---
    /// No session token found in the app-group preference store
    #[error("Oturum bulunamadı, lütfen uygulamaya giriş yapın")]
    MissingSessionToken,

    /// No company selected
    #[error("Lütfen bir firma seçin")]
    NoCompanySelected,

    /// No project selected (or only the "no projects" sentinel is available)
    #[error("Lütfen bir proje seçin")]
    NoProjectSelected,

    /// No document type selected
    #[error("Lütfen bir belge türü seçin")]
    NoDocumentTypeSelected,

    /// Share payload contains no file item (text-only shares cannot become documents)
    #[error("Yüklenecek dosya bulunamadı")]
    NoFileAttached,

    /// Caller violated the selection dependency order or the submission lock
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid input (bad URI, unreadable preference value, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Transport errors ---
    /// Network-level failure (timeout, DNS, connection reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // --- API-level failures ---
    /// Server answered with a non-2xx status
    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Server answered 2xx but reported `success: false`
    #[error("{message}")]
    Api { message: String },

    // --- Parse errors ---
    /// Response body could not be decoded into the expected shape
    #[error("Invalid API response: {message}")]
    InvalidResponse {
        message: String,
        response_body: Option<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShareError {
    /// True for errors the user fixes by completing the form rather than retrying
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ShareError::MissingSessionToken
                | ShareError::NoCompanySelected
                | ShareError::NoProjectSelected
                | ShareError::NoDocumentTypeSelected
                | ShareError::NoFileAttached
        )
    }

    /// True when re-invoking the same action may succeed (transport, API, parse)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShareError::Network(_)
                | ShareError::RequestFailed { .. }
                | ShareError::Api { .. }
                | ShareError::InvalidResponse { .. }
                | ShareError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(ShareError::MissingSessionToken.is_precondition());
        assert!(ShareError::NoFileAttached.is_precondition());
        assert!(!ShareError::MissingSessionToken.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        let err = ShareError::Api {
            message: "Duplicate (409)".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_precondition());

        let err = ShareError::RequestFailed {
            status: 500,
            body: "oops".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_api_error_display_is_server_message() {
        let err = ShareError::Api {
            message: "Duplicate (409)".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate (409)");
    }
}
