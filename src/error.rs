// src/error.rs

//! Unified error handling for the publication tracker.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client failed outside of a page or document fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/transport failure while retrieving a page or document
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The listing page no longer has the expected structure
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A source date could not be interpreted
    #[error("Unparseable date '{0}'")]
    DateParse(String),

    /// Sending a message to one recipient failed
    #[error("Delivery to {recipient} failed: {message}")]
    Delivery { recipient: String, message: String },

    /// Requested publication is not present in the current index
    #[error("Publication {0} not found")]
    NotFound(String),

    /// Publication has no downloadable document
    #[error("Publication {0} has no document")]
    DocumentUnavailable(String),

    /// PDF rendering failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Operation exceeded its deadline
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create a delivery error for a recipient.
    pub fn delivery(recipient: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Delivery {
            recipient: recipient.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs,
        }
    }

    /// Whether the error means the page layout changed and needs an operator.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Selector { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_needs_attention() {
        assert!(AppError::extraction("table missing").needs_attention());
        assert!(!AppError::fetch("https://example.com", "refused").needs_attention());
    }

    #[test]
    fn delivery_message_names_recipient() {
        let err = AppError::delivery("42", "blocked by user");
        assert_eq!(err.to_string(), "Delivery to 42 failed: blocked by user");
    }
}
