//! Publication data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text shown when a row carries no document link.
pub const UNAVAILABLE: &str = "No disponible";

/// Link to the document attached to a publication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum DocumentLink {
    /// Absolute URL to the document
    Available(String),
    /// The row had no anchor in its document cell
    Unavailable,
}

impl DocumentLink {
    /// URL of the document, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Available(url) => Some(url),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl fmt::Display for DocumentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(url) => f.write_str(url),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// One row of the source listing at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationRecord {
    /// Listing identifier, unique within one fetch
    pub id: String,

    /// Free text description
    pub description: String,

    /// Publication date as shown by the source
    pub published_at: String,

    /// Expiry date as shown by the source
    pub expires_at: String,

    /// Status text (contains the active token while open)
    pub status: String,

    /// Document attached to the row
    pub document_url: DocumentLink,
}
