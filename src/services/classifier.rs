//! Active/expired classification.

use crate::models::PublicationRecord;

/// Classifies records by a status token.
#[derive(Debug, Clone)]
pub struct ActiveClassifier {
    token: String,
}

impl ActiveClassifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// A record is active iff its status contains the token (case-sensitive).
    pub fn is_active(&self, record: &PublicationRecord) -> bool {
        record.status.contains(&self.token)
    }

    /// Keep only active records, preserving input order.
    pub fn classify_active<'a, I>(&self, records: I) -> Vec<&'a PublicationRecord>
    where
        I: IntoIterator<Item = &'a PublicationRecord>,
    {
        records.into_iter().filter(|r| self.is_active(r)).collect()
    }
}
