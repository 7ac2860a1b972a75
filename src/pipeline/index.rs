//! Publication index keyed by listing id.
//!
//! Rebuilt wholesale from every successful fetch and published to readers as
//! an immutable snapshot, so a reader sees either the previous complete index
//! or the new one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::PublicationRecord;
use crate::services::ActiveClassifier;
use crate::utils::url::direct_download_url;

/// A record together with its normalized download URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexedPublication {
    pub record: PublicationRecord,
    /// Direct-download URL, `None` when the row has no document
    pub download_url: Option<String>,
}

impl IndexedPublication {
    fn new(record: PublicationRecord) -> Self {
        let download_url = record.document_url.url().map(direct_download_url);
        Self {
            record,
            download_url,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// Immutable mapping from publication id to its entry, in page order.
#[derive(Debug, Clone, Default)]
pub struct PublicationIndex {
    entries: Vec<IndexedPublication>,
    positions: HashMap<String, usize>,
}

impl PublicationIndex {
    /// Build an index from one fetch.
    ///
    /// Ids are expected to be unique; a repeated id keeps its first row.
    pub fn build(records: Vec<PublicationRecord>) -> Self {
        let mut entries = Vec::with_capacity(records.len());
        let mut positions = HashMap::with_capacity(records.len());

        for record in records {
            if positions.contains_key(&record.id) {
                log::warn!("Duplicate publication id {} dropped", record.id);
                continue;
            }
            positions.insert(record.id.clone(), entries.len());
            entries.push(IndexedPublication::new(record));
        }

        Self { entries, positions }
    }

    pub fn get(&self, id: &str) -> Option<&IndexedPublication> {
        self.positions.get(id).map(|&i| &self.entries[i])
    }

    /// All entries in page order.
    pub fn all(&self) -> &[IndexedPublication] {
        &self.entries
    }

    /// Active entries in page order.
    pub fn active<'a>(
        &'a self,
        classifier: &'a ActiveClassifier,
    ) -> impl Iterator<Item = &'a IndexedPublication> + 'a {
        self.entries
            .iter()
            .filter(move |e| classifier.is_active(&e.record))
    }

    /// Ids of active entries in page order.
    pub fn active_ids(&self, classifier: &ActiveClassifier) -> Vec<String> {
        self.active(classifier).map(|e| e.record.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holder of the current index snapshot.
///
/// The lock only guards the pointer swap; readers clone the `Arc` and work
/// on a snapshot that can no longer change.
#[derive(Debug, Default)]
pub struct IndexStore {
    current: RwLock<Arc<PublicationIndex>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<PublicationIndex> {
        self.current.read().clone()
    }

    /// Replace the whole index at once.
    pub fn replace(&self, index: PublicationIndex) -> Arc<PublicationIndex> {
        let index = Arc::new(index);
        *self.current.write() = Arc::clone(&index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentLink;

    fn record(id: &str, status: &str, link: DocumentLink) -> PublicationRecord {
        PublicationRecord {
            id: id.into(),
            description: format!("Publicación {id}"),
            published_at: "2024-10-01 08:00:00".into(),
            expires_at: "2024-10-10 17:00:00".into(),
            status: status.into(),
            document_url: link,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let index = PublicationIndex::build(vec![
            record("1", "Vigente", DocumentLink::Unavailable),
            record("2", "Vencido", DocumentLink::Unavailable),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("2").unwrap().record.status, "Vencido");
        assert!(index.get("3").is_none());
    }

    #[test]
    fn test_drive_links_are_rewritten() {
        let index = PublicationIndex::build(vec![
            record(
                "1",
                "Vigente",
                DocumentLink::Available("https://drive.google.com/file/d/XYZ123/view".into()),
            ),
            record(
                "2",
                "Vigente",
                DocumentLink::Available("https://example.com/a.pdf".into()),
            ),
            record("3", "Vigente", DocumentLink::Unavailable),
        ]);
        assert_eq!(
            index.get("1").unwrap().download_url.as_deref(),
            Some("https://drive.google.com/uc?export=download&id=XYZ123")
        );
        assert_eq!(
            index.get("2").unwrap().download_url.as_deref(),
            Some("https://example.com/a.pdf")
        );
        assert_eq!(index.get("3").unwrap().download_url, None);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let index = PublicationIndex::build(vec![
            record("1", "Vigente", DocumentLink::Unavailable),
            record("1", "Vencido", DocumentLink::Unavailable),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().record.status, "Vigente");
    }

    #[test]
    fn test_active_ids_in_page_order() {
        let index = PublicationIndex::build(vec![
            record("9", "Vigente", DocumentLink::Unavailable),
            record("4", "Vencido", DocumentLink::Unavailable),
            record("5", "Vigente", DocumentLink::Unavailable),
        ]);
        let classifier = ActiveClassifier::new("Vigente");
        assert_eq!(index.active_ids(&classifier), vec!["9", "5"]);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = IndexStore::new();
        store.replace(PublicationIndex::build(vec![record(
            "1",
            "Vigente",
            DocumentLink::Unavailable,
        )]));
        let old = store.snapshot();

        store.replace(PublicationIndex::build(vec![]));

        assert_eq!(old.len(), 1);
        assert!(store.snapshot().is_empty());
    }
}
