// src/pipeline/tracker.rs

//! Publication tracker: cycle execution and on-demand queries.
//!
//! The tracker is the single owner of cycle state:
//! - the index snapshot, replaced whole after each successful fetch
//! - the diff engine, locked for the duration of a cycle so cycles never
//!   overlap
//! - the subscriber registry
//!
//! A failing cycle returns before anything is replaced.

use std::sync::Arc;
use std::time::Instant;

use chrono::{FixedOffset, NaiveDateTime};
use tokio::sync::Mutex;

use crate::artifacts::{Artifact, ArtifactExporter, file_stem};
use crate::error::{AppError, Result};
use crate::models::{Alert, Config, PublicationRecord, RecipientId};
use crate::pipeline::diff::DiffEngine;
use crate::pipeline::index::{IndexStore, IndexedPublication, PublicationIndex};
use crate::services::formatter::format_alert;
use crate::services::{
    ActiveClassifier, NotificationSink, Notifier, NotifyReport, PageFetcher, SubscriberRegistry,
    TableExtractor,
};
use crate::utils::dates::source_now;

/// Outcome of one completed cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Records in the rebuilt index
    pub total: usize,
    /// Active records in the rebuilt index
    pub active: usize,
    /// Ids announced this cycle, in page order
    pub new_ids: Vec<String>,
    pub notifications: NotifyReport,
    pub elapsed_ms: u64,
}

/// Tracks the listing page and notifies subscribers about new publications.
pub struct Tracker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: TableExtractor,
    classifier: ActiveClassifier,
    notifier: Notifier,
    offset: FixedOffset,
    index: IndexStore,
    diff: Mutex<DiffEngine>,
    subscribers: SubscriberRegistry,
}

impl Tracker {
    /// Build a tracker from configuration and its collaborators.
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let offset = config.source.offset().ok_or_else(|| {
            AppError::config(format!(
                "invalid utc offset {} minutes",
                config.source.utc_offset_minutes
            ))
        })?;

        Ok(Self {
            fetcher,
            extractor: TableExtractor::new(&config.source)?,
            classifier: ActiveClassifier::new(&config.source.active_token),
            notifier: Notifier::new(sink, &config.delivery),
            offset,
            index: IndexStore::new(),
            diff: Mutex::new(DiffEngine::new(config.scheduler.diff_policy)),
            subscribers: SubscriberRegistry::new(),
        })
    }

    /// Run one fetch → extract → index → classify → diff → notify cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let start = Instant::now();
        let mut diff = self.diff.lock().await;

        let index = self.index.replace(self.load().await?);
        let active_ids = index.active_ids(&self.classifier);
        let new_ids = diff.detect_new(&active_ids);

        let notifications = if new_ids.is_empty() {
            NotifyReport::default()
        } else {
            let recipients = self.subscribers.snapshot();
            log::info!(
                "{} new publication(s), notifying {} subscriber(s)",
                new_ids.len(),
                recipients.len()
            );
            self.notifier
                .notify(&new_ids, &index, &recipients, self.now())
                .await
        };

        drop(diff);

        Ok(CycleReport {
            total: index.len(),
            active: active_ids.len(),
            new_ids,
            notifications,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Fetch and rebuild the index without diffing or notifying.
    ///
    /// Returns the number of indexed records.
    pub async fn refresh(&self) -> Result<usize> {
        let _cycle = self.diff.lock().await;
        let index = self.index.replace(self.load().await?);
        Ok(index.len())
    }

    async fn load(&self) -> Result<PublicationIndex> {
        let page = self.fetcher.fetch_page().await?;
        let records = self.extractor.extract(&page)?;
        Ok(PublicationIndex::build(records))
    }

    /// Current time at the source's offset.
    pub fn now(&self) -> NaiveDateTime {
        source_now(self.offset)
    }

    /// Snapshot of the current index.
    pub fn index(&self) -> Arc<PublicationIndex> {
        self.index.snapshot()
    }

    /// Active publications in page order.
    pub fn active(&self) -> Vec<IndexedPublication> {
        self.index
            .snapshot()
            .active(&self.classifier)
            .cloned()
            .collect()
    }

    /// Active publications formatted as alerts, in page order.
    pub fn list_active(&self, now: NaiveDateTime) -> Vec<Alert> {
        self.index
            .snapshot()
            .active(&self.classifier)
            .map(|entry| format_alert(entry, now))
            .collect()
    }

    /// Look up a record by id in the current index.
    pub fn get(&self, id: &str) -> Option<PublicationRecord> {
        self.entry(id).map(|e| e.record)
    }

    /// Look up a record with its download URL.
    pub fn entry(&self, id: &str) -> Option<IndexedPublication> {
        self.index.snapshot().get(id).cloned()
    }

    /// Format one publication, if present.
    pub fn alert(&self, id: &str, now: NaiveDateTime) -> Option<Alert> {
        self.index
            .snapshot()
            .get(id)
            .map(|entry| format_alert(entry, now))
    }

    /// Add a recipient. Subscribing twice is a no-op.
    pub fn subscribe(&self, recipient: RecipientId) {
        if self.subscribers.add(recipient.clone()) {
            log::info!("Subscribed {recipient}");
        }
    }

    /// Remove a recipient. Unsubscribing an absent recipient is a no-op.
    pub fn unsubscribe(&self, recipient: &RecipientId) {
        if self.subscribers.remove(recipient) {
            log::info!("Unsubscribed {recipient}");
        }
    }

    pub fn subscribers(&self) -> Vec<RecipientId> {
        self.subscribers.snapshot()
    }

    /// Build an artifact for a publication; `None` if the id is not indexed.
    pub fn export(
        &self,
        id: &str,
        exporter: &dyn ArtifactExporter,
    ) -> Result<Option<Artifact>> {
        self.index
            .snapshot()
            .get(id)
            .map(|entry| exporter.export(entry))
            .transpose()
    }

    /// Download a publication's document; `None` if the id is not indexed.
    pub async fn download_document(&self, id: &str) -> Result<Option<Artifact>> {
        let Some(entry) = self.entry(id) else {
            return Ok(None);
        };
        let url = entry
            .download_url
            .ok_or_else(|| AppError::DocumentUnavailable(id.to_string()))?;

        let bytes = self.fetcher.fetch_document(&url).await?;

        Ok(Some(Artifact {
            filename: format!("{}.pdf", file_stem(id)),
            content_type: "application/pdf",
            bytes,
        }))
    }
}
