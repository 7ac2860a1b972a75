// src/services/notifier.rs

//! New-publication fan-out.
//!
//! Recipients are served concurrently, up to a limit. Each recipient gets
//! its publications one at a time in page order, so a multi-part message is
//! never interleaved with the next one. Every send has its own deadline and
//! failures are collected per pair without stopping the rest.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{DeliveryConfig, OutboundMessage, RecipientId};
use crate::pipeline::PublicationIndex;
use crate::services::NotificationSink;
use crate::services::formatter::format_alert;

/// Result of one send.
#[derive(Debug)]
pub struct Delivery {
    pub publication_id: String,
    pub recipient: RecipientId,
    pub outcome: Result<()>,
}

/// Summary of a fan-out.
#[derive(Debug, Default)]
pub struct NotifyReport {
    pub deliveries: Vec<Delivery>,
}

impl NotifyReport {
    pub fn sent(&self) -> usize {
        self.deliveries.iter().filter(|d| d.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.sent()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.outcome.is_err())
    }
}

/// Formats new publications and sends them to every subscriber.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    max_concurrent: usize,
    send_timeout: Duration,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, config: &DeliveryConfig) -> Self {
        Self {
            sink,
            max_concurrent: config.max_concurrent.max(1),
            send_timeout: config.timeout(),
        }
    }

    /// Notify `recipients` about each id in `new_ids` found in `index`.
    ///
    /// Ids missing from the index are skipped with a warning.
    pub async fn notify(
        &self,
        new_ids: &[String],
        index: &PublicationIndex,
        recipients: &[RecipientId],
        now: NaiveDateTime,
    ) -> NotifyReport {
        if new_ids.is_empty() || recipients.is_empty() {
            return NotifyReport::default();
        }

        let messages: Vec<(String, OutboundMessage)> = new_ids
            .iter()
            .filter_map(|id| match index.get(id) {
                Some(entry) => {
                    let alert = format_alert(entry, now);
                    Some((id.clone(), OutboundMessage::new_publication(&alert)))
                }
                None => {
                    log::warn!("New publication {id} missing from index, not notified");
                    None
                }
            })
            .collect();

        let messages = &messages;
        let deliveries = stream::iter(recipients.iter().cloned())
            .map(|recipient| async move {
                let mut deliveries = Vec::with_capacity(messages.len());
                for (publication_id, message) in messages {
                    let outcome = self.send_one(&recipient, message).await;
                    if let Err(e) = &outcome {
                        log::warn!("Failed to notify {recipient} about {publication_id}: {e}");
                    }
                    deliveries.push(Delivery {
                        publication_id: publication_id.clone(),
                        recipient: recipient.clone(),
                        outcome,
                    });
                }
                deliveries
            })
            .buffer_unordered(self.max_concurrent)
            .flat_map(stream::iter)
            .collect::<Vec<_>>()
            .await;

        NotifyReport { deliveries }
    }

    async fn send_one(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()> {
        match tokio::time::timeout(self.send_timeout, self.sink.send(recipient, message)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(
                format!("delivery to {recipient}"),
                self.send_timeout.as_secs(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentLink, PublicationRecord};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FlakySink {
        fail_for: Option<RecipientId>,
        sent: Mutex<Vec<(RecipientId, OutboundMessage)>>,
    }

    #[async_trait]
    impl NotificationSink for FlakySink {
        async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()> {
            if self.fail_for.as_ref() == Some(recipient) {
                return Err(AppError::delivery(recipient, "chat not found"));
            }
            self.sent.lock().push((recipient.clone(), message.clone()));
            Ok(())
        }
    }

    fn index(ids: &[&str]) -> PublicationIndex {
        PublicationIndex::build(
            ids.iter()
                .map(|id| PublicationRecord {
                    id: id.to_string(),
                    description: "Compra de útiles".into(),
                    published_at: "2024-10-01 08:00:00".into(),
                    expires_at: "2024-10-10 17:00:00".into(),
                    status: "Vigente".into(),
                    document_url: DocumentLink::Unavailable,
                })
                .collect(),
        )
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-10-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let sink = Arc::new(FlakySink {
            fail_for: Some("2".into()),
            ..FlakySink::default()
        });
        let notifier = Notifier::new(sink.clone(), &DeliveryConfig::default());
        let recipients: Vec<RecipientId> = vec!["1".into(), "2".into(), "3".into()];

        let report = notifier
            .notify(&ids(&["A", "B"]), &index(&["A", "B"]), &recipients, now())
            .await;

        assert_eq!(report.deliveries.len(), 6);
        assert_eq!(report.sent(), 4);
        assert_eq!(report.failed(), 2);
        assert!(report.failures().all(|d| d.recipient.as_str() == "2"));

        let sent = sink.sent.lock();
        assert!(sent.iter().all(|(_, m)| m.text == OutboundMessage::NEW_PUBLICATION));
        assert!(
            sent.iter()
                .all(|(_, m)| m.body.as_deref().is_some_and(|b| b.contains("Compra de útiles")))
        );
    }

    #[tokio::test]
    async fn test_no_recipients_sends_nothing() {
        let sink = Arc::new(FlakySink::default());
        let notifier = Notifier::new(sink.clone(), &DeliveryConfig::default());
        let report = notifier.notify(&ids(&["A"]), &index(&["A"]), &[], now()).await;
        assert!(report.deliveries.is_empty());
        assert!(sink.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_skipped() {
        let sink = Arc::new(FlakySink::default());
        let notifier = Notifier::new(sink.clone(), &DeliveryConfig::default());
        let report = notifier
            .notify(&ids(&["A", "Z"]), &index(&["A"]), &["1".into()], now())
            .await;
        assert_eq!(report.deliveries.len(), 1);
        assert_eq!(report.deliveries[0].publication_id, "A");
    }

    struct SlowSink;

    #[async_trait]
    impl NotificationSink for SlowSink {
        async fn send(&self, _: &RecipientId, _: &OutboundMessage) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_send_times_out() {
        let config = DeliveryConfig {
            timeout_secs: 1,
            ..DeliveryConfig::default()
        };
        let notifier = Notifier::new(Arc::new(SlowSink), &config);
        let report = notifier
            .notify(&ids(&["A"]), &index(&["A"]), &["1".into()], now())
            .await;
        assert!(matches!(
            report.deliveries[0].outcome,
            Err(AppError::Timeout { .. })
        ));
    }

    /// Records body order; sends for publication "slow" take longer.
    #[derive(Default)]
    struct OrderedSink {
        received: Mutex<Vec<(RecipientId, String)>>,
    }

    #[async_trait]
    impl NotificationSink for OrderedSink {
        async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()> {
            let body = message.body.clone().unwrap_or_default();
            if body.contains("#slow") {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            let id = if body.contains("#slow") { "slow" } else { "fast" };
            self.received.lock().push((recipient.clone(), id.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_each_recipient_gets_publications_in_order() {
        let sink = Arc::new(OrderedSink::default());
        let notifier = Notifier::new(sink.clone(), &DeliveryConfig::default());
        let recipients: Vec<RecipientId> = vec!["1".into(), "2".into()];

        let report = notifier
            .notify(
                &ids(&["slow", "fast"]),
                &index(&["slow", "fast"]),
                &recipients,
                now(),
            )
            .await;
        assert_eq!(report.sent(), 4);

        let received = sink.received.lock();
        for recipient in &recipients {
            let order: Vec<&str> = received
                .iter()
                .filter(|(r, _)| r == recipient)
                .map(|(_, id)| id.as_str())
                .collect();
            assert_eq!(order, vec!["slow", "fast"]);
        }
    }
}
