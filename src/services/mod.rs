//! Service modules for the publication tracker.
//!
//! Leaf components of a cycle:
//! - `fetcher`: Listing page and document retrieval
//! - `extractor`: Table rows to typed records
//! - `classifier`: Active/expired filtering
//! - `formatter`: Human-readable alerts
//! - `notifier`: Fan-out to subscribers
//! - `subscribers`: Recipient registry
//! - `sink` / `telegram`: Message delivery backends

pub mod classifier;
pub mod extractor;
pub mod fetcher;
pub mod formatter;
pub mod notifier;
pub mod sink;
pub mod subscribers;
pub mod telegram;

pub use classifier::ActiveClassifier;
pub use extractor::TableExtractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use notifier::{Delivery, Notifier, NotifyReport};
pub use sink::{LogSink, NotificationSink};
pub use subscribers::SubscriberRegistry;
pub use telegram::TelegramSink;
