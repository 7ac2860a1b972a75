// src/models/mod.rs

//! Domain models for the publication tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod message;
mod publication;

// Re-export all public types
pub use config::{Config, DeliveryConfig, DiffPolicy, HttpConfig, SchedulerConfig, SourceConfig};
pub use message::{Action, ActionKind, Alert, OutboundMessage, RecipientId};
pub use publication::{DocumentLink, PublicationRecord, UNAVAILABLE};
