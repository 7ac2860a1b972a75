//! Subscriber registry.

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::models::RecipientId;

/// In-memory set of notification recipients.
///
/// Mutations may race with a notification fan-out; the fan-out works on a
/// copy taken when it starts.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    members: RwLock<BTreeSet<RecipientId>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient. Returns `false` if it was already subscribed.
    pub fn add(&self, recipient: RecipientId) -> bool {
        self.members.write().insert(recipient)
    }

    /// Remove a recipient. Returns `false` if it was not subscribed.
    pub fn remove(&self, recipient: &RecipientId) -> bool {
        self.members.write().remove(recipient)
    }

    pub fn contains(&self, recipient: &RecipientId) -> bool {
        self.members.read().contains(recipient)
    }

    /// Copy of the current members.
    pub fn snapshot(&self) -> Vec<RecipientId> {
        self.members.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}
