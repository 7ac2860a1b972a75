//! New-publication detection.
//!
//! Compares the active ids of the current cycle against the set recorded by
//! an earlier cycle. Only appearance is detected; content changes under the
//! same id are not.

use std::collections::HashSet;

use crate::models::DiffPolicy;

/// Tracks the previously observed active set across cycles.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    previous: HashSet<String>,
    policy: DiffPolicy,
}

impl DiffEngine {
    /// Create an engine with an empty previous set.
    pub fn new(policy: DiffPolicy) -> Self {
        Self {
            previous: HashSet::new(),
            policy,
        }
    }

    /// Return ids in `active_ids` absent from the previous set, in input order.
    ///
    /// With [`DiffPolicy::ReplaceOnNew`] the previous set becomes the whole
    /// current set only when something new was found; otherwise it is left
    /// untouched. With [`DiffPolicy::EveryCycle`] it is always replaced.
    pub fn detect_new(&mut self, active_ids: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let added: Vec<String> = active_ids
            .iter()
            .filter(|id| !self.previous.contains(*id) && seen.insert(id.as_str()))
            .cloned()
            .collect();

        let replace = match self.policy {
            DiffPolicy::ReplaceOnNew => !added.is_empty(),
            DiffPolicy::EveryCycle => true,
        };
        if replace {
            self.previous = active_ids.iter().cloned().collect();
        }

        added
    }

    /// Ids recorded by the last replacing cycle.
    pub fn previous(&self) -> &HashSet<String> {
        &self.previous
    }

    pub fn policy(&self) -> DiffPolicy {
        self.policy
    }
}
