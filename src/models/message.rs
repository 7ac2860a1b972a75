//! Outbound message structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a notification recipient (a chat id for Telegram).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(String);

impl RecipientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipientId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<i64> for RecipientId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Follow-up actions a front-end can offer for a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Download the original document
    DownloadDocument,
    /// Generate the PDF summary artifact
    Summary,
    /// Generate the calendar artifact
    Calendar,
}

impl ActionKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::DownloadDocument => "download_",
            Self::Summary => "sharepdf_",
            Self::Calendar => "calendar_",
        }
    }

    /// Button label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::DownloadDocument => "PDF Original",
            Self::Summary => "PDF de la Publicación",
            Self::Calendar => "Agregar al Calendario",
        }
    }
}

/// An action bound to one publication id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub publication_id: String,
}

impl Action {
    pub fn new(kind: ActionKind, publication_id: impl Into<String>) -> Self {
        Self {
            kind,
            publication_id: publication_id.into(),
        }
    }

    /// Callback payload used by the front-end to dispatch the action later.
    pub fn callback_data(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.publication_id)
    }

    /// Decode callback payload produced by [`Action::callback_data`].
    pub fn parse(data: &str) -> Option<Self> {
        [
            ActionKind::DownloadDocument,
            ActionKind::Summary,
            ActionKind::Calendar,
        ]
        .into_iter()
        .find_map(|kind| {
            data.strip_prefix(kind.prefix())
                .filter(|id| !id.is_empty())
                .map(|id| Self::new(kind, id))
        })
    }
}

/// A formatted publication ready to be shown or sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub publication_id: String,
    /// HTML text
    pub text: String,
    pub actions: Vec<Action>,
}

/// What a sink delivers to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Short plain headline
    pub text: String,
    /// Optional HTML body
    pub body: Option<String>,
    pub actions: Vec<Action>,
}

impl OutboundMessage {
    /// Headline shown before every new-publication alert.
    pub const NEW_PUBLICATION: &'static str = "¡Nueva publicación disponible!";

    /// Wrap an alert as a new-publication notification.
    pub fn new_publication(alert: &Alert) -> Self {
        Self {
            text: Self::NEW_PUBLICATION.to_string(),
            body: Some(alert.text.clone()),
            actions: alert.actions.clone(),
        }
    }
}
