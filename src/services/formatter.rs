// src/services/formatter.rs

//! Human-readable alerts for publications.

use chrono::NaiveDateTime;

use crate::models::{Action, ActionKind, Alert};
use crate::pipeline::IndexedPublication;
use crate::utils::dates::describe_remaining;
use crate::utils::escape_html;

/// Format one publication as an HTML alert with its follow-up actions.
///
/// `now` is the source's local time, used for the remaining-time line.
pub fn format_alert(entry: &IndexedPublication, now: NaiveDateTime) -> Alert {
    let record = &entry.record;
    let has_document = entry.download_url.is_some();

    let document_line = if has_document {
        "Disponible para descargar"
    } else {
        "No disponible"
    };

    let text = format!(
        "📢 <b>Publicación #{id}</b>\n\
         📝 <b>Descripción:</b>\n{description}\n\n\
         📄 <b>PDF:</b> {document_line}\n\
         📅 <b>Publicado:</b> {published}\n\
         ⏳ <b>Vence:</b> {expires}\n\
         ⏱ <b>Tiempo disponible:</b> {remaining}\n\
         🗑 <b>Estado:</b> {status}\n",
        id = escape_html(&record.id),
        description = escape_html(&record.description),
        published = escape_html(&record.published_at),
        expires = escape_html(&record.expires_at),
        remaining = describe_remaining(&record.expires_at, now),
        status = escape_html(&record.status),
    );

    let mut actions = Vec::with_capacity(3);
    if has_document {
        actions.push(Action::new(ActionKind::DownloadDocument, &record.id));
    }
    actions.push(Action::new(ActionKind::Summary, &record.id));
    actions.push(Action::new(ActionKind::Calendar, &record.id));

    Alert {
        publication_id: record.id.clone(),
        text,
        actions,
    }
}
