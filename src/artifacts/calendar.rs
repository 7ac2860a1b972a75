//! iCalendar export.
//!
//! One `VEVENT` spanning publication to expiry, in floating local time.

use chrono::{NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use crate::artifacts::{Artifact, ArtifactExporter, file_stem};
use crate::error::{AppError, Result};
use crate::pipeline::IndexedPublication;
use crate::utils::dates::SourceDate;

const SUMMARY_CHARS: usize = 30;
const MAX_LINE_OCTETS: usize = 75;

/// Builds `.ics` files.
#[derive(Debug, Clone)]
pub struct CalendarExporter {
    /// Listing URL, mixed into event UIDs
    source_url: String,
}

impl CalendarExporter {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }

    /// Stable event UID for a publication id.
    fn uid(&self, id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_url.as_bytes());
        hasher.update(b"\n");
        hasher.update(id.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{}@tender-watch", &digest[..32])
    }

    fn render(&self, entry: &IndexedPublication, stamp: NaiveDateTime) -> Result<String> {
        let record = &entry.record;
        let start = parse_required(&record.published_at)?;
        let end = parse_required(&record.expires_at)?;

        let short: String = record.description.chars().take(SUMMARY_CHARS).collect();
        let summary = format!("Publicación #{} - {}...", record.id, short);

        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//tender-watch//ES".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid(&record.id)),
            format!("DTSTAMP:{}Z", stamp.format("%Y%m%dT%H%M%S")),
            format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")),
            format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")),
            format!("SUMMARY:{}", escape_text(&summary)),
            format!("DESCRIPTION:{}", escape_text(&record.description)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        Ok(out)
    }
}

impl ArtifactExporter for CalendarExporter {
    fn export(&self, entry: &IndexedPublication) -> Result<Artifact> {
        let body = self.render(entry, Utc::now().naive_utc())?;
        Ok(Artifact {
            filename: format!("{}.ics", file_stem(entry.id())),
            content_type: "text/calendar",
            bytes: body.into_bytes(),
        })
    }
}

fn parse_required(text: &str) -> Result<NaiveDateTime> {
    SourceDate::parse(text)
        .value()
        .ok_or_else(|| AppError::DateParse(text.to_string()))
}

/// Escape TEXT values per RFC 5545 §3.3.11.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting UTF-8 sequences.
fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // continuation lines start with one space
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentLink, PublicationRecord};

    fn entry(published: &str, expires: &str) -> IndexedPublication {
        IndexedPublication {
            download_url: None,
            record: PublicationRecord {
                id: "101".into(),
                description: "Adquisición de computadoras, impresoras; y accesorios para laboratorio"
                    .into(),
                published_at: published.into(),
                expires_at: expires.into(),
                status: "Vigente".into(),
                document_url: DocumentLink::Unavailable,
            },
        }
    }

    fn stamp() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-10-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_event_fields() {
        let exporter = CalendarExporter::new("https://example.pe/");
        let ics = exporter
            .render(&entry("2024-10-01 08:00:00", "10/10/2024 17:30"), stamp())
            .unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTART:20241001T080000\r\n"));
        assert!(ics.contains("DTEND:20241010T173000\r\n"));
        assert!(ics.contains("DTSTAMP:20241001T000000Z\r\n"));
        assert!(ics.contains("SUMMARY:Publicación #101 - Adquisición de computadoras\\, i...\r\n"));
    }

    #[test]
    fn test_uid_is_stable() {
        let exporter = CalendarExporter::new("https://example.pe/");
        assert_eq!(exporter.uid("101"), exporter.uid("101"));
        assert_ne!(exporter.uid("101"), exporter.uid("102"));
    }

    #[test]
    fn test_unparseable_dates_fail() {
        let exporter = CalendarExporter::new("https://example.pe/");
        let err = exporter.export(&entry("pendiente", "2024-10-10")).unwrap_err();
        assert!(matches!(err, AppError::DateParse(ref s) if s == "pendiente"));
    }

    #[test]
    fn test_export_filename() {
        let exporter = CalendarExporter::new("https://example.pe/");
        let artifact = exporter
            .export(&entry("2024-10-01", "2024-10-10"))
            .unwrap();
        assert_eq!(artifact.filename, "101.ics");
        assert_eq!(artifact.content_type, "text/calendar");
    }

    #[test]
    fn test_fold_line_limits_octets() {
        let long = format!("DESCRIPTION:{}", "ñ".repeat(80));
        let folded = fold_line(&long);
        for part in folded.split("\r\n") {
            assert!(part.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(folded.replace("\r\n ", ""), long);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }
}
