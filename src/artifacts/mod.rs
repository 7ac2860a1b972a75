//! Derived artifacts for a single publication.
//!
//! Exporters turn one indexed publication into a downloadable payload with a
//! filename. They never touch tracker state.

pub mod calendar;
pub mod summary;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::IndexedPublication;

pub use calendar::CalendarExporter;
pub use summary::SummaryExporter;

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the artifact into `dir`, returning the written path.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Builds an artifact from a publication.
pub trait ArtifactExporter: Send + Sync {
    fn export(&self, entry: &IndexedPublication) -> Result<Artifact>;
}

/// Replace characters that are unsafe in filenames.
pub(crate) fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "publicacion".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("CP-001/2024"), "CP-001_2024");
        assert_eq!(file_stem(".."), "publicacion");
        assert_eq!(file_stem(""), "publicacion");
    }

    #[tokio::test]
    async fn test_write_to_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = Artifact {
            filename: "101.ics".into(),
            content_type: "text/calendar",
            bytes: b"BEGIN:VCALENDAR".to_vec(),
        };
        let path = artifact.write_to(tmp.path().join("out")).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"BEGIN:VCALENDAR");
    }
}
