// src/utils/url.rs

//! Document link normalization.

use url::Url;

/// Host of the cloud drive whose share links get rewritten.
const DRIVE_HOST: &str = "drive.google.com";

/// Direct-download endpoint on the drive host.
const DRIVE_DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc";

/// Rewrite a cloud-drive share link into a direct-download link.
///
/// Recognizes `/file/d/<id>/...` paths and `/open?id=<id>` links on the
/// drive host. Anything else is returned unchanged.
///
/// # Examples
/// ```
/// use tender_watch::utils::url::direct_download_url;
///
/// assert_eq!(
///     direct_download_url("https://drive.google.com/file/d/XYZ123/view"),
///     "https://drive.google.com/uc?export=download&id=XYZ123"
/// );
/// assert_eq!(
///     direct_download_url("https://example.com/doc.pdf"),
///     "https://example.com/doc.pdf"
/// );
/// ```
pub fn direct_download_url(link: &str) -> String {
    drive_file_id(link)
        .map(|id| format!("{DRIVE_DOWNLOAD_ENDPOINT}?export=download&id={id}"))
        .unwrap_or_else(|| link.to_string())
}

/// Extract the file identifier from a drive share link.
pub fn drive_file_id(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    if !parsed.host_str()?.eq_ignore_ascii_case(DRIVE_HOST) {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.collect();
    if let Some(pos) = segments.windows(2).position(|w| w == ["file", "d"]) {
        return segments
            .get(pos + 2)
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string());
    }

    if segments.contains(&"open") {
        return parsed
            .query_pairs()
            .find(|(key, value)| key == "id" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }

    None
}
