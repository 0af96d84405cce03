// components/media_download/src/filename.rs
use crate::request::MediaType;

const FALLBACK_STEM: &str = "download";

/// Keep only word characters and whitespace, so the name is safe both on
/// disk and inside a quoted `Content-Disposition` value.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c),
            c if c.is_whitespace() => Some(' '),
            _ => None,
        })
        .collect();

    kept.trim().to_string()
}

/// `<sanitized title>.<ext>`
pub fn download_filename(title: &str, media_type: MediaType) -> String {
    let stem = sanitize_title(title);
    let stem = if stem.is_empty() { FALLBACK_STEM } else { &stem };
    format!("{}.{}", stem, media_type.extension())
}
