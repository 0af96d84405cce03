// components/media_download/src/selection.rs
//! Deterministic choice of exactly one provider format per request.
//!
//! Provider order is treated as opaque. When no exact quality label
//! matches, the first combined format is served, which may differ from the
//! requested quality.

use crate::request::{MediaType, Quality};
use video_provider::FormatDescriptor;

pub fn select_format(
    formats: &[FormatDescriptor],
    media_type: MediaType,
    quality: Quality,
) -> Option<&FormatDescriptor> {
    match media_type {
        MediaType::Mp3 => best_audio(formats),
        MediaType::Mp4 => best_combined(formats, quality),
    }
}

/// Highest bitrate audio-only format; the earlier entry wins ties
fn best_audio(formats: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
    formats
        .iter()
        .filter(|f| f.is_audio_only())
        .fold(None, |best: Option<&FormatDescriptor>, candidate| match best {
            Some(current) if bitrate(current) >= bitrate(candidate) => Some(current),
            _ => Some(candidate),
        })
}

fn bitrate(format: &FormatDescriptor) -> f64 {
    format.audio_bitrate.unwrap_or(0.0)
}

fn best_combined(formats: &[FormatDescriptor], quality: Quality) -> Option<&FormatDescriptor> {
    let combined: Vec<&FormatDescriptor> = formats.iter().filter(|f| f.is_combined()).collect();
    let labelled = |label: &str| combined.iter().copied().find(|f| f.quality_label == label);

    let exact = match quality {
        Quality::P1080 => labelled("1080p"),
        Quality::P720 => labelled("720p"),
        Quality::P360 => labelled("360p").or_else(|| labelled("480p")),
    };

    exact.or_else(|| combined.first().copied())
}
