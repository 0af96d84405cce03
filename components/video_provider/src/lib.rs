// components/video_provider/src/lib.rs
//! Narrow contract to the external service that finds videos, describes
//! their formats and hands out their bytes.

mod types;
mod video_url;
mod ytdlp;

#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use types::{
    FormatDescriptor, MediaKind, MediaStream, ProviderError, SearchHit, Thumbnail, VideoDetails,
    VideoInfo, VideoProvider,
};
pub use video_url::VideoUrl;
pub use ytdlp::{timestamp_label, YtDlp};
