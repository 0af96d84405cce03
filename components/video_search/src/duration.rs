// components/video_search/src/duration.rs

/// `HH:MM:SS`; hours keep counting past a day
pub fn clock_label(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
