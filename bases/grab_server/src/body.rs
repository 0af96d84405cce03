// bases/grab_server/src/body.rs
use axum::body::Body;
use futures::StreamExt;
use media_download::{DownloadError, PreparedDownload};
use tracing::{error, info, warn};

/// Logs a transfer that ends without completing or failing, i.e. the
/// client went away and the body was dropped.
struct TransferGuard {
    filename: String,
    sent: u64,
    done: bool,
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        if !self.done {
            warn!(
                "Download of {} aborted by client after {} bytes",
                self.filename, self.sent
            );
        }
    }
}

/// Pipe the provider stream into the response body chunk by chunk.
///
/// Headers are already committed when this runs, so a provider error can
/// only end the body, which aborts the connection.
pub fn download_body(prepared: PreparedDownload) -> Body {
    let PreparedDownload {
        filename, stream, ..
    } = prepared;

    let piped = async_stream::stream! {
        let mut stream = stream;
        let mut guard = TransferGuard { filename, sent: 0, done: false };

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    guard.sent += bytes.len() as u64;
                    yield Ok(bytes);
                }
                Err(e) => {
                    guard.done = true;
                    let failure = DownloadError::stream_failure(guard.filename.clone(), e);
                    error!("{}", failure);
                    yield Err(failure);
                    return;
                }
            }
        }

        guard.done = true;
        info!("Download completed: {} ({} bytes)", guard.filename, guard.sent);
    };

    Body::from_stream(piped)
}
