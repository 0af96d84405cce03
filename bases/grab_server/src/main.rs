// bases/grab_server/src/main.rs
use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use video_provider::{VideoProvider, YtDlp};

mod body;
mod config;
mod error;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "grab_server=info,video_search=info,media_download=info,video_provider=info,tower_http=info"
                    .into()
            }),
        )
        .init();

    let args = config::CliArgs::parse();
    let config = config::Config::from_args(args);

    let provider = YtDlp::new(&config.yt_dlp).with_lookup_timeout(config.lookup_timeout);
    provider.check_available().await?;
    tracing::info!("Using {} as video provider", config.yt_dlp.display());
    if let Some(limit) = config.lookup_timeout {
        tracing::info!("Lookups time out after {:?}", limit);
    }

    server::run(Arc::new(provider), config).await?;

    Ok(())
}
