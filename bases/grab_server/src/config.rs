// bases/grab_server/src/config.rs
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// Path or name of the yt-dlp executable
    pub yt_dlp: PathBuf,

    /// Upper bound for search and metadata lookups; `None` leaves it to the transport
    pub lookup_timeout: Option<Duration>,
}

/// VGrab - search videos and download them as audio or video
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Directory holding the browser client's script and stylesheet
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", env = "YT_DLP_PATH", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Give up on a search or metadata lookup after this many seconds
    #[arg(long, env = "LOOKUP_TIMEOUT_SECS")]
    pub lookup_timeout_secs: Option<u64>,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Self {
        Self {
            bind: args.bind,
            port: args.port,
            static_dir: args.static_dir,
            yt_dlp: args.yt_dlp,
            lookup_timeout: args
                .lookup_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}
