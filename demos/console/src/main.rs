//! Console client for a rover.
//!
//! Connects to the rover's JSON-RPC socket, logs every push and reads
//! commands from stdin (`help` lists them).
//!
//! Run against a rover on the LAN:
//!   cargo run -p rover-console -- --host rover.local --port 8080 --view /drive

mod command;
mod console;

use clap::Parser;
use rover_client::ClientConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rover-console", version, about = "Remote-control console for a rover")]
struct Args {
    /// Host the rover serves its web interface on.
    #[arg(long, env = "ROVER_HOST", default_value = "localhost")]
    host: String,

    #[arg(long, env = "ROVER_PORT", default_value_t = 8080)]
    port: u16,

    /// Pretend the page was loaded over https (no websocket is opened).
    #[arg(long)]
    secure: bool,

    /// TOML file overriding the client defaults.
    #[arg(long, env = "ROVER_CONFIG")]
    config: Option<PathBuf>,

    /// View to start on; driving views reacquire a vacant driver seat.
    #[arg(long, default_value = "/drive")]
    view: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rover_console=info".parse()?)
                .add_directive("rover_client=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };

    let url = rover_client::endpoint_url(&args.host, args.port, args.secure);
    tracing::info!("Connecting to {}", if url.is_empty() { "<none>" } else { &url });

    console::run(&url, config, args.view).await
}
