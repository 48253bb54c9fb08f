//! The `platewise serve` command: run the HTTP service.

use clap::Args;
use platewise_core::Config;

use crate::server;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Load models at startup instead of on the first request
    #[arg(long)]
    pub preload: bool,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.server.preload |= args.preload;

    server::run(config).await
}
