use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neoncity-server", about = "NeonCity score service")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "NEONCITY_BIND", default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Directory holding the score store
    #[arg(long, env = "NEONCITY_DATA_DIR", default_value = "neoncity-data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    neoncity_server::serve_listener(listener, cli.data_dir, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutting down");
    })
    .await?;
    Ok(())
}
