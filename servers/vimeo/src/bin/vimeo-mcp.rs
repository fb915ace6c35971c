use eyre::Context;
use mcp_sdk::Server;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vimeo_mcp::{Config, SERVER_NAME, setup_tools};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env().context("load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let tools = setup_tools(&config)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "serving on stdio");
    Server::new(SERVER_NAME, env!("CARGO_PKG_VERSION"))
        .with_instructions(
            "Browse and organise a Vimeo account. Folder and video ids are the numeric ids \
             returned by list_folders, list_videos and search_videos.",
        )
        .serve_stdio(&tools)
        .await?;

    tracing::info!("host disconnected, shutting down");
    Ok(())
}
