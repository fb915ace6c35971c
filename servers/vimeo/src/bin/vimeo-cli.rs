//! Runs a single tool against the real API and prints its result.
//!
//! ```text
//! vimeo-cli --list
//! vimeo-cli <tool> ['{"json": "arguments"}']
//! ```

use eyre::{Context, OptionExt};
use mcp_sdk::ToolHandler;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vimeo_mcp::{Config, setup_tools, tool_definitions};

const USAGE: &str = "usage: vimeo-cli --list | vimeo-cli <tool> [json-arguments]";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let mut argv = std::env::args().skip(1);
    let tool = argv.next().ok_or_eyre(USAGE)?;

    if tool == "--list" {
        for tool in tool_definitions()? {
            println!("{}\n    {}", tool.name, tool.description);
        }
        return Ok(());
    }

    let arguments = match argv.next() {
        Some(json) => serde_json::from_str::<serde_json::Value>(&json)
            .with_context(|| format!("parse arguments for {tool} as JSON"))?,
        None => serde_json::json!({}),
    };
    let serde_json::Value::Object(arguments) = arguments else {
        eyre::bail!("arguments for {tool} must be a JSON object");
    };

    let config = Config::from_env().context("load configuration")?;
    let tools = setup_tools(&config)?;
    let result = tools.call(&tool, arguments).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.get("error").is_some() {
        std::process::exit(1);
    }
    Ok(())
}
