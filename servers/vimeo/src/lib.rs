//! A Model Context Protocol server exposing a Vimeo account to AI assistants.
//!
//! Nine tools cover folders, videos and account statistics. Every result is trimmed to the
//! handful of fields an assistant needs, see [`minimal`].

pub mod args;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod minimal;
pub mod vimeo_api;

pub use config::Config;
pub use dispatch::{VimeoTools, tool_definitions};
pub use vimeo_api::VimeoClient;

/// Name reported to hosts during `initialize`.
pub const SERVER_NAME: &str = "vimeo-mcp";

/// Builds the tool set from configuration.
pub fn setup_tools(config: &Config) -> eyre::Result<VimeoTools> {
    let client = VimeoClient::new(config)?;
    VimeoTools::new(client)
}
