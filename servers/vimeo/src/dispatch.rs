//! The tool catalogue and the name-to-handler routing behind it.

use crate::args;
use crate::handlers;
use crate::vimeo_api::VimeoClient;
use eyre::WrapErr;
use mcp_sdk::{InputSchema, Property, Tool, ToolHandler};
use serde_json::{Map, Value, json};

fn tool(name: &str, description: &str, input_schema: InputSchema) -> eyre::Result<Tool> {
    Tool::builder()
        .name(name)
        .description(description)
        .input_schema(input_schema)
        .build()
        .wrap_err_with(|| format!("declare tool {name}"))
}

fn page() -> Property {
    Property::integer("Page number (default: 1)")
}

fn per_page(default: u32) -> Property {
    Property::integer(format!("Results per page (default: {default}, max: 100)"))
}

/// Every tool this server answers to, in listing order.
///
/// Descriptions spell out the exact result shape, since they are all the calling agent has to
/// go on.
pub fn tool_definitions() -> eyre::Result<Vec<Tool>> {
    Ok(vec![
        tool(
            "list_folders",
            "List all folders in the Vimeo account. \
             Returns: {total, folders: [{id, name, video_count}], truncated?}. \
             `truncated` is only present (and true) when the listing stopped early.",
            InputSchema::empty(),
        )?,
        tool(
            "list_videos",
            "List videos in the account or inside one folder, optionally filtered by name. \
             Returns: {total, page, per_page, videos: [{id, name, duration, created, folder?}]}.",
            InputSchema::empty()
                .optional(
                    "folder_id",
                    Property::string("Only list videos in this folder"),
                )
                .optional("query", Property::string("Only list videos whose name matches"))
                .optional("page", page())
                .optional("per_page", per_page(args::DEFAULT_LIST_PER_PAGE)),
        )?,
        tool(
            "get_video",
            "Get the details of one video. \
             Returns: {id, name, description, duration, created, folder?, tags: [name], privacy, link}. \
             Descriptions are cut to their first 500 characters.",
            InputSchema::empty().required("video_id", Property::string("The video ID")),
        )?,
        tool(
            "get_folder_videos",
            "Get a folder's name and one page of its videos. \
             Returns: {folder, total, page, per_page, videos: [{id, name, duration, created}]}.",
            InputSchema::empty()
                .required("folder_id", Property::string("The folder ID"))
                .optional("page", page())
                .optional("per_page", per_page(args::DEFAULT_LIST_PER_PAGE)),
        )?,
        tool(
            "move_video",
            "Move a video into a folder. Returns: {success, video_id, folder_id}.",
            InputSchema::empty()
                .required("video_id", Property::string("The video to move"))
                .required("folder_id", Property::string("The destination folder")),
        )?,
        tool(
            "create_folder",
            "Create a new folder. Returns: {success, id, name} or {success: false, error}.",
            InputSchema::empty().required("name", Property::string("Name of the new folder")),
        )?,
        tool(
            "update_video",
            "Change a video's name, description or tags. Only the given fields are changed. \
             Returns: {success, video_id}.",
            InputSchema::empty()
                .required("video_id", Property::string("The video to update"))
                .optional("name", Property::string("New name"))
                .optional("description", Property::string("New description"))
                .optional(
                    "tags",
                    Property::string_list("Replacement tags (replaces all existing tags)"),
                ),
        )?,
        tool(
            "search_videos",
            "Search the account's videos by name. \
             Returns: {total, page, per_page, videos: [{id, name, duration, created, folder?}]}.",
            InputSchema::empty()
                .required("query", Property::string("Search term"))
                .optional("page", page())
                .optional("per_page", per_page(args::DEFAULT_SEARCH_PER_PAGE)),
        )?,
        tool(
            "get_stats",
            "Get account statistics. Returns: {total_videos, total_folders, storage_used_gb, \
             storage_total_gb, storage_free_gb, account}.",
            InputSchema::empty(),
        )?,
    ])
}

/// The Vimeo tools, bound to one authenticated client.
#[derive(Debug, Clone)]
pub struct VimeoTools {
    client: VimeoClient,
    tools: Vec<Tool>,
}

impl VimeoTools {
    pub fn new(client: VimeoClient) -> eyre::Result<Self> {
        Ok(Self {
            client,
            tools: tool_definitions()?,
        })
    }

    async fn run(&self, name: &str, arguments: Map<String, Value>) -> eyre::Result<Value> {
        let client = &self.client;
        match name {
            "list_folders" => handlers::list_folders(client).await,
            "list_videos" => handlers::list_videos(client, args::decode(name, arguments)?).await,
            "get_video" => handlers::get_video(client, args::decode(name, arguments)?).await,
            "get_folder_videos" => {
                handlers::get_folder_videos(client, args::decode(name, arguments)?).await
            }
            "move_video" => handlers::move_video(client, args::decode(name, arguments)?).await,
            "create_folder" => {
                handlers::create_folder(client, args::decode(name, arguments)?).await
            }
            "update_video" => handlers::update_video(client, args::decode(name, arguments)?).await,
            "search_videos" => {
                handlers::search_videos(client, args::decode(name, arguments)?).await
            }
            "get_stats" => handlers::get_stats(client).await,
            other => Ok(json!({ "error": format!("Unknown tool: {other}") })),
        }
    }
}

impl ToolHandler for VimeoTools {
    fn tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    async fn call(&self, name: &str, arguments: Map<String, Value>) -> Value {
        tracing::debug!(tool = name, "calling tool");
        match self.run(name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = name, error = %format!("{e:#}"), "tool failed");
                json!({ "error": format!("{e:#}") })
            }
        }
    }
}
