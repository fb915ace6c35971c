//! One function per tool. Each turns its arguments into one or more API calls and shrinks the
//! answer down to a minimal JSON result.
//!
//! An upstream non-success status is never an `Err` here: it becomes an error-shaped result
//! (`{error, status}` or `success: false`) so the caller can read it. `Err` is reserved for
//! transport failures and bad arguments.

use crate::args::{self, CreateFolderArgs, FolderVideosArgs, GetVideoArgs, ListVideosArgs};
use crate::args::{MoveVideoArgs, SearchVideosArgs, UpdateVideoArgs};
use crate::minimal::{
    MinimalFolder, MinimalVideo, date_only, id_from_uri, name_or_untitled, to_minimal_folder,
    to_minimal_video,
};
use crate::vimeo_api::client::{FOLDER_FIELDS, segment, with_query};
use crate::vimeo_api::folders::{FolderItems, NewFolder};
use crate::vimeo_api::{ApiResponse, Folder, Page, User, Video, VideoUpdate, VimeoClient};
use http::Method;
use serde::Serialize;
use serde_json::{Value, json};
use tokio_stream::StreamExt;

/// Longest description `get_video` hands back, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Upper bound on folders `list_folders` collects before giving up.
pub const MAX_FOLDERS: usize = 100_000;

/// Folder name used when the folder itself could not be fetched.
pub const UNKNOWN_FOLDER: &str = "Unknown folder";

/// Trimmed field set for video listings.
const VIDEO_FIELDS: &str = "uri,name,duration,created_time,parent_folder.name";

/// Trimmed field set for a single video.
const VIDEO_DETAIL_FIELDS: &str =
    "uri,name,description,duration,created_time,parent_folder.name,tags.name,privacy.view,link";

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

fn to_json(value: impl Serialize) -> eyre::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn upstream_error(error: impl Into<String>, status: u16) -> Value {
    json!({ "error": error.into(), "status": status })
}

#[derive(Debug, Serialize)]
struct FolderList {
    total: usize,
    folders: Vec<MinimalFolder>,
    /// Set when a page failed and the list stops early.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    truncated: bool,
}

/// Every folder of the account, fetched page by page.
pub async fn list_folders(client: &VimeoClient) -> eyre::Result<Value> {
    let mut folders = Vec::new();
    let mut truncated = false;

    let stream = client.list_folders();
    let mut stream = std::pin::pin!(stream);
    while let Some(folder) = stream.next().await {
        match folder {
            Ok(folder) if folders.len() < MAX_FOLDERS => folders.push(to_minimal_folder(&folder)),
            Ok(_) => {
                tracing::warn!(limit = MAX_FOLDERS, "folder listing hit its ceiling, stopping");
                truncated = true;
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, fetched = folders.len(), "folder page failed, returning partial list");
                truncated = true;
                break;
            }
        }
    }

    tracing::debug!(count = folders.len(), truncated, "listed folders");
    to_json(FolderList {
        total: folders.len(),
        folders,
        truncated,
    })
}

#[derive(Debug, Serialize)]
struct VideoPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    folder: Option<String>,
    total: u64,
    page: u64,
    per_page: u64,
    videos: Vec<MinimalVideo>,
}

impl VideoPage {
    fn new(listing: Page<Video>, page: u32, per_page: u32) -> Self {
        Self {
            folder: None,
            total: listing.total.unwrap_or(0),
            page: listing.page.unwrap_or(page.into()),
            per_page: listing.per_page.unwrap_or(per_page.into()),
            videos: listing.into_items().iter().map(to_minimal_video).collect(),
        }
    }
}

fn video_list_path(base: &str, query: Option<&str>, page: u32, per_page: u32) -> String {
    let page = page.to_string();
    let per_page = per_page.to_string();
    let mut params = vec![
        ("page", page.as_str()),
        ("per_page", per_page.as_str()),
        ("fields", VIDEO_FIELDS),
    ];
    if let Some(query) = query {
        params.push(("query", query));
    }
    with_query(base, &params)
}

async fn fetch_video_page(
    client: &VimeoClient,
    base: &str,
    query: Option<&str>,
    page: u32,
    per_page: u32,
) -> eyre::Result<Result<VideoPage, ApiResponse>> {
    let response = client
        .get(&video_list_path(base, query, page, per_page))
        .await?;
    if response.status != 200 {
        tracing::warn!(status = response.status, path = base, "video listing failed");
        return Ok(Err(response));
    }
    let listing: Page<Video> = response.parse()?;
    let page = VideoPage::new(listing, page, per_page);
    tracing::debug!(count = page.videos.len(), total = page.total, "listed videos");
    Ok(Ok(page))
}

/// One page of videos, across the account or inside one folder, optionally name-filtered.
pub async fn list_videos(client: &VimeoClient, args: ListVideosArgs) -> eyre::Result<Value> {
    let page = args::page(args.page);
    let per_page = args::per_page(args.per_page, args::DEFAULT_LIST_PER_PAGE);
    let base = match &args.folder_id {
        Some(folder_id) => format!("/me/projects/{}/videos", segment(folder_id)),
        None => "/me/videos".to_string(),
    };
    let query = args.query.as_deref().filter(|q| !q.trim().is_empty());

    match fetch_video_page(client, &base, query, page, per_page).await? {
        Ok(videos) => to_json(videos),
        Err(response) => Ok(upstream_error(response.error_message(), response.status)),
    }
}

/// Account-wide name search.
pub async fn search_videos(client: &VimeoClient, args: SearchVideosArgs) -> eyre::Result<Value> {
    args::require("query", &args.query)?;
    let page = args::page(args.page);
    let per_page = args::per_page(args.per_page, args::DEFAULT_SEARCH_PER_PAGE);

    match fetch_video_page(client, "/me/videos", Some(args.query.trim()), page, per_page).await? {
        Ok(videos) => to_json(videos),
        Err(response) => Ok(upstream_error(response.error_message(), response.status)),
    }
}

#[derive(Debug, Serialize)]
struct VideoDetails {
    id: String,
    name: String,
    description: String,
    duration: u64,
    created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder: Option<String>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    privacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

/// One video with its description, tags, privacy and share link.
pub async fn get_video(client: &VimeoClient, args: GetVideoArgs) -> eyre::Result<Value> {
    let path = with_query(
        &format!("/videos/{}", segment(&args.video_id)),
        &[("fields", VIDEO_DETAIL_FIELDS)],
    );
    let response = client.get(&path).await?;
    if response.status != 200 {
        tracing::warn!(video_id = %args.video_id, status = response.status, "video lookup failed");
        return Ok(upstream_error("Video not found", response.status));
    }

    let video: Video = response.parse()?;
    let description: String = video
        .description
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect();
    let tags = video
        .tags
        .iter()
        .flatten()
        .filter_map(|tag| tag.name.clone())
        .collect();

    to_json(VideoDetails {
        id: id_from_uri(video.uri.as_deref()),
        name: name_or_untitled(video.name.as_deref()),
        description,
        duration: video.duration.unwrap_or(0),
        created: date_only(video.created_time.as_deref()),
        folder: video.parent_folder.and_then(|f| f.name),
        tags,
        privacy: video.privacy.and_then(|p| p.view),
        link: video.link,
    })
}

async fn fetch_folder(client: &VimeoClient, folder_path: &str) -> eyre::Result<Folder> {
    let response = client
        .get(&with_query(folder_path, &[("fields", FOLDER_FIELDS)]))
        .await?;
    if response.status != 200 {
        eyre::bail!("HTTP {}: {}", response.status, response.error_message());
    }
    response.parse()
}

/// A folder's name and size together with one page of its videos.
pub async fn get_folder_videos(client: &VimeoClient, args: FolderVideosArgs) -> eyre::Result<Value> {
    let page = args::page(args.page);
    let per_page = args::per_page(args.per_page, args::DEFAULT_LIST_PER_PAGE);
    let folder_path = format!("/me/projects/{}", segment(&args.folder_id));

    // a folder we cannot describe still has listable videos, so this one may fail
    let folder = match fetch_folder(client, &folder_path).await {
        Ok(folder) => folder,
        Err(e) => {
            tracing::warn!(folder_id = %args.folder_id, error = %format!("{e:#}"), "folder lookup failed");
            Folder::default()
        }
    };

    let base = format!("{folder_path}/videos");
    match fetch_video_page(client, &base, None, page, per_page).await? {
        Ok(mut videos) => {
            videos.folder = Some(folder.name.clone().unwrap_or_else(|| UNKNOWN_FOLDER.to_string()));
            if let Some(count) = folder.video_count() {
                videos.total = count;
            }
            to_json(videos)
        }
        Err(response) => Ok(upstream_error(response.error_message(), response.status)),
    }
}

#[derive(Debug, Serialize)]
struct MoveResult {
    success: bool,
    video_id: String,
    folder_id: String,
}

/// Puts a video into a folder.
pub async fn move_video(client: &VimeoClient, args: MoveVideoArgs) -> eyre::Result<Value> {
    let path = format!("/me/projects/{}/items", segment(&args.folder_id));
    let body = FolderItems::video(&args.video_id);
    let response = client.request(Method::PUT, &path, Some(&body)).await?;

    let success = matches!(response.status, 200 | 201 | 204);
    if success {
        tracing::debug!(video_id = %args.video_id, folder_id = %args.folder_id, "moved video");
    } else {
        tracing::warn!(
            video_id = %args.video_id,
            folder_id = %args.folder_id,
            status = response.status,
            error = %response.error_message(),
            "move failed"
        );
    }

    to_json(MoveResult {
        success,
        video_id: args.video_id,
        folder_id: args.folder_id,
    })
}

/// Creates a folder at the top level of the account.
pub async fn create_folder(client: &VimeoClient, args: CreateFolderArgs) -> eyre::Result<Value> {
    args::require("name", &args.name)?;
    let body = NewFolder { name: &args.name };
    let response = client
        .request(Method::POST, "/me/projects", Some(&body))
        .await?;

    match response.status {
        201 => {
            let folder: Folder = response.parse()?;
            let id = id_from_uri(folder.uri.as_deref());
            tracing::debug!(%id, name = %args.name, "created folder");
            Ok(json!({ "success": true, "id": id, "name": args.name }))
        }
        400 if response.error_message().contains("already exists") => {
            Ok(json!({ "success": false, "error": "Folder already exists" }))
        }
        status => {
            tracing::warn!(status, name = %args.name, "folder creation failed");
            Ok(json!({
                "success": false,
                "error": response.error_message(),
                "status": status,
            }))
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdateResult {
    success: bool,
    video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

/// Changes a video's name, description and/or tags. Only the given fields are sent.
pub async fn update_video(client: &VimeoClient, args: UpdateVideoArgs) -> eyre::Result<Value> {
    let update = VideoUpdate {
        name: args.name,
        description: args.description,
        tags: args.tags,
    };
    if update.is_empty() {
        eyre::bail!("update_video needs at least one of name, description or tags");
    }

    let path = format!("/videos/{}", segment(&args.video_id));
    let response = client
        .request(Method::PATCH, &path, Some(&update))
        .await?;

    let result = if response.status == 200 {
        tracing::debug!(video_id = %args.video_id, "updated video");
        UpdateResult {
            success: true,
            video_id: args.video_id,
            error: None,
            status: None,
        }
    } else {
        tracing::warn!(video_id = %args.video_id, status = response.status, "update failed");
        UpdateResult {
            success: false,
            video_id: args.video_id,
            error: Some(response.error_message()),
            status: Some(response.status),
        }
    };
    to_json(result)
}

#[derive(Debug, Serialize)]
struct Stats {
    total_videos: u64,
    total_folders: u64,
    storage_used_gb: String,
    storage_total_gb: String,
    storage_free_gb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
}

/// Bytes as gigabytes (GiB) with two decimals.
pub fn bytes_to_gb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_GB)
}

fn total_of(response: &ApiResponse) -> u64 {
    response
        .parse::<Page<Video>>()
        .ok()
        .and_then(|page| page.total)
        .unwrap_or(0)
}

/// Video and folder counts plus storage use for the account.
pub async fn get_stats(client: &VimeoClient) -> eyre::Result<Value> {
    let videos_count_path = with_query("/me/videos", &[("per_page", "1"), ("fields", "uri")]);
    let folders_count_path = with_query("/me/projects", &[("per_page", "1"), ("fields", "uri")]);
    let account_path = with_query("/me", &[("fields", "account,upload_quota.space")]);

    // the three lookups are independent
    let (videos, folders, account) = tokio::join!(
        client.get(&videos_count_path),
        client.get(&folders_count_path),
        client.get(&account_path),
    );
    let (videos, folders, account) = (videos?, folders?, account?);

    let user = account.parse::<User>().unwrap_or_default();
    let space = user.space();
    let used = space.used.unwrap_or(0);
    let max = space.max.unwrap_or(0);
    let free = space.free.unwrap_or_else(|| max.saturating_sub(used));

    let stats = Stats {
        total_videos: total_of(&videos),
        total_folders: total_of(&folders),
        storage_used_gb: bytes_to_gb(used),
        storage_total_gb: bytes_to_gb(max),
        storage_free_gb: bytes_to_gb(free),
        account: user.account,
    };
    tracing::debug!(?stats, "collected account stats");
    to_json(stats)
}
