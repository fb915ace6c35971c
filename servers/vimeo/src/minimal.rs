//! Reduces verbose API resources to the few fields a caller actually needs.

use crate::vimeo_api::{Folder, Video};
use jiff::fmt::temporal::Pieces;
use serde::{Deserialize, Serialize};

/// Name used when the API does not give one.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalVideo {
    pub id: String,
    pub name: String,
    /// Seconds.
    pub duration: u64,
    /// Calendar date of the upload, `YYYY-MM-DD`.
    pub created: String,
    /// Name of the containing folder, only when the API embedded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalFolder {
    pub id: String,
    pub name: String,
    pub video_count: u64,
}

/// The last path segment of a resource URI, or `""` if there is no URI.
pub fn id_from_uri(uri: Option<&str>) -> String {
    uri.and_then(|uri| uri.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

/// The calendar date of an ISO 8601 timestamp, in the offset the timestamp was written in.
///
/// Missing or unparseable timestamps give `""`.
pub fn date_only(timestamp: Option<&str>) -> String {
    let Some(timestamp) = timestamp.map(str::trim).filter(|ts| !ts.is_empty()) else {
        return String::new();
    };
    match Pieces::parse(timestamp) {
        Ok(pieces) => pieces.date().to_string(),
        Err(e) => {
            tracing::debug!(timestamp, error = %e, "ignoring unparseable timestamp");
            String::new()
        }
    }
}

pub fn name_or_untitled(name: Option<&str>) -> String {
    name.unwrap_or(UNTITLED).to_string()
}

pub fn to_minimal_video(video: &Video) -> MinimalVideo {
    MinimalVideo {
        id: id_from_uri(video.uri.as_deref()),
        name: name_or_untitled(video.name.as_deref()),
        duration: video.duration.unwrap_or(0),
        created: date_only(video.created_time.as_deref()),
        folder: video
            .parent_folder
            .as_ref()
            .and_then(|folder| folder.name.clone()),
    }
}

pub fn to_minimal_folder(folder: &Folder) -> MinimalFolder {
    MinimalFolder {
        id: id_from_uri(folder.uri.as_deref()),
        name: name_or_untitled(folder.name.as_deref()),
        video_count: folder.video_count().unwrap_or(0),
    }
}
