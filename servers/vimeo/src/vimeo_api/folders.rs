//! Vimeo folder (a.k.a. project) resources.

use super::types::lenient_u64;
use serde::{Deserialize, Serialize};

/// A `project` resource, shown as a folder in the Vimeo UI.
///
/// See: <https://developer.vimeo.com/api/reference/response/project>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    /// Canonical relative URI, e.g. `/users/1/projects/789`.
    pub uri: Option<String>,
    pub name: Option<String>,
    pub metadata: Option<FolderMetadata>,
}

impl Folder {
    /// Number of videos in the folder, as reported by its `videos` connection.
    pub fn video_count(&self) -> Option<u64> {
        self.metadata
            .as_ref()?
            .connections
            .as_ref()?
            .videos
            .as_ref()?
            .total
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderMetadata {
    pub connections: Option<FolderConnections>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConnections {
    pub videos: Option<Connection>,
}

/// A link from one resource to a related collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub uri: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

/// Body of `POST /me/projects`.
#[derive(Debug, Clone, Serialize)]
pub struct NewFolder<'a> {
    pub name: &'a str,
}

/// Body of `PUT /me/projects/{id}/items`.
#[derive(Debug, Clone, Serialize)]
pub struct FolderItems {
    pub items: Vec<FolderItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderItem {
    pub uri: String,
}

impl FolderItems {
    pub fn video(video_id: &str) -> Self {
        Self {
            items: vec![FolderItem {
                uri: format!("/videos/{video_id}"),
            }],
        }
    }
}
