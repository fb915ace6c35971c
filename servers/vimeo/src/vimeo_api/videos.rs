//! Vimeo video resources.

use super::folders::Folder;
use super::types::lenient_u64;
use serde::{Deserialize, Serialize};

/// A `video` resource.
///
/// Only the fields this crate reads are modelled, and every one of them may be absent or
/// `null` upstream.
///
/// See: <https://developer.vimeo.com/api/reference/response/video>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    /// Canonical relative URI, e.g. `/videos/123456`.
    pub uri: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Length in seconds.
    #[serde(deserialize_with = "lenient_u64")]
    pub duration: Option<u64>,
    /// ISO 8601 timestamp of the upload.
    pub created_time: Option<String>,
    /// Public share link.
    pub link: Option<String>,
    pub privacy: Option<Privacy>,
    pub tags: Option<Vec<Tag>>,
    /// The folder the video lives in, when the API embeds it.
    pub parent_folder: Option<Folder>,
}

/// See: <https://developer.vimeo.com/api/reference/response/video#privacy>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Privacy {
    /// Who can watch, e.g. `anybody`, `nobody`, `password`, `unlisted`.
    pub view: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    /// The tag as the owner typed it.
    pub name: Option<String>,
    /// Normalized form used in URLs.
    pub tag: Option<String>,
}

/// Partial update for `PATCH /videos/{id}`.
///
/// Fields left as `None` are omitted from the body, so they keep their current value upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl VideoUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_nulls_are_tolerated() {
        let json = r#"{
            "uri": "/videos/42",
            "name": null,
            "description": null,
            "tags": null,
            "privacy": null,
            "parent_folder": null,
            "some_field_we_ignore": {"deeply": ["nested"]}
        }"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert_eq!(video.uri.as_deref(), Some("/videos/42"));
        assert!(video.name.is_none());
        assert!(video.tags.is_none());
    }

    #[test]
    fn test_update_only_sends_given_fields() {
        let update = VideoUpdate {
            name: Some("X".to_string()),
            ..Default::default()
        };
        assert_snapshot!(serde_json::to_string(&update).unwrap(), @r#"{"name":"X"}"#);
        assert!(!update.is_empty());
        assert!(VideoUpdate::default().is_empty());
    }
}
