//! Typed arguments for each tool.
//!
//! Hosts are not consistent about JSON types, so numbers may arrive as strings and ids as
//! numbers. Both are accepted.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIST_PER_PAGE: u32 = 50;
pub const DEFAULT_SEARCH_PER_PAGE: u32 = 25;

/// Decodes the argument object of `tool` into `T`.
pub fn decode<T: DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Map<String, serde_json::Value>,
) -> eyre::Result<T> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| eyre::eyre!("invalid arguments for {tool}: {e}"))
}

/// Fails unless `value` has something other than whitespace in it.
pub fn require(name: &str, value: &str) -> eyre::Result<()> {
    if value.trim().is_empty() {
        eyre::bail!("{name} must not be empty");
    }
    Ok(())
}

/// 1-based page number; anything below 1 becomes 1.
pub fn page(requested: Option<i64>) -> u32 {
    requested.map_or(DEFAULT_PAGE, |p| p.clamp(1, u32::MAX as i64) as u32)
}

/// Page size, defaulted and capped at the API maximum.
pub fn per_page(requested: Option<i64>, default: u32) -> u32 {
    requested.map_or(default, |p| {
        p.clamp(1, crate::vimeo_api::client::MAX_PER_PAGE as i64) as u32
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVideosArgs {
    #[serde(default, deserialize_with = "lenient_string")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetVideoArgs {
    #[serde(deserialize_with = "required_string")]
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderVideosArgs {
    #[serde(deserialize_with = "required_string")]
    pub folder_id: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveVideoArgs {
    #[serde(deserialize_with = "required_string")]
    pub video_id: String,
    #[serde(deserialize_with = "required_string")]
    pub folder_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderArgs {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVideoArgs {
    #[serde(deserialize_with = "required_string")]
    pub video_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchVideosArgs {
    pub query: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    String(String),
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        Some(Scalar::Float(f)) if f.is_finite() => Ok(Some(f.trunc() as i64)),
        Some(Scalar::Float(f)) => Err(D::Error::custom(format!("expected a number, got {f}"))),
        Some(Scalar::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::String(s)) if s.trim().is_empty() => None,
        Some(Scalar::String(s)) => Some(s.trim().to_string()),
    })
}

fn required_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_string(deserializer)?.ok_or_else(|| D::Error::custom("must not be empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    fn args(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_paging_clamps() {
        assert_eq!(page(None), 1);
        assert_eq!(page(Some(0)), 1);
        assert_eq!(page(Some(-4)), 1);
        assert_eq!(page(Some(7)), 7);

        assert_eq!(per_page(None, DEFAULT_LIST_PER_PAGE), 50);
        assert_eq!(per_page(None, DEFAULT_SEARCH_PER_PAGE), 25);
        assert_eq!(per_page(Some(500), DEFAULT_LIST_PER_PAGE), 100);
        assert_eq!(per_page(Some(0), DEFAULT_LIST_PER_PAGE), 1);
        assert_eq!(per_page(Some(10), DEFAULT_LIST_PER_PAGE), 10);
    }

    #[test]
    fn test_lenient_numbers_and_ids() {
        let parsed: ListVideosArgs = decode(
            "list_videos",
            args(json!({"folder_id": 789, "page": "2", "per_page": 10.0})),
        )
        .unwrap();
        assert_eq!(parsed.folder_id.as_deref(), Some("789"));
        assert_eq!(parsed.page, Some(2));
        assert_eq!(parsed.per_page, Some(10));
        assert_eq!(parsed.query, None);

        let parsed: ListVideosArgs =
            decode("list_videos", args(json!({"folder_id": "", "page": null}))).unwrap();
        assert_eq!(parsed.folder_id, None);
        assert_eq!(parsed.page, None);
    }

    #[test]
    fn test_missing_required_argument() {
        let err = decode::<GetVideoArgs>("get_video", args(json!({}))).unwrap_err();
        assert_snapshot!(err, @"invalid arguments for get_video: missing field `video_id`");

        let err = decode::<GetVideoArgs>("get_video", args(json!({"video_id": "  "}))).unwrap_err();
        assert_snapshot!(err, @"invalid arguments for get_video: must not be empty");

        let err = decode::<SearchVideosArgs>(
            "search_videos",
            args(json!({"query": "cats", "page": "two"})),
        )
        .unwrap_err();
        assert_snapshot!(err, @r#"invalid arguments for search_videos: expected a number, got "two""#);
    }

    #[test]
    fn test_update_args_keep_absence() {
        let parsed: UpdateVideoArgs =
            decode("update_video", args(json!({"video_id": "1", "name": "X"}))).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("X"));
        assert!(parsed.description.is_none());
        assert!(parsed.tags.is_none());
    }
}
