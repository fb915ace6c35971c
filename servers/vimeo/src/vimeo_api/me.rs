//! The authenticated account.

use super::types::lenient_u64;
use serde::{Deserialize, Serialize};

/// A `user` resource as returned by `GET /me`.
///
/// See: <https://developer.vimeo.com/api/reference/response/user>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub uri: Option<String>,
    pub name: Option<String>,
    /// Membership tier, e.g. `basic`, `plus`, `pro`.
    pub account: Option<String>,
    pub upload_quota: Option<UploadQuota>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadQuota {
    pub space: Option<QuotaSpace>,
}

/// Storage figures, in bytes. `max` is `null` on unlimited plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSpace {
    #[serde(deserialize_with = "lenient_u64")]
    pub used: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub max: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub free: Option<u64>,
}

impl User {
    pub fn space(&self) -> QuotaSpace {
        self.upload_quota
            .as_ref()
            .and_then(|q| q.space.clone())
            .unwrap_or_default()
    }
}
