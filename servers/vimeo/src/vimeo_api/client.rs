//! Core Vimeo API client functionality.

use crate::config::Config;
use crate::vimeo_api::folders::Folder;
use crate::vimeo_api::types::{Page, PagedStream};
use eyre::Context;
use http::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use tokio_stream::Stream;
use tracing::instrument;

/// Pins the response format to API version 3.4.
pub const ACCEPT_VERSION: &str = "application/vnd.vimeo.*+json;version=3.4";

/// Largest page the list endpoints will serve.
pub const MAX_PER_PAGE: u32 = 100;

/// Trimmed field set for folder listings.
pub const FOLDER_FIELDS: &str = "uri,name,metadata.connections.videos.total";

/// Status code and decoded body of one API call.
///
/// A non-2xx status is not an error at this layer; callers decide what it means.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// The JSON body, or an empty object if there was none or it did not parse.
    pub data: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The error text the API put in the body, falling back to the status code.
    pub fn error_message(&self) -> String {
        ["error", "developer_message"]
            .iter()
            .find_map(|key| self.data.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    /// Decodes the body into one of the lenient resource types.
    pub fn parse<T: DeserializeOwned>(&self) -> eyre::Result<T> {
        T::deserialize(&self.data)
            .with_context(|| format!("decode Vimeo API response (HTTP {})", self.status))
    }
}

/// Client for the Vimeo REST API.
///
/// Every request carries the same bearer token and version header; the token is fixed for the
/// lifetime of the client.
#[derive(Debug, Clone)]
pub struct VimeoClient {
    api_base: String,
    client: reqwest::Client,
}

impl VimeoClient {
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("bearer {}", config.access_token()))
            .context("access token is not a valid header value")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            api_base: config.api_base.clone(),
            client,
        })
    }

    /// Performs one request against `path` (which may include a query string).
    ///
    /// Only transport failures are errors. Whatever status the API answers with is returned in
    /// the [`ApiResponse`], together with the body decoded as JSON.
    #[instrument(skip(self, body), fields(status = tracing::field::Empty), level = tracing::Level::DEBUG)]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> eyre::Result<ApiResponse> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {method} request to Vimeo API: {path}"))?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("read Vimeo API response body: {path}"))?;
        let data = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            if !bytes.is_empty() {
                tracing::debug!(len = bytes.len(), "response body is not JSON, treating as empty");
            }
            serde_json::Value::Object(Default::default())
        });

        Ok(ApiResponse { status, data })
    }

    pub async fn get(&self, path: &str) -> eyre::Result<ApiResponse> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// Returns a stream of every folder owned by the authenticated user.
    ///
    /// Pages of [`MAX_PER_PAGE`] are fetched one at a time; the stream ends after the first page
    /// that comes back short. A page that fails (transport error or non-2xx status) is yielded
    /// as an error and ends the stream, so callers see every folder up to that point.
    #[instrument(skip(self))]
    pub fn list_folders(&self) -> impl Stream<Item = eyre::Result<Folder>> + use<'_> {
        PagedStream::new(move |page| async move {
            let page_number = page.to_string();
            let per_page = MAX_PER_PAGE.to_string();
            let path = with_query(
                "/me/projects",
                &[
                    ("page", page_number.as_str()),
                    ("per_page", per_page.as_str()),
                    ("fields", FOLDER_FIELDS),
                ],
            );

            let response = self.get(&path).await?;
            if !response.is_success() {
                eyre::bail!(
                    "folder page {page} failed with HTTP {}: {}",
                    response.status,
                    response.error_message()
                );
            }

            let listing = response.parse::<Page<Folder>>()?;
            // a page that was full before undecodable items were dropped still has a successor
            let sent = listing.len();
            let folders: VecDeque<Folder> = listing.into_items().into();
            tracing::trace!(page, sent, count = folders.len(), "fetched folder page");
            let next = (sent >= MAX_PER_PAGE as usize).then_some(page + 1);
            Ok((folders, next))
        })
    }
}

/// Appends a URL-encoded query string to `path`.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

/// Encodes a caller-supplied identifier for use as one path segment.
pub fn segment(id: &str) -> String {
    // byte_serialize writes spaces as '+', which means something else in a path
    form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
