use crate::api::wire;
use crate::api::{ApiError, ContentApiClient, RawPage, RawTitle, TitleRef};
use crate::config::Config;
use crate::models::{CatalogItem, EpisodeRef, Season, TitleInfo};
use crate::request::with_cancellation;
use crate::util::validate_base_url;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

const DEFAULT_MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024; // 5MB

/// [`ContentApiClient`] over HTTP/JSON.
///
/// Endpoints, relative to the base URL:
///
/// | call               | request                           | body                                      |
/// |--------------------|-----------------------------------|-------------------------------------------|
/// | `list_catalog`     | `GET api/anime`                   | `{ success, results: [item] }`            |
/// | `get_episodes`     | `GET api/episodes/{slug}`         | `{ success, results: { episodes: [..] } }`|
/// | `list_by_category` | `GET api/{path}?page=N`           | `{ data: [item], totalPages }`            |
/// | `search`           | `GET api/search?keyword=K&page=N` | `{ data: [item], totalPage }`             |
/// | `get_title`        | `GET api/info?id=ID`, `api/random`| `{ data, seasons }`                       |
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: reqwest::Client,
    base: Url,
    max_response_bytes: usize,
    timeout: Option<Duration>,
}

impl HttpContentApi {
    /// Client with default settings for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Wraps an existing reqwest client (shares its connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client,
            base,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            timeout: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        let mut api = Self::with_client(client, &config.api_base_url)?;
        api.max_response_bytes = config.max_response_bytes;
        api.timeout = config.request_timeout_secs.map(Duration::from_secs);
        Ok(api)
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base}/api/{segments...}?{query}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty().push("api");
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url, cancel: &CancellationToken) -> Result<Value, ApiError> {
        tracing::debug!(url = %url, "GET");

        let fetch = async {
            let response = self.client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(ApiError::HttpStatus(response.status().as_u16()));
            }
            read_limited_bytes(response, self.max_response_bytes).await
        };

        let bytes = with_cancellation(cancel, async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::Timeout),
                },
                None => fetch.await,
            }
        })
        .await
        .inspect_err(|e| {
            if e.is_cancelled() {
                tracing::debug!(url = %url, "Request aborted by cancellation");
            }
        })?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ContentApiClient for HttpContentApi {
    async fn list_catalog(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let mut body = self.get_json(self.endpoint(&["anime"], &[])?, cancel).await?;
        if !wire::envelope_ok(&body) {
            return Err(ApiError::Format("catalog response reported failure".into()));
        }

        wire::items(take_field(&mut body, &["results"]))
            .ok_or_else(|| ApiError::Format("catalog response has no results array".into()))
    }

    async fn get_episodes(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<EpisodeRef>, ApiError> {
        let url = self.endpoint(&["episodes", slug], &[])?;
        let mut body = self.get_json(url, cancel).await?;
        if !wire::envelope_ok(&body) {
            return Err(ApiError::Format(format!(
                "episode response for '{}' reported failure",
                slug
            )));
        }

        Ok(wire::items(take_field(&mut body, &["results", "episodes"])).unwrap_or_default())
    }

    async fn list_by_category(
        &self,
        path: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<RawPage, ApiError> {
        let url = self.endpoint(&[path], &[("page", page.to_string())])?;
        let body = self.get_json(url, cancel).await?;
        Ok(raw_page(body, &["totalPages", "totalPage"]))
    }

    async fn search(
        &self,
        keyword: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<RawPage, ApiError> {
        let url = self.endpoint(
            &["search"],
            &[("keyword", keyword.to_string()), ("page", page.to_string())],
        )?;
        let body = self.get_json(url, cancel).await?;
        Ok(raw_page(body, &["totalPage", "totalPages"]))
    }

    async fn get_title(
        &self,
        title: TitleRef<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawTitle, ApiError> {
        let url = match title {
            TitleRef::Id(id) => self.endpoint(&["info"], &[("id", id.to_string())])?,
            TitleRef::Random => self.endpoint(&["random"], &[])?,
        };
        let mut body = self.get_json(url, cancel).await?;

        let info = match take_field(&mut body, &["data"]) {
            value @ Value::Object(_) => serde_json::from_value::<TitleInfo>(value).ok(),
            _ => None,
        };
        let seasons: Vec<Season> =
            wire::items(take_field(&mut body, &["seasons"])).unwrap_or_default();
        Ok(RawTitle { info, seasons })
    }
}

/// Moves the value at `path` out of `body`, or `Null` when any step is missing
/// or not an object.
fn take_field(body: &mut Value, path: &[&str]) -> Value {
    let mut current = body;
    for key in path {
        match current.get_mut(*key) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.take()
}

/// First present page-count key wins; the value is kept raw for the caller's policy.
fn raw_page(mut body: Value, total_keys: &[&str]) -> RawPage {
    let total_pages = total_keys
        .iter()
        .find_map(|key| body.get(*key).filter(|v| !v.is_null()).cloned());
    RawPage {
        items: wire::items(take_field(&mut body, &["data"])),
        total_pages,
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
