//! The content API collaborator.
//!
//! [`ContentApiClient`] is the only seam between the orchestration layer and the
//! network. [`HttpContentApi`] implements it over reqwest; tests substitute spies.
//!
//! Every call takes a [`CancellationToken`]. Implementations must abort the
//! underlying transport when the token fires and report [`ApiError::Cancelled`],
//! not merely discard the result after it arrives.

mod error;
mod http;
pub(crate) mod wire;

pub use error::{ApiError, ErrorKind};
pub use http::HttpContentApi;

use crate::models::{CatalogItem, EpisodeRef, Season, TitleInfo};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A listing page as the API returned it, before the page-count policy is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    /// `None` when the payload had no usable item array.
    pub items: Option<Vec<CatalogItem>>,
    /// The page-count field exactly as sent (`totalPages` or `totalPage`).
    pub total_pages: Option<Value>,
}

/// A title detail payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTitle {
    pub info: Option<TitleInfo>,
    pub seasons: Vec<Season>,
}

/// Which title a detail request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRef<'a> {
    Id(&'a str),
    Random,
}

#[async_trait]
pub trait ContentApiClient: Send + Sync {
    /// The full catalog, in the API's order.
    async fn list_catalog(&self, cancel: &CancellationToken)
        -> Result<Vec<CatalogItem>, ApiError>;

    /// Episodes of one title, oldest first. An empty list is a valid answer.
    async fn get_episodes(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<EpisodeRef>, ApiError>;

    /// One page of a category listing (`genre/action`, `az-list/b`, `most-popular`, ...).
    async fn list_by_category(
        &self,
        path: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<RawPage, ApiError>;

    async fn search(
        &self,
        keyword: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<RawPage, ApiError>;

    async fn get_title(
        &self,
        title: TitleRef<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawTitle, ApiError>;
}
