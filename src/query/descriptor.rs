use crate::api::wire::positive_count;
use crate::api::{ApiError, ContentApiClient, RawPage, RawTitle, TitleRef};
use crate::models::{CatalogItem, Season, TitleInfo};
use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// Title id the router uses for its not-found page. Never fetched.
pub const NOT_FOUND_ID: &str = "404-not-found-page";

/// Something a [`QueryController`](super::QueryController) can fetch.
///
/// Two equal descriptors denote the same request; the controller only re-issues
/// on change (or on an explicit reload).
#[async_trait]
pub trait Query: Clone + PartialEq + Debug + Send + Sync + 'static {
    type Output: Clone + Debug + Send + Sync + 'static;

    /// Idle descriptors publish `Idle` without touching the network.
    fn is_idle(&self) -> bool {
        false
    }

    async fn fetch(
        &self,
        client: &dyn ContentApiClient,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, ApiError>;
}

/// Parameters of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryDescriptor {
    /// Category-style listing: genres, A-to-Z letters, curated lists.
    Category { path: String, page: u32 },
    Search { keyword: String, page: u32 },
}

impl QueryDescriptor {
    /// Pages are 1-based; 0 is lifted to 1.
    pub fn category(path: impl Into<String>, page: u32) -> Self {
        QueryDescriptor::Category {
            path: path.into(),
            page: page.max(1),
        }
    }

    pub fn search(keyword: impl Into<String>, page: u32) -> Self {
        QueryDescriptor::Search {
            keyword: keyword.into(),
            page: page.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            QueryDescriptor::Category { page, .. } | QueryDescriptor::Search { page, .. } => *page,
        }
    }

    /// Same listing, different page.
    pub fn with_page(&self, page: u32) -> Self {
        match self {
            QueryDescriptor::Category { path, .. } => Self::category(path.clone(), page),
            QueryDescriptor::Search { keyword, .. } => Self::search(keyword.clone(), page),
        }
    }
}

/// Parses a raw `page` query parameter the way browsers hand it over.
///
/// Leading digits are taken (`"3abc"` is page 3); anything that does not yield a
/// positive number is page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 1;
    };
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(page) if page > 0 => page,
        _ => 1,
    }
}

/// One normalised listing page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub items: Vec<CatalogItem>,
    /// Category pages: at least 1. Search pages: 0 when nothing matched.
    pub total_pages: u32,
}

impl PageResult {
    /// Missing items become an empty page; a missing or garbled page count is 1.
    pub fn from_category(raw: RawPage) -> Self {
        let items = raw.items.unwrap_or_default();
        let total_pages = raw
            .total_pages
            .as_ref()
            .and_then(positive_count)
            .unwrap_or(1);
        Self { items, total_pages }
    }

    /// Like [`from_category`](Self::from_category), except a garbled count on an
    /// empty result is 0: there are no pages to go to.
    pub fn from_search(raw: RawPage) -> Self {
        let items = raw.items.unwrap_or_default();
        let fallback = if items.is_empty() { 0 } else { 1 };
        let total_pages = raw
            .total_pages
            .as_ref()
            .and_then(positive_count)
            .unwrap_or(fallback);
        Self { items, total_pages }
    }

    /// Advisory bounds check; the controller never clamps.
    pub fn is_beyond_last_page(&self, page: u32) -> bool {
        self.total_pages > 0 && page > self.total_pages
    }
}

#[async_trait]
impl Query for QueryDescriptor {
    type Output = PageResult;

    fn is_idle(&self) -> bool {
        matches!(self, QueryDescriptor::Search { keyword, .. } if keyword.trim().is_empty())
    }

    async fn fetch(
        &self,
        client: &dyn ContentApiClient,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        match self {
            QueryDescriptor::Category { path, page } => client
                .list_by_category(path, *page, cancel)
                .await
                .map(PageResult::from_category),
            QueryDescriptor::Search { keyword, page } => client
                .search(keyword.trim(), *page, cancel)
                .await
                .map(PageResult::from_search),
        }
    }
}

/// Parameters of the title detail page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetailQuery {
    Id(String),
    Random,
}

/// A title with its sibling seasons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitleDetail {
    /// `None` when the API answered without a record.
    pub info: Option<TitleInfo>,
    pub seasons: Vec<Season>,
}

impl From<RawTitle> for TitleDetail {
    fn from(raw: RawTitle) -> Self {
        Self {
            info: raw.info,
            seasons: raw.seasons,
        }
    }
}

#[async_trait]
impl Query for DetailQuery {
    type Output = TitleDetail;

    fn is_idle(&self) -> bool {
        matches!(self, DetailQuery::Id(id) if id.trim().is_empty() || id.trim() == NOT_FOUND_ID)
    }

    async fn fetch(
        &self,
        client: &dyn ContentApiClient,
        cancel: &CancellationToken,
    ) -> Result<TitleDetail, ApiError> {
        let title = match self {
            DetailQuery::Id(id) => TitleRef::Id(id.trim()),
            DetailQuery::Random => TitleRef::Random,
        };
        client.get_title(title, cancel).await.map(TitleDetail::from)
    }
}
