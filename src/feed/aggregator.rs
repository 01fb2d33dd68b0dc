use super::home::HomeFeed;
use crate::api::{ApiError, ContentApiClient};
use crate::models::{CatalogItem, EnrichedItem, EpisodeRef};
use crate::request::settle_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Errors that fail a home feed build as a whole.
///
/// Episode lookups never surface here; a failed lookup only leaves that
/// title's `latest_episode` empty.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Failed to fetch catalog: {0}")]
    Catalog(#[source] ApiError),
    #[error("Home feed build cancelled")]
    Cancelled,
}

/// Builds the home feed from one catalog fetch plus an episode lookup per title.
///
/// One instance per session: [`home_feed`](Self::home_feed) memoises the first
/// successful build, [`build_home_feed`](Self::build_home_feed) always rebuilds.
pub struct FeedAggregator {
    client: Arc<dyn ContentApiClient>,
    concurrency: usize,
    cached: OnceCell<Arc<HomeFeed>>,
}

impl FeedAggregator {
    pub const DEFAULT_CONCURRENCY: usize = 8;

    pub fn new(client: Arc<dyn ContentApiClient>) -> Self {
        Self {
            client,
            concurrency: Self::DEFAULT_CONCURRENCY,
            cached: OnceCell::new(),
        }
    }

    /// Caps the number of episode lookups in flight. 0 is treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The session's home feed, built on first use.
    ///
    /// A failed build is not cached; the next call tries again.
    pub async fn home_feed(&self) -> Result<Arc<HomeFeed>, AggregationError> {
        self.cached
            .get_or_try_init(|| async { self.build_home_feed().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    pub async fn build_home_feed(&self) -> Result<HomeFeed, AggregationError> {
        self.build_home_feed_with(&CancellationToken::new()).await
    }

    /// Builds a fresh feed, bound to `cancel`.
    ///
    /// Cancellation aborts the catalog fetch and every pending episode lookup and
    /// yields [`AggregationError::Cancelled`] rather than a half-enriched feed.
    pub async fn build_home_feed_with(
        &self,
        cancel: &CancellationToken,
    ) -> Result<HomeFeed, AggregationError> {
        let catalog = match self.client.list_catalog(cancel).await {
            Ok(catalog) => catalog,
            Err(ApiError::Cancelled) => return Err(AggregationError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed, home feed unavailable");
                return Err(AggregationError::Catalog(e));
            }
        };

        tracing::debug!(
            titles = catalog.len(),
            concurrency = self.concurrency,
            "Catalog fetched, looking up latest episodes"
        );

        let enriched = self.enrich(&catalog, cancel).await;
        if cancel.is_cancelled() {
            return Err(AggregationError::Cancelled);
        }

        let missing = enriched
            .iter()
            .filter(|e| e.latest_episode.is_none())
            .count();
        tracing::info!(
            titles = catalog.len(),
            without_episode = missing,
            "Home feed built"
        );

        Ok(HomeFeed::derive(&catalog, &enriched))
    }

    /// Attaches the latest episode to every title, in catalog order.
    async fn enrich(&self, catalog: &[CatalogItem], cancel: &CancellationToken) -> Vec<EnrichedItem> {
        let lookups = catalog.iter().map(|item| self.latest_episode(item, cancel));
        let outcomes = settle_all(lookups, self.concurrency).await;

        catalog
            .iter()
            .zip(outcomes)
            .map(|(item, outcome)| {
                let latest_episode = outcome.unwrap_or_else(|e| {
                    tracing::debug!(slug = %item.slug, error = %e, "Episode lookup failed");
                    None
                });
                EnrichedItem {
                    item: item.clone(),
                    latest_episode,
                }
            })
            .collect()
    }

    async fn latest_episode(
        &self,
        item: &CatalogItem,
        cancel: &CancellationToken,
    ) -> Result<Option<EpisodeRef>, ApiError> {
        if item.slug.trim().is_empty() {
            tracing::debug!(id = %item.id, "Title has no slug, skipping episode lookup");
            return Ok(None);
        }
        let mut episodes = self.client.get_episodes(&item.slug, cancel).await?;
        Ok(episodes.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawPage, RawTitle, TitleRef};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed catalog; episode answers are looked up by slug.
    #[derive(Default)]
    struct StubApi {
        catalog: Vec<CatalogItem>,
        catalog_fails: bool,
        episodes: HashMap<String, Vec<EpisodeRef>>,
        catalog_calls: AtomicUsize,
        episode_calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentApiClient for StubApi {
        async fn list_catalog(
            &self,
            _cancel: &CancellationToken,
        ) -> Result<Vec<CatalogItem>, ApiError> {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            if self.catalog_fails {
                return Err(ApiError::HttpStatus(503));
            }
            Ok(self.catalog.clone())
        }

        async fn get_episodes(
            &self,
            slug: &str,
            _cancel: &CancellationToken,
        ) -> Result<Vec<EpisodeRef>, ApiError> {
            self.episode_calls.fetch_add(1, Ordering::SeqCst);
            self.episodes
                .get(slug)
                .cloned()
                .ok_or_else(|| ApiError::Format(format!("no episodes for {}", slug)))
        }

        async fn list_by_category(
            &self,
            _path: &str,
            _page: u32,
            _cancel: &CancellationToken,
        ) -> Result<RawPage, ApiError> {
            unreachable!("not used by the aggregator")
        }

        async fn search(
            &self,
            _keyword: &str,
            _page: u32,
            _cancel: &CancellationToken,
        ) -> Result<RawPage, ApiError> {
            unreachable!("not used by the aggregator")
        }

        async fn get_title(
            &self,
            _title: TitleRef<'_>,
            _cancel: &CancellationToken,
        ) -> Result<RawTitle, ApiError> {
            unreachable!("not used by the aggregator")
        }
    }

    fn titles(n: usize) -> Vec<CatalogItem> {
        (0..n)
            .map(|i| CatalogItem {
                id: i.to_string(),
                slug: format!("title-{}", i),
                genres: vec!["Action".into()],
                ..Default::default()
            })
            .collect()
    }

    fn episode(number: u32) -> EpisodeRef {
        EpisodeRef {
            number,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_latest_episode_is_last_in_list() {
        let mut api = StubApi {
            catalog: titles(2),
            ..Default::default()
        };
        api.episodes
            .insert("title-0".into(), vec![episode(1), episode(2), episode(3)]);
        api.episodes.insert("title-1".into(), Vec::new());

        let feed = FeedAggregator::new(Arc::new(api))
            .build_home_feed()
            .await
            .unwrap();

        assert_eq!(
            feed.latest_episode[0].latest_episode,
            Some(episode(3))
        );
        assert_eq!(feed.latest_episode[1].latest_episode, None);
    }

    #[tokio::test]
    async fn test_all_episode_lookups_fail() {
        let api = Arc::new(StubApi {
            catalog: titles(15),
            ..Default::default()
        });

        let feed = FeedAggregator::new(api.clone())
            .build_home_feed()
            .await
            .unwrap();

        assert_eq!(api.episode_calls.load(Ordering::SeqCst), 15);
        assert_eq!(feed.latest_episode.len(), 12);
        assert!(feed.latest_episode.iter().all(|e| e.latest_episode.is_none()));
        assert_eq!(feed.spotlights.len(), 5);
    }

    #[tokio::test]
    async fn test_catalog_failure_fails_build() {
        let api = Arc::new(StubApi {
            catalog_fails: true,
            ..Default::default()
        });

        let result = FeedAggregator::new(api.clone()).build_home_feed().await;
        assert!(matches!(
            result,
            Err(AggregationError::Catalog(ApiError::HttpStatus(503)))
        ));
        assert_eq!(api.episode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_slug_skips_lookup() {
        let mut catalog = titles(3);
        catalog[1].slug = String::new();
        let api = Arc::new(StubApi {
            catalog,
            ..Default::default()
        });

        let feed = FeedAggregator::new(api.clone())
            .build_home_feed()
            .await
            .unwrap();
        assert_eq!(api.episode_calls.load(Ordering::SeqCst), 2);
        assert_eq!(feed.latest_episode.len(), 3);
    }

    #[tokio::test]
    async fn test_home_feed_is_memoised() {
        let api = Arc::new(StubApi {
            catalog: titles(3),
            ..Default::default()
        });
        let aggregator = FeedAggregator::new(api.clone());

        let first = aggregator.home_feed().await.unwrap();
        let second = aggregator.home_feed().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(api.catalog_calls.load(Ordering::SeqCst), 1);

        aggregator.build_home_feed().await.unwrap();
        assert_eq!(api.catalog_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_build_not_memoised() {
        let api = Arc::new(StubApi {
            catalog_fails: true,
            ..Default::default()
        });
        let aggregator = FeedAggregator::new(api.clone());

        assert!(aggregator.home_feed().await.is_err());
        assert!(aggregator.home_feed().await.is_err());
        assert_eq!(api.catalog_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_build() {
        let api = Arc::new(StubApi {
            catalog: titles(3),
            ..Default::default()
        });
        let token = CancellationToken::new();
        token.cancel();

        let result = FeedAggregator::new(api)
            .build_home_feed_with(&token)
            .await;
        assert!(matches!(result, Err(AggregationError::Cancelled)));
    }
}
