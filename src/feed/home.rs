use crate::models::{CatalogItem, EnrichedItem};
use std::collections::BTreeSet;

/// The home page, as named slices of one catalog snapshot.
///
/// Every slice is derived from the base list in [`HomeFeed::derive`]; nothing
/// mutates a slice independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeFeed {
    pub spotlights: Vec<CatalogItem>,
    /// Every genre of every title, once.
    pub genres: BTreeSet<String>,
    pub latest_episode: Vec<EnrichedItem>,
    pub top_airing: Vec<CatalogItem>,
    pub most_favorite: Vec<CatalogItem>,
    pub latest_completed: Vec<CatalogItem>,
    pub trending: Vec<CatalogItem>,
    pub top_ten: Vec<CatalogItem>,
}

impl HomeFeed {
    pub const SPOTLIGHTS: usize = 5;
    pub const LATEST_EPISODES: usize = 12;
    pub const TOP_LISTS: usize = 10;
    pub const LATEST_COMPLETED: usize = 10;
    pub const TRENDING: usize = 12;

    /// Builds every slice from `catalog` (API order) and its enriched twin.
    ///
    /// Windows larger than the list yield the whole list.
    pub fn derive(catalog: &[CatalogItem], enriched: &[EnrichedItem]) -> Self {
        let genres = catalog
            .iter()
            .flat_map(|item| item.genres.iter())
            .filter(|genre| !genre.is_empty())
            .cloned()
            .collect();

        Self {
            spotlights: head(catalog, Self::SPOTLIGHTS),
            genres,
            latest_episode: tail(enriched, Self::LATEST_EPISODES),
            top_airing: head(catalog, Self::TOP_LISTS),
            most_favorite: head(catalog, Self::TOP_LISTS),
            latest_completed: tail(catalog, Self::LATEST_COMPLETED),
            trending: head(catalog, Self::TRENDING),
            top_ten: head(catalog, Self::TOP_LISTS),
        }
    }
}

fn head<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[..n.min(items.len())].to_vec()
}

fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}
