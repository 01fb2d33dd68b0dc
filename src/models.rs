//! Catalog entities as returned by the content API.
//!
//! The API's JSON shapes are an external contract that drifts, so every field is
//! decoded through the lenient helpers in [`crate::api::wire`]: a missing, null or
//! wrongly-typed field falls back to its default instead of failing the payload.

use crate::api::wire;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A title in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CatalogItem {
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub id: String,
    /// Path key used by the episode endpoint.
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::lenient_string_list")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub poster: Option<String>,
    #[serde(
        default,
        alias = "japaneseTitle",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub japanese_title: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, alias = "tvInfo", deserialize_with = "wire::lenient_object")]
    pub tv_info: TvInfo,
}

/// Broadcast metadata shown as badges on cards and the detail page.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TvInfo {
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub quality: Option<String>,
    /// Number of subtitled episodes.
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub sub: Option<String>,
    /// Number of dubbed episodes.
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub dub: Option<String>,
    #[serde(
        default,
        alias = "showType",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub show_type: Option<String>,
}

/// One episode of a title.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EpisodeRef {
    #[serde(
        default,
        alias = "episode_no",
        alias = "episodeNumber",
        deserialize_with = "wire::lenient_u32"
    )]
    pub number: u32,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub title: Option<String>,
    #[serde(
        default,
        alias = "releasedAt",
        deserialize_with = "wire::lenient_datetime"
    )]
    pub released_at: Option<DateTime<Utc>>,
}

/// A catalog item with its latest episode attached.
///
/// `latest_episode == None` means the lookup finished without an episode
/// (failed, or the title has none yet). It is a terminal value, not "pending".
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedItem {
    pub item: CatalogItem,
    pub latest_episode: Option<EpisodeRef>,
}

/// Full record for the title detail page.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TitleInfo {
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub title: String,
    #[serde(
        default,
        alias = "japaneseTitle",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub japanese_title: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub poster: Option<String>,
    #[serde(
        default,
        rename = "animeInfo",
        alias = "anime_info",
        deserialize_with = "wire::lenient_object"
    )]
    pub details: TitleDetails,
    #[serde(
        default,
        rename = "recommended_data",
        alias = "recommended",
        deserialize_with = "wire::lenient_items"
    )]
    pub recommended: Vec<CatalogItem>,
}

/// The nested `animeInfo` block of a title record.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TitleDetails {
    #[serde(default, rename = "tvInfo", alias = "tv_info", deserialize_with = "wire::lenient_object")]
    pub tv_info: TvInfo,
    #[serde(
        default,
        rename = "Overview",
        alias = "overview",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub overview: Option<String>,
    #[serde(
        default,
        rename = "Genres",
        alias = "genres",
        deserialize_with = "wire::lenient_string_list"
    )]
    pub genres: Vec<String>,
    #[serde(
        default,
        rename = "Producers",
        alias = "producers",
        deserialize_with = "wire::lenient_string_list"
    )]
    pub producers: Vec<String>,
    #[serde(
        default,
        rename = "Status",
        alias = "status",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub status: Option<String>,
}

/// Another season of the same franchise, linked from the detail page.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Season {
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub season: Option<String>,
    #[serde(
        default,
        alias = "seasonPoster",
        deserialize_with = "wire::lenient_opt_string"
    )]
    pub season_poster: Option<String>,
}
