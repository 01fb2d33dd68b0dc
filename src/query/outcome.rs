//! What a page should show for a given query state.
//!
//! Listing pages have several empty-looking outcomes that must not be confused:
//! nothing matched, the request failed, or the page number is past the end.

use super::controller::{ErrorInfo, QueryState};
use super::descriptor::{PageResult, TitleDetail};
use crate::models::{Season, TitleInfo};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListingOutcome<'a> {
    /// No request was made (e.g. empty search keyword): prompt for input.
    Idle,
    Loading,
    Failed(&'a ErrorInfo),
    /// `page` is past the last known page.
    BeyondLastPage { page: u32, total_pages: u32 },
    /// The request succeeded and matched nothing.
    NoResults,
    Results(&'a PageResult),
}

impl<'a> ListingOutcome<'a> {
    pub fn classify(state: &'a QueryState<PageResult>, page: u32) -> Self {
        match state {
            QueryState::Idle => ListingOutcome::Idle,
            QueryState::Loading => ListingOutcome::Loading,
            QueryState::Error(info) => ListingOutcome::Failed(info),
            QueryState::Success(result) if result.is_beyond_last_page(page) => {
                ListingOutcome::BeyondLastPage {
                    page,
                    total_pages: result.total_pages,
                }
            }
            QueryState::Success(result) if result.items.is_empty() => ListingOutcome::NoResults,
            QueryState::Success(result) => ListingOutcome::Results(result),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailOutcome<'a> {
    Idle,
    Loading,
    Failed(&'a ErrorInfo),
    /// The API answered but had no such title.
    NotFound,
    Found {
        info: &'a TitleInfo,
        seasons: &'a [Season],
    },
}

impl<'a> DetailOutcome<'a> {
    pub fn classify(state: &'a QueryState<TitleDetail>) -> Self {
        match state {
            QueryState::Idle => DetailOutcome::Idle,
            QueryState::Loading => DetailOutcome::Loading,
            QueryState::Error(info) => DetailOutcome::Failed(info),
            QueryState::Success(TitleDetail { info: None, .. }) => DetailOutcome::NotFound,
            QueryState::Success(TitleDetail {
                info: Some(info),
                seasons,
            }) => DetailOutcome::Found { info, seasons },
        }
    }
}
