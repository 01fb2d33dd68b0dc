//! Cancellable queries for listing, search and detail pages.
//!
//! - [`descriptor`] - what to fetch ([`QueryDescriptor`], [`DetailQuery`]) and how
//!   raw pages are normalised into [`PageResult`]
//! - [`controller`] - [`QueryController`], the last-request-wins state machine
//! - [`outcome`] - classification of a state into what a page should render
//! - [`atoz`] - letter navigation for the A-to-Z listing
//!
//! # Example
//!
//! ```ignore
//! let mut search = QueryController::new(api.clone());
//! search.resolve(QueryDescriptor::search("frieren", 1));
//! search.resolve(QueryDescriptor::search("frieren", 2)); // cancels page 1
//! let state = search.settled().await;
//! match ListingOutcome::classify(&state, 2) { /* ... */ }
//! ```

pub mod atoz;
mod controller;
mod descriptor;
mod outcome;

pub use controller::{ErrorInfo, QueryController, QueryState};
pub use descriptor::{
    parse_page, DetailQuery, PageResult, Query, QueryDescriptor, TitleDetail, NOT_FOUND_ID,
};
pub use outcome::{DetailOutcome, ListingOutcome};

/// Controller for category, A-to-Z and search pages.
pub type ListingController = QueryController<QueryDescriptor>;

/// Controller for the title detail page.
pub type DetailController = QueryController<DetailQuery>;
