//! Data-fetch orchestration for an anime catalog site.
//!
//! The crate sits between page-level UI code and a remote content API:
//!
//! - [`feed`] builds the home feed: one catalog fetch, a bounded fan-out for the
//!   latest episode of every title, and the named slices derived from the result.
//! - [`query`] drives listing, search and detail pages through a cancellable
//!   controller that only ever publishes the result of the newest request.
//! - [`api`] defines the [`api::ContentApiClient`] collaborator and its reqwest
//!   implementation.
//!
//! # Example
//!
//! ```ignore
//! use anifeed::api::HttpContentApi;
//! use anifeed::query::{QueryController, QueryDescriptor};
//!
//! let api = Arc::new(HttpContentApi::new("https://api.example.com")?);
//! let mut listing = QueryController::new(api);
//! listing.resolve(QueryDescriptor::category("genre/action", 2));
//! let state = listing.settled().await;
//! ```

pub mod api;
pub mod config;
pub mod feed;
pub mod models;
pub mod query;
pub mod request;
pub mod util;
