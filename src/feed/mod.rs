//! Home feed aggregation.
//!
//! - [`FeedAggregator`] - catalog fetch plus a bounded, failure-isolated episode
//!   lookup per title
//! - [`HomeFeed`] - the named slices derived from one catalog snapshot
//!
//! # Example
//!
//! ```ignore
//! let aggregator = FeedAggregator::new(api).with_concurrency(8);
//! let feed = aggregator.home_feed().await?;
//! for item in &feed.spotlights {
//!     println!("{}", item.title);
//! }
//! ```

mod aggregator;
mod home;

pub use aggregator::{AggregationError, FeedAggregator};
pub use home::HomeFeed;
