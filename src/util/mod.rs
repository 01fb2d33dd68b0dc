//! Utility functions for common operations.
//!
//! - **URL validation**: the content API base URL must be HTTPS (loopback excepted)
//! - **Slugs**: link slugs and headings derived from catalog labels

mod slug;
mod url_validator;

pub use slug::{category_title, producer_slug};
pub use url_validator::{validate_base_url, UrlValidationError};
