//! Listing-metadata extraction pipeline: SSRF guard, site-specific and
//! generic HTML providers, remote fallbacks, and an optional headless
//! browser, orchestrated into one best-effort result per URL.

pub mod error;
pub mod extractor;
pub mod headless;
pub mod parse;
pub mod providers;
pub mod ssrf;
pub mod types;
pub mod unfurl;

pub use error::ExtractError;
pub use extractor::{ExtractConfig, Extractor};
pub use parse::parse_listing_html;
pub use ssrf::assert_url_is_safe;
pub use types::{merge_result, ExtractResponse, ExtractResult};
