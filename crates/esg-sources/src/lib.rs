//! Evidence sources for the ESG greenwashing detector
//!
//! Each client wraps one JSON API, applies its own rate limit and response
//! cache, and maps results into [`RawArticle`]s. [`SourceHub`] fans a query out
//! to every configured source and merges the results.

pub mod article;
pub mod cache;
pub mod classify;
pub mod error;
pub mod hub;
mod http;
pub mod newsapi;
pub mod newsdata;
pub mod scholar;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use article::{RawArticle, SearchRequest};
pub use cache::{CacheKey, ResponseCache};
pub use classify::{classify_source, freshness_days, news_source_tier, parse_date};
pub use error::{Result, SourceError};
pub use hub::{EvidenceSource, SourceHub, aggregate_and_deduplicate};
pub use newsapi::NewsApiClient;
pub use newsdata::NewsDataClient;
pub use scholar::SemanticScholarClient;
