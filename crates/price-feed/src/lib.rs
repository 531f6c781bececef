//! Steem price sampling
//!
//! Features:
//! - Seven quote APIs behind one `PriceSource` trait
//! - Triangulated pricing for exchanges without a direct STEEM/USDT pair
//! - Bounded retry per source with failures absorbed into "no price"
//! - Sequential polling and unweighted averaging

pub mod aggregator;
pub mod fetcher;
pub mod poller;
pub mod sources;

pub use aggregator::{mean, PriceAggregator, PriceSample};
pub use fetcher::{Fetcher, HttpFetcher, StaticFetcher, DEFAULT_REQUEST_TIMEOUT};
pub use poller::{PollOutcome, SourcePoller};
pub use sources::{sources_for, PriceSource};
