//! Witness feed publishing
//!
//! Features:
//! - JSON-RPC client with node failover
//! - feed_publish transaction serialization and signing
//! - Bounded retry around each broadcast

pub mod client;
pub mod steem;
pub mod submitter;
pub mod transaction;

pub use client::{RecordingWitnessClient, WitnessClient};
pub use steem::{SteemClient, DEFAULT_RPC_TIMEOUT};
pub use submitter::{FeedSubmitter, PublishOutcome};
pub use transaction::{ActiveKey, HeadBlock, Transaction, STEEM_CHAIN_ID};
