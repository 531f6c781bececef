//! Core types and utilities for the Steem price feed
//!
//! This crate provides what every other crate shares:
//! - Exchange identifiers and the on-chain exchange rate
//! - Feed configuration and its startup validation
//! - Error types for sources, publishing and configuration
//! - The bounded retry policy and injectable sleep

pub mod types;
pub mod config;
pub mod errors;
pub mod retry;

pub use types::*;
pub use config::*;
pub use errors::*;
pub use retry::*;
