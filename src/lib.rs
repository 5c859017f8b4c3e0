//! mr-mergeability - cached, pluggable mergeability checks for merge requests
//!
//! A merge request is mergeable when every applicable check passes. Checks
//! are declared as an ordered [`checks::CheckList`], evaluated in order by
//! [`runner::MergeabilityCheckRunner`], and their results are cached in a
//! [`store::ResultsStore`] under keys that change whenever the state a check
//! depends on changes.
//!
//! # Architecture
//!
//! - [`checks`] - the closed set of checks and their result type
//! - [`store`] / [`cache`] - versioned, TTL-bound result caching
//! - [`runner`] - evaluation loop and aggregation into a decision
//! - [`platform`] - read-only forge queries (GitLab)
//! - [`config`] / [`auth`] - configuration and credentials

pub mod auth;
pub mod cache;
pub mod checks;
pub mod config;
pub mod error;
pub mod platform;
pub mod runner;
pub mod store;
pub mod types;
