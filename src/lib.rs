//! Fediverse instance freshness survey.
//!
//! Finds the oldest public post still retrievable from each candidate
//! Mastodon-compatible host, ranks the hosts by how recent that post is, and
//! writes the ranking as a JSON snapshot. A companion sampler estimates each
//! host's posting throughput.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod hosts;
pub mod locator;
pub mod metadata;
pub mod models;
pub mod snapshot;
pub mod speed;
pub mod survey;

#[cfg(test)]
mod testing;

pub use error::{HostError, MalformedPostError, QueryError};
pub use locator::OldestPostLocator;
pub use models::{Host, HostOutcome, OldestPost, Post, TimelinePage};
pub use survey::{HostSurveyor, SurveyOptions};
