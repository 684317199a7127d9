//! Access to the Mastodon-compatible HTTP API of surveyed hosts.

mod client;
mod traits;

pub use client::ApiClient;
pub use traits::{InstanceSource, PlatformProbe, TimelineSource};
