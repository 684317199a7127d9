//! Shared constants used across the application.

/// User agent string sent with every API request.
pub const SURVEY_USER_AGENT: &str = concat!("instance-first-post/", env!("CARGO_PKG_VERSION"));

/// Public list of candidate hosts, one per line.
pub const DEFAULT_HOSTS_URL: &str =
    "https://raw.githubusercontent.com/distsn/follow-recommendation/master/hosts.txt";

/// Number of posts a Mastodon-compatible server returns per public timeline page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Endpoint that only Pleroma answers with JSON.
pub const DEFAULT_PLATFORM_PROBE_PATH: &str = "/api/statusnet/config.json";

/// Public timeline endpoint, restricted to posts local to the host.
pub const TIMELINE_PATH: &str = "/api/v1/timelines/public?local=true";

/// Instance metadata endpoint.
pub const INSTANCE_PATH: &str = "/api/v1/instance";
