use async_trait::async_trait;
use serde_json::Value;

use crate::error::QueryError;
use crate::models::TimelinePage;

/// Source of public timeline pages for a host.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch one page of the host's local public timeline.
    ///
    /// With a cursor, only posts whose id is at most `cursor` are returned.
    /// Without one, the most recent page is returned. No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    async fn fetch_page(&self, host: &str, cursor: Option<u64>)
        -> Result<TimelinePage, QueryError>;
}

/// Source of instance metadata for a host.
#[async_trait]
pub trait InstanceSource: Send + Sync {
    /// Fetch the decoded instance metadata document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    async fn fetch_instance(&self, host: &str) -> Result<Value, QueryError>;
}

/// Detection of server implementations the oldest-post search cannot handle.
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// Whether the host runs the excluded platform variant.
    ///
    /// Best effort: any failure means "not excluded".
    async fn is_excluded_platform(&self, host: &str) -> bool;
}
