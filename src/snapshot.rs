//! Freshness-ranked JSON snapshot of surveyed hosts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Host;

/// One host as written to the snapshot file.
///
/// The timestamp is emitted as a string of Unix seconds and absent optional
/// fields as empty strings, which is what existing consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub domain: String,
    pub first_toot_time: String,
    pub first_toot_url: String,
    pub title: String,
    pub thumbnail: String,
}

impl From<&Host> for SnapshotEntry {
    fn from(host: &Host) -> Self {
        Self {
            domain: host.domain.clone(),
            first_toot_time: host.oldest_post_time.timestamp().to_string(),
            first_toot_url: host.oldest_post_url.clone(),
            title: host.title.clone().unwrap_or_default(),
            thumbnail: host.thumbnail.clone().unwrap_or_default(),
        }
    }
}

/// Sort hosts freshest first; hosts with equal times keep their order.
pub fn sort_by_freshness(hosts: &mut [Host]) {
    hosts.sort_by(|a, b| b.oldest_post_time.cmp(&a.oldest_post_time));
}

/// Render hosts as the snapshot JSON array, freshest first.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(hosts: &[Host]) -> serde_json::Result<String> {
    let mut sorted = hosts.to_vec();
    sort_by_freshness(&mut sorted);
    let entries: Vec<SnapshotEntry> = sorted.iter().map(SnapshotEntry::from).collect();
    serde_json::to_string(&entries)
}

/// Overwrite `destination` with the snapshot of `hosts`.
///
/// Returns whether the file was written. A destination that cannot be
/// written is logged and skipped.
pub async fn write(hosts: &[Host], destination: &Path) -> bool {
    let json = match render(hosts) {
        Ok(json) => json,
        Err(e) => {
            warn!(path = %destination.display(), "Failed to render snapshot: {e}");
            return false;
        }
    };

    match tokio::fs::write(destination, json).await {
        Ok(()) => {
            info!(
                path = %destination.display(),
                hosts = hosts.len(),
                "Snapshot written"
            );
            true
        }
        Err(e) => {
            warn!(path = %destination.display(), "Skipping snapshot write: {e}");
            false
        }
    }
}
