//! Candidate host list.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;

/// Parse a host list: one host per line, blank lines and `#` comments ignored.
#[must_use]
pub fn parse_host_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Load the candidate hosts from `HOSTS_FILE` if set, otherwise from `HOSTS_URL`.
///
/// # Errors
///
/// Returns an error if the list cannot be read or downloaded.
pub async fn load_hosts(client: &reqwest::Client, config: &Config) -> Result<BTreeSet<String>> {
    let text = if let Some(path) = &config.hosts_file {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read host list: {}", path.display()))?
    } else {
        let response = client
            .get(&config.hosts_url)
            .send()
            .await
            .context("Failed to fetch host list")?;

        if !response.status().is_success() {
            anyhow::bail!("Host list fetch failed with status {}", response.status());
        }

        response.text().await.context("Failed to read host list body")?
    };

    let hosts = parse_host_list(&text);
    info!(count = hosts.len(), "Loaded candidate hosts");
    Ok(hosts)
}
