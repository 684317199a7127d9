use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

use super::traits::{InstanceSource, PlatformProbe, TimelineSource};
use crate::config::Config;
use crate::constants::{INSTANCE_PATH, SURVEY_USER_AGENT, TIMELINE_PATH};
use crate::error::QueryError;
use crate::models::TimelinePage;

/// HTTP client for the Mastodon-compatible API of a host.
///
/// Every request is bounded by the configured timeout; a timeout surfaces as
/// [`QueryError::Transport`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    scheme: String,
    probe_path: String,
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(SURVEY_USER_AGENT)
            .build()?;

        Ok(Self::with_client(
            http,
            &config.api_scheme,
            &config.platform_probe_path,
        ))
    }

    /// Wrap an existing HTTP client.
    #[must_use]
    pub fn with_client(http: Client, scheme: &str, probe_path: &str) -> Self {
        Self {
            http,
            scheme: scheme.to_string(),
            probe_path: probe_path.to_string(),
        }
    }

    /// The underlying HTTP client, shared with other fetchers.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    fn endpoint(&self, host: &str, path: &str) -> String {
        format!("{}://{host}{path}", self.scheme)
    }

    fn timeline_url(&self, host: &str, cursor: Option<u64>) -> String {
        let base = self.endpoint(host, TIMELINE_PATH);
        match cursor {
            Some(max_id) => format!("{base}&max_id={max_id}"),
            None => base,
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, QueryError> {
        trace!(url = %url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| QueryError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| QueryError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| QueryError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl TimelineSource for ApiClient {
    async fn fetch_page(
        &self,
        host: &str,
        cursor: Option<u64>,
    ) -> Result<TimelinePage, QueryError> {
        let url = self.timeline_url(host, cursor);
        match self.get_json(&url).await? {
            Value::Array(posts) if posts.iter().all(Value::is_object) => {
                Ok(TimelinePage::new(posts))
            }
            _ => Err(QueryError::NotAPage { url }),
        }
    }
}

#[async_trait]
impl InstanceSource for ApiClient {
    async fn fetch_instance(&self, host: &str) -> Result<Value, QueryError> {
        self.get_json(&self.endpoint(host, INSTANCE_PATH)).await
    }
}

#[async_trait]
impl PlatformProbe for ApiClient {
    async fn is_excluded_platform(&self, host: &str) -> bool {
        match self.get_json(&self.endpoint(host, &self.probe_path)).await {
            Ok(_) => true,
            Err(e) => {
                debug!(domain = %host, "Platform probe negative: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::with_client(Client::new(), "https", "/api/statusnet/config.json")
    }

    #[test]
    fn test_timeline_url_without_cursor() {
        assert_eq!(
            client().timeline_url("mastodon.example", None),
            "https://mastodon.example/api/v1/timelines/public?local=true"
        );
    }

    #[test]
    fn test_timeline_url_with_cursor() {
        assert_eq!(
            client().timeline_url("mastodon.example", Some(98_765)),
            "https://mastodon.example/api/v1/timelines/public?local=true&max_id=98765"
        );
    }

    #[test]
    fn test_endpoint_keeps_port() {
        assert_eq!(
            client().endpoint("127.0.0.1:8080", "/api/v1/instance"),
            "https://127.0.0.1:8080/api/v1/instance"
        );
    }
}
