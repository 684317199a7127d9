//! Runs the oldest-post search across many hosts.
//!
//! Hosts are surveyed one at a time. A failure on one host only removes that
//! host from the result; the survey always runs to the end of the list.

use std::time::Instant;

use tracing::{info, warn};

use crate::api::{InstanceSource, PlatformProbe, TimelineSource};
use crate::locator::OldestPostLocator;
use crate::metadata::{fetch_thumbnail, fetch_title};
use crate::models::{Host, HostOutcome};

/// Per-run survey settings.
#[derive(Debug, Clone, Copy)]
pub struct SurveyOptions {
    /// Number of posts a host returns for a full timeline page.
    pub page_size: usize,
}

/// Surveys hosts through a backend that speaks the timeline, instance and
/// platform-probe APIs.
pub struct HostSurveyor<'a, B: ?Sized> {
    backend: &'a B,
    options: SurveyOptions,
}

impl<'a, B> HostSurveyor<'a, B>
where
    B: TimelineSource + InstanceSource + PlatformProbe + ?Sized,
{
    #[must_use]
    pub fn new(backend: &'a B, options: SurveyOptions) -> Self {
        Self { backend, options }
    }

    /// Survey a single host: probe, locate the oldest post, then fetch metadata.
    pub async fn survey_host(&self, domain: &str) -> HostOutcome {
        if self.backend.is_excluded_platform(domain).await {
            return HostOutcome::Skipped {
                reason: "excluded platform",
            };
        }

        let locator = OldestPostLocator::new(self.backend, self.options.page_size);
        let oldest = match locator.locate_oldest_post(domain).await {
            Ok(oldest) => oldest,
            Err(e) => return HostOutcome::Failed(e),
        };

        let title = match fetch_title(self.backend, domain).await {
            Ok(title) => Some(title),
            Err(e) => {
                warn!(domain = %domain, "Title unavailable: {e}");
                None
            }
        };
        let thumbnail = match fetch_thumbnail(self.backend, domain).await {
            Ok(thumbnail) => Some(thumbnail),
            Err(e) => {
                warn!(domain = %domain, "Thumbnail unavailable: {e}");
                None
            }
        };

        HostOutcome::Surveyed(Host {
            domain: domain.to_string(),
            oldest_post_time: oldest.created_at,
            oldest_post_url: oldest.url,
            title,
            thumbnail,
        })
    }

    /// Survey every domain in order and return the hosts that succeeded.
    pub async fn survey<I, D>(&self, domains: I) -> Vec<Host>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        let started = Instant::now();
        let mut hosts = Vec::new();
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for domain in domains {
            let domain = domain.as_ref();
            let host_started = Instant::now();
            let outcome = self.survey_host(domain).await;
            let elapsed_ms = host_started.elapsed().as_millis();

            match outcome {
                HostOutcome::Surveyed(host) => {
                    info!(
                        domain = %domain,
                        oldest_post_time = %host.oldest_post_time,
                        oldest_post_url = %host.oldest_post_url,
                        elapsed_ms,
                        "Host surveyed"
                    );
                    hosts.push(host);
                }
                HostOutcome::Skipped { reason } => {
                    info!(domain = %domain, reason, elapsed_ms, "Host skipped");
                    skipped += 1;
                }
                HostOutcome::Failed(e) => {
                    warn!(domain = %domain, error = ?e, elapsed_ms, "Host failed: {e}");
                    failed += 1;
                }
            }
        }

        info!(
            surveyed = hosts.len(),
            skipped,
            failed,
            elapsed_ms = started.elapsed().as_millis(),
            "Survey complete"
        );
        hosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::testing::{FakeFediverse, SyntheticHost};

    const OPTIONS: SurveyOptions = SurveyOptions { page_size: 20 };

    fn fediverse() -> FakeFediverse {
        FakeFediverse::default()
            .with_host(
                SyntheticHost::evenly_spaced("old.example", 1_000, 17, 400)
                    .with_title("Old Town")
                    .with_thumbnail("https://old.example/thumb.png"),
            )
            .with_host(SyntheticHost::evenly_spaced("down.example", 1, 1, 100).down())
            .with_excluded(SyntheticHost::evenly_spaced("pleroma.example", 1, 1, 100))
            .with_host(SyntheticHost::evenly_spaced("untitled.example", 5, 3, 60))
    }

    #[tokio::test]
    async fn test_survey_host_success() {
        let fediverse = fediverse();
        let outcome = HostSurveyor::new(&fediverse, OPTIONS)
            .survey_host("old.example")
            .await;

        let HostOutcome::Surveyed(host) = outcome else {
            panic!("expected a surveyed host");
        };
        assert_eq!(host.domain, "old.example");
        assert_eq!(host.oldest_post_url, "https://old.example/@someone/1000");
        assert_eq!(host.oldest_post_time.timestamp(), 1_500_000_000);
        assert_eq!(host.title.as_deref(), Some("Old Town"));
        assert_eq!(host.thumbnail.as_deref(), Some("https://old.example/thumb.png"));
    }

    #[tokio::test]
    async fn test_excluded_platform_never_reaches_locator() {
        let fediverse = fediverse();
        let outcome = HostSurveyor::new(&fediverse, OPTIONS)
            .survey_host("pleroma.example")
            .await;

        assert!(matches!(outcome, HostOutcome::Skipped { .. }));
        assert!(fediverse.host("pleroma.example").cursors().is_empty());
    }

    #[tokio::test]
    async fn test_failing_host_is_reported_not_propagated() {
        let fediverse = fediverse();
        let outcome = HostSurveyor::new(&fediverse, OPTIONS)
            .survey_host("down.example")
            .await;

        assert!(matches!(outcome, HostOutcome::Failed(HostError::Query(_))));
    }

    #[tokio::test]
    async fn test_missing_metadata_leaves_fields_absent() {
        let fediverse = fediverse().with_metadata_down("old.example");
        let outcome = HostSurveyor::new(&fediverse, OPTIONS)
            .survey_host("old.example")
            .await;

        let HostOutcome::Surveyed(host) = outcome else {
            panic!("expected a surveyed host");
        };
        assert_eq!(host.title, None);
        assert_eq!(host.thumbnail, None);

        let HostOutcome::Surveyed(untitled) = HostSurveyor::new(&fediverse, OPTIONS)
            .survey_host("untitled.example")
            .await
        else {
            panic!("expected a surveyed host");
        };
        assert_eq!(untitled.title, None);
        assert_eq!(untitled.oldest_post_url, "https://untitled.example/@someone/5");
    }

    #[tokio::test]
    async fn test_survey_keeps_only_successes_in_order() {
        let fediverse = fediverse();
        let hosts = HostSurveyor::new(&fediverse, OPTIONS)
            .survey([
                "down.example",
                "untitled.example",
                "pleroma.example",
                "unknown.example",
                "old.example",
            ])
            .await;

        let domains: Vec<_> = hosts.iter().map(|h| h.domain.as_str()).collect();
        assert_eq!(domains, vec!["untitled.example", "old.example"]);
    }
}
