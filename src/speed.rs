//! Posting throughput sampler.
//!
//! Estimates how fast each host posts from its most recent public posts and
//! keeps a per-host CSV history of the estimates.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::api::{InstanceSource, TimelineSource};
use crate::error::HostError;
use crate::metadata::fetch_title;
use crate::models::Post;

/// Longest span of sampled posts considered plausible.
const MAX_SAMPLE_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Throughput estimate for one host.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSample {
    pub domain: String,
    /// Posts per second.
    pub speed: f64,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeedEntry<'a> {
    domain: &'a str,
    speed: f64,
    title: &'a str,
}

/// Collect at least `min_posts` of the newest posts, following the cursor
/// back one page at a time.
async fn recent_posts<S: TimelineSource + ?Sized>(
    source: &S,
    host: &str,
    min_posts: usize,
) -> Result<Vec<Post>, HostError> {
    let mut posts: Vec<Post> = Vec::new();
    let mut cursor = None;

    while posts.len() < min_posts {
        let page = source.fetch_page(host, cursor).await?;
        let before = posts.len();
        for value in page.iter() {
            match Post::from_value(value) {
                Ok(post) if posts.last().map_or(true, |last| post.id < last.id) => {
                    posts.push(post);
                }
                Ok(_) => {}
                Err(e) => return Err(HostError::MalformedSamplePost(e)),
            }
        }

        match posts.last() {
            Some(oldest) if posts.len() > before && oldest.id > 0 => cursor = Some(oldest.id - 1),
            _ => break,
        }
    }

    if posts.len() < min_posts {
        return Err(HostError::NotEnoughPosts {
            found: posts.len(),
            required: min_posts,
        });
    }
    Ok(posts)
}

/// Estimate posts per second from the newest `min_posts` posts of `host`.
///
/// # Errors
///
/// Returns an error if too few posts are available or they span less than a
/// second or more than a year.
pub async fn measure_speed<S: TimelineSource + ?Sized>(
    source: &S,
    host: &str,
    min_posts: usize,
    now: DateTime<Utc>,
) -> Result<f64, HostError> {
    let posts = recent_posts(source, host, min_posts).await?;
    let (Some(newest), Some(oldest)) = (posts.first(), posts.last()) else {
        return Err(HostError::EmptyTimeline);
    };

    let seconds = (now.max(newest.created_at) - oldest.created_at).num_seconds();
    if !(1 < seconds && seconds < MAX_SAMPLE_SECONDS) {
        return Err(HostError::ImplausibleDuration { seconds });
    }

    Ok(posts.len() as f64 / seconds as f64)
}

/// Append one `"<unix time>","<speed>"` line to the host's history file.
///
/// # Errors
///
/// Returns an error if the history file cannot be opened or written.
pub async fn append_history(
    dir: &Path,
    domain: &str,
    sampled_at: DateTime<Utc>,
    speed: f64,
) -> std::io::Result<()> {
    let path = dir.join(format!("{domain}.csv"));
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    let line = format!("\"{}\",\"{speed:.6e}\"\n", sampled_at.timestamp());
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

/// Sample every domain in order, recording history, and return the hosts that
/// succeeded.
///
/// `sampled_at` is the run's clock reading: it ends every host's sample window
/// and stamps every history line.
pub async fn survey<B, I, D>(
    backend: &B,
    domains: I,
    min_posts: usize,
    history_dir: &Path,
    sampled_at: DateTime<Utc>,
) -> Vec<SpeedSample>
where
    B: TimelineSource + InstanceSource + ?Sized,
    I: IntoIterator<Item = D>,
    D: AsRef<str>,
{
    let mut samples = Vec::new();

    for domain in domains {
        let domain = domain.as_ref();
        let started = Instant::now();

        let speed = match measure_speed(backend, domain, min_posts, sampled_at).await {
            Ok(speed) => speed,
            Err(e) => {
                warn!(
                    domain = %domain,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Speed sample failed: {e}"
                );
                continue;
            }
        };

        if let Err(e) = append_history(history_dir, domain, sampled_at, speed).await {
            warn!(domain = %domain, "Failed to append speed history: {e}");
        }

        let title = fetch_title(backend, domain).await.ok();
        info!(
            domain = %domain,
            speed,
            elapsed_ms = started.elapsed().as_millis(),
            "Speed sampled"
        );
        samples.push(SpeedSample {
            domain: domain.to_string(),
            speed,
            title,
        });
    }

    samples
}

/// Render samples as a JSON array, fastest first.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(samples: &[SpeedSample]) -> serde_json::Result<String> {
    let mut sorted: Vec<&SpeedSample> = samples.iter().collect();
    sorted.sort_by(|a, b| b.speed.total_cmp(&a.speed));
    let entries: Vec<SpeedEntry<'_>> = sorted
        .iter()
        .map(|sample| SpeedEntry {
            domain: &sample.domain,
            speed: sample.speed,
            title: sample.title.as_deref().unwrap_or_default(),
        })
        .collect();
    serde_json::to_string(&entries)
}

/// Overwrite `destination` with the ranked samples; failures are logged.
pub async fn write(samples: &[SpeedSample], destination: &Path) -> bool {
    let result = match render(samples) {
        Ok(json) => tokio::fs::write(destination, json).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(()) => {
            info!(path = %destination.display(), hosts = samples.len(), "Speed snapshot written");
            true
        }
        Err(e) => {
            warn!(path = %destination.display(), "Skipping speed snapshot write: {e}");
            false
        }
    }
}
