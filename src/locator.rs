//! Bisection search for the oldest post still retrievable from a host.
//!
//! The public timeline only answers "the newest page of posts with id at most
//! `max_id`". Post ids grow monotonically, so the oldest post is found by
//! bisecting the id space between 0 and the newest id:
//!
//! * an empty page means every post lies above the cursor,
//! * a full page means more posts lie below the cursor than fit on a page,
//! * a partial page holds every remaining post, so its last entry is the
//!   oldest post on the host.

use tracing::{debug, trace};

use crate::api::TimelineSource;
use crate::error::HostError;
use crate::models::{OldestPost, Post};

/// Upper bound on bisection steps; the 64-bit id space needs at most 64.
pub const MAX_BISECTION_STEPS: u32 = 128;

/// Locates the oldest post of a host through its public timeline.
pub struct OldestPostLocator<'a, S: ?Sized> {
    source: &'a S,
    page_size: usize,
}

impl<'a, S: TimelineSource + ?Sized> OldestPostLocator<'a, S> {
    /// `page_size` is the number of posts the host returns for a full page.
    #[must_use]
    pub fn new(source: &'a S, page_size: usize) -> Self {
        Self { source, page_size }
    }

    /// Find the time and URL of the oldest retrievable post on `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the newest page cannot be fetched, is empty, or the
    /// bisection cannot isolate a partial page.
    pub async fn locate_oldest_post(&self, host: &str) -> Result<OldestPost, HostError> {
        let newest_page = self.source.fetch_page(host, None).await?;
        let newest = newest_page.newest().ok_or(HostError::EmptyTimeline)?;
        let upper = Post::from_value(newest)
            .map_err(HostError::MalformedNewestPost)?
            .id;

        debug!(domain = %host, upper, "Bisecting post ids");
        self.locate(host, 0, upper).await
    }

    /// Narrow `[lower, upper)` until a partial page isolates the oldest post.
    ///
    /// A failed query is treated as undecidable and the search continues in
    /// the lower half, so a persistently failing host still terminates.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::RangeCollapsed`] once the range is narrower than 2,
    /// or [`HostError::MalformedOldestPost`] if the terminal post is malformed.
    pub async fn locate(
        &self,
        host: &str,
        mut lower: u64,
        mut upper: u64,
    ) -> Result<OldestPost, HostError> {
        for step in 0..MAX_BISECTION_STEPS {
            if upper.saturating_sub(lower) < 2 {
                return Err(HostError::RangeCollapsed { lower, upper });
            }

            let cursor = lower + (upper - lower) / 2;
            match self.source.fetch_page(host, Some(cursor)).await {
                Err(e) => {
                    debug!(domain = %host, step, cursor, "Query failed, narrowing down: {e}");
                    upper = cursor;
                }
                Ok(page) if page.is_empty() => {
                    trace!(domain = %host, step, cursor, "Empty page");
                    lower = cursor;
                }
                Ok(page) if page.len() >= self.page_size => {
                    trace!(domain = %host, step, cursor, "Full page");
                    upper = cursor;
                }
                Ok(page) => {
                    let oldest = page.oldest().ok_or(HostError::EmptyTimeline)?;
                    let post = Post::from_value(oldest)
                        .map_err(|source| HostError::MalformedOldestPost { cursor, source })?;
                    debug!(domain = %host, step, cursor, id = post.id, "Found oldest post");
                    return Ok(OldestPost {
                        created_at: post.created_at,
                        url: post.url,
                    });
                }
            }
        }

        Err(HostError::StepLimit {
            steps: MAX_BISECTION_STEPS,
        })
    }
}
