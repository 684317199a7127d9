use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::MalformedPostError;

/// Fields pulled out of one public timeline post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

impl Post {
    /// Extract the identifier, creation time and canonical URL from a raw post.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is not an object, `id` or `url` is missing
    /// or not a string, or `created_at` cannot be parsed.
    pub fn from_value(post: &Value) -> Result<Self, MalformedPostError> {
        let properties = post.as_object().ok_or(MalformedPostError::NotAnObject)?;
        let string_field = |name: &'static str| {
            properties
                .get(name)
                .and_then(Value::as_str)
                .ok_or(MalformedPostError::MissingField(name))
        };

        let raw_id = string_field("id")?;
        let id = raw_id
            .parse::<u64>()
            .map_err(|_| MalformedPostError::InvalidId(raw_id.to_string()))?;

        let raw_time = string_field("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(raw_time)
            .map_err(|_| MalformedPostError::InvalidTime(raw_time.to_string()))?
            .with_timezone(&Utc);

        let url = string_field("url")?.to_string();

        Ok(Self {
            id,
            created_at,
            url,
        })
    }
}

/// One page of a public timeline, newest post first.
///
/// Posts are kept as raw JSON and only decoded on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelinePage {
    posts: Vec<Value>,
}

impl TimelinePage {
    #[must_use]
    pub fn new(posts: Vec<Value>) -> Self {
        Self { posts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Most recent post on the page.
    #[must_use]
    pub fn newest(&self) -> Option<&Value> {
        self.posts.first()
    }

    /// Oldest post on the page.
    #[must_use]
    pub fn oldest(&self) -> Option<&Value> {
        self.posts.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.posts.iter()
    }
}

/// The oldest retrievable post located on a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldestPost {
    pub created_at: DateTime<Utc>,
    pub url: String,
}

/// A successfully surveyed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub domain: String,
    pub oldest_post_time: DateTime<Utc>,
    pub oldest_post_url: String,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

/// Result of surveying a single host.
#[derive(Debug)]
pub enum HostOutcome {
    Surveyed(Host),
    Skipped { reason: &'static str },
    Failed(crate::error::HostError),
}
