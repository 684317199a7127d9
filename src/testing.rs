//! In-memory hosts used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::{InstanceSource, PlatformProbe, TimelineSource};
use crate::error::QueryError;
use crate::models::TimelinePage;

pub fn post_json(host: &str, id: u64, created_at: i64) -> Value {
    let time = DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default();
    json!({
        "id": id.to_string(),
        "created_at": time.to_rfc3339(),
        "url": format!("https://{host}/@someone/{id}"),
    })
}

pub fn unavailable(host: &str) -> QueryError {
    QueryError::Status {
        url: format!("https://{host}/api/v1/timelines/public"),
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// A host whose timeline is a fixed, ascending list of `(id, created_at)` posts.
pub struct SyntheticHost {
    pub name: String,
    pub posts: Vec<(u64, i64)>,
    pub page_size: usize,
    pub title: Option<Value>,
    pub thumbnail: Option<Value>,
    pub timeline_down: bool,
    pub cursors: Mutex<Vec<Option<u64>>>,
}

impl SyntheticHost {
    pub fn new(name: &str, posts: Vec<(u64, i64)>) -> Self {
        Self {
            name: name.to_string(),
            posts,
            page_size: 20,
            title: None,
            thumbnail: None,
            timeline_down: false,
            cursors: Mutex::new(Vec::new()),
        }
    }

    /// Posts with ids `first, first + stride, ...`, one minute apart.
    pub fn evenly_spaced(name: &str, first: u64, stride: u64, count: u64) -> Self {
        let posts = (0..count)
            .map(|i| (first + i * stride, 1_500_000_000 + i as i64 * 60))
            .collect();
        Self::new(name, posts)
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(json!(title));
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: &str) -> Self {
        self.thumbnail = Some(json!(thumbnail));
        self
    }

    pub fn down(mut self) -> Self {
        self.timeline_down = true;
        self
    }

    pub fn page(&self, cursor: Option<u64>) -> TimelinePage {
        let posts = self
            .posts
            .iter()
            .rev()
            .filter(|(id, _)| cursor.map_or(true, |max_id| *id <= max_id))
            .take(self.page_size)
            .map(|&(id, created_at)| post_json(&self.name, id, created_at))
            .collect();
        TimelinePage::new(posts)
    }

    pub fn cursors(&self) -> Vec<Option<u64>> {
        self.cursors.lock().unwrap().clone()
    }

    fn instance(&self) -> Value {
        let mut instance = json!({ "uri": self.name });
        if let Some(title) = &self.title {
            instance["title"] = title.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            instance["thumbnail"] = thumbnail.clone();
        }
        instance
    }
}

#[async_trait]
impl TimelineSource for SyntheticHost {
    async fn fetch_page(
        &self,
        host: &str,
        cursor: Option<u64>,
    ) -> Result<TimelinePage, QueryError> {
        self.cursors.lock().unwrap().push(cursor);
        if self.timeline_down {
            return Err(unavailable(host));
        }
        Ok(self.page(cursor))
    }
}

#[async_trait]
impl InstanceSource for SyntheticHost {
    async fn fetch_instance(&self, _host: &str) -> Result<Value, QueryError> {
        Ok(self.instance())
    }
}

/// Several synthetic hosts addressed by domain.
#[derive(Default)]
pub struct FakeFediverse {
    pub hosts: HashMap<String, SyntheticHost>,
    pub excluded: HashSet<String>,
    pub metadata_down: HashSet<String>,
}

impl FakeFediverse {
    pub fn with_host(mut self, host: SyntheticHost) -> Self {
        self.hosts.insert(host.name.clone(), host);
        self
    }

    pub fn with_excluded(mut self, host: SyntheticHost) -> Self {
        self.excluded.insert(host.name.clone());
        self.with_host(host)
    }

    pub fn with_metadata_down(mut self, domain: &str) -> Self {
        self.metadata_down.insert(domain.to_string());
        self
    }

    pub fn host(&self, domain: &str) -> &SyntheticHost {
        &self.hosts[domain]
    }
}

#[async_trait]
impl TimelineSource for FakeFediverse {
    async fn fetch_page(
        &self,
        host: &str,
        cursor: Option<u64>,
    ) -> Result<TimelinePage, QueryError> {
        match self.hosts.get(host) {
            Some(synthetic) => synthetic.fetch_page(host, cursor).await,
            None => Err(unavailable(host)),
        }
    }
}

#[async_trait]
impl InstanceSource for FakeFediverse {
    async fn fetch_instance(&self, host: &str) -> Result<Value, QueryError> {
        match self.hosts.get(host) {
            Some(synthetic) if !self.metadata_down.contains(host) => {
                synthetic.fetch_instance(host).await
            }
            _ => Err(unavailable(host)),
        }
    }
}

#[async_trait]
impl PlatformProbe for FakeFediverse {
    async fn is_excluded_platform(&self, host: &str) -> bool {
        self.excluded.contains(host)
    }
}
