//! Error kinds raised while surveying a host.

use reqwest::StatusCode;
use thiserror::Error;

/// A single API request failed or returned something unusable.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Connection, TLS or timeout failure reported by the HTTP client.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} returned a body that is not JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} did not return a JSON array of objects")]
    NotAPage { url: String },
}

/// A post object lacked a required field or carried one of the wrong shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedPostError {
    #[error("post is not a JSON object")]
    NotAnObject,
    #[error("post field '{0}' is missing or not a string")]
    MissingField(&'static str),
    #[error("post id '{0}' is not an unsigned integer")]
    InvalidId(String),
    #[error("post creation time '{0}' cannot be parsed")]
    InvalidTime(String),
}

/// A host-level operation could not be completed.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("public timeline is empty")]
    EmptyTimeline,
    #[error("timeline query failed: {0}")]
    Query(#[from] QueryError),
    #[error("newest post is malformed: {0}")]
    MalformedNewestPost(#[source] MalformedPostError),
    #[error("range [{lower}, {upper}) collapsed before a partial page was found")]
    RangeCollapsed { lower: u64, upper: u64 },
    #[error("bisection gave up after {steps} steps")]
    StepLimit { steps: u32 },
    #[error("oldest post on page at max_id={cursor} is malformed: {source}")]
    MalformedOldestPost {
        cursor: u64,
        #[source]
        source: MalformedPostError,
    },
    #[error("instance metadata unavailable: {0}")]
    Metadata(#[source] QueryError),
    #[error("instance metadata is not an object")]
    MetadataNotAnObject,
    #[error("instance metadata field '{0}' is missing or not a string")]
    MetadataField(&'static str),
    #[error("sampled post is malformed: {0}")]
    MalformedSamplePost(#[source] MalformedPostError),
    #[error("only {found} posts available, at least {required} needed")]
    NotEnoughPosts { found: usize, required: usize },
    #[error("sampled posts span an implausible {seconds}s")]
    ImplausibleDuration { seconds: i64 },
}
