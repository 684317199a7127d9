//! Instance title and thumbnail lookup.

use serde_json::Value;

use crate::api::InstanceSource;
use crate::error::HostError;

/// Fetch the display title of a host.
///
/// # Errors
///
/// Returns an error if the metadata request fails or has no string `title`.
pub async fn fetch_title<S: InstanceSource + ?Sized>(
    source: &S,
    host: &str,
) -> Result<String, HostError> {
    fetch_string_field(source, host, "title").await
}

/// Fetch the thumbnail image URL of a host.
///
/// # Errors
///
/// Returns an error if the metadata request fails or has no string `thumbnail`.
pub async fn fetch_thumbnail<S: InstanceSource + ?Sized>(
    source: &S,
    host: &str,
) -> Result<String, HostError> {
    fetch_string_field(source, host, "thumbnail").await
}

async fn fetch_string_field<S: InstanceSource + ?Sized>(
    source: &S,
    host: &str,
    field: &'static str,
) -> Result<String, HostError> {
    let instance = source
        .fetch_instance(host)
        .await
        .map_err(HostError::Metadata)?;
    string_field(&instance, field)
}

fn string_field(instance: &Value, field: &'static str) -> Result<String, HostError> {
    let properties = instance.as_object().ok_or(HostError::MetadataNotAnObject)?;
    properties
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(HostError::MetadataField(field))
}
