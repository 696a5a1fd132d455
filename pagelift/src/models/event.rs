use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SourceDocument;
use crate::error::{PageliftError, Result};

/// Storage object payload of a `google.cloud.storage.object.v1.finalized` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectData {
    pub bucket: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
}

impl StorageObjectData {
    /// Parses a CloudEvent body in either binary mode (the body is the object
    /// data) or structured mode (the object data sits under `data`).
    pub fn from_event_body(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PageliftError::InvalidEvent(format!("body is not JSON: {e}")))?;

        let data = match value {
            Value::Object(mut envelope)
                if envelope.contains_key("specversion") && envelope.contains_key("data") =>
            {
                envelope.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        serde_json::from_value(data)
            .map_err(|e| PageliftError::InvalidEvent(format!("missing storage object data: {e}")))
    }

    pub fn into_document(self) -> Result<SourceDocument> {
        SourceDocument::new(self.bucket, self.name)
    }
}
