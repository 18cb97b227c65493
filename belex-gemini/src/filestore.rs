//! Types for File Search store document management.

use serde::{Deserialize, Serialize};

/// Custom key/value metadata attached to a store document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

impl CustomMetadata {
    /// String-valued metadata entry
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), string_value: Some(value.into()), numeric_value: None }
    }
}

/// A document held in a File Search store
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    /// Fully qualified resource name, `fileSearchStores/…/documents/…`
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Size in bytes; the API encodes int64 fields as JSON strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_metadata: Vec<CustomMetadata>,
}

impl StoreDocument {
    /// Label shown to users: the display name, or the trailing segment of
    /// the resource name when no display name was set
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display_name) if !display_name.is_empty() => display_name,
            _ => self.name.rsplit('/').next().unwrap_or(&self.name),
        }
    }

    /// Decoded size in bytes, when present and well-formed
    pub fn size(&self) -> Option<u64> {
        self.size_bytes.as_deref().and_then(|raw| raw.parse().ok())
    }

    /// Value of a string metadata entry with the given key
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.custom_metadata
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.string_value.as_deref())
    }
}

/// One page of a document listing
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<StoreDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// A long-running operation handle.
///
/// The upload endpoint answers with one of these once it has accepted the
/// bytes. Ingestion and indexing continue in the background; `done` is
/// usually still false at that point.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}
