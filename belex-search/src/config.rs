//! Runtime configuration for the BELEX clients.
//!
//! Two sources exist: the command-line client reads a JSON file (nested
//! `gemini` section, matching the long-standing `config.json` layout), the
//! web front-ends read environment variables. Both go through the same
//! validation: a missing or empty credential is fatal before anything is
//! served.

use crate::error::{Result, SearchError};
use serde::Deserialize;
use std::path::Path;

const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_FILESTORE_ID: &str = "GEMINI_FILESTORE_ID";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    gemini: GeminiSection,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiSection {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    filestore_id: Option<String>,
}

/// Credentials and store identity shared by every BELEX client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BelexConfig {
    /// AI Studio API key.
    pub api_key: String,
    /// Fully qualified File Search store name (`fileSearchStores/…`).
    pub filestore_id: String,
}

impl BelexConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// The file carries a nested `gemini` object with `api_key` and
    /// `filestore_id` keys:
    ///
    /// ```json
    /// { "gemini": { "api_key": "…", "filestore_id": "fileSearchStores/…" } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when the file cannot be read or
    /// parsed, or when either key is missing or empty.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|error| {
            SearchError::Config(format!(
                "cannot read configuration file {}: {error}",
                path.display()
            ))
        })?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|error| {
            SearchError::Config(format!(
                "invalid configuration file {}: {error}",
                path.display()
            ))
        })?;
        Self::validated(
            file.gemini.api_key,
            file.gemini.filestore_id,
            "gemini.api_key",
            "gemini.filestore_id",
        )
    }

    /// Loads the configuration from the `GEMINI_API_KEY` and
    /// `GEMINI_FILESTORE_ID` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when either variable is unset or
    /// empty.
    pub fn from_env() -> Result<Self> {
        Self::validated(
            std::env::var(ENV_API_KEY).ok(),
            std::env::var(ENV_FILESTORE_ID).ok(),
            ENV_API_KEY,
            ENV_FILESTORE_ID,
        )
    }

    fn validated(
        api_key: Option<String>,
        filestore_id: Option<String>,
        api_key_name: &str,
        filestore_id_name: &str,
    ) -> Result<Self> {
        let api_key = require(api_key, api_key_name)?;
        let filestore_id = require(filestore_id, filestore_id_name)?;
        Ok(Self { api_key, filestore_id })
    }
}

fn require(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SearchError::Config(format!("missing or empty {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validated_accepts_complete_values() {
        let config = BelexConfig::validated(
            Some("key-123".to_string()),
            Some("fileSearchStores/belex".to_string()),
            "gemini.api_key",
            "gemini.filestore_id",
        )
        .unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.filestore_id, "fileSearchStores/belex");
    }

    #[test]
    fn validated_rejects_missing_api_key() {
        let error = BelexConfig::validated(
            None,
            Some("fileSearchStores/belex".to_string()),
            "gemini.api_key",
            "gemini.filestore_id",
        )
        .unwrap_err();
        assert!(error.to_string().contains("gemini.api_key"), "{error}");
    }

    #[test]
    fn validated_rejects_empty_filestore_id() {
        let error = BelexConfig::validated(
            Some("key-123".to_string()),
            Some("   ".to_string()),
            "GEMINI_API_KEY",
            "GEMINI_FILESTORE_ID",
        )
        .unwrap_err();
        assert!(error.to_string().contains("GEMINI_FILESTORE_ID"), "{error}");
    }

    #[test]
    fn from_file_reads_nested_gemini_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gemini": {{"api_key": "key-123", "filestore_id": "fileSearchStores/belex"}}}}"#
        )
        .unwrap();

        let config = BelexConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.filestore_id, "fileSearchStores/belex");
    }

    #[test]
    fn from_file_rejects_missing_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "key-123"}}"#).unwrap();

        let error = BelexConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(error, SearchError::Config(_)), "{error}");
    }

    #[test]
    fn from_file_reports_unreadable_path() {
        let error = BelexConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(error.to_string().contains("/nonexistent/config.json"), "{error}");
    }
}
