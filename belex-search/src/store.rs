//! The storage seam between the search surfaces and the Gemini File
//! Search backend.

use crate::{
    config::BelexConfig,
    error::{Result, SearchError},
};
use async_trait::async_trait;
use belex_gemini::{CustomMetadata, Gemini, GenerationResponse, Model, Operation, StoreDocument};
use futures::StreamExt;
use mime::Mime;
use std::pin::pin;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, error, info};

/// Ceiling for a single uploaded file.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Page size used when walking the store catalog.
const LIST_PAGE_SIZE: u32 = 20;

/// Metadata key marking documents ingested through the web front-end.
pub const UPLOADED_VIA_KEY: &str = "uploaded_via";
/// Metadata value for [`UPLOADED_VIA_KEY`].
pub const UPLOADED_VIA_VALUE: &str = "webapp";
/// Metadata key carrying the RFC 3339 upload time.
pub const UPLOAD_TIMESTAMP_KEY: &str = "upload_timestamp";

/// Outcome of a catalog listing.
///
/// Pagination failures do not discard progress: `documents` keeps every
/// page fetched before the failure and `error` describes it.
#[derive(Debug, Default)]
pub struct DocumentListing {
    pub documents: Vec<StoreDocument>,
    pub error: Option<String>,
}

/// A file to be ingested into the law store.
#[derive(Debug)]
pub struct UploadRequest {
    /// Name of the uploaded file, used for MIME guessing and as the
    /// default display name.
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Explicit MIME type; guessed from `file_name` when absent.
    pub mime_type: Option<Mime>,
    /// Display name override; empty or missing falls back to `file_name`.
    pub display_name: Option<String>,
}

/// The law-document store behind the search surfaces.
///
/// Implementations hold one fixed document collection; there is no
/// multi-store fan-out.
#[async_trait]
pub trait LawStore: Send + Sync {
    /// Run one grounded generation over the store.
    async fn search(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<GenerationResponse>;

    /// Walk the full document catalog.
    async fn list_documents(&self) -> DocumentListing;

    /// Ingest a file. The returned operation only confirms acceptance;
    /// indexing completes in the background.
    async fn upload_document(&self, request: UploadRequest) -> Result<Operation>;

    /// Delete a document and the chunks derived from it.
    async fn delete_document(&self, document_name: &str) -> Result<()>;
}

/// Whether a document was ingested through the web front-end upload form.
pub fn is_webapp_upload(document: &StoreDocument) -> bool {
    document.metadata_value(UPLOADED_VIA_KEY) == Some(UPLOADED_VIA_VALUE)
}

/// A [`LawStore`] backed by a Gemini File Search store.
pub struct GeminiLawStore {
    gemini: Gemini,
    store_name: String,
}

impl GeminiLawStore {
    /// Store over the configured File Search collection, answering with
    /// the given model.
    pub fn new(config: &BelexConfig, model: Model) -> Result<Self> {
        let gemini = Gemini::with_model(&config.api_key, model)?;
        Ok(Self { gemini, store_name: config.filestore_id.clone() })
    }

    /// Store from an existing [`Gemini`] client.
    ///
    /// Use this for full control over the client configuration (custom
    /// base URL, custom HTTP client).
    pub fn from_client(gemini: Gemini, store_name: impl Into<String>) -> Self {
        Self { gemini, store_name: store_name.into() }
    }
}

#[async_trait]
impl LawStore for GeminiLawStore {
    async fn search(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<GenerationResponse> {
        debug!(query_len = query.len(), "running grounded search");

        let mut builder = self
            .gemini
            .generate_content()
            .with_user_message(query)
            .with_file_search_store(self.store_name.as_str());
        if let Some(instruction) = system_instruction {
            builder = builder.with_system_instruction(instruction);
        }

        let response = builder.execute().await.map_err(|error| {
            error!(%error, "grounded search request failed");
            SearchError::from(error)
        })?;
        Ok(response)
    }

    async fn list_documents(&self) -> DocumentListing {
        debug!(store = %self.store_name, "listing store documents");

        let stream = self.gemini.list_documents(self.store_name.as_str(), LIST_PAGE_SIZE);
        let mut stream = pin!(stream);

        let mut listing = DocumentListing::default();
        while let Some(item) = stream.next().await {
            match item {
                Ok(document) => listing.documents.push(document),
                Err(error) => {
                    error!(%error, fetched = listing.documents.len(), "document listing aborted");
                    listing.error = Some(error.to_string());
                    break;
                }
            }
        }
        listing
    }

    async fn upload_document(&self, request: UploadRequest) -> Result<Operation> {
        let UploadRequest { file_name, bytes, mime_type, display_name } = request;

        let size_bytes = bytes.len() as u64;
        if size_bytes > MAX_UPLOAD_BYTES {
            return Err(SearchError::FileTooLarge { size_bytes, limit_bytes: MAX_UPLOAD_BYTES });
        }

        let mime_type = mime_type
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream());
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| file_name.clone());

        debug!(file = %file_name, size = size_bytes, mime = %mime_type, "uploading");

        let metadata = vec![
            CustomMetadata::string(UPLOADED_VIA_KEY, UPLOADED_VIA_VALUE),
            CustomMetadata::string(UPLOAD_TIMESTAMP_KEY, upload_timestamp()),
        ];

        let operation = self
            .gemini
            .upload_document(&self.store_name, Some(display_name), bytes, mime_type, metadata)
            .await
            .map_err(|error| {
                error!(%error, file = %file_name, "upload rejected");
                SearchError::from(error)
            })?;

        info!(operation = %operation.name, file = %file_name, "upload accepted");
        Ok(operation)
    }

    async fn delete_document(&self, document_name: &str) -> Result<()> {
        self.gemini.delete_document(document_name, true).await.map_err(|error| {
            error!(%error, document = document_name, "delete failed");
            SearchError::from(error)
        })?;

        info!(document = document_name, "document deleted");
        Ok(())
    }
}

fn upload_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("unreachable error: RFC 3339 formatting of the current time cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_metadata(entries: Vec<CustomMetadata>) -> StoreDocument {
        StoreDocument {
            name: "fileSearchStores/belex/documents/d1".to_string(),
            custom_metadata: entries,
            ..StoreDocument::default()
        }
    }

    #[test]
    fn webapp_uploads_are_recognized_by_metadata() {
        let tagged = doc_with_metadata(vec![
            CustomMetadata::string(UPLOADED_VIA_KEY, UPLOADED_VIA_VALUE),
            CustomMetadata::string(UPLOAD_TIMESTAMP_KEY, "2025-03-12T09:30:00Z"),
        ]);
        assert!(is_webapp_upload(&tagged));

        let foreign = doc_with_metadata(vec![CustomMetadata::string(UPLOADED_VIA_KEY, "sync-job")]);
        assert!(!is_webapp_upload(&foreign));

        let untagged = doc_with_metadata(Vec::new());
        assert!(!is_webapp_upload(&untagged));
    }

    #[test]
    fn upload_timestamp_is_rfc3339_utc() {
        let stamp = upload_timestamp();
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok(), "{stamp}");
    }
}
