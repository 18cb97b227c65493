//! The search engine: one grounded generation call per query.

use crate::{citations::SourceMap, error::Result, store::LawStore};
use std::sync::Arc;
use tracing::{debug, info};

/// A completed search: the generated answer and the sources behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Generated answer text; empty when the model produced none.
    pub text: String,
    pub sources: SourceMap,
}

/// Runs grounded searches against a [`LawStore`].
///
/// The engine is stateless per call and never retries; a failed search is
/// reported exactly once and the caller decides how to carry on. Sessions
/// keep the last answer, not the engine.
#[derive(Clone)]
pub struct BelexSearchEngine {
    store: Arc<dyn LawStore>,
}

impl BelexSearchEngine {
    pub fn new(store: Arc<dyn LawStore>) -> Self {
        Self { store }
    }

    /// Search without a system instruction.
    pub async fn search(&self, query: &str) -> Result<Answer> {
        self.search_with_instruction(query, None).await
    }

    /// Search with an optional system instruction steering the answer
    /// style.
    pub async fn search_with_instruction(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<Answer> {
        debug!(query_len = query.len(), instructed = system_instruction.is_some(), "search started");

        let response = self.store.search(query, system_instruction).await?;
        let answer =
            Answer { text: response.text().to_string(), sources: SourceMap::from_response(&response) };

        info!(answer_len = answer.text.len(), sources = answer.sources.len(), "search completed");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SearchError,
        store::{DocumentListing, UploadRequest},
    };
    use async_trait::async_trait;
    use belex_gemini::{GenerationResponse, Operation};
    use serde_json::json;

    struct CannedStore {
        response: GenerationResponse,
    }

    #[async_trait]
    impl LawStore for CannedStore {
        async fn search(
            &self,
            _query: &str,
            _system_instruction: Option<&str>,
        ) -> Result<GenerationResponse> {
            Ok(self.response.clone())
        }

        async fn list_documents(&self) -> DocumentListing {
            DocumentListing::default()
        }

        async fn upload_document(&self, _request: UploadRequest) -> Result<Operation> {
            unimplemented!("not exercised")
        }

        async fn delete_document(&self, _document_name: &str) -> Result<()> {
            unimplemented!("not exercised")
        }
    }

    struct FailingStore;

    #[async_trait]
    impl LawStore for FailingStore {
        async fn search(
            &self,
            _query: &str,
            _system_instruction: Option<&str>,
        ) -> Result<GenerationResponse> {
            Err(SearchError::Config("store unreachable".to_string()))
        }

        async fn list_documents(&self) -> DocumentListing {
            DocumentListing::default()
        }

        async fn upload_document(&self, _request: UploadRequest) -> Result<Operation> {
            unimplemented!("not exercised")
        }

        async fn delete_document(&self, _document_name: &str) -> Result<()> {
            unimplemented!("not exercised")
        }
    }

    fn grounded_response() -> GenerationResponse {
        serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Die Probezeit dauert drei Monate."}], "role": "model"},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"retrievedContext": {"title": "BSG_153.01_Personalgesetz.pdf", "text": "Art. 5"}},
                        {"retrievedContext": {"title": "BSG_153.011_Personalverordnung.pdf", "text": "Art. 12"}}
                    ]
                }
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn search_builds_answer_with_sources() {
        let engine = BelexSearchEngine::new(Arc::new(CannedStore { response: grounded_response() }));

        let answer = engine.search("Wie lange dauert die Probezeit?").await.unwrap();
        assert_eq!(answer.text, "Die Probezeit dauert drei Monate.");

        let titles: Vec<&str> = answer.sources.iter().map(|entry| entry.title.as_str()).collect();
        assert_eq!(
            titles,
            ["BSG_153.01_Personalgesetz.pdf", "BSG_153.011_Personalverordnung.pdf"]
        );
    }

    #[tokio::test]
    async fn search_passes_through_empty_answers() {
        let engine = BelexSearchEngine::new(Arc::new(CannedStore {
            response: GenerationResponse::default(),
        }));

        let answer = engine.search("frage").await.unwrap();
        assert!(answer.text.is_empty());
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn search_surfaces_store_failures_once() {
        let engine = BelexSearchEngine::new(Arc::new(FailingStore));

        let error = engine.search("frage").await.unwrap_err();
        assert!(error.to_string().contains("store unreachable"), "{error}");
    }
}
