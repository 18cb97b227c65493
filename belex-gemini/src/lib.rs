//! Minimal client for the Google Gemini API, covering the two surfaces the
//! BELEX tooling needs: grounded content generation with the File Search
//! tool, and File Search store document management (list, upload, delete).
//!
//! Authentication uses an AI Studio API key sent as the `x-goog-api-key`
//! header. The entry point is [`Gemini`] (or [`GeminiBuilder`] for custom
//! models and base URLs):
//!
//! ```no_run
//! use belex_gemini::Gemini;
//!
//! # async fn run() -> Result<(), belex_gemini::Error> {
//! let gemini = Gemini::new("YOUR_API_KEY")?;
//! let response = gemini
//!     .generate_content()
//!     .with_user_message("Wie lange dauert die Probezeit?")
//!     .with_file_search_store("fileSearchStores/my-store")
//!     .execute()
//!     .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

mod client;
mod filestore;
mod generation;


pub use client::{Error, Gemini, GeminiBuilder, Model};
pub use filestore::{CustomMetadata, ListDocumentsResponse, Operation, StoreDocument};
pub use generation::{
    Candidate, Content, ContentBuilder, FileSearch, FinishReason, GenerateContentRequest,
    GenerationResponse, GroundingChunk, GroundingMetadata, Part, RetrievedContext, Role, Tool,
    UsageMetadata, WebSource,
};
