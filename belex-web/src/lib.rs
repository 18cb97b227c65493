//! Web console for the BELEX search tooling.
//!
//! Two builds of the same axum application exist: the public test build
//! (`belex-web`) and the University of Bern build (`belex-web-unibe`) with
//! an editable system prompt. Both serve a search page over the grounded
//! [`belex_search::BelexSearchEngine`] and a document console for the
//! underlying File Search store.

pub mod render;
pub mod server;
pub mod state;
pub mod variant;

pub use render::{Notice, View};
pub use server::{ServerConfig, app_router, run_server};
pub use state::{AppState, Session};
pub use variant::Variant;
