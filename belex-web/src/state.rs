//! Shared application state.
//!
//! The console serves one working session per process. Everything a
//! request may read or update lives in [`Session`] behind one lock, so
//! user actions never overlap; the surrounding [`AppState`] holds the
//! long-lived collaborators (store, engine, title resolver, variant).

use crate::{render::Notice, variant::Variant};
use belex_gemini::StoreDocument;
use belex_search::{Answer, BelexSearchEngine, LawStore, TitleResolver};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-session state surviving between requests.
#[derive(Debug, Default)]
pub struct Session {
    /// Query text of the most recent search, redisplayed in the form.
    pub last_query: String,
    /// Result of the most recent search, if it succeeded.
    pub last_answer: Option<Answer>,
    /// Failure message of the most recent search, if it failed.
    pub last_error: Option<String>,
    /// Catalog snapshot backing the delete picker. Loaded on demand and
    /// invalidated by every upload or delete.
    pub docs_for_delete: Option<Vec<StoreDocument>>,
    /// Prompt override from the editor; `None` means the variant default.
    pub custom_prompt: Option<String>,
    /// Outcome of the last write action, shown once on the next document
    /// console render.
    pub pending_notice: Option<Notice>,
}

impl Session {
    /// The system instruction searches run with right now.
    pub fn active_prompt<'a>(&'a self, variant: &'a Variant) -> Option<&'a str> {
        self.custom_prompt.as_deref().or(variant.default_system_prompt)
    }

    pub fn record_answer(&mut self, query: String, answer: Answer) {
        self.last_query = query;
        self.last_answer = Some(answer);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, query: String, message: String) {
        self.last_query = query;
        self.last_answer = None;
        self.last_error = Some(message);
    }

    /// Drops the delete picker snapshot after a write to the store.
    pub fn invalidate_delete_cache(&mut self) {
        self.docs_for_delete = None;
    }

    /// Takes the pending notice, leaving none behind.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.pending_notice.take()
    }
}

/// Handle cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LawStore>,
    pub engine: BelexSearchEngine,
    pub titles: Arc<TitleResolver>,
    pub variant: Arc<Variant>,
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// State resolving titles against the production portal.
    pub fn new(store: Arc<dyn LawStore>, variant: Variant) -> Self {
        Self::with_title_resolver(store, variant, TitleResolver::new())
    }

    /// State with an explicit title resolver, for tests and custom portals.
    pub fn with_title_resolver(
        store: Arc<dyn LawStore>,
        variant: Variant,
        titles: TitleResolver,
    ) -> Self {
        Self {
            engine: BelexSearchEngine::new(store.clone()),
            store,
            titles: Arc::new(titles),
            variant: Arc::new(variant),
            session: Arc::new(RwLock::new(Session::default())),
        }
    }
}
