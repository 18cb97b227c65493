//! Router, handlers and server loop of the web console.
//!
//! Every handler follows the same pattern: one sequence of blocking calls
//! against the store, the outcome recorded in the session, then a redirect
//! back to the page that shows it. External failures become inline
//! messages; the page always renders.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use belex_search::{MAX_UPLOAD_BYTES, UploadRequest};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    render::{self, Notice, View},
    state::AppState,
};

/// Request bodies may exceed the upload ceiling; the handler rejects them
/// with an explanation instead of a bare 413.
const BODY_LIMIT_BYTES: usize = 256 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8501 }
    }
}

impl ServerConfig {
    /// Host and port from `BELEX_WEB_HOST` / `BELEX_WEB_PORT`, falling
    /// back to localhost and the given port.
    pub fn from_env(default_port: u16) -> Self {
        let host = std::env::var("BELEX_WEB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("BELEX_WEB_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(default_port);
        Self { host, port }
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(index))
        .route("/search", post(run_search))
        .route("/health", get(health))
        .route("/documents", get(documents))
        .route("/documents/upload", post(upload_document))
        .route("/documents/delete", post(delete_document));
    if state.variant.prompt_editor {
        router = router.route("/prompt", get(prompt_editor).post(update_prompt));
    }

    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let variant_name = state.variant.name;
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for the BELEX web console")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("belex-web ({variant_name}) listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.read().await;
    Html(render::search_page(&state.variant, &state.titles, &session).await)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "service": format!("belex-web-{}", state.variant.name)}))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

async fn run_search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    let query = form.query.trim().to_string();
    if query.is_empty() {
        return Redirect::to("/");
    }

    let instruction = {
        let session = state.session.read().await;
        session.active_prompt(&state.variant).map(str::to_string)
    };

    match state.engine.search_with_instruction(&query, instruction.as_deref()).await {
        Ok(answer) => state.session.write().await.record_answer(query, answer),
        Err(search_error) => {
            error!(%search_error, "search failed");
            state.session.write().await.record_failure(query, search_error.to_string());
        }
    }
    Redirect::to("/")
}

#[derive(Debug, Default, Deserialize)]
struct DocumentsQuery {
    view: Option<String>,
    #[serde(default)]
    load_delete: Option<u8>,
}

async fn documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentsQuery>,
) -> Html<String> {
    let view = View::from_query(params.view.as_deref(), &state.variant);
    // The catalog has no local persistence; every view is a fresh walk.
    let listing = state.store.list_documents().await;

    let mut session = state.session.write().await;
    if params.load_delete == Some(1) {
        session.docs_for_delete = Some(listing.documents.clone());
    }
    let notice = session.take_notice();

    Html(
        render::documents_page(
            &state.variant,
            &state.titles,
            &session,
            view,
            Some(&listing),
            notice.as_ref(),
        )
        .await,
    )
}

async fn upload_document(State(state): State<AppState>, mut multipart: Multipart) -> Redirect {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut display_name: Option<String> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.name() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    match field.bytes().await {
                        Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                        Err(read_error) => {
                            let message =
                                format!("❌ Fehler beim Lesen der Datei: {read_error}");
                            return write_failed(&state, message).await;
                        }
                    }
                }
                Some("display_name") => {
                    display_name =
                        field.text().await.ok().filter(|text| !text.trim().is_empty());
                }
                _ => {}
            },
            Ok(None) => break,
            Err(form_error) => {
                let message = format!("❌ Ungültiges Upload-Formular: {form_error}");
                return write_failed(&state, message).await;
            }
        }
    }

    let Some((file_name, bytes)) = file else {
        return write_failed(&state, "❌ Keine Datei ausgewählt".to_string()).await;
    };

    // Checked here, before the store sees the request; the store enforces
    // the same ceiling for its other callers.
    let size_bytes = bytes.len() as u64;
    if size_bytes > MAX_UPLOAD_BYTES {
        let message = format!(
            "❌ Datei ist zu groß ({:.1} MB). Maximum: 100 MB",
            size_bytes as f64 / (1024.0 * 1024.0)
        );
        return write_failed(&state, message).await;
    }

    let request = UploadRequest {
        file_name: file_name.clone(),
        bytes,
        mime_type: None,
        display_name,
    };
    match state.store.upload_document(request).await {
        Ok(operation) => {
            let mut session = state.session.write().await;
            session.invalidate_delete_cache();
            session.pending_notice = Some(Notice::Success(format!(
                "✅ '{file_name}' hochgeladen! Die Indexierung läuft im Hintergrund (Operation: {}).",
                operation.name
            )));
        }
        Err(upload_error) => {
            error!(%upload_error, file = %file_name, "upload failed");
            let mut session = state.session.write().await;
            session.pending_notice =
                Some(Notice::Error(format!("❌ Upload fehlgeschlagen: {upload_error}")));
        }
    }
    Redirect::to("/documents")
}

async fn write_failed(state: &AppState, message: String) -> Redirect {
    state.session.write().await.pending_notice = Some(Notice::Error(message));
    Redirect::to("/documents")
}

#[derive(Debug, Deserialize)]
struct DeleteForm {
    name: String,
    #[serde(default)]
    view: Option<String>,
}

async fn delete_document(State(state): State<AppState>, Form(form): Form<DeleteForm>) -> Redirect {
    let view = View::from_query(form.view.as_deref(), &state.variant);

    match state.store.delete_document(&form.name).await {
        Ok(()) => {
            {
                let mut session = state.session.write().await;
                session.invalidate_delete_cache();
                session.pending_notice =
                    Some(Notice::Success("🗑️ Dokument gelöscht!".to_string()));
            }
            // The store keeps returning the document for a few seconds
            // after a delete; the pause makes the refreshed listing less
            // confusing, it does not confirm anything.
            if !state.variant.post_delete_wait.is_zero() {
                tokio::time::sleep(state.variant.post_delete_wait).await;
            }
        }
        Err(delete_error) => {
            error!(%delete_error, document = %form.name, "delete failed");
            state.session.write().await.pending_notice =
                Some(Notice::Error(format!("❌ Löschen fehlgeschlagen: {delete_error}")));
        }
    }

    Redirect::to(&format!("/documents?view={}", view.as_query()))
}

async fn prompt_editor(State(state): State<AppState>) -> Html<String> {
    let session = state.session.read().await;
    Html(render::prompt_page(&state.variant, &session))
}

#[derive(Debug, Deserialize)]
struct PromptForm {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    action: String,
}

async fn update_prompt(State(state): State<AppState>, Form(form): Form<PromptForm>) -> Redirect {
    let mut session = state.session.write().await;
    if form.action == "reset" {
        session.custom_prompt = None;
    } else {
        // Text identical to the variant default is not an override.
        let prompt = form.prompt.trim();
        let is_default = state
            .variant
            .default_system_prompt
            .is_some_and(|default| default.trim() == prompt);
        session.custom_prompt =
            (!prompt.is_empty() && !is_default).then(|| prompt.to_string());
    }
    Redirect::to("/prompt")
}
