//! The University of Bern BELEX web console, with the editable system
//! prompt and the own-uploads view.

use std::sync::Arc;

use anyhow::Context;
use belex_search::{BelexConfig, GeminiLawStore};
use belex_web::{AppState, ServerConfig, Variant, run_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BelexConfig::from_env()
        .context("belex-web-unibe needs GEMINI_API_KEY and GEMINI_FILESTORE_ID")?;
    let variant = Variant::unibe();
    let store = Arc::new(GeminiLawStore::new(&config, variant.model.clone())?);

    run_server(ServerConfig::from_env(8502), AppState::new(store, variant)).await
}
