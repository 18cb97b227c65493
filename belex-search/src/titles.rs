//! Resolution of registry numbers to official law titles.
//!
//! The cantonal portal exposes law metadata under
//! `/api/de/texts_of_law/{bsg}`. Lookups are decoration only: any failure
//! (HTTP error, timeout, unexpected payload) resolves to `None` and the
//! caller falls back to the raw document title.

use crate::citations::BELEX_PORTAL;
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::LazyLock,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use url::Url;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

static DEFAULT_ENDPOINT: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(&format!("{BELEX_PORTAL}/api/de/texts_of_law/"))
        .expect("unreachable error: failed to parse default title endpoint")
});

#[derive(Debug, Deserialize)]
struct TextOfLawResponse {
    #[serde(default)]
    text_of_law: Option<TextOfLaw>,
}

#[derive(Debug, Default, Deserialize)]
struct TextOfLaw {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
}

struct CacheSlot {
    resolved: Option<String>,
    fetched_at: Instant,
}

/// Looks up official law names on the cantonal portal, with a TTL cache.
///
/// Negative results are cached like positive ones, so an unknown registry
/// number does not hammer the portal on every render.
pub struct TitleResolver {
    http_client: reqwest::Client,
    endpoint: Url,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl TitleResolver {
    /// Resolver against the production portal with the default timeout
    /// and a one-hour cache.
    pub fn new() -> Self {
        Self::with_options(DEFAULT_ENDPOINT.clone(), LOOKUP_TIMEOUT, CACHE_TTL)
    }

    /// Resolver against a custom endpoint (must end in a slash).
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self::with_options(endpoint, LOOKUP_TIMEOUT, CACHE_TTL)
    }

    /// Fully parameterized resolver.
    pub fn with_options(endpoint: Url, lookup_timeout: Duration, ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(lookup_timeout)
            .build()
            .expect("all parameters must be valid");
        Self { http_client, endpoint, ttl, cache: Mutex::new(HashMap::new()) }
    }

    /// Resolves a registry number to `"title (abbreviation)"`, the bare
    /// title when no abbreviation exists, or `None`.
    pub async fn resolve(&self, bsg: &str) -> Option<String> {
        {
            let cache = self.cache.lock().await;
            if let Some(slot) = cache.get(bsg) {
                if slot.fetched_at.elapsed() < self.ttl {
                    return slot.resolved.clone();
                }
            }
        }

        let resolved = self.fetch(bsg).await;

        let mut cache = self.cache.lock().await;
        cache.insert(
            bsg.to_string(),
            CacheSlot { resolved: resolved.clone(), fetched_at: Instant::now() },
        );
        resolved
    }

    async fn fetch(&self, bsg: &str) -> Option<String> {
        let url = match self.endpoint.join(bsg) {
            Ok(url) => url,
            Err(error) => {
                tracing::debug!(bsg, %error, "cannot build title lookup URL");
                return None;
            }
        };

        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(bsg, %error, "title lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(bsg, status = response.status().as_u16(), "title lookup rejected");
            return None;
        }

        match response.json::<TextOfLawResponse>().await {
            Ok(body) => display_title(body.text_of_law.unwrap_or_default()),
            Err(error) => {
                tracing::debug!(bsg, %error, "title payload not understood");
                None
            }
        }
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn display_title(law: TextOfLaw) -> Option<String> {
    let title = law.title.filter(|title| !title.is_empty())?;
    match law.abbreviation.filter(|abbreviation| !abbreviation.is_empty()) {
        Some(abbreviation) => Some(format!("{title} ({abbreviation})")),
        None => Some(title),
    }
}
