//! Behavior of the title resolver against a mock portal: formatting,
//! silent failure modes, and the TTL cache.

use belex_search::TitleResolver;
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_against(server: &MockServer) -> TitleResolver {
    let endpoint = Url::parse(&format!("{}/api/de/texts_of_law/", server.uri())).unwrap();
    TitleResolver::with_endpoint(endpoint)
}

#[tokio::test]
async fn resolves_title_with_abbreviation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text_of_law": {"title": "Personalgesetz", "abbreviation": "PG"}
        })))
        .mount(&server)
        .await;

    let resolved = resolver_against(&server).resolve("153.01").await;
    assert_eq!(resolved.as_deref(), Some("Personalgesetz (PG)"));
}

#[tokio::test]
async fn unknown_numbers_resolve_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/999.99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    assert_eq!(resolver_against(&server).resolve("999.99").await, None);
}

#[tokio::test]
async fn server_errors_resolve_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(resolver_against(&server).resolve("153.01").await, None);
}

#[tokio::test]
async fn garbled_payloads_resolve_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    assert_eq!(resolver_against(&server).resolve("153.01").await, None);
}

#[tokio::test]
async fn slow_lookups_time_out_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"text_of_law": {"title": "Personalgesetz"}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{}/api/de/texts_of_law/", server.uri())).unwrap();
    let resolver = TitleResolver::with_options(
        endpoint,
        Duration::from_millis(100),
        Duration::from_secs(3600),
    );
    assert_eq!(resolver.resolve("153.01").await, None);
}

#[tokio::test]
async fn second_lookup_is_served_from_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text_of_law": {"title": "Personalgesetz", "abbreviation": "PG"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_against(&server);
    assert_eq!(resolver.resolve("153.01").await.as_deref(), Some("Personalgesetz (PG)"));
    assert_eq!(resolver.resolve("153.01").await.as_deref(), Some("Personalgesetz (PG)"));
}

#[tokio::test]
async fn negative_results_are_cached_too() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/999.99"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_against(&server);
    assert_eq!(resolver.resolve("999.99").await, None);
    assert_eq!(resolver.resolve("999.99").await, None);
}

#[tokio::test]
async fn expired_entries_are_fetched_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/de/texts_of_law/153.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text_of_law": {"title": "Personalgesetz"}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{}/api/de/texts_of_law/", server.uri())).unwrap();
    let resolver =
        TitleResolver::with_options(endpoint, Duration::from_secs(5), Duration::ZERO);
    assert_eq!(resolver.resolve("153.01").await.as_deref(), Some("Personalgesetz"));
    assert_eq!(resolver.resolve("153.01").await.as_deref(), Some("Personalgesetz"));
}
