//! HTTP client behaviour against a mock catalogue server.

use std::time::Duration;

use pokecards::api::{Catalogue, PokeApiClient};
use pokecards::error::CatalogueError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> PokeApiClient {
    PokeApiClient::new(format!("{}/api/v2/", server.uri()), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_list_page_sends_offset_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1302,
            "results": [
                {"name": "spearow", "url": "https://pokeapi.co/api/v2/pokemon/21/"},
                {"name": "fearow", "url": "https://pokeapi.co/api/v2/pokemon/22/"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = client(&server).list_page(20, 2).await.unwrap();
    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["spearow", "fearow"]);
    assert_eq!(entries[1].detail_url, "https://pokeapi.co/api/v2/pokemon/22/");
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server).list_page(0, 20).await;
    assert!(matches!(result, Err(CatalogueError::Network(_))));
}

#[tokio::test]
async fn test_missing_resource_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/missingno"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let catalogue = client(&server);
    let result = catalogue.fetch_detail(&catalogue.detail_url("missingno")).await;
    assert!(matches!(result, Err(ref err) if err.is_not_found()));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/pikachu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 25,"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/eevee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let catalogue = client(&server);
    let truncated = catalogue.fetch_detail(&catalogue.detail_url("pikachu")).await;
    assert!(matches!(truncated, Err(CatalogueError::Parse(_))));

    let array = catalogue.fetch_detail(&catalogue.detail_url("eevee")).await;
    assert!(matches!(array, Err(CatalogueError::Parse(_))));
}

#[tokio::test]
async fn test_detail_with_nulls_still_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/porygon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 137,
            "name": "porygon",
            "base_experience": null,
            "moves": null,
            "sprites": {"front_default": null}
        })))
        .mount(&server)
        .await;

    let catalogue = client(&server);
    let raw = catalogue
        .fetch_detail(&catalogue.detail_url("porygon"))
        .await
        .unwrap();
    assert_eq!(raw.id, Some(137));
    assert_eq!(raw.base_experience, None);
    assert!(raw.moves.is_empty());
}
