#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use deezer_client::{
	api::{Endpoint, Extractor, SearchQuery},
	auth::{ClientConfig, CredentialId, GrantType, TokenState},
	client::ApiClient,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	pager::{self, PagePolicy},
	store::{CredentialStore, MemoryStore},
};

type TestClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

fn build_client(server: &MockServer) -> TestClient {
	let config = ClientConfig::builder("client-pager")
		.client_secret("secret-pager")
		.token_endpoint(
			Url::parse(&server.url("/oauth/access_token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_base(
			Url::parse(&server.base_url()).expect("Mock API base should parse successfully."),
		)
		.grant_type(GrantType::AuthorizationCode)
		.build()
		.expect("Pager test configuration should build successfully.");
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let credential = CredentialId::new("deezer-pager")
		.expect("Credential identifier should be valid for pager tests.");

	ApiClient::with_http_client(
		store,
		config,
		credential,
		TokenState::with_access_token("walk-access"),
		ReqwestHttpClient::default(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

#[tokio::test]
async fn three_page_walk_merges_items_in_order() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let page_one = server
		.mock_async(|when, then| {
			when.method(GET).path("/playlist/908622995/tracks");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [{ "id": 1 }, { "id": 2 }],
				"next": server.url("/walk/page-two"),
			}));
		})
		.await;
	let page_two = server
		.mock_async(|when, then| {
			when.method(GET).path("/walk/page-two");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [{ "id": 3 }, { "id": 4 }],
				"next": server.url("/walk/page-three"),
			}));
		})
		.await;
	let page_three = server
		.mock_async(|when, then| {
			when.method(GET).path("/walk/page-three");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": [{ "id": 5 }], "next": null }));
		})
		.await;
	let walk = client
		.execute_endpoint_all(&Endpoint::PlaylistTracks { id: 908_622_995 })
		.await
		.expect("Three-page walk should complete.");

	assert_eq!(walk.items.len(), 5);
	assert!(!walk.truncated);

	let ids: Vec<i64> =
		walk.items.iter().map(|item| item["id"].as_i64().expect("Item id")).collect();

	assert_eq!(ids, vec![1, 2, 3, 4, 5]);

	page_one.assert_async().await;
	page_two.assert_async().await;
	page_three.assert_async().await;
}

#[tokio::test]
async fn single_page_walk_stops_without_a_second_call() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let only_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/artist/27/fans");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": [{ "id": 9 }], "total": 1 }));
		})
		.await;
	let walk = client
		.execute_endpoint_all(&Endpoint::ArtistFans { id: 27 })
		.await
		.expect("Single-page walk should complete.");

	assert_eq!(walk.items.len(), 1);
	assert!(!walk.truncated);

	only_page.assert_calls_async(1).await;
}

#[tokio::test]
async fn search_walk_stops_before_the_offset_1000_request() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let items: Vec<_> = (0..25).map(|idx| json!({ "id": idx })).collect();
	let first_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/search/track");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": items,
				// The server still advertises a follow-up, but it sits at the boundary
				// the search endpoints hard-fail beyond.
				"next": server.url("/search/track?q=test&index=1000"),
			}));
		})
		.await;
	let walk = client
		.execute_endpoint_all(&Endpoint::TrackSearch {
			query: SearchQuery::keyword("test"),
			order: None,
		})
		.await
		.expect("Search walk should stop at the boundary, not error.");

	assert_eq!(walk.items.len(), 25);
	assert!(walk.truncated);

	first_page.assert_calls_async(1).await;
}

#[tokio::test]
async fn item_cap_truncates_the_walk() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/walk/cap-one");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [{ "id": 1 }, { "id": 2 }, { "id": 3 }],
				"next": server.url("/walk/cap-two"),
			}));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/walk/cap-two");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [{ "id": 4 }, { "id": 5 }, { "id": 6 }],
				"next": server.url("/walk/cap-three"),
			}));
		})
		.await;
	let third = server
		.mock_async(|when, then| {
			when.method(GET).path("/walk/cap-three");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": [], "next": null }));
		})
		.await;
	let initial = deezer_client::api::UnsignedRequest::get(
		Url::parse(&server.url("/walk/cap-one")).expect("Initial walk URL should parse."),
	);
	let walk = pager::fetch_all(
		&client,
		initial,
		Extractor::DATA,
		PagePolicy { cap: 4, offset_hard_limit: false },
	)
	.await
	.expect("Capped walk should complete.");

	assert_eq!(walk.items.len(), 6);
	assert!(walk.truncated);

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
	third.assert_calls_async(0).await;
}
