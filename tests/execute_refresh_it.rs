#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use deezer_client::{
	api::Endpoint,
	auth::{ClientConfig, CredentialId, GrantType, TokenState},
	client::ApiClient,
	error::Error,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	store::{CredentialStore, MemoryStore},
};

type TestClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

fn build_config(server: &MockServer, grant: GrantType) -> ClientConfig {
	ClientConfig::builder("client-execute")
		.client_secret("secret-execute")
		.token_endpoint(
			Url::parse(&server.url("/oauth/access_token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_base(
			Url::parse(&server.base_url()).expect("Mock API base should parse successfully."),
		)
		.grant_type(grant)
		.build()
		.expect("Test configuration should build successfully.")
}

fn build_client(config: ClientConfig, token: TokenState) -> (TestClient, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let credential = CredentialId::new("deezer-execute")
		.expect("Credential identifier should be valid for execute tests.");
	let client = ApiClient::with_http_client(
		store,
		config,
		credential,
		token,
		ReqwestHttpClient::default(),
		Arc::new(ReqwestTransportErrorMapper),
	);

	(client, store_backend)
}

#[tokio::test]
async fn expired_token_refreshes_once_and_retries_once() {
	let server = MockServer::start_async().await;
	let config = build_config(&server, GrantType::AuthorizationCode);
	let (client, store) = build_client(
		config.clone(),
		TokenState::with_access_token("stale-access").and_refresh_token("stale-refresh"),
	);
	let stale_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/album/302127")
				.query_param("access_token", "stale-access");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":{\"type\":\"OAuthException\",\"code\":300}}");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"fresh-access\",\"refresh_token\":\"fresh-refresh\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/album/302127")
				.query_param("access_token", "fresh-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":302127,\"title\":\"Discovery\"}");
		})
		.await;
	let response = client
		.execute_endpoint(&Endpoint::AlbumGet { id: 302_127 })
		.await
		.expect("Refresh-and-retry should recover from the first 401.");

	assert_eq!(response.body["title"], "Discovery");

	stale_mock.assert_async().await;
	token_mock.assert_async().await;
	fresh_mock.assert_async().await;

	let credential = CredentialId::new("deezer-execute").expect("Credential fixture");
	let persisted = store
		.load(&credential, &config.scopes)
		.await
		.expect("Store load should succeed.")
		.expect("Refreshed state should be persisted.");

	assert_eq!(persisted.access_token.as_ref().map(|s| s.expose()), Some("fresh-access"));
	assert_eq!(persisted.refresh_token.as_ref().map(|s| s.expose()), Some("fresh-refresh"));

	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn persistent_rejection_surfaces_authentication_failure() {
	let server = MockServer::start_async().await;
	let config = build_config(&server, GrantType::AuthorizationCode);
	let (client, _store) = build_client(
		config,
		TokenState::with_access_token("rejected-access").and_refresh_token("rejected-refresh"),
	);
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/me/playlists");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":{\"type\":\"OAuthException\",\"code\":300}}");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"still-rejected\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	let err = client
		.execute_endpoint(&Endpoint::UserPlaylists { user: deezer_client::api::UserRef::Me })
		.await
		.expect_err("A second 401 must not trigger another refresh.");

	assert!(matches!(err, Error::AuthenticationFailed { .. }));

	// Exactly two upstream calls and one refresh; the cycle never loops.
	api_mock.assert_calls_async(2).await;
	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn other_upstream_errors_propagate_without_refresh() {
	let server = MockServer::start_async().await;
	let config = build_config(&server, GrantType::AuthorizationCode);
	let (client, _store) = build_client(config, TokenState::with_access_token("good-access"));
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/track/3135556");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"error\":\"internal\"}");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = client
		.execute_endpoint(&Endpoint::TrackGet { id: 3_135_556 })
		.await
		.expect_err("A 500 is an upstream error, not a refresh trigger.");

	match err {
		Error::Upstream { status, body } => {
			assert_eq!(status, 500);
			assert!(body.contains("internal"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	api_mock.assert_calls_async(1).await;
	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_refresh_token_fails_without_retry() {
	let server = MockServer::start_async().await;
	let config = build_config(&server, GrantType::AuthorizationCode);
	let (client, _store) = build_client(config, TokenState::with_access_token("stale-access"));
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/artist/27");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":{\"type\":\"OAuthException\",\"code\":300}}");
		})
		.await;
	let err = client
		.execute_endpoint(&Endpoint::ArtistGet { id: 27 })
		.await
		.expect_err("Refresh without a refresh token must fail.");

	assert!(matches!(err, Error::AuthenticationFailed { .. }));

	api_mock.assert_calls_async(1).await;
	assert_eq!(client.refresh_metrics.failures(), 1);
}
