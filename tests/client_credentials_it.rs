#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use deezer_client::{
	api::Endpoint,
	auth::{ClientConfig, CredentialId, GrantType},
	client::ApiClient,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	store::{CredentialStore, MemoryStore},
};

fn build_config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder("client-cc")
		.client_secret("secret-cc")
		.token_endpoint(
			Url::parse(&server.url("/oauth/access_token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_base(
			Url::parse(&server.base_url()).expect("Mock API base should parse successfully."),
		)
		.grant_type(GrantType::ClientCredentials)
		.build()
		.expect("Client-credentials configuration should build successfully.")
}

#[tokio::test]
async fn empty_record_bootstraps_eagerly_before_the_first_call() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let credential = CredentialId::new("deezer-cc")
		.expect("Credential identifier should be valid for bootstrap test.");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"minted-access\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	// The chart mock only matches the freshly minted token, so a hit proves the
	// bootstrap exchange happened before the first API call.
	let chart_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/chart/tracks")
				.query_param("access_token", "minted-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"id\":1109731},{\"id\":3135556}],\"total\":2}");
		})
		.await;

	// An entirely absent record is fine for this grant; `load` starts empty.
	let client = ApiClient::load(
		store,
		config.clone(),
		credential.clone(),
		ReqwestHttpClient::default(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.await
	.expect("Loading an absent client-credentials record should succeed.");
	let walk = client
		.execute_endpoint_all(&Endpoint::ChartTracks)
		.await
		.expect("Chart walk should succeed after eager bootstrap.");

	assert_eq!(walk.items.len(), 2);
	assert!(!walk.truncated);

	token_mock.assert_calls_async(1).await;
	chart_mock.assert_calls_async(1).await;

	let persisted = store_backend
		.load(&credential, &config.scopes)
		.await
		.expect("Store load should succeed.")
		.expect("Bootstrapped state should be persisted.");

	assert_eq!(persisted.access_token.as_ref().map(|s| s.expose()), Some("minted-access"));
}

#[tokio::test]
async fn absent_authorization_code_record_is_rejected_at_load() {
	let server = MockServer::start_async().await;
	let config = ClientConfig::builder("client-ac")
		.client_secret("secret-ac")
		.token_endpoint(
			Url::parse(&server.url("/oauth/access_token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_base(
			Url::parse(&server.base_url()).expect("Mock API base should parse successfully."),
		)
		.grant_type(GrantType::AuthorizationCode)
		.build()
		.expect("Authorization-code configuration should build successfully.");
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let credential = CredentialId::new("deezer-ac")
		.expect("Credential identifier should be valid for rejection test.");
	let err = ApiClient::load(
		store,
		config,
		credential,
		ReqwestHttpClient::default(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.await
	.expect_err("Authorization-code grant cannot start without a connected record.");

	assert!(matches!(err, deezer_client::error::Error::Config(_)));
}
