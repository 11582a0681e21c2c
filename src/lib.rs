//! Async Deezer API client—OAuth2-signed requests, 401-aware refresh-and-retry, and
//! cursor-walking pagination behind pluggable transport and credential-store seams.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod pager;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientConfig, CredentialId, GrantType, TokenState},
		client::ApiClient,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		store::{CredentialStore, MemoryStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store and the reqwest transport used
	/// across integration tests, seeding the client with the provided token state.
	pub fn build_reqwest_test_client(
		config: ClientConfig,
		credential: CredentialId,
		token: TokenState,
	) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let http_client = test_reqwest_http_client();
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let client =
			ApiClient::with_http_client(store, config, credential, token, http_client, mapper);

		(client, store_backend)
	}

	/// Minimal configuration fixture pointing every endpoint at the provided mock server base.
	pub fn test_config(server_base: &str, grant: GrantType) -> ClientConfig {
		ClientConfig::builder("client-id")
			.client_secret("client-secret")
			.token_endpoint(
				Url::parse(&format!("{server_base}/oauth/access_token"))
					.expect("Mock token endpoint should parse successfully."),
			)
			.api_base(Url::parse(server_base).expect("Mock API base should parse successfully."))
			.grant_type(grant)
			.build()
			.expect("Test configuration should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {httpmock as _, tokio as _};
