//! The token-managing API client orchestrating sign, dispatch, refresh, and retry.

pub mod execute;
pub mod refresh;

pub use execute::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	api::request::RequestDefaults,
	auth::{ClientConfig, CredentialId, GrantType, TokenState},
	error::ConfigError,
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Executes signed Deezer API calls for one credential record.
///
/// The client owns the HTTP transport, credential store handle, immutable
/// configuration, and the mutable [`TokenState`] for the duration of one workflow
/// execution. Request descriptors come from the caller (typically via
/// [`Endpoint`](crate::api::Endpoint)); the client signs them per the configured
/// credential placement, dispatches them, and transparently performs the single
/// refresh-and-retry cycle when the API reports the token expired.
#[derive(Clone)]
pub struct ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request, token exchanges included.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Credential store that persists refreshed token state.
	pub store: Arc<dyn CredentialStore>,
	/// Immutable OAuth2 client configuration for this credential record.
	pub config: ClientConfig,
	/// Reference naming the credential record inside the store.
	pub credential: CredentialId,
	/// Default headers merged into every request.
	pub defaults: RequestDefaults,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	token: Arc<AsyncMutex<TokenState>>,
}
impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair and a
	/// pre-loaded token state.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		credential: CredentialId,
		token: TokenState,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			config,
			credential,
			defaults: RequestDefaults::default(),
			refresh_metrics: Default::default(),
			token: Arc::new(AsyncMutex::new(token)),
		}
	}

	/// Creates a client by loading the persisted token state from the store.
	///
	/// An entirely absent record is acceptable for the client-credentials grant (the
	/// client bootstraps eagerly before the first call) but a configuration error for
	/// the authorization-code grant, which cannot mint tokens on its own.
	pub async fn load(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		credential: CredentialId,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let token = match store.load(&credential, &config.scopes).await? {
			Some(state) => state,
			None => match config.grant_type {
				GrantType::ClientCredentials => TokenState::empty(),
				GrantType::AuthorizationCode =>
					return Err(ConfigError::CredentialsNotConnected.into()),
			},
		};

		Ok(Self::with_http_client(store, config, credential, token, http_client, mapper))
	}

	/// Replaces the default headers merged into every request.
	pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
		self.defaults = defaults;

		self
	}

	/// Returns a snapshot of the current token state.
	pub async fn token_state(&self) -> TokenState {
		self.token.lock().await.clone()
	}

	pub(crate) fn token_cell(&self) -> &AsyncMutex<TokenState> {
		&self.token
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client for the provided configuration and credential reference.
	///
	/// The client provisions its own reqwest-backed transport honoring the
	/// configuration's TLS-validation preference, then loads the persisted token state
	/// from the store.
	pub async fn connect(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		credential: CredentialId,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::try_from_tls_preference(config.ignore_tls_validation)?;

		Self::load(
			store,
			config,
			credential,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)
		.await
	}
}
impl<C, M> Debug for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("credential", &self.credential)
			.field("api_base", &self.config.api_base.as_str())
			.field("grant_type", &self.config.grant_type)
			.field("placement", &self.config.placement)
			.finish()
	}
}
