//! Internal facade over the OAuth token endpoint.
//!
//! The API client renews credentials through exactly two grants: `refresh_token` for
//! authorization-code records and `client_credentials` for app-only records. Both are
//! delegated to the `oauth2` crate, driven through the same [`ApiHttpClient`] transport
//! that carries signed API traffic.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
};
// self
#[cfg(feature = "reqwest")] use crate::error::TransportError;
use crate::{
	_prelude::*,
	auth::{ClientAuthMethod, ClientConfig, DEFAULT_TOKEN_TYPE, TokenState},
	error::ConfigError,
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::CallKind,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// Maps HTTP transport failures into client [`Error`] values.
///
/// The same mapper classifies failures for token exchanges and signed API calls, so
/// custom transports plug in one translation for both paths.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		kind: CallKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		kind: CallKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		let _ = (kind, meta);

		match err {
			HttpClientError::Reqwest(inner) => {
				let inner = *inner;

				if inner.is_builder() {
					ConfigError::from(inner).into()
				} else {
					TransportError::from(inner).into()
				}
			},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Io(std::io::Error::other(message)).into(),
			_ => TransportError::Io(std::io::Error::other(
				"HTTP client reported an unrecognized failure.",
			))
			.into(),
		}
	}
}

pub(crate) struct TokenEndpointFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenEndpointFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &ClientConfig,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(config.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_token_uri(token_url);

		if let Some(secret) = &config.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.clone()));
		}
		if matches!(config.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Performs the `refresh_token` grant and returns the replacement state.
	///
	/// The returned state carries only what the token endpoint reported; callers that
	/// must keep a rotated-out refresh token alive handle the carry-over themselves.
	pub(crate) async fn refresh(
		&self,
		refresh_token: &str,
		config: &ClientConfig,
	) -> Result<TokenState> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let mut request = self.oauth_client.exchange_refresh_token(&refresh_secret);

		for scope in config.scopes.iter() {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		Ok(state_from_response(response))
	}

	/// Performs the `client_credentials` grant and returns the freshly minted state.
	pub(crate) async fn client_credentials(&self, config: &ClientConfig) -> Result<TokenState> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for scope in config.scopes.iter() {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		Ok(state_from_response(response))
	}
}

fn state_from_response(response: FacadeTokenResponse) -> TokenState {
	// Deezer omits `expires_in` for long-lived tokens; absence maps to "no expiry"
	// rather than an error.
	let expires_at = response
		.expires_in()
		.and_then(|delta| i64::try_from(delta.as_secs()).ok())
		.map(|secs| OffsetDateTime::now_utc() + Duration::seconds(secs));
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => DEFAULT_TOKEN_TYPE.to_owned(),
		// Non-bearer types keep their wire spelling.
		other => serde_json::to_value(other)
			.ok()
			.and_then(|value| value.as_str().map(str::to_owned))
			.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_owned()),
	};
	let mut state = TokenState::with_access_token(response.access_token().secret().to_owned());

	state.token_type = token_type;
	state.expires_at = expires_at;

	if let Some(refresh) = response.refresh_token() {
		state.refresh_token = Some(crate::auth::TokenSecret::new(refresh.secret().to_owned()));
	}

	state
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(CallKind::Refresh, meta.as_ref(), error),
		RequestTokenError::Parse(error, _body) => Error::TokenEndpoint {
			message: format!("Token endpoint returned malformed JSON: {error}"),
			status,
		},
		RequestTokenError::Other(message) => Error::TokenEndpoint { message, status },
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let code = response.error().as_ref().to_owned();
	let message = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	// invalid_grant/invalid_client responses mean the stored credential can no longer
	// authenticate; everything else is an unexpected token endpoint response.
	if ["invalid_grant", "access_denied", "invalid_client", "unauthorized_client"]
		.iter()
		.any(|known| code.eq_ignore_ascii_case(known))
	{
		Error::AuthenticationFailed { reason: message }
	} else {
		Error::TokenEndpoint { message, status }
	}
}
