//! Immutable OAuth2 client configuration consumed by the API client.

// self
use crate::{_prelude::*, auth::scope::ScopeSet, error::ConfigError};

/// Deezer's production API base.
pub const DEEZER_API_BASE: &str = "https://api.deezer.com/";
/// Deezer's production token endpoint.
pub const DEEZER_TOKEN_ENDPOINT: &str = "https://connect.deezer.com/oauth/access_token.php";
/// Status code Deezer uses to signal an expired or revoked access token.
pub const DEFAULT_TOKEN_EXPIRED_CODE: u16 = 401;

/// OAuth 2.0 grant flavors the client can renew tokens with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant; renewal goes through the stored refresh token.
	AuthorizationCode,
	/// Client Credentials grant; renewal mints a brand-new token, no refresh token needed.
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where the access token is injected into an outbound API request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPlacement {
	/// `Authorization: <token_type> <access_token>` request header.
	Header,
	#[default]
	/// `access_token` query-string parameter, Deezer's documented convention.
	QueryString,
	/// `access_token` field merged into the JSON request body.
	Body,
}

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Immutable OAuth2 client configuration, constructed once per invocation from the
/// host's decrypted credential record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Token endpoint used for refreshes and client-credentials exchanges.
	pub token_endpoint: Url,
	/// API base every endpoint path is joined onto.
	pub api_base: Url,
	/// Normalized scopes tied to the credential record.
	pub scopes: ScopeSet,
	/// Grant flavor governing how tokens are renewed.
	pub grant_type: GrantType,
	/// Where the access token is injected into signed requests.
	pub placement: CredentialPlacement,
	/// Client authentication mode for token endpoint calls.
	pub client_auth_method: ClientAuthMethod,
	/// Disables TLS certificate validation on the transport when true.
	pub ignore_tls_validation: bool,
	/// Status code that triggers the refresh-and-retry cycle.
	pub token_expired_code: u16,
}
impl ClientConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client_id)
	}
}

/// Builder for [`ClientConfig`] values, seeded with Deezer's production endpoints.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	client_id: String,
	client_secret: Option<String>,
	token_endpoint: Option<Url>,
	api_base: Option<Url>,
	scopes: ScopeSet,
	grant_type: GrantType,
	placement: CredentialPlacement,
	client_auth_method: ClientAuthMethod,
	ignore_tls_validation: bool,
	token_expired_code: u16,
}
impl ClientConfigBuilder {
	fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			token_endpoint: None,
			api_base: None,
			scopes: ScopeSet::default(),
			grant_type: GrantType::AuthorizationCode,
			placement: CredentialPlacement::default(),
			client_auth_method: ClientAuthMethod::default(),
			ignore_tls_validation: false,
			token_expired_code: DEFAULT_TOKEN_EXPIRED_CODE,
		}
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides the token endpoint (defaults to Deezer's).
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the API base (defaults to Deezer's).
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the credential scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Sets the grant type (defaults to authorization-code).
	pub fn grant_type(mut self, grant: GrantType) -> Self {
		self.grant_type = grant;

		self
	}

	/// Sets the credential placement (defaults to query-string).
	pub fn placement(mut self, placement: CredentialPlacement) -> Self {
		self.placement = placement;

		self
	}

	/// Sets the client authentication mode for token endpoint calls.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Toggles TLS certificate validation on the transport.
	pub fn ignore_tls_validation(mut self, ignore: bool) -> Self {
		self.ignore_tls_validation = ignore;

		self
	}

	/// Overrides the status code treated as "token expired".
	pub fn token_expired_code(mut self, code: u16) -> Self {
		self.token_expired_code = code;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let token_endpoint = match self.token_endpoint {
			Some(url) => url,
			None => Url::parse(DEEZER_TOKEN_ENDPOINT)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?,
		};
		let api_base = match self.api_base {
			Some(url) => url,
			None => Url::parse(DEEZER_API_BASE)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?,
		};

		if api_base.cannot_be_a_base() {
			return Err(ConfigError::InvalidPath { path: api_base.to_string() });
		}
		if matches!(self.grant_type, GrantType::ClientCredentials) && self.client_secret.is_none() {
			return Err(ConfigError::MissingClientSecret);
		}

		Ok(ClientConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			token_endpoint,
			api_base,
			scopes: self.scopes,
			grant_type: self.grant_type,
			placement: self.placement,
			client_auth_method: self.client_auth_method,
			ignore_tls_validation: self.ignore_tls_validation,
			token_expired_code: self.token_expired_code,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_seeds_deezer_defaults() {
		let config = ClientConfig::builder("app-id")
			.client_secret("app-secret")
			.build()
			.expect("Default configuration should build successfully.");

		assert_eq!(config.api_base.as_str(), DEEZER_API_BASE);
		assert_eq!(config.token_endpoint.as_str(), DEEZER_TOKEN_ENDPOINT);
		assert_eq!(config.placement, CredentialPlacement::QueryString);
		assert_eq!(config.token_expired_code, 401);
	}

	#[test]
	fn client_credentials_requires_secret() {
		let err = ClientConfig::builder("app-id")
			.grant_type(GrantType::ClientCredentials)
			.build()
			.expect_err("Client-credentials configuration without a secret must be rejected.");

		assert!(matches!(err, ConfigError::MissingClientSecret));
	}
}
