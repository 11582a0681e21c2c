//! Client-level error types shared across signing, execution, and pagination.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The API kept rejecting the credential after the single refresh-and-retry cycle, or the
	/// credential record lacks the fields a refresh would need.
	#[error("Authentication failed: {reason}.")]
	AuthenticationFailed {
		/// Human-readable failure summary.
		reason: String,
	},
	/// The API returned a non-2xx status other than the configured token-expired code.
	#[error("Upstream returned HTTP {status}: {body}.")]
	Upstream {
		/// HTTP status code returned by the API.
		status: u16,
		/// Response body preview for the caller to report.
		body: String,
	},
	/// The token endpoint returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// A 2xx API response carried a body that could not be decoded as JSON.
	#[error("API response body could not be decoded.")]
	Payload {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the offending response.
		status: u16,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Configuration contains an invalid URL.
	#[error("Configuration contains an invalid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint path segment could not be joined onto the API base.
	#[error("Endpoint path `{path}` cannot be joined onto the API base.")]
	InvalidPath {
		/// Offending path value.
		path: String,
	},

	/// The credential record holds no usable access token for signing.
	#[error("Credential record is missing an access token.")]
	MissingAccessToken,
	/// Body credential placement needs a JSON object body to merge the token into.
	#[error("Body credential placement requires a JSON object body.")]
	BodyNotAnObject,
	/// The authorization-code grant requires a connected credential record.
	#[error("OAuth credentials are not connected for the authorization-code grant.")]
	CredentialsNotConnected,
	/// The client secret is required by the configured client authentication method.
	#[error("Client secret is required for the configured client authentication method.")]
	MissingClientSecret,
	/// Request scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Credential identifier failed validation.
	#[error("Credential identifier is invalid.")]
	InvalidCredentialId(#[from] crate::auth::IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
