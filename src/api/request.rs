//! Unsigned and signed request descriptors plus the pure signing function.

// crates.io
use oauth2::http::{self, Method};
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	auth::{CredentialPlacement, TokenState},
	error::ConfigError,
};

/// Query parameter Deezer expects the access token under.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Immutable per-call request defaults, combined functionally with each descriptor.
///
/// This replaces any notion of a process-global mutable option bag: defaults are plain
/// data handed to [`UnsignedRequest::with_defaults`], and per-request values always win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDefaults {
	/// Headers applied to every request unless the descriptor already sets them.
	pub headers: BTreeMap<String, String>,
}
impl Default for RequestDefaults {
	fn default() -> Self {
		let mut headers = BTreeMap::new();

		headers.insert(
			"User-Agent".to_owned(),
			concat!("deezer-client/", env!("CARGO_PKG_VERSION")).to_owned(),
		);
		headers.insert("Accept".to_owned(), "application/json".to_owned());

		Self { headers }
	}
}

/// Request descriptor produced by an endpoint builder, not yet carrying a credential.
///
/// Consumed once by the signing layer; [`sign`] never mutates the descriptor it is
/// handed, so one descriptor can be re-signed for the post-refresh retry.
#[derive(Clone, Debug, PartialEq)]
pub struct UnsignedRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL (query-string parameters live in `query`).
	pub url: Url,
	/// Query parameters appended at dispatch time.
	pub query: Vec<(String, String)>,
	/// Request headers.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<Value>,
}
impl UnsignedRequest {
	/// Creates a descriptor for the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), headers: BTreeMap::new(), body: None }
	}

	/// Creates a GET descriptor.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Appends a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets a header, replacing any previous value for the same name.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Attaches a JSON body.
	pub fn body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Merges the default headers in, keeping any header the descriptor already set.
	pub fn with_defaults(mut self, defaults: &RequestDefaults) -> Self {
		for (name, value) in &defaults.headers {
			self.headers.entry(name.clone()).or_insert_with(|| value.clone());
		}

		self
	}

	/// Builds the follow-up descriptor for a pagination cursor.
	///
	/// The cursor URL already embeds the paging parameters, so previously set query
	/// parameters are cleared; method, headers, and body carry over unchanged.
	pub(crate) fn follow_cursor(&self, cursor: Url) -> Self {
		Self {
			method: self.method.clone(),
			url: cursor,
			query: Vec::new(),
			headers: self.headers.clone(),
			body: self.body.clone(),
		}
	}
}

/// An [`UnsignedRequest`] with the credential injected, ready for one dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedRequest(UnsignedRequest);
impl SignedRequest {
	/// Borrows the underlying descriptor.
	pub fn descriptor(&self) -> &UnsignedRequest {
		&self.0
	}

	/// Converts the signed descriptor into the transport's request type.
	pub(crate) fn into_http_request(self) -> Result<oauth2::HttpRequest, ConfigError> {
		let UnsignedRequest { method, mut url, query, headers, body } = self.0;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k, v)));
		}

		let mut builder = http::Request::builder().method(method).uri(url.as_str());

		for (name, value) in &headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		let payload = match &body {
			Some(value) => {
				if !headers.contains_key("Content-Type") {
					builder = builder.header("Content-Type", "application/json");
				}

				serde_json::to_vec(value).unwrap_or_default()
			},
			None => Vec::new(),
		};

		Ok(builder.body(payload)?)
	}
}

/// Injects the access token into a request per the configured placement.
///
/// Pure and idempotent: the input descriptor is borrowed immutably and identical inputs
/// produce identical signed output. Fails when the state holds no access token, or when
/// body placement meets a non-object body.
pub fn sign(
	request: &UnsignedRequest,
	token: &TokenState,
	placement: CredentialPlacement,
) -> Result<SignedRequest, ConfigError> {
	let access =
		token.access_token.as_ref().map(|s| s.expose()).ok_or(ConfigError::MissingAccessToken)?;
	let mut signed = request.clone();

	match placement {
		CredentialPlacement::Header => {
			signed
				.headers
				.insert("Authorization".to_owned(), format!("{} {access}", token.token_type));
		},
		CredentialPlacement::QueryString => {
			signed.query.push((ACCESS_TOKEN_PARAM.to_owned(), access.to_owned()));
		},
		CredentialPlacement::Body => match signed.body.take() {
			Some(Value::Object(mut fields)) => {
				fields.insert(ACCESS_TOKEN_PARAM.to_owned(), Value::String(access.to_owned()));
				signed.body = Some(Value::Object(fields));
			},
			None => {
				let mut fields = Map::new();

				fields.insert(ACCESS_TOKEN_PARAM.to_owned(), Value::String(access.to_owned()));
				signed.body = Some(Value::Object(fields));
			},
			Some(_) => return Err(ConfigError::BodyNotAnObject),
		},
	}

	Ok(SignedRequest(signed))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn request() -> UnsignedRequest {
		UnsignedRequest::get(Url::parse("https://api.deezer.com/album/302127").expect("URL fixture"))
			.query("limit", "25")
	}

	fn token() -> TokenState {
		TokenState::with_access_token("frXYZ")
	}

	#[test]
	fn header_placement_formats_authorization() {
		let signed = sign(&request(), &token(), CredentialPlacement::Header)
			.expect("Header signing should succeed.");

		assert_eq!(
			signed.descriptor().headers.get("Authorization").map(String::as_str),
			Some("Bearer frXYZ"),
		);
	}

	#[test]
	fn query_placement_appends_access_token() {
		let signed = sign(&request(), &token(), CredentialPlacement::QueryString)
			.expect("Query signing should succeed.");

		assert!(
			signed
				.descriptor()
				.query
				.iter()
				.any(|(k, v)| k == ACCESS_TOKEN_PARAM && v == "frXYZ")
		);
	}

	#[test]
	fn body_placement_merges_into_object() {
		let base = request().body(json!({ "title": "Discovery" }));
		let signed =
			sign(&base, &token(), CredentialPlacement::Body).expect("Body signing should succeed.");
		let body = signed.descriptor().body.as_ref().expect("Signed body should be present.");

		assert_eq!(body["title"], "Discovery");
		assert_eq!(body[ACCESS_TOKEN_PARAM], "frXYZ");

		let err = sign(&request().body(json!([1, 2])), &token(), CredentialPlacement::Body)
			.expect_err("Array bodies cannot take a token field.");

		assert!(matches!(err, ConfigError::BodyNotAnObject));
	}

	#[test]
	fn signing_never_mutates_the_input() {
		let original = request();
		let snapshot = original.clone();
		let _ = sign(&original, &token(), CredentialPlacement::Header)
			.expect("Signing should succeed.");
		let _ = sign(&original, &token(), CredentialPlacement::QueryString)
			.expect("Signing should succeed.");

		assert_eq!(original, snapshot);
	}

	#[test]
	fn signing_is_idempotent_across_calls() {
		let base = request();
		let first = sign(&base, &token(), CredentialPlacement::QueryString)
			.expect("First signing should succeed.");
		let second = sign(&base, &token(), CredentialPlacement::QueryString)
			.expect("Second signing should succeed.");

		assert_eq!(first, second);
	}

	#[test]
	fn missing_access_token_is_rejected() {
		let err = sign(&request(), &TokenState::empty(), CredentialPlacement::Header)
			.expect_err("Empty token state cannot sign.");

		assert!(matches!(err, ConfigError::MissingAccessToken));
	}

	#[test]
	fn cursor_follow_up_clears_query_and_keeps_shape() {
		let base = request().header("X-Trace", "abc").body(json!({ "k": "v" }));
		let cursor =
			Url::parse("https://api.deezer.com/album/302127/tracks?index=25").expect("URL fixture");
		let next = base.follow_cursor(cursor.clone());

		assert_eq!(next.url, cursor);
		assert!(next.query.is_empty());
		assert_eq!(next.method, base.method);
		assert_eq!(next.headers, base.headers);
		assert_eq!(next.body, base.body);
	}

	#[test]
	fn defaults_merge_without_overriding() {
		let defaults = RequestDefaults::default();
		let merged = request().header("Accept", "text/plain").with_defaults(&defaults);

		assert_eq!(merged.headers.get("Accept").map(String::as_str), Some("text/plain"));
		assert!(merged.headers.contains_key("User-Agent"));
	}

	#[test]
	fn http_conversion_appends_query_and_content_type() {
		let signed = sign(
			&request().body(json!({ "title": "Discovery" })),
			&token(),
			CredentialPlacement::QueryString,
		)
		.expect("Signing should succeed.");
		let http_request =
			signed.into_http_request().expect("HTTP conversion should succeed.");

		assert_eq!(http_request.method(), Method::GET);

		let uri = http_request.uri().to_string();

		assert!(uri.contains("limit=25"));
		assert!(uri.contains("access_token=frXYZ"));
		assert_eq!(
			http_request.headers().get("content-type").and_then(|v| v.to_str().ok()),
			Some("application/json"),
		);
	}
}
