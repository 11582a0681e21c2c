//! Mutable token state owned by the client for the duration of one execution.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Default `token_type` applied when the token endpoint omits one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Snapshot of the OAuth tokens loaded from (and persisted back to) the credential store.
///
/// A refresh produces a brand-new state that supersedes the old one wholesale; fields are
/// never merged between generations. The access token may be absent for freshly connected
/// client-credentials records, in which case the client bootstraps eagerly before the
/// first API call.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenState {
	/// Access token secret, absent until the first successful exchange.
	pub access_token: Option<TokenSecret>,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Token type echoed into the Authorization header (`Bearer` unless overridden).
	pub token_type: String,
	/// Expiry instant, when the token endpoint reported one. Deezer omits `expires_in`
	/// for long-lived tokens, which maps to `None` here.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// Creates an empty state for a credential record that has never been exchanged.
	pub fn empty() -> Self {
		Self {
			access_token: None,
			refresh_token: None,
			token_type: DEFAULT_TOKEN_TYPE.into(),
			expires_at: None,
		}
	}

	/// Creates a state holding only an access token.
	pub fn with_access_token(token: impl Into<String>) -> Self {
		Self { access_token: Some(TokenSecret::new(token)), ..Self::empty() }
	}

	/// Attaches a refresh token.
	pub fn and_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Attaches an absolute expiry instant.
	pub fn and_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Returns true if the state carries an access token usable for signing.
	pub fn has_access_token(&self) -> bool {
		self.access_token.is_some()
	}

	/// Returns true if the state carries neither an access nor a refresh token.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}

	/// Returns true if the recorded expiry lies at or before the provided instant.
	///
	/// States without a recorded expiry never report expired; the API's token-expired
	/// status code is the authoritative signal either way.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expiry| instant >= expiry)
	}
}
impl Default for TokenState {
	fn default() -> Self {
		Self::empty()
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
