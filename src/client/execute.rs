//! Signed execution with the single sanctioned refresh-and-retry cycle.
//!
//! [`ApiClient::execute`] is the primary entry point: sign with the current token
//! state, dispatch, and when the API answers with the configured token-expired status
//! refresh once, persist the replacement state, re-sign, and retry exactly once. A
//! second token-expired answer surfaces as an authentication failure; every other
//! non-2xx status propagates as an upstream error without any retry.

// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	api::request::{SignedRequest, UnsignedRequest, sign},
	error::ConfigError,
	http::{ApiHttpClient, ResponseMetadataSlot},
	obs::{self, CallKind, CallOutcome, CallSpan},
	oauth::TransportErrorMapper,
};

use super::ApiClient;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Decoded response from one completed API exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
	/// HTTP status code (always 2xx; other statuses surface as errors).
	pub status: u16,
	/// Decoded JSON body; `Null` for empty bodies.
	pub body: Value,
}

struct RawResponse {
	status: u16,
	bytes: Vec<u8>,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Executes one API call, transparently refreshing the credential when the API
	/// rejects the current token.
	pub async fn execute(&self, request: UnsignedRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Execute;

		let span = CallSpan::new(KIND, "execute");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = request.with_defaults(&self.defaults);

				self.ensure_bootstrapped().await?;

				let first = self.dispatch_signed(&request).await?;

				if first.status != self.config.token_expired_code {
					return decode(first);
				}

				// One refresh, persisted before the retried call is signed, then one
				// retry. A second rejection is terminal.
				self.refresh_token_state().await?;

				let second = self.dispatch_signed(&request).await?;

				if second.status == self.config.token_expired_code {
					return Err(Error::AuthenticationFailed {
						reason: format!(
							"API kept responding with HTTP {} after a token refresh",
							second.status
						),
					});
				}

				decode(second)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Builds the endpoint's request descriptor and executes it.
	pub async fn execute_endpoint(&self, endpoint: &crate::api::Endpoint) -> Result<ApiResponse> {
		let request = endpoint.request(&self.config.api_base)?;

		self.execute(request).await
	}

	async fn dispatch_signed(&self, request: &UnsignedRequest) -> Result<RawResponse> {
		let signed = self.sign_current(request).await?;
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let http_request = signed.into_http_request()?;
		let response = handle.call(http_request).await.map_err(|err| {
			self.transport_mapper.map_transport_error(
				CallKind::Execute,
				slot.take().as_ref(),
				err,
			)
		})?;
		let status = response.status().as_u16();

		Ok(RawResponse { status, bytes: response.into_body() })
	}

	async fn sign_current(&self, request: &UnsignedRequest) -> Result<SignedRequest> {
		let token = self.token_cell().lock().await.clone();

		sign(request, &token, self.config.placement).map_err(|err| match err {
			ConfigError::MissingAccessToken => Error::AuthenticationFailed {
				reason: "credential record holds no access token".into(),
			},
			other => other.into(),
		})
	}
}

fn decode(raw: RawResponse) -> Result<ApiResponse> {
	if !(200..300).contains(&raw.status) {
		return Err(Error::Upstream { status: raw.status, body: preview(&raw.bytes) });
	}
	if raw.bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(ApiResponse { status: raw.status, body: Value::Null });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&raw.bytes);
	let body = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Payload { source, status: raw.status })?;

	Ok(ApiResponse { status: raw.status, body })
}

fn preview(bytes: &[u8]) -> String {
	let text = String::from_utf8_lossy(bytes);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}
