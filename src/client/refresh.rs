//! Token renewal with persist-then-use ordering.
//!
//! A refresh replaces the [`TokenState`](crate::auth::TokenState) wholesale: the
//! client-credentials grant mints a brand-new token, the authorization-code grant goes
//! through the stored refresh token. Either way the replacement is written to the
//! credential store **before** it signs anything, so a crash after persistence leaves
//! the next invocation with the fresh token, and concurrent invocations over one
//! credential record can at worst refresh redundantly, never corrupt state.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::GrantType,
	http::ApiHttpClient,
	oauth::{TokenEndpointFacade, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

use super::ApiClient;

/// Thread-safe counters for token renewal attempts.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the total number of renewal attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful renewals.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed renewals.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches an initial token before the first call when the loaded state cannot sign.
	///
	/// Freshly connected client-credentials records start with no token at all, and an
	/// authorization-code record may hold only a refresh token; both renew here instead
	/// of burning the first API call on a guaranteed rejection.
	pub(crate) async fn ensure_bootstrapped(&self) -> Result<()> {
		let (has_access, has_refresh) = {
			let token = self.token_cell().lock().await;

			(token.has_access_token(), token.refresh_token.is_some())
		};

		if has_access {
			return Ok(());
		}

		match self.config.grant_type {
			GrantType::ClientCredentials => self.refresh_token_state().await,
			GrantType::AuthorizationCode if has_refresh => self.refresh_token_state().await,
			GrantType::AuthorizationCode => Err(Error::AuthenticationFailed {
				reason: "credential record holds neither an access nor a refresh token".into(),
			}),
		}
	}

	/// Renews the token state and persists the replacement before it is used.
	pub async fn refresh_token_state(&self) -> Result<()> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_token_state");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				// The lock is held across the exchange so concurrent callers serialize
				// on one renewal instead of stampeding the token endpoint.
				let mut guard = self.token_cell().lock().await;
				let facade = TokenEndpointFacade::from_config(
					&self.config,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;
				let mut fresh = match self.config.grant_type {
					GrantType::ClientCredentials =>
						facade.client_credentials(&self.config).await?,
					GrantType::AuthorizationCode => {
						let refresh_secret = guard
							.refresh_token
							.as_ref()
							.map(|secret| secret.expose().to_owned())
							.ok_or_else(|| Error::AuthenticationFailed {
								reason: "credential record is missing a refresh token".into(),
							})?;

						facade.refresh(&refresh_secret, &self.config).await?
					},
				};

				// Carry the previous refresh token forward when the endpoint did not
				// rotate it, so the replacement stays renewable.
				if fresh.refresh_token.is_none() {
					fresh.refresh_token = guard.refresh_token.clone();
				}

				// Persist-then-use: the store write precedes every use of the new state.
				self.store
					.save(&self.credential, &self.config.scopes, fresh.clone())
					.await
					.map_err(Error::from)?;

				*guard = fresh;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => {
				obs::record_call_outcome(KIND, CallOutcome::Success);
				self.refresh_metrics.record_success();
			},
			Err(_) => {
				obs::record_call_outcome(KIND, CallOutcome::Failure);
				self.refresh_metrics.record_failure();
			},
		}

		result
	}
}
