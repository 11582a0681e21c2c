//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `deezer_client.call` with the `call`
//!   (operation kind) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `deezer_client_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and the
//!   `deezer_client_pages_truncated_total` counter whenever a pagination walk stops at
//!   the safety cap instead of natural exhaustion.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// One signed API call, including its sanctioned refresh-and-retry cycle.
	Execute,
	/// A token endpoint exchange (refresh or client-credentials).
	Refresh,
	/// A multi-page walk through a list endpoint.
	Paginate,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Execute => "execute",
			CallKind::Refresh => "refresh",
			CallKind::Paginate => "paginate",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
