// self
use crate::obs::{CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"deezer_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a pagination walk stopping at the safety cap instead of natural exhaustion.
pub fn record_pages_truncated() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("deezer_client_pages_truncated_total").increment(1);
	}
}
