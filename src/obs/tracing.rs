// self
use crate::{_prelude::*, auth::ScopeSet, obs::Operation};

/// Future wrapped in the `cowc.request` span.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// The bare future; spans are compiled out.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// `cowc.request` span for one client operation.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Opens the span with `operation` and `stage` fields.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("cowc.request", operation = operation.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event when the cached session is replaced.
pub fn trace_token_refresh(scope: &ScopeSet, reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(scope = %scope, reason, "requesting a new access token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, reason);
	}
}

/// Emits a debug event when an inbound webhook fails verification.
pub fn trace_webhook_rejection(reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reason = %reason, "rejected webhook");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = RequestSpan::new(Operation::ListFunds, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn trace_helpers_run_without_subscriber() {
		trace_token_refresh(&ScopeSet::partner_default(), "missing");
		trace_webhook_rejection(&"signature mismatch");
	}
}
