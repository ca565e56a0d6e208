// self
use crate::{
	_prelude::*,
	error::ApiError,
	obs::{Operation, Outcome},
};

/// Status label used when an [`ApiError`] carries no HTTP status.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Counts one `outcome` of `operation` on `cowc_client_request_total`.
pub fn record_outcome(operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cowc_client_request_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Counts a provider error response on `cowc_client_api_error_total`, labeled by HTTP status.
pub fn record_api_error(operation: Operation, error: &ApiError) {
	let status = status_label(error);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cowc_client_api_error_total",
			"operation" => operation.as_str(),
			"status" => status
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, status);
	}
}

/// Closes an operation: success or failure, plus the provider status when the API refused it.
pub fn record_result<T>(operation: Operation, result: &Result<T>) {
	match result {
		Ok(_) => record_outcome(operation, Outcome::Success),
		Err(e) => {
			record_outcome(operation, Outcome::Failure);

			if let Some(api) = e.as_api() {
				record_api_error(operation, api);
			}
		},
	}
}

fn status_label(error: &ApiError) -> String {
	error.status.map_or_else(|| UNKNOWN_STATUS.to_owned(), |status| status.to_string())
}
