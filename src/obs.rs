//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every operation in a `cowc.request` span carrying the `operation`
//!   and `stage` fields, and emits debug events for token refreshes and webhook rejections.
//! - `metrics` increments the `cowc_client_request_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`. Provider error responses also
//!   bump `cowc_client_api_error_total`, labeled by `operation` + `status`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Client-credentials exchange.
	Authenticate,
	/// `GET /funds`.
	ListFunds,
	/// `GET /funds/{id}`.
	GetFund,
	/// `GET /funds/{id}/nav`.
	GetFundNav,
	/// `GET /bindings/{id}/portfolio`.
	GetPortfolio,
	/// `GET /bindings/{id}/holdings`.
	GetHoldings,
	/// `GET /bindings/{id}/transactions`.
	GetTransactions,
	/// `GET /bindings/{id}`.
	GetBindingStatus,
	/// `POST /orders/preview`.
	PreviewOrder,
	/// `POST /orders`.
	CreateOrder,
	/// `GET /orders/{id}`.
	GetOrder,
	/// `POST /flows/onboarding`.
	InitiateOnboarding,
	/// Untyped call issued through [`CowcClient::request_json`](crate::client::CowcClient::request_json).
	Raw,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Authenticate => "authenticate",
			Operation::ListFunds => "list_funds",
			Operation::GetFund => "get_fund",
			Operation::GetFundNav => "get_fund_nav",
			Operation::GetPortfolio => "get_portfolio",
			Operation::GetHoldings => "get_holdings",
			Operation::GetTransactions => "get_transactions",
			Operation::GetBindingStatus => "get_binding_status",
			Operation::PreviewOrder => "preview_order",
			Operation::CreateOrder => "create_order",
			Operation::GetOrder => "get_order",
			Operation::InitiateOnboarding => "initiate_onboarding",
			Operation::Raw => "raw",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
