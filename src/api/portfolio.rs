//! Binding-scoped reads: portfolio summary, holdings, transactions, and binding status.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	api::common::{self, Extra, MoneyAmount, Pagination, Returns},
	client::{CowcClient, Query},
	obs::Operation,
};

/// Portfolio summary for one binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
	/// Current market value.
	#[serde(default)]
	pub total_value: Option<MoneyAmount>,
	/// Net amount invested.
	#[serde(default)]
	pub total_invested: Option<MoneyAmount>,
	/// Returns to date.
	#[serde(default)]
	pub total_returns: Option<Returns>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// One fund position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
	/// Fund identifier.
	pub fund_id: String,
	/// Fund display name.
	#[serde(default)]
	pub fund_name: Option<String>,
	/// Units held.
	#[serde(default)]
	pub units: Option<f64>,
	/// NAV used for the valuation.
	#[serde(default)]
	pub current_nav: Option<f64>,
	/// Units multiplied by NAV.
	#[serde(default)]
	pub market_value: Option<f64>,
	/// Unrealized gain as a percentage.
	#[serde(default)]
	pub unrealized_gain_percent: Option<f64>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Holdings returned by [`CowcClient::get_holdings`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoldingList {
	/// Positions held under the binding.
	#[serde(default)]
	pub holdings: Vec<Holding>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Optional window and paging for [`CowcClient::get_transactions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionQuery {
	/// First day included.
	pub from: Option<Date>,
	/// Last day included.
	pub to: Option<Date>,
	/// Page size.
	pub limit: Option<u32>,
	/// Pagination offset.
	pub offset: Option<u32>,
}
impl TransactionQuery {
	/// Restricts the window to `from..=to`.
	pub fn between(from: Date, to: Date) -> Self {
		Self { from: Some(from), to: Some(to), ..Self::default() }
	}

	/// Sets the page size.
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	/// Sets the pagination offset.
	pub fn offset(mut self, offset: u32) -> Self {
		self.offset = Some(offset);

		self
	}

	/// Renders the options as query parameters.
	pub fn to_query(&self) -> Query {
		let mut query = Query::new();

		common::push_opt(&mut query, "from", self.from.map(common::format_date));
		common::push_opt(&mut query, "to", self.to.map(common::format_date));
		common::push_opt(&mut query, "limit", self.limit);
		common::push_opt(&mut query, "offset", self.offset);

		query
	}
}

/// Transaction history page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
	/// Transactions, verbatim.
	#[serde(default)]
	pub transactions: Vec<JsonValue>,
	/// Pagination block.
	#[serde(default)]
	pub pagination: Option<Pagination>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Binding status record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binding {
	/// Binding identifier.
	#[serde(default)]
	pub binding_id: Option<String>,
	/// Binding status label.
	#[serde(default)]
	pub status: Option<String>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

impl CowcClient {
	/// Fetches the portfolio summary (`GET /bindings/{id}/portfolio`).
	pub async fn get_portfolio(&self, binding_id: &str) -> Result<Portfolio> {
		self.call(
			Operation::GetPortfolio,
			Method::GET,
			&["bindings", binding_id, "portfolio"],
			Query::new(),
			None::<&()>,
		)
		.await
	}

	/// Fetches current holdings (`GET /bindings/{id}/holdings`).
	pub async fn get_holdings(&self, binding_id: &str) -> Result<HoldingList> {
		self.call(
			Operation::GetHoldings,
			Method::GET,
			&["bindings", binding_id, "holdings"],
			Query::new(),
			None::<&()>,
		)
		.await
	}

	/// Fetches transaction history (`GET /bindings/{id}/transactions`).
	pub async fn get_transactions(
		&self,
		binding_id: &str,
		options: &TransactionQuery,
	) -> Result<TransactionList> {
		self.call(
			Operation::GetTransactions,
			Method::GET,
			&["bindings", binding_id, "transactions"],
			options.to_query(),
			None::<&()>,
		)
		.await
	}

	/// Fetches the binding status (`GET /bindings/{id}`).
	pub async fn get_binding_status(&self, binding_id: &str) -> Result<Binding> {
		self.call(
			Operation::GetBindingStatus,
			Method::GET,
			&["bindings", binding_id],
			Query::new(),
			None::<&()>,
		)
		.await
	}
}
