//! Fund discovery: listing, details, and NAV history.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	api::common::{self, Extra, Pagination},
	client::{CowcClient, Query},
	obs::Operation,
};

def_label! {
	/// Fund asset class.
	FundCategory {
		/// Equity fund.
		Equity => "equity",
		/// Bond / fixed-income fund.
		Bond => "bond",
		/// Money market fund.
		MoneyMarket => "money_market",
		/// Mixed-asset fund.
		Balanced => "balanced",
	}
}

def_label! {
	/// Provider risk classification.
	RiskLevel {
		/// Low risk.
		Conservative => "conservative",
		/// Medium risk.
		Moderate => "moderate",
		/// High risk.
		Aggressive => "aggressive",
	}
}

/// Optional filters for [`CowcClient::list_funds`]. Unset fields are omitted from the query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FundFilter {
	/// Restrict to one asset class.
	pub category: Option<FundCategory>,
	/// Restrict to one risk level.
	pub risk_level: Option<RiskLevel>,
	/// Restrict to Shariah-compliant (`true`) or conventional (`false`) funds.
	pub is_shariah: Option<bool>,
	/// Restrict to one currency (e.g. `MYR`).
	pub currency: Option<String>,
	/// Page size.
	pub limit: Option<u32>,
	/// Pagination offset.
	pub offset: Option<u32>,
}
impl FundFilter {
	/// Sets the category filter.
	pub fn category(mut self, category: FundCategory) -> Self {
		self.category = Some(category);

		self
	}

	/// Sets the risk level filter.
	pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
		self.risk_level = Some(risk_level);

		self
	}

	/// Sets the Shariah filter.
	pub fn shariah(mut self, is_shariah: bool) -> Self {
		self.is_shariah = Some(is_shariah);

		self
	}

	/// Sets the currency filter.
	pub fn currency(mut self, currency: impl Into<String>) -> Self {
		self.currency = Some(currency.into());

		self
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

	/// Renders the filter as query parameters.
	pub fn to_query(&self) -> Query {
		let mut query = Query::new();

		common::push_opt(&mut query, "category", self.category.as_ref());
		common::push_opt(&mut query, "risk_level", self.risk_level.as_ref());
		common::push_opt(&mut query, "is_shariah", self.is_shariah);
		common::push_opt(&mut query, "currency", self.currency.as_ref());
		common::push_opt(&mut query, "limit", self.limit);
		common::push_opt(&mut query, "offset", self.offset);

		query
	}
}

/// Fund summary or detail record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fund {
	/// Provider fund identifier.
	pub fund_id: String,
	/// Exchange or registry code.
	#[serde(default)]
	pub fund_code: Option<String>,
	/// Display name.
	#[serde(default)]
	pub fund_name: Option<String>,
	/// Asset class.
	#[serde(default)]
	pub category: Option<FundCategory>,
	/// Risk classification.
	#[serde(default)]
	pub risk_level: Option<RiskLevel>,
	/// Latest net asset value per unit.
	#[serde(default)]
	pub current_nav: Option<f64>,
	/// Fund currency.
	#[serde(default)]
	pub currency: Option<String>,
	/// Whether the fund is Shariah-compliant.
	#[serde(default)]
	pub is_shariah: Option<bool>,
	/// Fields not modeled here (minimums, performance, ...).
	#[serde(flatten)]
	pub extra: Extra,
}

/// Page of funds returned by [`CowcClient::list_funds`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundList {
	/// Funds on this page.
	#[serde(default)]
	pub funds: Vec<Fund>,
	/// Pagination block.
	#[serde(default)]
	pub pagination: Option<Pagination>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// NAV history for one fund over a date range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavHistory {
	/// Fund the history belongs to.
	#[serde(default)]
	pub fund_id: Option<String>,
	/// The NAV series and any other fields, verbatim.
	#[serde(flatten)]
	pub extra: Extra,
}

impl CowcClient {
	/// Lists available funds (`GET /funds`).
	pub async fn list_funds(&self, filter: &FundFilter) -> Result<FundList> {
		self.call(Operation::ListFunds, Method::GET, &["funds"], filter.to_query(), None::<&()>)
			.await
	}

	/// Fetches one fund (`GET /funds/{id}`).
	pub async fn get_fund(&self, fund_id: &str) -> Result<Fund> {
		self.call(Operation::GetFund, Method::GET, &["funds", fund_id], Query::new(), None::<&()>)
			.await
	}

	/// Fetches NAV history between `from` and `to` inclusive (`GET /funds/{id}/nav`).
	pub async fn get_fund_nav(&self, fund_id: &str, from: Date, to: Date) -> Result<NavHistory> {
		let query = vec![("from", common::format_date(from)), ("to", common::format_date(to))];

		self.call(Operation::GetFundNav, Method::GET, &["funds", fund_id, "nav"], query, None::<&()>)
			.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_filter_has_no_query() {
		assert!(FundFilter::default().to_query().is_empty());
	}

	#[test]
	fn filter_renders_wire_labels() {
		let query = FundFilter::default()
			.category(FundCategory::MoneyMarket)
			.risk_level(RiskLevel::Conservative)
			.shariah(false)
			.currency("MYR")
			.limit(10)
			.offset(20)
			.to_query();

		assert_eq!(
			query,
			vec![
				("category", "money_market".to_owned()),
				("risk_level", "conservative".to_owned()),
				("is_shariah", "false".to_owned()),
				("currency", "MYR".to_owned()),
				("limit", "10".to_owned()),
				("offset", "20".to_owned()),
			]
		);
	}

	#[test]
	fn fund_keeps_unknown_fields_and_labels() {
		let fund: Fund = serde_json::from_value(serde_json::json!({
			"fund_id": "fund_1",
			"fund_name": "Growth Fund",
			"category": "thematic",
			"risk_level": "aggressive",
			"current_nav": 1.2345,
			"minimums": { "initial_investment": 100 }
		}))
		.expect("Fund payload should decode.");

		assert_eq!(fund.category, Some(FundCategory::Other("thematic".into())));
		assert_eq!(fund.risk_level, Some(RiskLevel::Aggressive));
		assert_eq!(fund.current_nav, Some(1.2345));
		assert!(fund.extra.contains_key("minimums"));

		let encoded = serde_json::to_value(&fund).expect("Fund should encode.");

		assert_eq!(encoded["category"], "thematic");
		assert_eq!(encoded["minimums"]["initial_investment"], 100);
	}
}
