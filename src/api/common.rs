//! Models and query helpers shared by the endpoint modules.

// crates.io
use time::Date;
// self
use crate::{_prelude::*, client::Query};

/// Unknown response fields, preserved verbatim.
pub type Extra = JsonMap<String, JsonValue>;

/// Offset-based pagination block returned by list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
	/// Total number of matching items.
	pub total: u64,
	/// Page size applied by the provider.
	pub limit: u64,
	/// Offset of the first returned item.
	pub offset: u64,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Monetary amount tagged with its currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoneyAmount {
	/// Amount in major units.
	pub amount: f64,
	/// ISO 4217 currency code.
	pub currency: String,
}

/// Absolute and relative return figures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Returns {
	/// Absolute return in the portfolio currency.
	pub amount: Option<f64>,
	/// Return as a percentage.
	pub percent: Option<f64>,
}

/// Renders a date the way the provider expects in query strings (`YYYY-MM-DD`).
pub fn format_date(date: Date) -> String {
	format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

pub(crate) fn push_opt<V>(query: &mut Query, key: &'static str, value: Option<V>)
where
	V: ToString,
{
	if let Some(value) = value {
		query.push((key, value.to_string()));
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn dates_are_zero_padded() {
		assert_eq!(format_date(macros::date!(2024 - 03 - 07)), "2024-03-07");
		assert_eq!(format_date(macros::date!(2025 - 12 - 31)), "2025-12-31");
	}

	#[test]
	fn pagination_tolerates_missing_fields() {
		let pagination: Pagination = serde_json::from_str(r#"{"total": 12, "has_more": true}"#)
			.expect("Partial pagination should decode.");

		assert_eq!(pagination.total, 12);
		assert_eq!(pagination.limit, 0);
		assert_eq!(pagination.extra.get("has_more"), Some(&JsonValue::Bool(true)));
	}

	#[test]
	fn push_opt_skips_none() {
		let mut query = Query::new();

		push_opt(&mut query, "limit", Some(5));
		push_opt::<u32>(&mut query, "offset", None);

		assert_eq!(query, vec![("limit", "5".to_owned())]);
	}
}
