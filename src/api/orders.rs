//! Order preview, placement, and status lookup.

// self
use crate::{
	_prelude::*,
	api::common::Extra,
	client::{CowcClient, Query},
	obs::Operation,
};

/// Currency applied when the caller does not pick one.
pub const DEFAULT_CURRENCY: &str = "MYR";

def_label! {
	/// Direction of an order.
	#[derive(Default)]
	OrderType {
		/// Buy units.
		#[default]
		Subscription => "subscription",
		/// Sell units.
		Redemption => "redemption",
	}
}

def_label! {
	/// Order lifecycle state reported by the provider.
	OrderStatus {
		/// Waiting for the investor to pay.
		PendingPayment => "pending_payment",
		/// Payment captured.
		PaymentReceived => "payment_received",
		/// Being processed by the provider.
		Processing => "processing",
		/// Forwarded to the fund manager.
		Submitted => "submitted",
		/// Accepted by the fund manager.
		Confirmed => "confirmed",
		/// Units allotted or proceeds paid out.
		Settled => "settled",
		/// Rejected or errored.
		Failed => "failed",
		/// Withdrawn before settlement.
		Cancelled => "cancelled",
	}
}
impl OrderStatus {
	/// Whether the order can no longer change state.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Settled | Self::Failed | Self::Cancelled)
	}
}

/// Order parameters shared by [`CowcClient::preview_order`] and [`CowcClient::create_order`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
	/// Binding placing the order.
	pub binding_id: String,
	/// Target fund.
	pub fund_id: String,
	/// Subscription or redemption.
	pub order_type: OrderType,
	/// Amount in `currency`.
	pub amount: f64,
	/// ISO currency code.
	pub currency: String,
	/// Partner-side idempotency reference. Sent only on placement.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_reference_id: Option<String>,
}
impl OrderRequest {
	/// Creates a subscription in the default currency.
	pub fn subscription(
		binding_id: impl Into<String>,
		fund_id: impl Into<String>,
		amount: f64,
	) -> Self {
		Self::new(binding_id, fund_id, OrderType::Subscription, amount)
	}

	/// Creates a redemption in the default currency.
	pub fn redemption(
		binding_id: impl Into<String>,
		fund_id: impl Into<String>,
		amount: f64,
	) -> Self {
		Self::new(binding_id, fund_id, OrderType::Redemption, amount)
	}

	/// Creates an order of `order_type` in the default currency.
	pub fn new(
		binding_id: impl Into<String>,
		fund_id: impl Into<String>,
		order_type: OrderType,
		amount: f64,
	) -> Self {
		Self {
			binding_id: binding_id.into(),
			fund_id: fund_id.into(),
			order_type,
			amount,
			currency: DEFAULT_CURRENCY.into(),
			partner_reference_id: None,
		}
	}

	/// Overrides the currency.
	pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
		self.currency = currency.into();

		self
	}

	/// Attaches a partner reference.
	pub fn with_partner_reference_id(mut self, reference: impl Into<String>) -> Self {
		self.partner_reference_id = Some(reference.into());

		self
	}

	fn preview_body(&self) -> PreviewBody<'_> {
		PreviewBody {
			binding_id: &self.binding_id,
			fund_id: &self.fund_id,
			order_type: &self.order_type,
			amount: self.amount,
			currency: &self.currency,
		}
	}
}

#[derive(Serialize)]
struct PreviewBody<'a> {
	binding_id: &'a str,
	fund_id: &'a str,
	order_type: &'a OrderType,
	amount: f64,
	currency: &'a str,
}

/// Fee and unit estimate for a prospective order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPreview {
	/// Amount before charges.
	#[serde(default)]
	pub gross_amount: Option<f64>,
	/// Sales charge deducted.
	#[serde(default)]
	pub sales_charge: Option<f64>,
	/// Amount after charges.
	#[serde(default)]
	pub net_amount: Option<f64>,
	/// Estimated units at the current NAV.
	#[serde(default)]
	pub indicative_units: Option<f64>,
	/// Currency of the amounts.
	#[serde(default)]
	pub currency: Option<String>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Hosted payment step returned with a new subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentFlow {
	/// URL the investor opens to pay.
	pub flow_url: String,
	/// Expiry timestamp, verbatim.
	#[serde(default)]
	pub expires_at: Option<String>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Order record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Provider order identifier.
	pub order_id: String,
	/// Current state.
	pub status: OrderStatus,
	/// Payment step, present on subscriptions awaiting payment.
	#[serde(default)]
	pub payment_flow: Option<PaymentFlow>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

impl CowcClient {
	/// Previews fees and units for `order` (`POST /orders/preview`).
	///
	/// The partner reference is not part of a preview and is never sent.
	pub async fn preview_order(&self, order: &OrderRequest) -> Result<OrderPreview> {
		self.call(
			Operation::PreviewOrder,
			Method::POST,
			&["orders", "preview"],
			Query::new(),
			Some(&order.preview_body()),
		)
		.await
	}

	/// Places `order` (`POST /orders`).
	pub async fn create_order(&self, order: &OrderRequest) -> Result<Order> {
		self.call(Operation::CreateOrder, Method::POST, &["orders"], Query::new(), Some(order)).await
	}

	/// Fetches an order (`GET /orders/{id}`).
	pub async fn get_order(&self, order_id: &str) -> Result<Order> {
		self.call(Operation::GetOrder, Method::GET, &["orders", order_id], Query::new(), None::<&()>)
			.await
	}
}
