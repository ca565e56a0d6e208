//! Hosted onboarding flow for new investors.

// self
use crate::{
	_prelude::*,
	api::common::Extra,
	client::{CowcClient, Query},
	obs::Operation,
};

/// Locale used when the caller does not pick one.
pub const DEFAULT_LOCALE: &str = "en";

/// Parameters for [`CowcClient::initiate_onboarding`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRequest {
	/// Partner-side user identifier.
	pub partner_user_id: String,
	/// Where the provider redirects once the flow finishes.
	pub callback_url: String,
	/// UI locale of the hosted flow.
	pub locale: String,
	/// Prefilled email address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Prefilled phone number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
}
impl OnboardingRequest {
	/// Creates a request with the default locale.
	pub fn new(partner_user_id: impl Into<String>, callback_url: impl Into<String>) -> Self {
		Self {
			partner_user_id: partner_user_id.into(),
			callback_url: callback_url.into(),
			locale: DEFAULT_LOCALE.into(),
			email: None,
			phone: None,
		}
	}

	/// Overrides the locale.
	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = locale.into();

		self
	}

	/// Prefills the email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Prefills the phone number.
	pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
		self.phone = Some(phone.into());

		self
	}
}

/// Hosted flow handed back to the partner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowSession {
	/// Flow identifier.
	pub flow_id: String,
	/// URL the investor opens.
	pub flow_url: String,
	/// Expiry timestamp, verbatim.
	#[serde(default)]
	pub expires_at: Option<String>,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

impl CowcClient {
	/// Starts an onboarding flow (`POST /flows/onboarding`).
	pub async fn initiate_onboarding(&self, request: &OnboardingRequest) -> Result<FlowSession> {
		self.call(
			Operation::InitiateOnboarding,
			Method::POST,
			&["flows", "onboarding"],
			Query::new(),
			Some(request),
		)
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_defaults_locale_and_skips_blank_contacts() {
		let body = serde_json::to_value(OnboardingRequest::new("user-1", "https://partner/cb"))
			.expect("Request should encode.");

		assert_eq!(
			body,
			serde_json::json!({
				"partner_user_id": "user-1",
				"callback_url": "https://partner/cb",
				"locale": "en"
			})
		);

		let body = serde_json::to_value(
			OnboardingRequest::new("user-1", "https://partner/cb")
				.with_locale("ms")
				.with_email("a@b.c"),
		)
		.expect("Request should encode.");

		assert_eq!(body["locale"], "ms");
		assert_eq!(body["email"], "a@b.c");
		assert!(body.get("phone").is_none());
	}
}
