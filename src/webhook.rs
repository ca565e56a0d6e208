//! Verification and decoding of inbound provider webhooks.
//!
//! The provider signs every delivery with `sha256=<hex>` where the MAC is
//! `HMAC-SHA256(secret, "{timestamp}.{payload}")` and `timestamp` is the raw
//! `X-COWC-Timestamp` header (unix seconds). Deliveries whose timestamp lies more than the
//! configured max age away from the local clock, in either direction, are rejected before the
//! MAC is checked.

// crates.io
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, api::common::Extra, auth::Secret, obs};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the `sha256=<hex>` signature.
pub const SIGNATURE_HEADER: &str = "X-COWC-Signature";
/// Header carrying the signing timestamp in unix seconds.
pub const TIMESTAMP_HEADER: &str = "X-COWC-Timestamp";
/// Header carrying the event type label.
pub const EVENT_TYPE_HEADER: &str = "X-COWC-Event-Type";
/// Accepted clock distance between the delivery timestamp and now.
pub const DEFAULT_MAX_AGE: Duration = Duration::seconds(300);

const SIGNATURE_PREFIX: &str = "sha256=";

/// Reasons a webhook delivery is rejected.
#[derive(Debug, ThisError)]
pub enum WebhookError {
	/// Timestamp header is not an integer.
	#[error("Webhook timestamp is not a unix timestamp.")]
	InvalidTimestamp,
	/// Timestamp lies outside the accepted window.
	#[error("Webhook timestamp is {distance_secs}s away from now, above the {max_age_secs}s limit.")]
	Expired {
		/// Absolute distance between the timestamp and now.
		distance_secs: u64,
		/// Configured limit.
		max_age_secs: u64,
	},
	/// Signature does not match the payload.
	#[error("Webhook signature does not match.")]
	SignatureMismatch,
	/// The secret cannot key the MAC.
	#[error("Webhook secret cannot be used as an HMAC key.")]
	InvalidSecret,
	/// Payload is not a webhook event envelope.
	#[error("Webhook payload could not be decoded.")]
	Payload {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

def_label! {
	/// Event type catalogue.
	WebhookEventType {
		/// A partner user was created.
		UserCreated => "user.created",
		/// KYC approved for a user.
		UserKycApproved => "user.kyc.approved",
		/// KYC rejected for a user.
		UserKycRejected => "user.kyc.rejected",
		/// A binding was established.
		BindingCreated => "binding.created",
		/// A binding was revoked.
		BindingRevoked => "binding.revoked",
		/// An order was created.
		OrderCreated => "order.created",
		/// Payment for an order arrived.
		OrderPaymentReceived => "order.payment_received",
		/// An order settled.
		OrderSettled => "order.settled",
		/// An order failed.
		OrderFailed => "order.failed",
	}
}

/// Webhook event envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
	/// Unique delivery identifier.
	pub event_id: String,
	/// Event type label.
	pub event_type: WebhookEventType,
	/// Emitting provider.
	#[serde(default)]
	pub provider: Option<String>,
	/// Creation timestamp, verbatim.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Event payload.
	#[serde(default)]
	pub data: JsonValue,
	/// Fields not modeled here.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Webhook headers pulled from a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
	/// `X-COWC-Signature` value.
	pub signature: Option<String>,
	/// `X-COWC-Timestamp` value.
	pub timestamp: Option<String>,
	/// `X-COWC-Event-Type` value.
	pub event_type: Option<WebhookEventType>,
}
impl WebhookHeaders {
	/// Reads the headers through `lookup`, which receives the canonical header names.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		Self {
			signature: lookup(SIGNATURE_HEADER),
			timestamp: lookup(TIMESTAMP_HEADER),
			event_type: lookup(EVENT_TYPE_HEADER).map(WebhookEventType::from),
		}
	}

	/// Reads the headers from an HTTP header map.
	pub fn from_header_map(headers: &HeaderMap) -> Self {
		Self::from_lookup(|name| {
			headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
		})
	}
}

/// Verifies deliveries signed with one shared secret.
#[derive(Clone, Debug)]
pub struct WebhookVerifier {
	secret: Secret,
	max_age: Duration,
}
impl WebhookVerifier {
	/// Creates a verifier using [`DEFAULT_MAX_AGE`].
	pub fn new(secret: impl Into<Secret>) -> Self {
		Self { secret: secret.into(), max_age: DEFAULT_MAX_AGE }
	}

	/// Overrides the accepted clock distance.
	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = max_age;

		self
	}

	/// Accepted clock distance.
	pub fn max_age(&self) -> Duration {
		self.max_age
	}

	/// Produces the signature header value for `payload` signed at `timestamp`.
	pub fn sign(&self, timestamp: &str, payload: &[u8]) -> Result<String, WebhookError> {
		let mut mac = HmacSha256::new_from_slice(self.secret.expose().as_bytes())
			.map_err(|_| WebhookError::InvalidSecret)?;

		mac.update(timestamp.as_bytes());
		mac.update(b".");
		mac.update(payload);

		Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes())))
	}

	/// Returns whether the delivery is authentic and fresh.
	pub fn verify(&self, payload: &[u8], signature: &str, timestamp: &str) -> bool {
		self.verify_at(OffsetDateTime::now_utc(), payload, signature, timestamp)
	}

	/// Same as [`verify`](Self::verify) against a caller-supplied clock.
	pub fn verify_at(
		&self,
		now: OffsetDateTime,
		payload: &[u8],
		signature: &str,
		timestamp: &str,
	) -> bool {
		self.check_at(now, payload, signature, timestamp).is_ok()
	}

	/// Verifies the delivery and reports why it was rejected.
	pub fn check(&self, payload: &[u8], signature: &str, timestamp: &str) -> Result<(), WebhookError> {
		self.check_at(OffsetDateTime::now_utc(), payload, signature, timestamp)
	}

	/// Same as [`check`](Self::check) against a caller-supplied clock.
	pub fn check_at(
		&self,
		now: OffsetDateTime,
		payload: &[u8],
		signature: &str,
		timestamp: &str,
	) -> Result<(), WebhookError> {
		let result = self.check_inner(now, payload, signature, timestamp);

		if let Err(e) = &result {
			obs::trace_webhook_rejection(e);
		}

		result
	}

	/// Verifies the delivery, then decodes the event envelope.
	pub fn verify_and_parse(
		&self,
		payload: &[u8],
		signature: &str,
		timestamp: &str,
	) -> Result<WebhookEvent, WebhookError> {
		self.check(payload, signature, timestamp)?;

		parse_webhook(payload)
	}

	/// Verifies a delivery using headers read from the request.
	///
	/// Missing headers count as a signature mismatch.
	pub fn verify_headers_and_parse(
		&self,
		headers: &WebhookHeaders,
		payload: &[u8],
	) -> Result<WebhookEvent, WebhookError> {
		let (Some(signature), Some(timestamp)) = (&headers.signature, &headers.timestamp) else {
			obs::trace_webhook_rejection(&WebhookError::SignatureMismatch);

			return Err(WebhookError::SignatureMismatch);
		};

		self.verify_and_parse(payload, signature, timestamp)
	}

	fn check_inner(
		&self,
		now: OffsetDateTime,
		payload: &[u8],
		signature: &str,
		timestamp: &str,
	) -> Result<(), WebhookError> {
		let signed_at = timestamp.trim().parse::<i64>().map_err(|_| WebhookError::InvalidTimestamp)?;
		let distance_secs = now.unix_timestamp().abs_diff(signed_at);
		let max_age_secs = u64::try_from(self.max_age.whole_seconds()).unwrap_or(0);

		if distance_secs > max_age_secs {
			return Err(WebhookError::Expired { distance_secs, max_age_secs });
		}

		let expected = self.sign(timestamp, payload)?;

		// Slices of different length compare unequal without leaking where they differ.
		if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
			Ok(())
		} else {
			Err(WebhookError::SignatureMismatch)
		}
	}
}

/// Returns whether `signature` is a valid, fresh signature of `payload`.
///
/// Malformed input (non-numeric timestamp, wrong prefix, bad hex) yields `false`.
pub fn verify_webhook(
	payload: &[u8],
	signature: &str,
	timestamp: &str,
	secret: &str,
	max_age: Duration,
) -> bool {
	WebhookVerifier::new(secret).with_max_age(max_age).verify(payload, signature, timestamp)
}

/// Decodes a webhook body into its event envelope.
pub fn parse_webhook(body: &[u8]) -> Result<WebhookEvent, WebhookError> {
	let de = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(de).map_err(|source| WebhookError::Payload { source })
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const SECRET: &str = "whsec_test";
	const PAYLOAD: &[u8] = br#"{"event_id":"evt_1"}"#;
	const SIGNED_AT: &str = "1735689600";
	const SIGNATURE: &str =
		"sha256=5a576c1f0690f7810b9c11cc72548508d0aceb798e93dd15f732a370a1c1adc3";

	fn now() -> OffsetDateTime {
		macros::datetime!(2025-01-01 00:00 UTC)
	}

	#[test]
	fn signs_timestamp_dot_payload() {
		let verifier = WebhookVerifier::new(SECRET);

		assert_eq!(verifier.sign(SIGNED_AT, PAYLOAD).expect("Signing should succeed."), SIGNATURE);
	}

	#[test]
	fn accepts_matching_signature_within_window() {
		let verifier = WebhookVerifier::new(SECRET);

		assert!(verifier.verify_at(now(), PAYLOAD, SIGNATURE, SIGNED_AT));
		assert!(verifier.verify_at(now() + Duration::seconds(300), PAYLOAD, SIGNATURE, SIGNED_AT));
		assert!(verifier.verify_at(now() - Duration::seconds(300), PAYLOAD, SIGNATURE, SIGNED_AT));
	}

	#[test]
	fn rejects_old_and_future_timestamps() {
		let verifier = WebhookVerifier::new(SECRET);
		let late = verifier.check_at(now() + Duration::seconds(301), PAYLOAD, SIGNATURE, SIGNED_AT);
		let early = verifier.check_at(now() - Duration::seconds(301), PAYLOAD, SIGNATURE, SIGNED_AT);

		assert!(matches!(late, Err(WebhookError::Expired { distance_secs: 301, max_age_secs: 300 })));
		assert!(matches!(early, Err(WebhookError::Expired { distance_secs: 301, .. })));

		let relaxed = verifier.with_max_age(Duration::seconds(600));

		assert!(relaxed.verify_at(now() + Duration::seconds(301), PAYLOAD, SIGNATURE, SIGNED_AT));
	}

	#[test]
	fn rejects_tampered_payload_and_signature() {
		let verifier = WebhookVerifier::new(SECRET);
		let tampered_signature = SIGNATURE.replace("5a57", "5a58");

		assert!(matches!(
			verifier.check_at(now(), br#"{"event_id":"evt_2"}"#, SIGNATURE, SIGNED_AT),
			Err(WebhookError::SignatureMismatch)
		));
		assert!(!verifier.verify_at(now(), PAYLOAD, &tampered_signature, SIGNED_AT));
		assert!(!verifier.verify_at(now(), PAYLOAD, &SIGNATURE[7..], SIGNED_AT));
		assert!(!verifier.verify_at(now(), PAYLOAD, "", SIGNED_AT));
		assert!(!WebhookVerifier::new("other").verify_at(now(), PAYLOAD, SIGNATURE, SIGNED_AT));
	}

	#[test]
	fn malformed_timestamps_fail_verification() {
		let verifier = WebhookVerifier::new(SECRET);

		assert!(matches!(
			verifier.check_at(now(), PAYLOAD, SIGNATURE, "yesterday"),
			Err(WebhookError::InvalidTimestamp)
		));
		assert!(!verifier.verify_at(now(), PAYLOAD, SIGNATURE, ""));
	}

	#[test]
	fn free_function_uses_the_wall_clock() {
		let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
		let signature = WebhookVerifier::new(SECRET)
			.sign(&timestamp, PAYLOAD)
			.expect("Signing should succeed.");

		assert!(verify_webhook(PAYLOAD, &signature, &timestamp, SECRET, DEFAULT_MAX_AGE));
		assert!(!verify_webhook(PAYLOAD, SIGNATURE, SIGNED_AT, SECRET, DEFAULT_MAX_AGE));
	}

	#[test]
	fn parses_event_envelope() {
		let body = br#"{
			"event_id": "evt_123",
			"event_type": "order.settled",
			"provider": "cashku",
			"created_at": "2025-01-01T00:00:00Z",
			"data": { "order_id": "ord_1", "status": "settled" },
			"attempt": 2
		}"#;
		let event = parse_webhook(body).expect("Envelope should decode.");

		assert_eq!(event.event_type, WebhookEventType::OrderSettled);
		assert_eq!(event.data["order_id"], "ord_1");
		assert_eq!(event.extra.get("attempt"), Some(&JsonValue::from(2)));
		assert_eq!(WebhookEventType::from("user.deleted").as_str(), "user.deleted");

		let err = parse_webhook(br#"{"event_type":"order.settled"}"#)
			.expect_err("Envelope without an id must not decode.");

		assert!(matches!(err, WebhookError::Payload { .. }));
	}

	#[test]
	fn header_map_lookup_is_case_insensitive() {
		let mut headers = HeaderMap::new();

		headers.insert("x-cowc-signature", SIGNATURE.parse().expect("Valid header value."));
		headers.insert("x-cowc-timestamp", SIGNED_AT.parse().expect("Valid header value."));
		headers.insert("x-cowc-event-type", "binding.revoked".parse().expect("Valid header value."));

		let parsed = WebhookHeaders::from_header_map(&headers);

		assert_eq!(parsed.signature.as_deref(), Some(SIGNATURE));
		assert_eq!(parsed.timestamp.as_deref(), Some(SIGNED_AT));
		assert_eq!(parsed.event_type, Some(WebhookEventType::BindingRevoked));

		let missing = WebhookVerifier::new(SECRET)
			.verify_headers_and_parse(&WebhookHeaders::default(), PAYLOAD)
			.expect_err("Missing headers must be rejected.");

		assert!(matches!(missing, WebhookError::SignatureMismatch));
	}
}
