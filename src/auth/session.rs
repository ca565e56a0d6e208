//! Cached session token and its refresh window.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
};

/// Access token issued by the client-credentials grant, plus the instants that govern reuse.
#[derive(Clone)]
pub struct SessionToken {
	/// Bearer token; callers must avoid logging it.
	pub access_token: Secret,
	/// Scopes the token was requested with. Refreshes reuse them.
	pub scope: ScopeSet,
	/// Instant the token endpoint answered.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry reported by the provider.
	pub expires_at: OffsetDateTime,
}
impl SessionToken {
	/// Sessions are treated as stale once less than this much validity remains.
	pub const REFRESH_MARGIN: Duration = Duration::seconds(300);

	/// Builds a session from a relative `expires_in` duration.
	pub fn new(
		access_token: impl Into<Secret>,
		scope: ScopeSet,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Self {
		Self { access_token: access_token.into(), scope, issued_at, expires_at: issued_at + expires_in }
	}

	/// Validity left at `now`; negative once expired.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Returns `true` when the session must be replaced before use at `now`.
	///
	/// A session with exactly [`Self::REFRESH_MARGIN`] left is still used.
	pub fn needs_refresh_at(&self, now: OffsetDateTime) -> bool {
		self.remaining_at(now) < Self::REFRESH_MARGIN
	}

	/// Returns `true` when the session must be replaced before use.
	pub fn needs_refresh(&self) -> bool {
		self.needs_refresh_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` once the provider-reported expiry has passed.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}
}
impl Debug for SessionToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionToken")
			.field("access_token", &"<redacted>")
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn session(expires_in: Duration) -> SessionToken {
		SessionToken::new(
			"access",
			ScopeSet::partner_default(),
			macros::datetime!(2025-01-01 00:00 UTC),
			expires_in,
		)
	}

	#[test]
	fn refresh_triggers_below_five_minutes_remaining() {
		let token = session(Duration::hours(1));
		let issued = token.issued_at;

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert!(!token.needs_refresh_at(issued));
		// 301 s left.
		assert!(!token.needs_refresh_at(macros::datetime!(2025-01-01 00:54:59 UTC)));
		// Exactly 300 s left.
		assert!(!token.needs_refresh_at(macros::datetime!(2025-01-01 00:55 UTC)));
		// 299 s left.
		assert!(token.needs_refresh_at(macros::datetime!(2025-01-01 00:55:01 UTC)));
		assert!(token.needs_refresh_at(macros::datetime!(2025-01-01 02:00 UTC)));
	}

	#[test]
	fn short_lived_tokens_are_stale_immediately() {
		let token = session(Duration::seconds(120));

		assert!(token.needs_refresh_at(token.issued_at));
		assert!(!token.is_expired_at(token.issued_at));
		assert!(token.is_expired_at(token.expires_at));
	}

	#[test]
	fn debug_redacts_access_token() {
		let rendered = format!("{:?}", session(Duration::hours(1)));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("\"access\""));
	}
}
