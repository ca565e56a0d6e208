//! Partner credentials and endpoint configuration.
//!
//! [`ClientConfig`] is immutable once built. Use [`ClientConfig::builder`] for explicit values
//! or [`ClientConfig::from_env`] to read the `COWC_*` variables.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
	error::ConfigError,
};

/// Staging base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://staging.cashku.ai/cowc/v1";
/// Environment variable holding the provider base URL.
pub const ENV_BASE_URL: &str = "COWC_BASE_URL";
/// Environment variable holding the partner client identifier.
pub const ENV_CLIENT_ID: &str = "COWC_CLIENT_ID";
/// Environment variable holding the partner client secret.
pub const ENV_CLIENT_SECRET: &str = "COWC_CLIENT_SECRET";
/// Environment variable holding the partner API key.
pub const ENV_API_KEY: &str = "COWC_API_KEY";

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Provider base URL; endpoint paths are appended to it.
	pub base_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Partner API key sent with every API call.
	pub api_key: Secret,
	/// Scopes requested when no session exists yet.
	pub default_scope: ScopeSet,
}
impl ClientConfig {
	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads `COWC_BASE_URL`, `COWC_CLIENT_ID`, `COWC_CLIENT_SECRET`, and `COWC_API_KEY` from the
	/// process environment. The base URL falls back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`from_env`](Self::from_env) but resolves variables through `lookup`.
	pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
	where
		F: FnMut(&str) -> Option<String>,
	{
		let mut require = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingEnvVar { name })
		};
		let client_id = require(ENV_CLIENT_ID)?;
		let client_secret = require(ENV_CLIENT_SECRET)?;
		let api_key = require(ENV_API_KEY)?;
		let mut builder =
			Self::builder().client_id(client_id).client_secret(client_secret).api_key(api_key);

		if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
			builder = builder.base_url(base_url);
		}

		builder.build()
	}

	/// Token endpoint (`{base}/oauth/token`).
	pub fn token_endpoint(&self) -> Url {
		self.endpoint(["oauth", "token"])
	}

	/// Appends `segments` to the base URL, percent-encoding each one.
	pub fn endpoint<'a, I>(&self, segments: I) -> Url
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut url = self.base_url.clone();

		// http(s) URLs always carry a path, so the segment handle is available.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<String>,
	client_id: Option<String>,
	client_secret: Option<Secret>,
	api_key: Option<Secret>,
	default_scope: Option<ScopeSet>,
}
impl ClientConfigBuilder {
	/// Sets the provider base URL (defaults to [`DEFAULT_BASE_URL`]).
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the OAuth 2.0 client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth 2.0 client secret.
	pub fn client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the partner API key.
	pub fn api_key(mut self, key: impl Into<Secret>) -> Self {
		self.api_key = Some(key.into());

		self
	}

	/// Overrides the scopes requested by default.
	pub fn default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = Some(scope);

		self
	}

	/// Validates inputs and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let raw_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim();
		let mut base_url =
			Url::parse(raw_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: base_url.scheme().to_owned() });
		}

		base_url.set_query(None);
		base_url.set_fragment(None);

		if let Ok(mut path) = base_url.path_segments_mut() {
			path.pop_if_empty();
		}

		let client_id = self
			.client_id
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingField { field: "client_id" })?;
		let client_secret = self
			.client_secret
			.filter(|value| !value.is_blank())
			.ok_or(ConfigError::MissingField { field: "client_secret" })?;
		let api_key = self
			.api_key
			.filter(|value| !value.is_blank())
			.ok_or(ConfigError::MissingField { field: "api_key" })?;
		let default_scope = self.default_scope.unwrap_or_else(ScopeSet::partner_default);

		Ok(ClientConfig { base_url, client_id, client_secret, api_key, default_scope })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeMap;
	// self
	use super::*;

	fn builder() -> ClientConfigBuilder {
		ClientConfig::builder().client_id("partner").client_secret("secret").api_key("key")
	}

	#[test]
	fn defaults_to_staging_and_partner_scopes() {
		let config = builder().build().expect("Config with credentials should build.");

		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert_eq!(config.default_scope, ScopeSet::partner_default());
		assert_eq!(
			config.token_endpoint().as_str(),
			"https://staging.cashku.ai/cowc/v1/oauth/token"
		);
	}

	#[test]
	fn endpoints_ignore_trailing_slashes_and_encode_ids() {
		let config = builder()
			.base_url("http://127.0.0.1:8080/cowc/v1/")
			.build()
			.expect("Config with trailing slash should build.");

		assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/cowc/v1");
		assert_eq!(
			config.endpoint(["funds", "fund_1", "nav"]).as_str(),
			"http://127.0.0.1:8080/cowc/v1/funds/fund_1/nav"
		);
		assert_eq!(
			config.endpoint(["orders", "a/b c"]).as_str(),
			"http://127.0.0.1:8080/cowc/v1/orders/a%2Fb%20c"
		);

		let root = builder().base_url("https://api.example.com").build().expect("Root URL builds.");

		assert_eq!(root.endpoint(["funds"]).as_str(), "https://api.example.com/funds");
	}

	#[test]
	fn rejects_blank_credentials_and_foreign_schemes() {
		let err = ClientConfig::builder()
			.client_id(" ")
			.client_secret("secret")
			.api_key("key")
			.build()
			.expect_err("Blank client id must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "client_id" }));

		let err = builder().base_url("ftp://example.com").build().expect_err("ftp is rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

		let err = builder().base_url("not a url").build().expect_err("Garbage is rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn lookup_reads_cowc_variables() {
		let vars = BTreeMap::from([
			(ENV_BASE_URL, "https://prod.example.com/cowc/v1"),
			(ENV_CLIENT_ID, "partner-id"),
			(ENV_CLIENT_SECRET, "partner-secret"),
			(ENV_API_KEY, "partner-key"),
		]);
		let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned()))
			.expect("Complete environment should build a config.");

		assert_eq!(config.base_url.as_str(), "https://prod.example.com/cowc/v1");
		assert_eq!(config.client_id, "partner-id");
		assert_eq!(config.client_secret.expose(), "partner-secret");
		assert_eq!(config.api_key.expose(), "partner-key");

		let err = ClientConfig::from_lookup(|name| {
			(name != ENV_API_KEY).then(|| "value".to_owned())
		})
		.expect_err("Missing API key must be reported.");

		assert!(matches!(err, ConfigError::MissingEnvVar { name: ENV_API_KEY }));
	}
}
