//! Authenticated client for the partner API.
//!
//! [`CowcClient`] owns the configuration, the HTTP transport, and the cached
//! [`SessionToken`]. Before every API call it checks the session and re-runs the
//! client-credentials exchange when the token is missing or has less than
//! [`SessionToken::REFRESH_MARGIN`] left. The check and the refresh happen under one async
//! lock, so concurrent callers sharing a client trigger a single exchange.

// crates.io
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret, SessionToken},
	config::ClientConfig,
	error::{ApiError, ConfigError, DecodeError, TransportError},
	http::{self, PARTNER_KEY_HEADER, REQUEST_ID_HEADER},
	oauth::TokenExchange,
	obs::{self, Operation, Outcome, RequestSpan},
};

/// Query parameters attached to a request, in wire order.
pub type Query = Vec<(&'static str, String)>;

/// Client for the fund, portfolio, and order endpoints.
///
/// Cloning is cheap and clones share the cached session.
#[derive(Clone)]
pub struct CowcClient {
	config: Arc<ClientConfig>,
	http_client: ReqwestClient,
	exchange: Arc<TokenExchange>,
	session: Arc<AsyncMutex<Option<SessionToken>>>,
}
impl CowcClient {
	/// Creates a client backed by the default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_http_client(config, http::default_http_client()?)
	}

	/// Creates a client that dispatches through a caller-configured reqwest client.
	///
	/// Timeouts, proxies, and TLS settings are taken from `http_client` as-is.
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestClient) -> Result<Self> {
		let exchange = TokenExchange::from_config(&config, http_client.clone())?;

		Ok(Self {
			config: Arc::new(config),
			http_client,
			exchange: Arc::new(exchange),
			session: Default::default(),
		})
	}

	/// Creates a client from the `COWC_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}

	/// Returns the configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Runs the client-credentials exchange for `scope` and caches the resulting session.
	///
	/// Returns the new access token. Later refreshes reuse `scope`.
	pub async fn authenticate(&self, scope: &ScopeSet) -> Result<Secret> {
		const OPERATION: Operation = Operation::Authenticate;

		let span = RequestSpan::new(OPERATION, "authenticate");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let mut session = self.session.lock().await;

				obs::trace_token_refresh(scope, "explicit");

				let fresh = self.exchange.client_credentials(scope).await?;
				let token = fresh.access_token.clone();

				*session = Some(fresh);

				Ok(token)
			})
			.await;

		obs::record_result(OPERATION, &result);

		result
	}

	/// Authenticates with the configured default scopes.
	pub async fn authenticate_default(&self) -> Result<Secret> {
		let scope = self.config.default_scope.clone();

		self.authenticate(&scope).await
	}

	/// Returns a snapshot of the cached session, if any.
	pub async fn session(&self) -> Option<SessionToken> {
		self.session.lock().await.clone()
	}

	/// Drops the cached session so the next call re-authenticates.
	pub async fn invalidate(&self) {
		self.session.lock().await.take();
	}

	/// Returns a usable access token, re-authenticating first when the cached session is
	/// missing or inside the refresh margin.
	pub async fn access_token(&self) -> Result<Secret> {
		self.access_token_at(OffsetDateTime::now_utc()).await
	}

	pub(crate) async fn access_token_at(&self, now: OffsetDateTime) -> Result<Secret> {
		let mut session = self.session.lock().await;
		let scope = match session.as_ref() {
			Some(current) if !current.needs_refresh_at(now) =>
				return Ok(current.access_token.clone()),
			Some(current) => {
				obs::trace_token_refresh(&current.scope, "expiring");

				current.scope.clone()
			},
			None => {
				obs::trace_token_refresh(&self.config.default_scope, "missing");

				self.config.default_scope.clone()
			},
		};
		let fresh = self.exchange.client_credentials(&scope).await?;
		let token = fresh.access_token.clone();

		*session = Some(fresh);

		Ok(token)
	}

	/// Issues an authenticated request against `path` (relative to the base URL) and returns
	/// the JSON body verbatim.
	///
	/// Intended for endpoints without a typed wrapper. An empty 2xx body yields
	/// [`JsonValue::Null`].
	///
	/// `path` is split into segments that are percent-encoded individually. A path containing
	/// `?` or `#` is refused with [`ConfigError::InvalidPath`] before any request is sent;
	/// parameters belong in `query`.
	pub async fn request_json(
		&self,
		method: Method,
		path: &str,
		query: Query,
		body: Option<&JsonValue>,
	) -> Result<JsonValue> {
		if path.contains(['?', '#']) {
			return Err(ConfigError::InvalidPath { path: path.to_owned() }.into());
		}

		let segments = path.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>();

		self.call(Operation::Raw, method, &segments, query, body).await
	}

	/// Runs one typed API call inside the operation's span and outcome accounting.
	pub(crate) async fn call<T, B>(
		&self,
		operation: Operation,
		method: Method,
		segments: &[&str],
		query: Query,
		body: Option<&B>,
	) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let span = RequestSpan::new(operation, "call");

		obs::record_outcome(operation, Outcome::Attempt);

		let result = span.instrument(self.send(method, segments, query, body)).await;

		obs::record_result(operation, &result);

		result
	}

	async fn send<T, B>(
		&self,
		method: Method,
		segments: &[&str],
		query: Query,
		body: Option<&B>,
	) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let token = self.access_token().await?;
		let url = self.config.endpoint(segments.iter().copied());
		let mut request = self
			.http_client
			.request(method, url.clone())
			.bearer_auth(token.expose())
			.header(PARTNER_KEY_HEADER, self.config.api_key.expose())
			.header(REQUEST_ID_HEADER, http::request_id())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json");

		if !query.is_empty() {
			request = request.query(&query);
		}
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(ApiError::from_response(status, &bytes).into());
		}

		decode_body(url.path(), status, &bytes)
	}
}
impl Debug for CowcClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CowcClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("client_id", &self.config.client_id)
			.finish()
	}
}

/// Decodes a successful response body, reporting the failing JSON path on mismatch.
pub(crate) fn decode_body<T>(endpoint: &str, status: StatusCode, bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"null" } else { bytes };
	let de = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(de).map_err(|source| {
		DecodeError::Response { endpoint: endpoint.to_owned(), status: status.as_u16(), source }
			.into()
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Sample {
		#[allow(dead_code)]
		fund_id: String,
	}

	#[test]
	fn decode_reports_json_path() {
		let err = decode_body::<Sample>("/funds/f1", StatusCode::OK, br#"{"fund_id": 7}"#)
			.expect_err("Numeric fund id must not decode into a string.");

		match err {
			Error::Decode(DecodeError::Response { endpoint, status, source }) => {
				assert_eq!(endpoint, "/funds/f1");
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "fund_id");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_bodies_decode_as_null() {
		let value = decode_body::<JsonValue>("/orders", StatusCode::NO_CONTENT, b"")
			.expect("Empty body should decode.");

		assert!(value.is_null());
	}

	#[tokio::test]
	async fn debug_omits_credentials() {
		let config = ClientConfig::builder()
			.client_id("partner")
			.client_secret("very-secret")
			.api_key("very-key")
			.build()
			.expect("Config should build.");
		let client = CowcClient::with_http_client(config, ReqwestClient::new())
			.expect("Client should build.");
		let rendered = format!("{client:?}");

		assert!(rendered.contains("partner"));
		assert!(!rendered.contains("very-secret"));
		assert!(!rendered.contains("very-key"));
		assert!(client.session().await.is_none());
	}
}
