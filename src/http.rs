//! Transport pieces shared by the token exchange and API calls.
//!
//! `oauth2` consumes the token endpoint response before handing back an error, so
//! [`TokenTransport`] writes the HTTP status into a [`StatusSlot`] first. Error mapping reads it
//! afterwards to attach the status to authentication failures. `oauth2` only parses a token
//! from an exact `200`, so every other 2xx is handed over as `200` once its real status is
//! recorded.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{
	header::{HeaderName, HeaderValue},
	redirect::Policy,
};
use uuid::Uuid;
// self
use crate::{_prelude::*, error::ConfigError};

/// Header carrying the partner API key.
pub const PARTNER_KEY_HEADER: &str = "X-COWC-Partner-Key";
/// Header carrying the per-request correlation identifier.
pub const REQUEST_ID_HEADER: &str = "X-COWC-Request-ID";

/// Builds the default transport. Redirects are not followed.
pub fn default_http_client() -> Result<ReqwestClient, ConfigError> {
	ReqwestClient::builder()
		.redirect(Policy::none())
		.build()
		.map_err(ConfigError::http_client_build)
}

/// Fresh correlation identifier for [`REQUEST_ID_HEADER`].
pub fn request_id() -> String {
	Uuid::new_v4().to_string()
}

/// Status of the last token endpoint response, shared between transport and error mapping.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<Mutex<Option<StatusCode>>>);
impl StatusSlot {
	fn set(&self, status: StatusCode) {
		*self.0.lock() = Some(status);
	}

	/// Removes and returns the recorded status as a number.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take().map(|status| status.as_u16())
	}
}

/// [`AsyncHttpClient`] used for the token exchange.
#[derive(Clone, Debug)]
pub struct TokenTransport {
	client: ReqwestClient,
	status: StatusSlot,
}
impl TokenTransport {
	/// Dispatches through `client` and records statuses into `status`.
	pub fn new(client: ReqwestClient, status: StatusSlot) -> Self {
		Self { client, status }
	}
}
impl<'c> AsyncHttpClient<'c> for TokenTransport {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.status.take();

			if let (Ok(name), Ok(value)) = (
				HeaderName::try_from(REQUEST_ID_HEADER),
				HeaderValue::try_from(request_id()),
			) {
				request.headers_mut().insert(name, value);
			}

			let response =
				self.client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();

			self.status.set(status);

			let headers = response.headers().clone();
			let body = response.bytes().await.map_err(Box::new)?;
			let mut converted = HttpResponse::new(body.to_vec());

			*converted.status_mut() = if status.is_success() { StatusCode::OK } else { status };
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}
