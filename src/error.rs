//! Client-level error types shared by authentication, API calls, and configuration.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Provider answered an API call with a non-2xx status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Token endpoint refused or mangled the client-credentials exchange.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Invalid or missing client settings.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Successful response whose body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// No usable HTTP response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Webhook verification or parsing failure.
	#[error(transparent)]
	Webhook(#[from] crate::webhook::WebhookError),
}
impl Error {
	/// Returns the HTTP status attached to provider-originated failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => e.status,
			Self::Authentication(AuthenticationError::Rejected { status, .. })
			| Self::Authentication(AuthenticationError::MalformedResponse { status, .. }) => *status,
			Self::Decode(DecodeError::Response { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns the provider error payload when the failure came from a non-2xx API response.
	pub fn as_api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(e) => Some(e),
			_ => None,
		}
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		TransportError::from(e).into()
	}
}

/// Structured error returned by the provider for non-2xx API responses.
///
/// The provider wraps failures as `{"error": {"message", "code", "details"}}`; the fields are
/// surfaced unchanged alongside the HTTP status.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("Provider request failed: {message}.")]
pub struct ApiError {
	/// Human-readable provider message.
	pub message: String,
	/// Provider error code, when supplied.
	pub code: Option<String>,
	/// Free-form provider details payload, when supplied.
	pub details: Option<JsonValue>,
	/// HTTP status code of the failed response.
	pub status: Option<u16>,
}
impl ApiError {
	const FALLBACK_MESSAGE: &'static str = "Request failed";

	/// Creates an error with only a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), code: None, details: None, status: None }
	}

	/// Attaches an HTTP status code.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Builds an error from a failed response, tolerating bodies that are not JSON.
	pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
		let envelope = serde_json::from_slice::<JsonValue>(body).ok();
		let error = envelope.as_ref().and_then(|value| value.get("error"));
		let message = error
			.and_then(|value| value.get("message"))
			.and_then(JsonValue::as_str)
			.unwrap_or(Self::FALLBACK_MESSAGE);
		let code = error.and_then(|value| value.get("code")).and_then(|code| match code {
			JsonValue::Null => None,
			JsonValue::String(s) => Some(s.clone()),
			other => Some(other.to_string()),
		});
		let details = error.and_then(|value| value.get("details")).filter(|v| !v.is_null()).cloned();

		Self { message: message.to_owned(), code, details, status: Some(status.as_u16()) }
	}
}

/// Failures raised by the client-credentials exchange.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Token endpoint answered with an error.
	#[error("Authentication failed: {message}.")]
	Rejected {
		/// Provider-supplied message, or a status summary when none was given.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint answered 2xx with a body that is not a token response.
	#[error("Token response from the provider could not be decoded.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token response carried no `expires_in`, so the refresh window cannot be computed.
	#[error("Token response does not say when the session expires.")]
	MissingExpiresIn,
	/// `expires_in` does not fit a signed 64-bit second count.
	#[error("Token lifetime is too large to track.")]
	ExpiresInOutOfRange,
	/// `expires_in` was zero.
	#[error("Token lifetime must be at least one second.")]
	NonPositiveExpiresIn,
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The default reqwest client failed to build.
	#[error("Default HTTP client could not be built.")]
	HttpClientBuild {
		/// Builder failure.
		#[source]
		source: BoxError,
	},
	/// The token request could not be assembled.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than `http` or `https`.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Token endpoint derived from the base URL is rejected by the OAuth client.
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// A required setting was not supplied or is blank.
	#[error("Configuration value `{field}` is required.")]
	MissingField {
		/// Setting name.
		field: &'static str,
	},
	/// A raw request path embeds a query string or fragment.
	#[error("Request path `{path}` must not contain `?` or `#`; pass query parameters separately.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
	/// A required environment variable is unset or blank.
	#[error("Environment variable `{name}` is required.")]
	MissingEnvVar {
		/// Variable name.
		name: &'static str,
	},
}
impl ConfigError {
	/// Boxes a client builder failure.
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Successful responses that could not be decoded into the expected model.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body does not match the expected shape.
	#[error("Response from `{endpoint}` could not be decoded.")]
	Response {
		/// Request path that produced the body.
		endpoint: String,
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// The request never produced an HTTP response.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection or TLS failure reported by reqwest.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Boxed transport error.
		#[source]
		source: BoxError,
	},
	/// I/O failure while reading the response.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Boxes a network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_keeps_provider_fields() {
		let body = br#"{"error":{"message":"Binding not found","code":"BINDING_NOT_FOUND","details":{"binding_id":"bind_1"}}}"#;
		let err = ApiError::from_response(StatusCode::NOT_FOUND, body);

		assert_eq!(err.message, "Binding not found");
		assert_eq!(err.code.as_deref(), Some("BINDING_NOT_FOUND"));
		assert_eq!(err.details, Some(serde_json::json!({ "binding_id": "bind_1" })));
		assert_eq!(err.status, Some(404));
	}

	#[test]
	fn api_error_falls_back_for_unstructured_bodies() {
		let err = ApiError::from_response(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>");

		assert_eq!(err.message, "Request failed");
		assert_eq!(err.code, None);
		assert_eq!(err.details, None);
		assert_eq!(err.status, Some(502));

		let err = ApiError::from_response(StatusCode::BAD_REQUEST, br#"{"error":{"code":42}}"#);

		assert_eq!(err.message, "Request failed");
		assert_eq!(err.code.as_deref(), Some("42"));
	}

	#[test]
	fn status_is_exposed_for_provider_failures() {
		let err = Error::from(ApiError::new("nope").with_status(409));

		assert_eq!(err.status(), Some(409));
		assert!(err.as_api().is_some());

		let err = Error::from(AuthenticationError::Rejected {
			message: "invalid client".into(),
			status: Some(401),
		});

		assert_eq!(err.status(), Some(401));
		assert!(err.as_api().is_none());
	}
}
