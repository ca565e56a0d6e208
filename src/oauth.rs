//! Client-credentials exchange against the provider's `/oauth/token` endpoint.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, SessionToken},
	config::ClientConfig,
	error::{AuthenticationError, ConfigError, TransportError},
	http::{StatusSlot, TokenTransport},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Performs client-credentials exchanges for one partner configuration.
///
/// Credentials travel in the form body (`client_id` + `client_secret`) next to `grant_type` and
/// the space-delimited `scope`, matching what the provider expects.
#[derive(Clone, Debug)]
pub struct TokenExchange {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestClient,
}
impl TokenExchange {
	/// Builds an exchange for `config` that dispatches through `http_client`.
	pub fn from_config(config: &ClientConfig, http_client: ReqwestClient) -> Result<Self> {
		let token_url = TokenUrl::new(config.token_endpoint().to_string())
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client })
	}

	/// Requests a new access token for `scope`.
	pub async fn client_credentials(&self, scope: &ScopeSet) -> Result<SessionToken> {
		let status = StatusSlot::default();
		let transport = TokenTransport::new(self.http_client.clone(), status.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for value in scope.iter() {
			request = request.add_scope(Scope::new(value.to_owned()));
		}

		let response = request
			.request_async(&transport)
			.await
			.map_err(|err| map_request_error(status.take(), err))?;

		map_token_response(scope, response)
	}
}

fn map_token_response(scope: &ScopeSet, response: BasicTokenResponse) -> Result<SessionToken> {
	let expires_in = response.expires_in().ok_or(AuthenticationError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| AuthenticationError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(AuthenticationError::NonPositiveExpiresIn.into());
	}

	Ok(SessionToken::new(
		response.access_token().secret().to_owned(),
		scope.clone(),
		OffsetDateTime::now_utc(),
		Duration::seconds(expires_in),
	))
}

fn map_request_error(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => map_transport_error(error, status),
		RequestTokenError::Parse(source, body) => match status {
			Some(code) if !(200..300).contains(&code) => AuthenticationError::Rejected {
				message: provider_message(&body).unwrap_or_else(|| status_summary(code)),
				status,
			}
			.into(),
			_ => AuthenticationError::MalformedResponse { source, status }.into(),
		},
		RequestTokenError::Other(message) =>
			AuthenticationError::Rejected { message, status }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let message = match response.error_description() {
		Some(description) => description.clone(),
		None => response.error().as_ref().to_owned(),
	};

	AuthenticationError::Rejected { message, status }.into()
}

fn map_transport_error(err: HttpClientError<ReqwestError>, status: Option<u16>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => AuthenticationError::Rejected { message, status }.into(),
		_ => AuthenticationError::Rejected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}

// The provider wraps token endpoint failures the same way as API failures.
fn provider_message(body: &[u8]) -> Option<String> {
	let value = serde_json::from_slice::<JsonValue>(body).ok()?;

	value.get("error")?.get("message")?.as_str().map(str::to_owned)
}

fn status_summary(code: u16) -> String {
	match StatusCode::from_u16(code).ok().and_then(|status| status.canonical_reason()) {
		Some(reason) => format!("token endpoint responded with {code} {reason}"),
		None => format!("token endpoint responded with {code}"),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builds_exchange_from_config() {
		let config = ClientConfig::builder()
			.base_url("https://example.com/cowc/v1")
			.client_id("partner")
			.client_secret("secret")
			.api_key("key")
			.build()
			.expect("Config should build.");

		assert!(TokenExchange::from_config(&config, ReqwestClient::new()).is_ok());
	}

	#[test]
	fn provider_message_reads_nested_error() {
		let body = br#"{"error":{"code":"INVALID_CLIENT","message":"Unknown client"}}"#;

		assert_eq!(provider_message(body).as_deref(), Some("Unknown client"));
		assert_eq!(provider_message(br#"{"error":"invalid_client"}"#), None);
		assert_eq!(provider_message(b"not json"), None);
	}

	#[test]
	fn status_summary_includes_reason() {
		assert_eq!(status_summary(401), "token endpoint responded with 401 Unauthorized");
		assert_eq!(status_summary(599), "token endpoint responded with 599");
	}
}
