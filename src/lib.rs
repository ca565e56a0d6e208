//! Async client for the COWC fund and portfolio partner API.
//!
//! [`client::CowcClient`] authenticates with the OAuth 2.0 client-credentials grant, keeps the
//! issued session fresh (refreshing five minutes ahead of expiry), and exposes typed calls for
//! fund discovery, portfolio reads, and order placement. [`webhook`] verifies the HMAC
//! signatures attached to inbound provider notifications.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

macro_rules! def_label {
	(
		$(#[$meta:meta])*
		$name:ident {
			$($(#[$vmeta:meta])* $variant:ident => $label:literal,)+
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(from = "String", into = "String")]
		pub enum $name {
			$($(#[$vmeta])* $variant,)+
			/// Label this crate does not know yet; the raw value is preserved.
			Other(String),
		}
		impl $name {
			/// Returns the wire label.
			pub fn as_str(&self) -> &str {
				match self {
					$(Self::$variant => $label,)+
					Self::Other(raw) => raw,
				}
			}
		}
		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				match value {
					$($label => Self::$variant,)+
					other => Self::Other(other.to_owned()),
				}
			}
		}
		impl From<String> for $name {
			fn from(value: String) -> Self {
				match value.as_str() {
					$($label => Self::$variant,)+
					_ => Self::Other(value),
				}
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				match value {
					$name::Other(raw) => raw,
					known => known.as_str().to_owned(),
				}
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(self.as_str())
			}
		}
	};
}

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod webhook;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, dotenvy as _, httpmock as _};

pub use client::CowcClient;
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use webhook::{WebhookVerifier, verify_webhook};
