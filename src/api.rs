//! Typed wrappers for the provider's fund, portfolio, order, and onboarding endpoints.
//!
//! Each submodule adds methods to [`CowcClient`](crate::client::CowcClient) and defines the
//! models it returns. Models keep fields this crate does not name in a flattened `extra` map,
//! so nothing the provider sends is dropped.

pub mod common;
pub mod funds;
pub mod onboarding;
pub mod orders;
pub mod portfolio;

pub use common::*;
pub use funds::*;
pub use onboarding::*;
pub use orders::*;
pub use portfolio::*;
