//! Auth-domain models: scope sets, redacted secrets, and cached session tokens.

pub mod scope;
pub mod secret;
pub mod session;

pub use scope::*;
pub use secret::*;
pub use session::*;
