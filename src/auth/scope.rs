//! Scopes requested from the token endpoint.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Scopes requested when the caller does not pick any.
pub const DEFAULT_SCOPES: [&str; 3] = ["funds:read", "portfolio:read", "orders:write"];

/// Rejected scope input.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// A scope entry was empty.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// A scope entry contained whitespace, which would split it on the wire.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// Offending entry.
		scope: String,
	},
}

/// Deduplicated, ordered set of scopes such as `funds:read`.
///
/// Two sets listing the same scopes in a different order compare equal. The token endpoint
/// receives them space-delimited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet(BTreeSet<String>);
impl ScopeSet {
	/// Validates and collects `scopes`.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		scopes
			.into_iter()
			.map(|scope| {
				let scope = scope.into();

				if scope.is_empty() {
					Err(ScopeValidationError::Empty)
				} else if scope.chars().any(char::is_whitespace) {
					Err(ScopeValidationError::ContainsWhitespace { scope })
				} else {
					Ok(scope)
				}
			})
			.collect::<Result<_, _>>()
			.map(Self)
	}

	/// `funds:read orders:write portfolio:read`.
	pub fn partner_default() -> Self {
		Self(DEFAULT_SCOPES.iter().map(|scope| (*scope).to_owned()).collect())
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the set is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Whether `scope` is part of the set.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// Whether the set grants `access` (e.g. `read`) on `resource` (e.g. `funds`).
	pub fn grants(&self, resource: &str, access: &str) -> bool {
		self.iter().any(|scope| scope.split_once(':') == Some((resource, access)))
	}

	/// Scopes in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (i, scope) in self.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}

			f.write_str(scope)?;
		}

		Ok(())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if !s.is_empty() && s.trim().is_empty() {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ScopeSet> for Vec<String> {
	fn from(value: ScopeSet) -> Self {
		value.0.into_iter().collect()
	}
}
