//! Join-point identifiers.

use std::fmt;
use std::sync::Arc;

/// Marker that turns a key component into a selector. Selectors are rejected.
const WILDCARD: char = '*';

/// Where a join-point member lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
	/// Free functions.
	Global,
	/// Members of a named class.
	Class(Arc<str>),
}

impl Scope {
	/// Returns the class name for class scopes.
	pub fn class(&self) -> Option<&str> {
		match self {
			Scope::Global => None,
			Scope::Class(name) => Some(name),
		}
	}
}

/// Stable identity of a join point: a scope plus a member name.
///
/// Equal keys always resolve to the same interception chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
	scope: Scope,
	member: Arc<str>,
}

impl TargetKey {
	/// Creates a key for a class-scoped member (`Class::member`).
	pub fn method(class: impl Into<Arc<str>>, member: impl Into<Arc<str>>) -> Self {
		Self {
			scope: Scope::Class(class.into()),
			member: member.into(),
		}
	}

	/// Creates a key for a free function.
	pub fn function(name: impl Into<Arc<str>>) -> Self {
		Self {
			scope: Scope::Global,
			member: name.into(),
		}
	}

	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	pub fn member(&self) -> &str {
		&self.member
	}

	/// Returns true if any component is a selector rather than a name.
	pub fn is_wildcard(&self) -> bool {
		let class_wild = self.scope.class().is_some_and(|c| c.contains(WILDCARD));
		class_wild || self.member.contains(WILDCARD)
	}
}

impl fmt::Display for TargetKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.scope {
			Scope::Global => f.write_str(&self.member),
			Scope::Class(class) => write!(f, "{class}::{}", self.member),
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(TargetKey::method("*", "foo"))]
	#[case(TargetKey::method("Foo", "*"))]
	#[case(TargetKey::method("Fo*", "bar"))]
	#[case(TargetKey::function("say_*"))]
	fn selectors_are_wildcards(#[case] key: TargetKey) {
		assert!(key.is_wildcard());
	}

	#[test]
	fn plain_names_are_not_wildcards() {
		assert!(!TargetKey::method("Test", "say_moo").is_wildcard());
		assert!(!TargetKey::function("strlen").is_wildcard());
	}

	#[test]
	fn display_matches_call_syntax() {
		assert_eq!(TargetKey::method("Test", "say_moo").to_string(), "Test::say_moo");
		assert_eq!(TargetKey::function("strlen").to_string(), "strlen");
	}
}
