//! Error taxonomy for resolution, composition and invocation.

use thiserror::Error;

use crate::key::TargetKey;
use crate::objects::ObjectHandle;

/// Errors raised while resolving pointcuts, composing advice or invoking a
/// woven join point.
///
/// Every error aborts the operation that detected it. Resolution and
/// composition leave the registry and chain exactly as they were.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// The target or advice symbol is unknown to the symbol provider.
	#[error("symbol not found: {0}")]
	Lookup(TargetKey),

	/// A wildcard target was requested.
	#[error("wildcard targets are not supported: {0}")]
	Unsupported(TargetKey),

	/// An instance advice handle is not present in the object registry.
	#[error("dangling object handle: {0}")]
	DanglingHandle(ObjectHandle),

	/// A required join-point argument was not supplied.
	#[error("missing argument ${param} for {target}")]
	MissingArgument {
		/// Join point being invoked.
		target: TargetKey,
		/// Name of the unsatisfied parameter.
		param: Box<str>,
	},

	/// A join-point argument does not satisfy its type hint.
	#[error("argument ${param} for {target} must be {expected}, got {found}")]
	TypeMismatch {
		/// Join point being invoked.
		target: TargetKey,
		/// Name of the offending parameter.
		param: Box<str>,
		/// Rendered type hint.
		expected: String,
		/// Type name of the supplied value.
		found: String,
	},

	/// A host callable reported a failure.
	#[error("{0}")]
	Raised(String),
}

impl Error {
	/// Convenience constructor for host callables reporting a failure.
	pub fn raised(msg: impl Into<String>) -> Self {
		Self::Raised(msg.into())
	}
}

/// Result type for pointcut operations.
pub type Result<T> = std::result::Result<T, Error>;
