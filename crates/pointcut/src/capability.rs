//! Host capabilities consumed by the weaving core.
//!
//! The core never inspects code or patches call sites itself. A host supplies
//! both through these traits; [`crate::MethodTable`] is an in-memory host
//! implementing both.

use crate::call::Callable;
use crate::error::Result;
use crate::key::TargetKey;
use crate::signature::SignatureDescriptor;

/// Describes and produces callables for named symbols.
///
/// Used for join points (once, at chain creation) and for advice symbols
/// (checked at composition time, fetched through [`Self::current`] on every
/// advice invocation).
pub trait SymbolProvider: Send + Sync {
	/// Returns the parameter shape of `key`.
	///
	/// Fails with [`crate::Error::Lookup`] if the symbol is unknown.
	fn describe(&self, key: &TargetKey) -> Result<SignatureDescriptor>;

	/// Returns the callable currently defined for `key`, before any weaving.
	///
	/// Fails with [`crate::Error::Lookup`] if the symbol is unknown.
	fn callable(&self, key: &TargetKey) -> Result<Callable>;

	/// Returns what a call to `key` reaches right now: the installed head if
	/// the symbol has been woven, otherwise its original callable.
	fn current(&self, key: &TargetKey) -> Result<Callable> {
		self.callable(key)
	}
}

/// Makes a callable the one actually invoked at a join point.
pub trait Installer: Send + Sync {
	/// Called once per successful composition with the chain's new head.
	fn install(&self, key: &TargetKey, signature: &SignatureDescriptor, head: Callable);
}
