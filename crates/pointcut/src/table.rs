//! In-memory host: a dispatch table of named callables.
//!
//! [`MethodTable`] plays both host roles. As a [`SymbolProvider`] it describes
//! the callables defined in it; as an [`Installer`] it records woven heads, and
//! [`MethodTable::invoke`] dispatches to the installed head when present.

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::call::{Call, Callable};
use crate::capability::{Installer, SymbolProvider};
use crate::error::{Error, Result};
use crate::key::TargetKey;
use crate::signature::SignatureDescriptor;
use crate::value::Value;

struct TableEntry {
	signature: SignatureDescriptor,
	original: Callable,
	installed: Option<Callable>,
}

#[derive(Default)]
pub struct MethodTable {
	entries: RwLock<HashMap<TargetKey, TableEntry>>,
}

impl MethodTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Defines (or redefines) `key`. Redefinition drops any installed head.
	pub fn define<F>(&self, key: TargetKey, signature: SignatureDescriptor, f: F) -> &Self
	where
		F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
	{
		self.entries.write().insert(
			key,
			TableEntry {
				signature,
				original: Callable::new(f),
				installed: None,
			},
		);
		self
	}

	pub fn contains(&self, key: &TargetKey) -> bool {
		self.entries.read().contains_key(key)
	}

	/// The head installed for `key`, if it has been woven.
	pub fn installed(&self, key: &TargetKey) -> Option<Callable> {
		self.entries.read().get(key)?.installed.clone()
	}

	/// Calls `key` the way code at the join point would.
	pub fn invoke(&self, key: &TargetKey, call: &Call) -> Result<Value> {
		let (signature, target) = {
			let entries = self.entries.read();
			let entry = entries.get(key).ok_or_else(|| Error::Lookup(key.clone()))?;
			match &entry.installed {
				Some(head) => (None, head.clone()),
				None => (Some(entry.signature.clone()), entry.original.clone()),
			}
		};

		match signature {
			// Woven heads bind their own arguments.
			None => target.call(call),
			Some(signature) => {
				let args = signature.bind(key, call.args())?;
				target.call(&Call::from_parts(call.this().cloned(), args))
			}
		}
	}
}

impl SymbolProvider for MethodTable {
	fn describe(&self, key: &TargetKey) -> Result<SignatureDescriptor> {
		self.entries
			.read()
			.get(key)
			.map(|e| e.signature.clone())
			.ok_or_else(|| Error::Lookup(key.clone()))
	}

	fn callable(&self, key: &TargetKey) -> Result<Callable> {
		self.entries
			.read()
			.get(key)
			.map(|e| e.original.clone())
			.ok_or_else(|| Error::Lookup(key.clone()))
	}

	fn current(&self, key: &TargetKey) -> Result<Callable> {
		self.entries
			.read()
			.get(key)
			.map(|e| e.installed.clone().unwrap_or_else(|| e.original.clone()))
			.ok_or_else(|| Error::Lookup(key.clone()))
	}
}

impl Installer for MethodTable {
	fn install(&self, key: &TargetKey, _signature: &SignatureDescriptor, head: Callable) {
		match self.entries.write().get_mut(key) {
			Some(entry) => entry.installed = Some(head),
			None => tracing::warn!(%key, "install for undefined symbol ignored"),
		}
	}
}
