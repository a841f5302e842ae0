//! Advice bindings: what to call when a woven join point fires.
//!
//! Resolution happens in two steps. [`AdviceBinding::resolve`] looks the
//! advice symbol up through the host at composition time, so a misspelled
//! advice fails before anything is installed. [`ResolvedAdvice::weave`] then
//! plans how each advice parameter is filled from a join-point call.
//!
//! The callable itself is fetched again on every invocation through
//! [`SymbolProvider::current`], so weaving applied to an advice symbol later
//! still runs when that advice fires.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::call::Call;
use crate::capability::SymbolProvider;
use crate::error::{Error, Result};
use crate::key::TargetKey;
use crate::objects::{ObjectHandle, ObjectRegistry};
use crate::signature::SignatureDescriptor;
use crate::value::{ObjectRef, Value};

/// A callable attached to a join point.
#[derive(Debug, Clone)]
pub enum AdviceBinding {
	/// A free function.
	Function { symbol: Arc<str> },
	/// A class-scoped static method.
	Static { scope: Arc<str>, symbol: Arc<str> },
	/// A method bound to an object held in an [`ObjectRegistry`].
	Instance {
		handle: ObjectHandle,
		symbol: Arc<str>,
		objects: ObjectRegistry,
	},
}

impl AdviceBinding {
	pub fn function(symbol: impl Into<Arc<str>>) -> Self {
		Self::Function {
			symbol: symbol.into(),
		}
	}

	pub fn method(scope: impl Into<Arc<str>>, symbol: impl Into<Arc<str>>) -> Self {
		Self::Static {
			scope: scope.into(),
			symbol: symbol.into(),
		}
	}

	/// Registers `object` in `objects` and binds `symbol` on it.
	///
	/// The registration is kept for as long as the host does not dispose the
	/// handle; see [`ObjectRegistry::dispose`].
	pub fn instance(
		objects: &ObjectRegistry,
		object: ObjectRef,
		symbol: impl Into<Arc<str>>,
	) -> Self {
		Self::Instance {
			handle: objects.register(object),
			symbol: symbol.into(),
			objects: objects.clone(),
		}
	}

	/// Handle of the bound object, for instance advice.
	pub fn handle(&self) -> Option<&ObjectHandle> {
		match self {
			Self::Instance { handle, .. } => Some(handle),
			_ => None,
		}
	}

	/// Looks up the advice symbol and its parameter shape.
	pub fn resolve(&self, provider: &Arc<dyn SymbolProvider>) -> Result<ResolvedAdvice> {
		let (key, instance) = match self {
			Self::Function { symbol } => (TargetKey::function(symbol.clone()), None),
			Self::Static { scope, symbol } => (TargetKey::method(scope.clone(), symbol.clone()), None),
			Self::Instance {
				handle,
				symbol,
				objects,
			} => {
				let object = objects.lookup(handle)?;
				let key = TargetKey::method(object.class(), symbol.clone());
				(key, Some((objects.clone(), handle.clone())))
			}
		};

		let signature = provider.describe(&key)?;
		provider.current(&key)?;
		tracing::trace!(advice = %self, %key, params = %signature, "advice resolved");

		Ok(ResolvedAdvice {
			key,
			signature,
			provider: Arc::clone(provider),
			instance,
		})
	}
}

impl fmt::Display for AdviceBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Function { symbol } => f.write_str(symbol),
			Self::Static { scope, symbol } => write!(f, "{scope}::{symbol}"),
			Self::Instance { handle, symbol, .. } => write!(f, "{handle}->{symbol}"),
		}
	}
}

/// Advice whose symbol has been found.
#[derive(Clone)]
pub struct ResolvedAdvice {
	key: TargetKey,
	signature: SignatureDescriptor,
	provider: Arc<dyn SymbolProvider>,
	instance: Option<(ObjectRegistry, ObjectHandle)>,
}

impl ResolvedAdvice {
	pub fn key(&self) -> &TargetKey {
		&self.key
	}

	pub fn signature(&self) -> &SignatureDescriptor {
		&self.signature
	}

	/// Plans argument passing for calls arriving at a join point shaped like
	/// `join_point`.
	///
	/// Each advice parameter is filled, in order of preference, by the
	/// receiver (for the bare `receiver_slot` parameter), by the join-point
	/// argument of the same name, by its own default, or with `Null`.
	/// A caller's argument therefore wins over the advice's declared default.
	pub fn weave(self, join_point: &SignatureDescriptor, receiver_slot: &str) -> WovenAdvice {
		let plan = self
			.signature
			.params()
			.iter()
			.map(|param| {
				if param.is_receiver_slot(receiver_slot) {
					ArgSource::Receiver
				} else if let Some(idx) = join_point.position(&param.name) {
					ArgSource::JoinPoint(idx)
				} else {
					ArgSource::Fixed(param.default.clone().unwrap_or_default())
				}
			})
			.collect();

		WovenAdvice {
			key: self.key,
			provider: Arc::downgrade(&self.provider),
			instance: self.instance,
			plan,
		}
	}
}

/// Where one advice argument comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSource {
	/// The join point's receiver, or `Null` for receiverless calls.
	Receiver,
	/// The join-point argument at this position.
	JoinPoint(usize),
	/// A constant: the advice parameter's default, or `Null`.
	Fixed(Value),
}

/// Advice ready to run inside a chain layer.
///
/// Holds the provider weakly: a host usually owns the heads it installs.
#[derive(Clone)]
pub struct WovenAdvice {
	key: TargetKey,
	provider: Weak<dyn SymbolProvider>,
	instance: Option<(ObjectRegistry, ObjectHandle)>,
	plan: Vec<ArgSource>,
}

impl WovenAdvice {
	pub fn key(&self) -> &TargetKey {
		&self.key
	}

	pub fn plan(&self) -> &[ArgSource] {
		&self.plan
	}

	/// Runs the advice for a join-point `call`.
	///
	/// The advice symbol is looked up through the host each time, picking up
	/// any head installed for it since composition. Instance advice also
	/// re-reads its object and fails with [`crate::Error::DanglingHandle`] once
	/// the handle is disposed.
	pub fn invoke(&self, call: &Call) -> Result<Value> {
		let this = match &self.instance {
			Some((objects, handle)) => Some(objects.lookup(handle)?),
			None => None,
		};

		let args = self
			.plan
			.iter()
			.map(|source| match source {
				ArgSource::Receiver => Value::receiver(call.this()),
				ArgSource::JoinPoint(idx) => call.arg(*idx).clone(),
				ArgSource::Fixed(value) => value.clone(),
			})
			.collect();

		let provider = self
			.provider
			.upgrade()
			.ok_or_else(|| Error::Lookup(self.key.clone()))?;
		let callable = provider.current(&self.key)?;
		callable.call(&Call::from_parts(this, args))
	}
}

impl fmt::Debug for ResolvedAdvice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolvedAdvice")
			.field("key", &self.key)
			.field("signature", &self.signature.to_string())
			.field("instance", &self.instance)
			.finish_non_exhaustive()
	}
}

impl fmt::Debug for WovenAdvice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WovenAdvice")
			.field("key", &self.key)
			.field("instance", &self.instance)
			.field("plan", &self.plan)
			.finish_non_exhaustive()
	}
}
