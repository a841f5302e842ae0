//! Interception chains: the composed behavior of one join point.
//!
//! # Role
//!
//! A chain keeps the join point's original callable and a current head. Each
//! composition wraps the current head in a new [`Layer`] and publishes it as
//! the head, then hands the head to the host installer.
//!
//! # Invariants
//!
//! - The head always terminates, through zero or more wraps, in the original.
//! - Layers are immutable. A head obtained earlier keeps its behavior after
//!   further composition.
//! - Concurrent compositions are serialized; none is lost, and installs reach
//!   the host in head order. Reads (`head`, `wrap_count`, `layers`) never
//!   block, so an installer may inspect the chain it is installing.
//! - A failed composition changes nothing and installs nothing.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::advice::{AdviceBinding, WovenAdvice};
use crate::call::{Call, Callable};
use crate::error::Result;
use crate::key::TargetKey;
use crate::registry::HostContext;
use crate::signature::SignatureDescriptor;
use crate::value::Value;


/// Composition mode of a wrap: where the advice runs and whose return value
/// survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
	/// Advice first, then the wrapped chain. Returns the chain's value.
	Before,
	/// Wrapped chain first, then the advice. Returns the advice's value.
	After,
	/// Wrapped chain first, then the advice. Returns the chain's value.
	Around,
}

enum Step {
	Original(Callable),
	Advice(Mode, WovenAdvice),
}

/// One level of a composed chain.
///
/// Every layer but the original wraps an inner layer.
pub struct Layer {
	name: Arc<str>,
	step: Step,
	inner: Option<Arc<Layer>>,
}

impl Layer {
	fn original(name: &str, callable: Callable) -> Self {
		Self {
			name: Arc::from(name),
			step: Step::Original(callable),
			inner: None,
		}
	}

	fn wrap(name: String, mode: Mode, advice: WovenAdvice, inner: Arc<Layer>) -> Self {
		Self {
			name: Arc::from(name),
			step: Step::Advice(mode, advice),
			inner: Some(inner),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Composition mode, or `None` for the original callable.
	pub fn mode(&self) -> Option<Mode> {
		match &self.step {
			Step::Original(_) => None,
			Step::Advice(mode, _) => Some(*mode),
		}
	}

	/// The layer this one wraps.
	pub fn inner(&self) -> Option<&Arc<Layer>> {
		self.inner.as_ref()
	}

	/// Runs this layer for an already-bound call.
	///
	/// Walks the layers iteratively: `before` advice runs on the way down,
	/// `after` and `around` advice on the way back up, innermost first.
	pub fn invoke(&self, call: &Call) -> Result<Value> {
		let mut unwind = Vec::new();
		let mut ret = Value::Null;
		let mut cur = Some(self);
		while let Some(layer) = cur {
			match &layer.step {
				Step::Original(original) => ret = original.call(call)?,
				Step::Advice(Mode::Before, advice) => {
					advice.invoke(call)?;
				}
				Step::Advice(mode, advice) => unwind.push((*mode, advice)),
			}
			cur = layer.inner.as_deref();
		}

		for (mode, advice) in unwind.into_iter().rev() {
			let value = advice.invoke(call)?;
			if mode == Mode::After {
				ret = value;
			}
		}
		Ok(ret)
	}
}

impl Drop for Layer {
	fn drop(&mut self) {
		// Unlink uniquely owned inner layers one at a time; deep chains would
		// otherwise recurse once per wrap.
		let mut next = self.inner.take();
		while let Some(layer) = next {
			next = match Arc::try_unwrap(layer) {
				Ok(mut layer) => layer.inner.take(),
				Err(_) => None,
			};
		}
	}
}

impl fmt::Debug for Layer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Layer")
			.field("name", &self.name)
			.field("mode", &self.mode())
			.finish()
	}
}

/// A published head: the outermost layer plus its installable callable.
struct Head {
	layer: Arc<Layer>,
	callable: Callable,
}

impl Head {
	fn new(key: &TargetKey, signature: &Arc<SignatureDescriptor>, layer: Arc<Layer>) -> Self {
		let callable = {
			let key = key.clone();
			let signature = Arc::clone(signature);
			let layer = Arc::clone(&layer);
			Callable::new(move |call| {
				let args = signature.bind(&key, call.args())?;
				layer.invoke(&Call::from_parts(call.this().cloned(), args))
			})
		};
		Self { layer, callable }
	}
}

/// The evolving composition for one join point.
///
/// Obtained from [`crate::PointcutRegistry::resolve`]; equal keys always yield
/// the same chain.
pub struct InterceptionChain {
	key: TargetKey,
	signature: Arc<SignatureDescriptor>,
	original: Callable,
	head: ArcSwap<Head>,
	wraps: AtomicU32,
	/// Serializes the wrap-publish-install step. Readers never take it.
	compose_lock: Mutex<()>,
	host: Arc<HostContext>,
}

impl InterceptionChain {
	pub(crate) fn new(
		key: TargetKey,
		signature: SignatureDescriptor,
		original: Callable,
		host: Arc<HostContext>,
	) -> Self {
		let signature = Arc::new(signature);
		let root = Arc::new(Layer::original(key.member(), original.clone()));
		let head = Head::new(&key, &signature, root);
		Self {
			key,
			signature,
			original,
			head: ArcSwap::from_pointee(head),
			wraps: AtomicU32::new(0),
			compose_lock: Mutex::new(()),
			host,
		}
	}

	pub fn key(&self) -> &TargetKey {
		&self.key
	}

	/// Parameter shape captured when the chain was created.
	pub fn signature(&self) -> &SignatureDescriptor {
		&self.signature
	}

	/// The join point's callable as it was before any weaving.
	pub fn original(&self) -> &Callable {
		&self.original
	}

	/// The current head. Later compositions do not affect the returned callable.
	pub fn head(&self) -> Callable {
		self.head.load().callable.clone()
	}

	/// Outermost layer of the current head.
	pub fn head_layer(&self) -> Arc<Layer> {
		Arc::clone(&self.head.load().layer)
	}

	/// Number of wraps composed so far.
	pub fn wrap_count(&self) -> u32 {
		self.wraps.load(Ordering::Acquire)
	}

	/// Layer names and modes from the outermost wrap down to the original.
	pub fn layers(&self) -> Vec<(Arc<str>, Option<Mode>)> {
		let mut out = Vec::new();
		let mut layer = Some(self.head_layer());
		while let Some(cur) = layer {
			out.push((Arc::clone(&cur.name), cur.mode()));
			layer = cur.inner().cloned();
		}
		out
	}

	/// Invokes the current head.
	pub fn invoke(&self, call: &Call) -> Result<Value> {
		self.head().call(call)
	}

	/// Runs `advice` before the current chain and keeps the chain's return value.
	pub fn before(&self, advice: &AdviceBinding) -> Result<&Self> {
		self.compose(Mode::Before, advice)
	}

	/// Runs `advice` after the current chain; the advice's return value
	/// replaces the chain's.
	pub fn after(&self, advice: &AdviceBinding) -> Result<&Self> {
		self.compose(Mode::After, advice)
	}

	/// Runs `advice` after the current chain and keeps the chain's return value.
	pub fn around(&self, advice: &AdviceBinding) -> Result<&Self> {
		self.compose(Mode::Around, advice)
	}

	fn compose(&self, mode: Mode, advice: &AdviceBinding) -> Result<&Self> {
		let resolved = advice
			.resolve(&self.host.provider)
			.inspect_err(|err| {
				tracing::warn!(join_point = %self.key, ?mode, %advice, %err, "composition rejected");
			})?;
		let woven = resolved.weave(&self.signature, &self.host.config.receiver_slot);

		let _guard = self.compose_lock.lock();
		let n = self.wraps.load(Ordering::Acquire);
		let name = format!("{}{}{}", self.key.member(), self.host.config.wrap_suffix, n);
		let layer = Arc::new(Layer::wrap(name, mode, woven, self.head_layer()));
		let head = Head::new(&self.key, &self.signature, layer);
		let callable = head.callable.clone();
		self.head.store(Arc::new(head));
		let wraps = n + 1;
		self.wraps.store(wraps, Ordering::Release);

		tracing::debug!(join_point = %self.key, ?mode, %advice, wraps, "advice woven");
		self.host.installer.install(&self.key, &self.signature, callable);
		tracing::trace!(join_point = %self.key, "head installed");
		Ok(self)
	}
}

impl fmt::Debug for InterceptionChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InterceptionChain")
			.field("key", &self.key)
			.field("signature", &self.signature.to_string())
			.field("wraps", &self.wrap_count())
			.finish()
	}
}
