//! Call frames and type-erased callables.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::value::{Object, ObjectRef, Value};

/// One invocation: an optional receiver plus positional arguments.
#[derive(Debug, Clone, Default)]
pub struct Call {
	this: Option<ObjectRef>,
	args: Vec<Value>,
}

impl Call {
	/// A call without a receiver (free function or static member).
	pub fn new(args: impl IntoIterator<Item = Value>) -> Self {
		Self {
			this: None,
			args: args.into_iter().collect(),
		}
	}

	/// A call made on `this`.
	pub fn on(this: ObjectRef, args: impl IntoIterator<Item = Value>) -> Self {
		Self {
			this: Some(this),
			args: args.into_iter().collect(),
		}
	}

	pub(crate) fn from_parts(this: Option<ObjectRef>, args: Vec<Value>) -> Self {
		Self { this, args }
	}

	pub fn this(&self) -> Option<&ObjectRef> {
		self.this.as_ref()
	}

	/// Downcasts the receiver to a concrete object type.
	pub fn this_as<T: Object>(&self) -> Option<&T> {
		self.this.as_deref()?.downcast_ref::<T>()
	}

	pub fn args(&self) -> &[Value] {
		&self.args
	}

	/// Argument at `idx`, or `Null` when absent.
	pub fn arg(&self, idx: usize) -> &Value {
		static NULL: Value = Value::Null;
		self.args.get(idx).unwrap_or(&NULL)
	}
}

type CallFn = dyn Fn(&Call) -> Result<Value> + Send + Sync;

/// A thread-safe, cheaply cloneable callable.
#[derive(Clone)]
pub struct Callable(Arc<CallFn>);

impl Callable {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	pub fn call(&self, call: &Call) -> Result<Value> {
		(self.0)(call)
	}

	/// True if both handles point at the same function object.
	pub fn ptr_eq(&self, other: &Callable) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Callable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Callable({:p})", Arc::as_ptr(&self.0))
	}
}
