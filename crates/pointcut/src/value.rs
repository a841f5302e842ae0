//! Dynamic values passed through woven calls.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An object that can act as a call receiver or host an instance advice.
pub trait Object: Any + Send + Sync + fmt::Debug {
	/// Class name used to look up methods on this object.
	fn class(&self) -> &str;
}

impl dyn Object {
	/// Returns the concrete object if it is a `T`.
	pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
		(self as &dyn Any).downcast_ref::<T>()
	}
}

/// Shared object reference.
pub type ObjectRef = Arc<dyn Object>;

/// A value flowing into or out of a join point.
#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	List(Arc<[Value]>),
	/// Objects compare by identity.
	Object(ObjectRef),
}

impl Value {
	/// Wraps a receiver, mapping `None` to [`Value::Null`].
	pub fn receiver(this: Option<&ObjectRef>) -> Self {
		this.map_or(Value::Null, |obj| Value::Object(obj.clone()))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Value::Object(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the type name of this value, using the class name for objects.
	pub fn type_name(&self) -> &str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "string",
			Value::List(_) => "array",
			Value::Object(obj) => obj.class(),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

/// Renders values the way default values appear in a parameter list.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::Int(v) => write!(f, "{v}"),
			Value::Float(v) => write!(f, "{v:?}"),
			Value::Str(v) => write!(f, "'{}'", v.replace('\'', "\\'")),
			Value::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Value::Object(obj) => write!(f, "{}#{:p}", obj.class(), Arc::as_ptr(obj)),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(Arc::from(v))
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(Arc::from(v))
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::List(Arc::from(v))
	}
}

impl From<ObjectRef> for Value {
	fn from(v: ObjectRef) -> Self {
		Value::Object(v)
	}
}

impl From<()> for Value {
	fn from(_: ()) -> Self {
		Value::Null
	}
}
