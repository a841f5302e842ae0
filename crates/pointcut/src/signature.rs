//! Parameter shapes of join points and advice.
//!
//! A [`SignatureDescriptor`] is captured once per join point when its chain is
//! created. Every composed head binds incoming arguments against it, so a
//! woven join point accepts exactly the calls the original accepted.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::key::TargetKey;
use crate::value::Value;

/// Declared type constraint of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHint {
	/// Accepts [`Value::List`].
	Array,
	/// Accepts objects whose class has this exact name.
	Class(Arc<str>),
}

impl TypeHint {
	/// Checks a value against this hint. `Null` passes only when the
	/// parameter defaults to `Null`.
	pub fn accepts(&self, value: &Value, default: Option<&Value>) -> bool {
		match (self, value) {
			(_, Value::Null) => default.is_some_and(Value::is_null),
			(TypeHint::Array, Value::List(_)) => true,
			(TypeHint::Class(name), Value::Object(obj)) => obj.class() == &**name,
			_ => false,
		}
	}
}

impl fmt::Display for TypeHint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TypeHint::Array => f.write_str("Array"),
			TypeHint::Class(name) => f.write_str(name),
		}
	}
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
	pub name: Arc<str>,
	pub hint: Option<TypeHint>,
	pub by_ref: bool,
	pub default: Option<Value>,
}

impl Param {
	/// A required, untyped, by-value parameter.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			hint: None,
			by_ref: false,
			default: None,
		}
	}

	pub fn hint(mut self, hint: TypeHint) -> Self {
		self.hint = Some(hint);
		self
	}

	pub fn by_ref(mut self) -> Self {
		self.by_ref = true;
		self
	}

	pub fn default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// True if this parameter is the reserved receiver slot: named `slot`,
	/// with neither a type hint nor a default.
	pub fn is_receiver_slot(&self, slot: &str) -> bool {
		&*self.name == slot && self.hint.is_none() && self.default.is_none()
	}
}

impl fmt::Display for Param {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(hint) = &self.hint {
			write!(f, "{hint} ")?;
		}
		if self.by_ref {
			f.write_str("&")?;
		}
		write!(f, "${}", self.name)?;
		if let Some(default) = &self.default {
			write!(f, " = {default}")?;
		}
		Ok(())
	}
}

/// Whether a join point is invoked with a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallKind {
	#[default]
	Instance,
	Static,
}

/// Declared visibility of a member, passed through to installers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
	#[default]
	Public,
	Protected,
	Private,
}

/// Ordered parameter list plus the call shape of a member.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureDescriptor {
	params: Vec<Param>,
	kind: CallKind,
	visibility: Visibility,
}

impl SignatureDescriptor {
	pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
		Self {
			params: params.into_iter().collect(),
			..Self::default()
		}
	}

	pub fn with_kind(mut self, kind: CallKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	pub fn params(&self) -> &[Param] {
		&self.params
	}

	pub fn kind(&self) -> CallKind {
		self.kind
	}

	pub fn visibility(&self) -> Visibility {
		self.visibility
	}

	pub fn is_static(&self) -> bool {
		self.kind == CallKind::Static
	}

	/// Position of the parameter called `name`.
	pub fn position(&self, name: &str) -> Option<usize> {
		self.params.iter().position(|p| &*p.name == name)
	}

	/// Binds positional arguments for a call to `target`.
	///
	/// Missing trailing arguments take their defaults and hinted parameters
	/// are checked. Arguments beyond the declared list pass through.
	pub fn bind(&self, target: &TargetKey, args: &[Value]) -> Result<Vec<Value>> {
		let mut bound = Vec::with_capacity(self.params.len().max(args.len()));

		for (idx, param) in self.params.iter().enumerate() {
			let value = match (args.get(idx), &param.default) {
				(Some(arg), _) => arg.clone(),
				(None, Some(default)) => default.clone(),
				(None, None) => {
					return Err(Error::MissingArgument {
						target: target.clone(),
						param: Box::from(&*param.name),
					});
				}
			};

			if let Some(hint) = &param.hint
				&& !hint.accepts(&value, param.default.as_ref())
			{
				return Err(Error::TypeMismatch {
					target: target.clone(),
					param: Box::from(&*param.name),
					expected: hint.to_string(),
					found: value.type_name().to_string(),
				});
			}

			bound.push(value);
		}

		bound.extend(args.iter().skip(self.params.len()).cloned());
		Ok(bound)
	}
}

/// Renders the parameter list, e.g. `Array &$xs = null, $local = 'default'`.
impl fmt::Display for SignatureDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, param) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{param}")?;
		}
		Ok(())
	}
}
