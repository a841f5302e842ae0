//! Handle table for objects hosting instance advice.
//!
//! Instance advice is invoked long after, and far away from, the code that
//! created it. The advice therefore stores only a handle and looks the object
//! up here on every invocation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::error::{Error, Result};
use crate::value::ObjectRef;

/// Process-wide handle clock. Handles are never reused, even across registries.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

static GLOBAL: LazyLock<ObjectRegistry> = LazyLock::new(ObjectRegistry::new);

/// Opaque key of a registered object, rendered as `<Class>_<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
	class: Arc<str>,
	id: u64,
}

impl ObjectHandle {
	pub fn class(&self) -> &str {
		&self.class
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

impl fmt::Display for ObjectHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.class, self.id)
	}
}

/// Shared handle → object table. Clones share the same table.
#[derive(Debug, Default, Clone)]
pub struct ObjectRegistry {
	inner: Arc<RwLock<HashMap<ObjectHandle, ObjectRef>>>,
}

impl ObjectRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide registry.
	pub fn global() -> Self {
		GLOBAL.clone()
	}

	/// Stores `object` under a fresh handle.
	pub fn register(&self, object: ObjectRef) -> ObjectHandle {
		let handle = ObjectHandle {
			class: Arc::from(object.class()),
			id: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
		};
		self.inner.write().insert(handle.clone(), object);
		tracing::trace!(%handle, "object registered");
		handle
	}

	/// Returns the object stored under `handle`.
	pub fn lookup(&self, handle: &ObjectHandle) -> Result<ObjectRef> {
		self.inner
			.read()
			.get(handle)
			.cloned()
			.ok_or_else(|| Error::DanglingHandle(handle.clone()))
	}

	/// Releases `handle`. Advice still referring to it fails on invocation.
	pub fn dispose(&self, handle: &ObjectHandle) -> Option<ObjectRef> {
		let removed = self.inner.write().remove(handle);
		if removed.is_some() {
			tracing::debug!(%handle, "object disposed");
		}
		removed
	}

	pub fn contains(&self, handle: &ObjectHandle) -> bool {
		self.inner.read().contains_key(handle)
	}

	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use rustc_hash::FxHashSet;

	use super::*;
	use crate::value::Object;

	#[derive(Debug)]
	struct Aspect;

	impl Object for Aspect {
		fn class(&self) -> &str {
			"Aspect"
		}
	}

	#[test]
	fn register_then_lookup_returns_same_object() {
		let registry = ObjectRegistry::new();
		let obj: ObjectRef = Arc::new(Aspect);
		let handle = registry.register(obj.clone());

		assert!(Arc::ptr_eq(&registry.lookup(&handle).unwrap(), &obj));
		assert!(handle.to_string().starts_with("Aspect_"));
	}

	#[test]
	fn handles_are_never_reused() {
		let registry = ObjectRegistry::new();
		let a = registry.register(Arc::new(Aspect));
		registry.dispose(&a);
		let b = registry.register(Arc::new(Aspect));
		assert_ne!(a, b);
	}

	#[test]
	fn disposed_handle_dangles() {
		let registry = ObjectRegistry::new();
		let handle = registry.register(Arc::new(Aspect));
		assert!(registry.dispose(&handle).is_some());
		assert!(registry.dispose(&handle).is_none());
		assert_eq!(registry.lookup(&handle).unwrap_err(), Error::DanglingHandle(handle));
		assert!(registry.is_empty());
	}

	#[test]
	fn clones_share_the_table() {
		let registry = ObjectRegistry::new();
		let handle = registry.clone().register(Arc::new(Aspect));
		assert!(registry.contains(&handle));
	}

	#[test]
	fn concurrent_registration_yields_unique_handles() {
		let registry = ObjectRegistry::new();
		let handles: Vec<ObjectHandle> = thread::scope(|s| {
			let workers: Vec<_> = (0..8)
				.map(|_| {
					let registry = registry.clone();
					s.spawn(move || {
						(0..64)
							.map(|_| registry.register(Arc::new(Aspect)))
							.collect::<Vec<_>>()
					})
				})
				.collect();
			workers
				.into_iter()
				.flat_map(|w| w.join().unwrap())
				.collect()
		});

		let unique: FxHashSet<_> = handles.iter().cloned().collect();
		assert_eq!(unique.len(), 8 * 64);
		assert_eq!(registry.len(), 8 * 64);
	}
}
