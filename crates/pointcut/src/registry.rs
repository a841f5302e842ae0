//! Pointcut registry: one canonical interception chain per join point.
//!
//! # Role
//!
//! Memoizing factory from [`TargetKey`] to [`InterceptionChain`]. The key map
//! is an immutable snapshot published through `ArcSwap`; readers never lock.
//! Creation is serialized by a writer lock taken before the host is asked, so
//! the host describes each join point exactly once.
//!
//! # Invariants
//!
//! - `resolve` on an equal key returns the identical chain (`Arc::ptr_eq`).
//! - Wildcard keys are rejected before the host is consulted.
//! - The symbol provider is queried once per created key, even under races.
//! - No entry is ever removed.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::capability::{Installer, SymbolProvider};
use crate::chain::InterceptionChain;
use crate::config::WeaveConfig;
use crate::error::{Error, Result};
use crate::key::TargetKey;

/// Host capabilities and configuration shared by a registry and its chains.
pub(crate) struct HostContext {
	pub(crate) provider: Arc<dyn SymbolProvider>,
	pub(crate) installer: Arc<dyn Installer>,
	pub(crate) config: WeaveConfig,
}

#[derive(Clone, Default)]
struct ChainSnapshot {
	by_key: HashMap<TargetKey, Arc<InterceptionChain>>,
	order: Vec<TargetKey>,
}

pub struct PointcutRegistry {
	host: Arc<HostContext>,
	snap: ArcSwap<ChainSnapshot>,
	/// Held while a chain is created. Lookups of existing chains skip it.
	creating: Mutex<()>,
}

impl PointcutRegistry {
	/// Creates a registry with the default [`WeaveConfig`].
	pub fn new(provider: Arc<dyn SymbolProvider>, installer: Arc<dyn Installer>) -> Self {
		Self::with_config(provider, installer, WeaveConfig::default())
	}

	pub fn with_config(
		provider: Arc<dyn SymbolProvider>,
		installer: Arc<dyn Installer>,
		config: WeaveConfig,
	) -> Self {
		Self {
			host: Arc::new(HostContext {
				provider,
				installer,
				config,
			}),
			snap: ArcSwap::from_pointee(ChainSnapshot::default()),
			creating: Mutex::new(()),
		}
	}

	pub fn config(&self) -> &WeaveConfig {
		&self.host.config
	}

	/// Returns the chain for `key`, creating it on first use.
	///
	/// Creation captures the join point's signature and original callable from
	/// the symbol provider exactly once per key.
	pub fn resolve(&self, key: TargetKey) -> Result<Arc<InterceptionChain>> {
		if key.is_wildcard() {
			tracing::warn!(%key, "wildcard pointcut rejected");
			return Err(Error::Unsupported(key));
		}
		if let Some(chain) = self.get(&key) {
			return Ok(chain);
		}

		let _guard = self.creating.lock();
		if let Some(chain) = self.get(&key) {
			// Created by the thread that held the lock before us.
			return Ok(chain);
		}

		let signature = self.host.provider.describe(&key)?;
		let original = self.host.provider.callable(&key)?;
		let created = Arc::new(InterceptionChain::new(
			key.clone(),
			signature,
			original,
			Arc::clone(&self.host),
		));

		let mut next = (**self.snap.load()).clone();
		next.by_key.insert(key.clone(), Arc::clone(&created));
		next.order.push(key.clone());
		self.snap.store(Arc::new(next));

		tracing::debug!(%key, params = %created.signature(), "pointcut created");
		Ok(created)
	}

	/// Returns the chain for `key` without creating it.
	pub fn get(&self, key: &TargetKey) -> Option<Arc<InterceptionChain>> {
		self.snap.load().by_key.get(key).cloned()
	}

	/// Keys of all chains, in creation order.
	pub fn keys(&self) -> Vec<TargetKey> {
		self.snap.load().order.clone()
	}

	pub fn len(&self) -> usize {
		self.snap.load().order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
