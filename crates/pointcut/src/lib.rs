//! Interception-chain composition engine.
//!
//! Attaches advice to a named join point without touching the join point's
//! definition, and composes any number of attachments in a fixed order.
//!
//! ```ignore
//! let table = Arc::new(MethodTable::new());
//! // ... define Test::say_moo and Aspect::hello on the table ...
//! let pointcuts = PointcutRegistry::new(table.clone(), table.clone());
//!
//! pointcuts
//! 	.resolve(TargetKey::method("Test", "say_moo"))?
//! 	.after(&AdviceBinding::method("Aspect", "hello"))?
//! 	.before(&AdviceBinding::method("Aspect", "hello"))?;
//!
//! table.invoke(&TargetKey::method("Test", "say_moo"), &Call::on(test, []))?;
//! ```
//!
//! # Composition modes
//!
//! | mode     | runs                   | returns          |
//! |----------|------------------------|------------------|
//! | `before` | advice, then chain     | chain's value    |
//! | `after`  | chain, then advice     | advice's value   |
//! | `around` | chain, then advice     | chain's value    |
//!
//! Each composition wraps the current head, so the newest wrap is outermost.
//!
//! # Host capabilities
//!
//! The engine does not inspect or patch code. Hosts implement
//! [`SymbolProvider`] (describe and fetch callables) and [`Installer`] (make a
//! head the thing invoked at the join point). [`MethodTable`] is an in-memory
//! host implementing both.
//!
//! # Receiver forwarding
//!
//! An advice parameter named after [`WeaveConfig::receiver_slot`] (default
//! `that`), with no type hint and no default, receives the join point's
//! receiver. Other advice parameters are filled from join-point arguments of
//! the same name. Local variables of the join point are not visible to advice.

pub mod advice;
pub mod call;
pub mod capability;
pub mod chain;
pub mod config;
pub mod error;
pub mod key;
pub mod objects;
pub mod registry;
pub mod signature;
pub mod table;
pub mod value;

pub use advice::{AdviceBinding, ArgSource, ResolvedAdvice, WovenAdvice};
pub use call::{Call, Callable};
pub use capability::{Installer, SymbolProvider};
pub use chain::{InterceptionChain, Layer, Mode};
pub use config::{ConfigError, WeaveConfig};
pub use error::{Error, Result};
pub use key::{Scope, TargetKey};
pub use objects::{ObjectHandle, ObjectRegistry};
pub use registry::PointcutRegistry;
pub use signature::{CallKind, Param, SignatureDescriptor, TypeHint, Visibility};
pub use table::MethodTable;
pub use value::{Object, ObjectRef, Value};
